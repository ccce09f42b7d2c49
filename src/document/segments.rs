/*!
 * Segment extraction.
 *
 * Flattens a block's subtree into the ordered inline units the renderer
 * consumes. Text split by incidental markup (`<em>`, `<span>` ...) is merged
 * back together; images stay as barriers.
 */

use super::model::{ContentNode, Segment};

/// Extract the ordered segments of a subtree, starting at `node` itself
pub fn extract_segments(node: &ContentNode) -> Vec<Segment> {
    let mut segments = Vec::new();
    walk(node, &mut segments);
    merge_text_segments(segments)
}

fn walk(node: &ContentNode, segments: &mut Vec<Segment>) {
    match node {
        ContentNode::Text(value) => segments.push(Segment::Text(value.clone())),
        ContentNode::Image { src } => segments.push(Segment::Image { src: src.clone() }),
        ContentNode::Break => segments.push(Segment::text("\n")),
        ContentNode::Container { children, .. } => {
            for child in children {
                walk(child, segments);
            }
        }
    }
}

/// Concatenate runs of consecutive text segments
pub fn merge_text_segments(segments: Vec<Segment>) -> Vec<Segment> {
    let mut merged: Vec<Segment> = Vec::with_capacity(segments.len());

    for segment in segments {
        if let Segment::Text(value) = &segment {
            if let Some(Segment::Text(previous)) = merged.last_mut() {
                previous.push_str(value);
                continue;
            }
        }
        merged.push(segment);
    }

    merged
}
