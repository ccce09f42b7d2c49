/*!
 * Structural blocks of a section body.
 *
 * Every top-level body child becomes at most one `Block`: recognized
 * block-level elements keep their role, non-blank bare text and any other
 * element become implicit paragraphs.
 */

use super::model::{ContentNode, Segment};
use super::segments::extract_segments;

/// Structural role of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    /// Heading with level 1 to 6
    Heading(u8),
    ListItem,
    Blockquote,
    Division,
    Table,
    /// Bare text or a non-block element at the top level
    Implicit,
}

impl BlockKind {
    /// Role of a block-level tag (`p`, `div`, `h1`-`h6`, `li`, `blockquote`,
    /// `table`); `None` for any other tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "p" => Some(Self::Paragraph),
            "div" => Some(Self::Division),
            "li" => Some(Self::ListItem),
            "blockquote" => Some(Self::Blockquote),
            "table" => Some(Self::Table),
            "h1" => Some(Self::Heading(1)),
            "h2" => Some(Self::Heading(2)),
            "h3" => Some(Self::Heading(3)),
            "h4" => Some(Self::Heading(4)),
            "h5" => Some(Self::Heading(5)),
            "h6" => Some(Self::Heading(6)),
            _ => None,
        }
    }
}

/// What a block carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockContent {
    /// Ordered inline segments
    Inline(Vec<Segment>),
    /// Rows of whitespace-collapsed cell text, blank cells included
    Table(Vec<Vec<String>>),
}

/// One structural unit of a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub content: BlockContent,
}

impl Block {
    /// Build the block for one top-level body child
    ///
    /// Returns `None` for whitespace-only bare text.
    pub fn from_node(node: &ContentNode) -> Option<Self> {
        match node {
            ContentNode::Text(value) if value.trim().is_empty() => None,
            ContentNode::Text(value) => Some(Self {
                kind: BlockKind::Implicit,
                content: BlockContent::Inline(vec![Segment::text(value.clone())]),
            }),
            ContentNode::Container { tag, .. } => match BlockKind::from_tag(tag) {
                Some(BlockKind::Table) => Some(Self {
                    kind: BlockKind::Table,
                    content: BlockContent::Table(table_rows(node)),
                }),
                Some(kind) => Some(Self {
                    kind,
                    content: BlockContent::Inline(extract_segments(node)),
                }),
                None => Some(Self::implicit(node)),
            },
            ContentNode::Image { .. } | ContentNode::Break => Some(Self::implicit(node)),
        }
    }

    fn implicit(node: &ContentNode) -> Self {
        Self {
            kind: BlockKind::Implicit,
            content: BlockContent::Inline(extract_segments(node)),
        }
    }
}

/// Collect the blocks of a section body in document order
pub fn collect_blocks(body: &[ContentNode]) -> Vec<Block> {
    body.iter().filter_map(Block::from_node).collect()
}

/// Rows of a table, each a list of cell texts
///
/// Every `tr` below the table is a row and every `td`/`th` below a row is a
/// cell, nested tables included.
pub fn table_rows(table: &ContentNode) -> Vec<Vec<String>> {
    table.find_all(&["tr"])
        .into_iter()
        .map(|row| row.find_all(&["td", "th"]).into_iter().map(cell_text).collect())
        .collect()
}

/// Text of a cell: descendant strings trimmed, blanks dropped, joined by one space
pub fn cell_text(cell: &ContentNode) -> String {
    cell.strings()
        .into_iter()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
