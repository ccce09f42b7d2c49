/*!
 * Tests for turning section markup into structural blocks
 */

use epubwai::document::{collect_blocks, Block, BlockContent, BlockKind, Segment};
use epubwai::epub::XhtmlDocument;
use crate::common;

fn blocks_of(body: &str) -> Vec<Block> {
    let markup = common::xhtml(body);
    let document = XhtmlDocument::parse("OEBPS/text/ch.xhtml", markup.as_bytes()).unwrap();
    collect_blocks(document.body().unwrap())
}

fn inline(block: &Block) -> &[Segment] {
    match &block.content {
        BlockContent::Inline(segments) => segments,
        BlockContent::Table(_) => panic!("Expected inline content, got a table"),
    }
}

#[test]
fn test_collectBlocks_withMixedBody_shouldKeepSourceOrderAndRoles() {
    let blocks = blocks_of(concat!(
        "<h2>Title</h2>\n",
        "<p>First <em>para</em>graph.</p>\n",
        "<li>Item</li>\n",
        "<blockquote>Quote</blockquote>\n",
        "loose text\n",
        "<section><span>Inside</span></section>",
    ));

    let kinds: Vec<_> = blocks.iter().map(|block| block.kind).collect();
    assert_eq!(kinds, vec![
        BlockKind::Heading(2),
        BlockKind::Paragraph,
        BlockKind::ListItem,
        BlockKind::Blockquote,
        BlockKind::Implicit,
        BlockKind::Implicit,
    ]);
    assert_eq!(inline(&blocks[1]), &[Segment::text("First paragraph.")]);
    assert_eq!(inline(&blocks[4]), &[Segment::text("\nloose text\n")]);
    assert_eq!(inline(&blocks[5]), &[Segment::text("Inside")]);
}

#[test]
fn test_collectBlocks_withImageInParagraph_shouldSplitTextAroundIt() {
    let blocks = blocks_of(r#"<p>Before <img src="../images/a.png" alt="a"/> after<br/>next</p>"#);

    assert_eq!(inline(&blocks[0]), &[
        Segment::text("Before "),
        Segment::image("../images/a.png"),
        Segment::text(" after\nnext"),
    ]);
}

#[test]
fn test_collectBlocks_withEntitiesAcrossMarkup_shouldMergeDecodedText() {
    let blocks = blocks_of("<p>Fish &amp; <b>chips</b>&nbsp;&mdash; 5&#36;</p>");

    assert_eq!(inline(&blocks[0]), &[Segment::text("Fish & chips\u{a0}\u{2014} 5$")]);
}

#[test]
fn test_collectBlocks_withTable_shouldCollectRowsOfCellText() {
    let blocks = blocks_of(concat!(
        "<table><thead><tr><th> Name </th><th>Age</th></tr></thead>",
        "<tbody><tr><td><p>Ada</p>\n <p>Lovelace</p></td><td>36</td></tr>",
        "<tr><td> </td><td></td></tr></tbody></table>",
    ));

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].kind, BlockKind::Table);
    assert_eq!(blocks[0].content, BlockContent::Table(vec![
        vec!["Name".to_string(), "Age".to_string()],
        vec!["Ada Lovelace".to_string(), "36".to_string()],
        vec![String::new(), String::new()],
    ]));
}

#[test]
fn test_collectBlocks_withEmptyParagraph_shouldYieldNoSegments() {
    let blocks = blocks_of("<p></p>");

    assert_eq!(blocks.len(), 1);
    assert!(inline(&blocks[0]).is_empty());
}

#[test]
fn test_parse_withMalformedMarkup_shouldStillReachBody() {
    let markup = "<html><body><p>Open <i>italic</p><p>Next</p></body></html>";
    let document = XhtmlDocument::parse("ch.xhtml", markup.as_bytes()).unwrap();

    let blocks = collect_blocks(document.body().unwrap());
    let texts: Vec<_> = blocks.iter()
        .flat_map(|block| inline(block).iter())
        .filter_map(|segment| match segment {
            Segment::Text(value) => Some(value.as_str()),
            Segment::Image { .. } => None,
        })
        .collect();
    assert_eq!(texts.concat(), "Open italicNext");
}
