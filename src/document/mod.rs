/*!
 * Content model for book sections.
 *
 * This module turns a parsed section body into the blocks and segments the
 * renderer consumes:
 * - `model`: the closed node tree and the segment type
 * - `segments`: ordered inline extraction with text merging
 * - `blocks`: top-level block classification and table cell text
 */

pub mod blocks;
pub mod model;
pub mod segments;

// Re-export types used by other modules
pub use blocks::{Block, BlockContent, BlockKind, cell_text, collect_blocks, table_rows};
pub use model::{ContentNode, Segment};
pub use segments::{extract_segments, merge_text_segments};
