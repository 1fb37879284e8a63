//! Block data model for the pagecraft editor core.
//!
//! - [`Block`]: one document node and its classification predicates
//! - [`BlockContent`]: typed content, one variant per block type
//! - [`BlockIndex`]: blocks of open documents keyed by `(root_id, id)`

pub mod block;
pub mod content;
pub mod enums;
pub mod error;
pub mod index;

pub use block::{Block, BlockFields, RawBlock};
pub use content::{
    BlockContent, BookmarkContent, DataviewContent, DivContent, FileContent, GroupIndex,
    LayoutContent, LinkContent, Mark, TextContent, TextRange, ViewGroupOrder,
};
pub use enums::{
    BlockAlign, BlockType, Coded, DivStyle, FileType, LayoutStyle, LinkStyle, MarkType,
    ObjectLayout, TextStyle,
};
pub use error::{ModelError, Result};
pub use index::BlockIndex;
