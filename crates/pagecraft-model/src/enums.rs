//! Type-safe enumerations for block classification.
//!
//! The backend sends most of these as small integer codes (layout, align,
//! content styles) and the block type as a lowercase name. Every enum here
//! can be recovered from loose JSON without failing: unknown or malformed
//! input coerces to the default variant.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

// ============================================================================
// Numeric codes
// ============================================================================

/// An enum whose variants travel as integer codes.
pub trait Coded: Sized + Copy + Default + 'static {
    /// Every variant, in code order.
    const ALL: &'static [Self];

    /// The wire code of this variant.
    fn code(self) -> u8;

    /// Look up a variant by its wire code.
    fn from_code(code: i64) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|variant| i64::from(variant.code()) == code)
    }

    /// Coerce loose JSON into a variant.
    ///
    /// Numbers and numeric strings are matched by code; booleans count as
    /// `0`/`1`. Anything else, including fractional or unknown codes, yields
    /// the default variant.
    fn coerce(value: &Value) -> Self {
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        };
        number
            .filter(|n| n.fract() == 0.0)
            .and_then(|n| Self::from_code(n as i64))
            .unwrap_or_default()
    }
}

// ============================================================================
// Block type
// ============================================================================

/// Kind of a block node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockType {
    /// No type was given.
    #[default]
    Empty,
    Page,
    Text,
    Layout,
    Link,
    Div,
    File,
    Bookmark,
    IconPage,
    IconUser,
    Cover,
    Featured,
    Dataview,
    Relation,
    Table,
    TableRow,
    TableColumn,
    TableCell,
}

impl BlockType {
    /// All block types, `Empty` first.
    pub const ALL: [BlockType; 18] = [
        BlockType::Empty,
        BlockType::Page,
        BlockType::Text,
        BlockType::Layout,
        BlockType::Link,
        BlockType::Div,
        BlockType::File,
        BlockType::Bookmark,
        BlockType::IconPage,
        BlockType::IconUser,
        BlockType::Cover,
        BlockType::Featured,
        BlockType::Dataview,
        BlockType::Relation,
        BlockType::Table,
        BlockType::TableRow,
        BlockType::TableColumn,
        BlockType::TableCell,
    ];

    /// Name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Empty => "",
            BlockType::Page => "page",
            BlockType::Text => "text",
            BlockType::Layout => "layout",
            BlockType::Link => "link",
            BlockType::Div => "div",
            BlockType::File => "file",
            BlockType::Bookmark => "bookmark",
            BlockType::IconPage => "iconPage",
            BlockType::IconUser => "iconUser",
            BlockType::Cover => "cover",
            BlockType::Featured => "featured",
            BlockType::Dataview => "dataview",
            BlockType::Relation => "relation",
            BlockType::Table => "table",
            BlockType::TableRow => "tableRow",
            BlockType::TableColumn => "tableColumn",
            BlockType::TableCell => "tableCell",
        }
    }

    /// Coerce a loose JSON value; anything that is not a known name is `Empty`.
    pub fn coerce(value: &Value) -> Self {
        value
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockType::Empty => write!(f, "empty"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

impl FromStr for BlockType {
    type Err = ModelError;

    /// Parse a wire name (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        BlockType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().to_lowercase() == normalized)
            .ok_or_else(|| ModelError::UnknownBlockType(s.to_string()))
    }
}

// ============================================================================
// Object layout
// ============================================================================

/// Layout of an object root. Only meaningful for `BlockType::Page`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectLayout {
    #[default]
    Page,
    Human,
    Task,
    Set,
    ObjectType,
    Relation,
    File,
}

impl Coded for ObjectLayout {
    const ALL: &'static [Self] = &[
        ObjectLayout::Page,
        ObjectLayout::Human,
        ObjectLayout::Task,
        ObjectLayout::Set,
        ObjectLayout::ObjectType,
        ObjectLayout::Relation,
        ObjectLayout::File,
    ];

    fn code(self) -> u8 {
        self as u8
    }
}

// ============================================================================
// Alignment
// ============================================================================

/// Horizontal alignment of a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl Coded for BlockAlign {
    const ALL: &'static [Self] = &[BlockAlign::Left, BlockAlign::Center, BlockAlign::Right];

    fn code(self) -> u8 {
        self as u8
    }
}

// ============================================================================
// Content styles
// ============================================================================

/// Style of a text block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextStyle {
    #[default]
    Paragraph,
    Header1,
    Header2,
    Header3,
    Quote,
    Code,
    Title,
    Checkbox,
    Bulleted,
    Numbered,
    Toggle,
    Description,
}

impl TextStyle {
    /// Returns true for the list styles (toggle, numbered, bulleted, checkbox).
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            TextStyle::Toggle | TextStyle::Numbered | TextStyle::Bulleted | TextStyle::Checkbox
        )
    }

    /// Returns true for the three header levels.
    pub fn is_header(&self) -> bool {
        matches!(
            self,
            TextStyle::Header1 | TextStyle::Header2 | TextStyle::Header3
        )
    }
}

impl Coded for TextStyle {
    const ALL: &'static [Self] = &[
        TextStyle::Paragraph,
        TextStyle::Header1,
        TextStyle::Header2,
        TextStyle::Header3,
        TextStyle::Quote,
        TextStyle::Code,
        TextStyle::Title,
        TextStyle::Checkbox,
        TextStyle::Bulleted,
        TextStyle::Numbered,
        TextStyle::Toggle,
        TextStyle::Description,
    ];

    fn code(self) -> u8 {
        self as u8
    }
}

/// Style of a layout block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutStyle {
    #[default]
    Row,
    Column,
    Div,
    Header,
    TableRows,
    TableColumns,
}

impl Coded for LayoutStyle {
    const ALL: &'static [Self] = &[
        LayoutStyle::Row,
        LayoutStyle::Column,
        LayoutStyle::Div,
        LayoutStyle::Header,
        LayoutStyle::TableRows,
        LayoutStyle::TableColumns,
    ];

    fn code(self) -> u8 {
        self as u8
    }
}

/// Style of a link block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkStyle {
    #[default]
    Page,
    Archive,
}

impl Coded for LinkStyle {
    const ALL: &'static [Self] = &[LinkStyle::Page, LinkStyle::Archive];

    fn code(self) -> u8 {
        self as u8
    }
}

/// Kind of file held by a file block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileType {
    #[default]
    None,
    File,
    Image,
    Video,
    Audio,
    Pdf,
}

impl Coded for FileType {
    const ALL: &'static [Self] = &[
        FileType::None,
        FileType::File,
        FileType::Image,
        FileType::Video,
        FileType::Audio,
        FileType::Pdf,
    ];

    fn code(self) -> u8 {
        self as u8
    }
}

/// Style of a divider block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DivStyle {
    #[default]
    Line,
    Dot,
}

impl Coded for DivStyle {
    const ALL: &'static [Self] = &[DivStyle::Line, DivStyle::Dot];

    fn code(self) -> u8 {
        self as u8
    }
}

/// Inline mark kinds inside text content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkType {
    #[default]
    Strike,
    Code,
    Italic,
    Bold,
    Underline,
    Link,
    Color,
    BgColor,
    Mention,
    Emoji,
    Object,
}

impl Coded for MarkType {
    const ALL: &'static [Self] = &[
        MarkType::Strike,
        MarkType::Code,
        MarkType::Italic,
        MarkType::Bold,
        MarkType::Underline,
        MarkType::Link,
        MarkType::Color,
        MarkType::BgColor,
        MarkType::Mention,
        MarkType::Emoji,
        MarkType::Object,
    ];

    fn code(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_type_from_str() {
        assert_eq!("text".parse::<BlockType>().unwrap(), BlockType::Text);
        assert_eq!("TableCell".parse::<BlockType>().unwrap(), BlockType::TableCell);
        assert_eq!(" iconuser ".parse::<BlockType>().unwrap(), BlockType::IconUser);
        assert!("paragraph".parse::<BlockType>().is_err());
    }

    #[test]
    fn test_block_type_coerce_defaults_to_empty() {
        assert_eq!(BlockType::coerce(&json!("page")), BlockType::Page);
        assert_eq!(BlockType::coerce(&json!(3)), BlockType::Empty);
        assert_eq!(BlockType::coerce(&Value::Null), BlockType::Empty);
        assert_eq!(BlockType::coerce(&json!("nope")), BlockType::Empty);
    }

    #[test]
    fn test_coded_coerce() {
        assert_eq!(ObjectLayout::coerce(&json!(3)), ObjectLayout::Set);
        assert_eq!(ObjectLayout::coerce(&json!("1")), ObjectLayout::Human);
        assert_eq!(ObjectLayout::coerce(&json!("set")), ObjectLayout::Page);
        assert_eq!(ObjectLayout::coerce(&json!(2.5)), ObjectLayout::Page);
        assert_eq!(ObjectLayout::coerce(&json!(99)), ObjectLayout::Page);
        assert_eq!(BlockAlign::coerce(&json!(true)), BlockAlign::Center);
        assert_eq!(BlockAlign::coerce(&json!({})), BlockAlign::Left);
    }

    #[test]
    fn test_codes_follow_declaration_order() {
        for (idx, style) in TextStyle::ALL.iter().enumerate() {
            assert_eq!(usize::from(style.code()), idx);
        }
        assert_eq!(TextStyle::from_code(6), Some(TextStyle::Title));
        assert_eq!(TextStyle::from_code(-1), None);
    }

    #[test]
    fn test_text_style_groups() {
        assert!(TextStyle::Toggle.is_list());
        assert!(!TextStyle::Quote.is_list());
        assert!(TextStyle::Header2.is_header());
        assert!(!TextStyle::Title.is_header());
    }
}
