//! The block node and its classification predicates.
//!
//! Every predicate is a pure function of `(block_type, layout, content
//! style)`. Nothing is cached, so a block mutated in place by its index is
//! classified correctly on the next call.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::content::{BlockContent, TextContent};
use crate::enums::{
    BlockAlign, BlockType, Coded, DivStyle, FileType, LayoutStyle, LinkStyle, ObjectLayout,
    TextStyle,
};
use crate::error::{ModelError, Result};

// ============================================================================
// Fields
// ============================================================================

/// Free-form presentation fields of a block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockFields {
    /// Layout width as a fraction of the editor width.
    pub width: Option<f64>,
    /// Everything else, kept verbatim.
    pub extra: Map<String, Value>,
}

impl BlockFields {
    pub fn from_value(value: &Value) -> Self {
        let mut extra = value.as_object().cloned().unwrap_or_default();
        let width = extra.remove("width").and_then(|w| w.as_f64());
        Self { width, extra }
    }

    pub fn to_value(&self) -> Value {
        let mut map = self.extra.clone();
        if let Some(width) = self.width {
            map.insert("width".to_string(), Value::from(width));
        }
        Value::Object(map)
    }

    /// Merge a patch object; a `width` key replaces the typed width.
    pub fn merge(&mut self, patch: &Map<String, Value>) {
        for (key, value) in patch {
            if key == "width" {
                self.width = value.as_f64();
            } else {
                self.extra.insert(key.clone(), value.clone());
            }
        }
    }
}

// ============================================================================
// Raw input
// ============================================================================

/// A block as it arrives from the backend, before coercion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawBlock {
    pub id: Value,
    pub parent_id: Value,
    #[serde(rename = "type")]
    pub block_type: Value,
    pub layout: Value,
    pub align: Value,
    pub bg_color: Value,
    /// Only array elements are read; any other shape means no children.
    pub children_ids: Value,
    pub fields: Value,
    pub content: Value,
}

// ============================================================================
// Block
// ============================================================================

/// One node of a document tree.
///
/// Children are referenced by id; the child blocks themselves live in a
/// [`BlockIndex`](crate::index::BlockIndex).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub parent_id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub layout: ObjectLayout,
    pub align: BlockAlign,
    pub bg_color: String,
    pub children_ids: Vec<String>,
    pub fields: BlockFields,
    pub content: BlockContent,
}

impl Block {
    /// Create a block of the given type with default content for that type.
    pub fn new(id: impl Into<String>, block_type: BlockType) -> Self {
        Self {
            id: id.into(),
            block_type,
            content: BlockContent::from_value(block_type, &Value::Null),
            ..Self::default()
        }
    }

    /// Create a text block.
    pub fn text(id: impl Into<String>, style: TextStyle, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            block_type: BlockType::Text,
            content: BlockContent::Text(TextContent {
                style,
                text: text.into(),
                ..TextContent::default()
            }),
            ..Self::default()
        }
    }

    /// Create an object root with the given layout.
    pub fn page(id: impl Into<String>, layout: ObjectLayout) -> Self {
        Self {
            layout,
            ..Self::new(id, BlockType::Page)
        }
    }

    /// Builder-style child list.
    #[must_use]
    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children_ids = children.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style content replacement.
    #[must_use]
    pub fn with_content(mut self, content: BlockContent) -> Self {
        self.content = content;
        self
    }

    /// Convert backend input, coercing anything malformed to defaults.
    ///
    /// A missing or unknown `type` yields an `Empty` block; non-numeric
    /// `layout`/`align` yield `Page`/`Left`.
    pub fn from_raw(raw: &RawBlock) -> Self {
        let block_type = BlockType::coerce(&raw.block_type);
        Self {
            id: loose_string(&raw.id),
            parent_id: loose_string(&raw.parent_id),
            block_type,
            layout: ObjectLayout::coerce(&raw.layout),
            align: BlockAlign::coerce(&raw.align),
            bg_color: loose_string(&raw.bg_color),
            children_ids: raw
                .children_ids
                .as_array()
                .map(|ids| {
                    ids.iter()
                        .map(loose_string)
                        .filter(|id| !id.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            fields: BlockFields::from_value(&raw.fields),
            content: BlockContent::from_value(block_type, &raw.content),
        }
    }

    /// Parse one block from a JSON value.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(ModelError::NotAnObject(json_kind(value)));
        }
        let raw: RawBlock = serde_json::from_value(value.clone())?;
        Ok(Self::from_raw(&raw))
    }

    /// Parse a JSON array (or single object) of blocks.
    pub fn list_from_json(input: &str) -> Result<Vec<Self>> {
        let value: Value = serde_json::from_str(input)?;
        match value {
            Value::Array(items) => items.iter().map(Self::from_json_value).collect(),
            other => Ok(vec![Self::from_json_value(&other)?]),
        }
    }

    /// Backend form of this block.
    pub fn to_raw(&self) -> RawBlock {
        RawBlock {
            id: Value::from(self.id.clone()),
            parent_id: Value::from(self.parent_id.clone()),
            block_type: Value::from(self.block_type.as_str()),
            layout: Value::from(self.layout.code()),
            align: Value::from(self.align.code()),
            bg_color: Value::from(self.bg_color.clone()),
            children_ids: Value::from(self.children_ids.clone()),
            fields: self.fields.to_value(),
            content: self.content.to_value(),
        }
    }

    // =========================================================================
    // Content accessors
    // =========================================================================

    fn text_style(&self) -> Option<TextStyle> {
        self.content.as_text().map(|text| text.style)
    }

    fn layout_style(&self) -> Option<LayoutStyle> {
        match &self.content {
            BlockContent::Layout(layout) => Some(layout.style),
            _ => None,
        }
    }

    fn link_style(&self) -> Option<LinkStyle> {
        match &self.content {
            BlockContent::Link(link) => Some(link.style),
            _ => None,
        }
    }

    fn file_type(&self) -> Option<FileType> {
        match &self.content {
            BlockContent::File(file) => Some(file.file_type),
            _ => None,
        }
    }

    fn div_style(&self) -> Option<DivStyle> {
        match &self.content {
            BlockContent::Div(div) => Some(div.style),
            _ => None,
        }
    }

    /// Text of a text block, empty for anything else.
    pub fn text_value(&self) -> &str {
        self.content.as_text().map_or("", |text| text.text.as_str())
    }

    /// Number of characters of text, `0` for non-text blocks.
    pub fn get_length(&self) -> usize {
        if self.is_text() {
            self.text_value().chars().count()
        } else {
            0
        }
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    pub fn is_system(&self) -> bool {
        self.is_page() || self.is_layout()
    }

    pub fn can_have_children(&self) -> bool {
        !self.is_system() && (self.is_text_paragraph() || self.is_text_list())
    }

    pub fn can_have_align(&self) -> bool {
        !self.is_system()
            && (self.is_text_title()
                || self.is_text_paragraph()
                || self.is_text_quote()
                || self.is_text_header()
                || self.is_image()
                || self.is_video())
    }

    pub fn can_have_color(&self) -> bool {
        !self.is_system() && self.is_text() && !self.is_text_code()
    }

    pub fn can_have_background(&self) -> bool {
        !self.is_system()
    }

    pub fn can_have_marks(&self) -> bool {
        self.is_text() && !self.is_text_title() && !self.is_text_code()
    }

    pub fn can_turn(&self) -> bool {
        !self.is_system()
            && ((self.is_text() && !self.is_text_title()) || self.is_div() || self.is_link())
    }

    pub fn can_turn_text(&self) -> bool {
        !self.is_system() && ((self.is_text() && !self.is_text_title()) || self.is_link())
    }

    pub fn can_turn_page(&self) -> bool {
        !self.is_system() && self.is_text() && !self.is_text_title()
    }

    pub fn can_turn_list(&self) -> bool {
        self.can_turn_text()
    }

    pub fn can_turn_object(&self) -> bool {
        self.can_turn_page()
    }

    pub fn can_have_history(&self) -> bool {
        self.is_object_page() || self.is_object_human() || self.is_object_task()
    }

    pub fn can_create_block(&self) -> bool {
        !self.is_text_title()
            && !self.is_layout_column()
            && !self.is_layout_div()
            && !self.is_layout_header()
            && !self.is_featured()
    }

    pub fn is_indentable(&self) -> bool {
        !self.is_system()
            && !self.is_text_title()
            && !self.is_div()
            && !self.is_text_header()
            && !self.is_text_code()
    }

    pub fn is_focusable(&self) -> bool {
        !self.is_system()
    }

    pub fn is_selectable(&self) -> bool {
        !self.is_system() && !self.is_icon() && !self.is_text_title()
    }

    pub fn is_draggable(&self) -> bool {
        !self.is_system() && !self.is_icon() && !self.is_text_title()
    }

    // =========================================================================
    // Objects
    // =========================================================================

    pub fn is_empty(&self) -> bool {
        self.block_type == BlockType::Empty
    }

    pub fn is_page(&self) -> bool {
        self.block_type == BlockType::Page
    }

    fn is_object(&self, layout: ObjectLayout) -> bool {
        self.is_page() && self.layout == layout
    }

    pub fn is_object_page(&self) -> bool {
        self.is_object(ObjectLayout::Page)
    }

    pub fn is_object_human(&self) -> bool {
        self.is_object(ObjectLayout::Human)
    }

    pub fn is_object_task(&self) -> bool {
        self.is_object(ObjectLayout::Task)
    }

    pub fn is_object_set(&self) -> bool {
        self.is_object(ObjectLayout::Set)
    }

    pub fn is_object_file(&self) -> bool {
        self.is_object(ObjectLayout::File)
    }

    pub fn is_object_type(&self) -> bool {
        self.is_object(ObjectLayout::ObjectType)
    }

    pub fn is_object_relation(&self) -> bool {
        self.is_object(ObjectLayout::Relation)
    }

    pub fn is_object_read_only(&self) -> bool {
        self.is_object_set() || self.is_object_file()
    }

    pub fn is_featured(&self) -> bool {
        self.block_type == BlockType::Featured
    }

    pub fn is_cover(&self) -> bool {
        self.block_type == BlockType::Cover
    }

    // =========================================================================
    // Layout
    // =========================================================================

    pub fn is_layout(&self) -> bool {
        self.block_type == BlockType::Layout
    }

    fn is_layout_style(&self, style: LayoutStyle) -> bool {
        self.is_layout() && self.layout_style() == Some(style)
    }

    pub fn is_layout_row(&self) -> bool {
        self.is_layout_style(LayoutStyle::Row)
    }

    pub fn is_layout_column(&self) -> bool {
        self.is_layout_style(LayoutStyle::Column)
    }

    pub fn is_layout_div(&self) -> bool {
        self.is_layout_style(LayoutStyle::Div)
    }

    pub fn is_layout_header(&self) -> bool {
        self.is_layout_style(LayoutStyle::Header)
    }

    pub fn is_layout_table_rows(&self) -> bool {
        self.is_layout_style(LayoutStyle::TableRows)
    }

    pub fn is_layout_table_columns(&self) -> bool {
        self.is_layout_style(LayoutStyle::TableColumns)
    }

    // =========================================================================
    // Links, icons, files, dividers
    // =========================================================================

    pub fn is_link(&self) -> bool {
        self.block_type == BlockType::Link
    }

    pub fn is_link_page(&self) -> bool {
        self.is_link() && self.link_style() == Some(LinkStyle::Page)
    }

    pub fn is_link_archive(&self) -> bool {
        self.is_link() && self.link_style() == Some(LinkStyle::Archive)
    }

    pub fn is_icon(&self) -> bool {
        self.is_icon_page() || self.is_icon_user()
    }

    pub fn is_icon_page(&self) -> bool {
        self.block_type == BlockType::IconPage
    }

    pub fn is_icon_user(&self) -> bool {
        self.block_type == BlockType::IconUser
    }

    pub fn is_file(&self) -> bool {
        self.block_type == BlockType::File
    }

    pub fn is_bookmark(&self) -> bool {
        self.block_type == BlockType::Bookmark
    }

    pub fn is_image(&self) -> bool {
        self.is_file() && self.file_type() == Some(FileType::Image)
    }

    pub fn is_video(&self) -> bool {
        self.is_file() && self.file_type() == Some(FileType::Video)
    }

    pub fn is_div(&self) -> bool {
        self.block_type == BlockType::Div
    }

    pub fn is_div_line(&self) -> bool {
        self.is_div() && self.div_style() == Some(DivStyle::Line)
    }

    pub fn is_div_dot(&self) -> bool {
        self.is_div() && self.div_style() == Some(DivStyle::Dot)
    }

    // =========================================================================
    // Tables
    // =========================================================================

    pub fn is_table(&self) -> bool {
        self.block_type == BlockType::Table
    }

    pub fn is_table_row(&self) -> bool {
        self.block_type == BlockType::TableRow
    }

    pub fn is_table_column(&self) -> bool {
        self.block_type == BlockType::TableColumn
    }

    pub fn is_table_cell(&self) -> bool {
        self.block_type == BlockType::TableCell
    }

    // =========================================================================
    // Text
    // =========================================================================

    pub fn is_text(&self) -> bool {
        self.block_type == BlockType::Text
    }

    fn is_text_style(&self, style: TextStyle) -> bool {
        self.is_text() && self.text_style() == Some(style)
    }

    pub fn is_text_title(&self) -> bool {
        self.is_text_style(TextStyle::Title)
    }

    pub fn is_text_paragraph(&self) -> bool {
        self.is_text_style(TextStyle::Paragraph)
    }

    pub fn is_text_header(&self) -> bool {
        self.is_text() && (self.is_text_header1() || self.is_text_header2() || self.is_text_header3())
    }

    pub fn is_text_header1(&self) -> bool {
        self.is_text_style(TextStyle::Header1)
    }

    pub fn is_text_header2(&self) -> bool {
        self.is_text_style(TextStyle::Header2)
    }

    pub fn is_text_header3(&self) -> bool {
        self.is_text_style(TextStyle::Header3)
    }

    pub fn is_text_list(&self) -> bool {
        self.is_text_toggle()
            || self.is_text_numbered()
            || self.is_text_bulleted()
            || self.is_text_checkbox()
    }

    pub fn is_text_toggle(&self) -> bool {
        self.is_text_style(TextStyle::Toggle)
    }

    pub fn is_text_numbered(&self) -> bool {
        self.is_text_style(TextStyle::Numbered)
    }

    pub fn is_text_bulleted(&self) -> bool {
        self.is_text_style(TextStyle::Bulleted)
    }

    pub fn is_text_checkbox(&self) -> bool {
        self.is_text_style(TextStyle::Checkbox)
    }

    pub fn is_text_code(&self) -> bool {
        self.is_text_style(TextStyle::Code)
    }

    pub fn is_text_quote(&self) -> bool {
        self.is_text_style(TextStyle::Quote)
    }
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        Self::from_raw(&raw)
    }
}

fn loose_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        _ => String::new(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
