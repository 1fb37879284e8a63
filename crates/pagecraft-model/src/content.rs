//! Per-type block content.
//!
//! Content arrives as a free-form JSON object whose meaning depends on the
//! block type. [`BlockContent::from_value`] picks the variant from the type
//! and reads only the fields that variant carries; unknown or malformed
//! fields fall back to defaults.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::enums::{BlockType, Coded, DivStyle, FileType, LayoutStyle, LinkStyle, MarkType, TextStyle};

/// Character range inside a text block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    pub from: usize,
    pub to: usize,
}

/// Inline formatting applied to a range of text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub range: TextRange,
    #[serde(rename = "type")]
    pub mark_type: MarkType,
    #[serde(default)]
    pub param: String,
}

impl Mark {
    fn from_value(value: &Value) -> Option<Self> {
        let range = value.get("range")?;
        Some(Self {
            range: TextRange {
                from: read_usize(range.get("from")),
                to: read_usize(range.get("to")),
            },
            mark_type: MarkType::coerce(value.get("type").unwrap_or(&Value::Null)),
            param: read_string(value.get("param")),
        })
    }

    fn to_value(&self) -> Value {
        json!({
            "range": { "from": self.range.from, "to": self.range.to },
            "type": self.mark_type.code(),
            "param": self.param,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub style: TextStyle,
    pub text: String,
    pub marks: Vec<Mark>,
    pub checked: bool,
    pub color: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutContent {
    pub style: LayoutStyle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkContent {
    pub style: LinkStyle,
    pub target_block_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivContent {
    pub style: DivStyle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    pub file_type: FileType,
    pub hash: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkContent {
    pub url: String,
    pub title: String,
}

/// Saved position of one board group inside a view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupIndex {
    pub group_id: String,
    pub index: usize,
}

/// Saved board group order for one dataview view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewGroupOrder {
    pub view_id: String,
    pub groups: Vec<GroupIndex>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataviewContent {
    pub group_order: Vec<ViewGroupOrder>,
}

impl DataviewContent {
    /// Saved group order for a view, if any.
    pub fn group_order_for(&self, view_id: &str) -> Option<&ViewGroupOrder> {
        self.group_order.iter().find(|order| order.view_id == view_id)
    }
}

/// Content of a block, one variant per block type that carries content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BlockContent {
    /// Types without typed content (page, icons, table parts, ...).
    #[default]
    None,
    Text(TextContent),
    Layout(LayoutContent),
    Link(LinkContent),
    Div(DivContent),
    File(FileContent),
    Bookmark(BookmarkContent),
    Dataview(DataviewContent),
}

impl BlockContent {
    /// Build the content variant that matches `block_type` from raw JSON.
    pub fn from_value(block_type: BlockType, value: &Value) -> Self {
        let style = value.get("style").unwrap_or(&Value::Null);
        let kind = value.get("type").unwrap_or(&Value::Null);
        match block_type {
            BlockType::Text => BlockContent::Text(TextContent {
                style: TextStyle::coerce(style),
                text: read_string(value.get("text")),
                marks: value
                    .get("marks")
                    .and_then(|m| m.get("marks").or(Some(m)))
                    .and_then(Value::as_array)
                    .map(|marks| marks.iter().filter_map(Mark::from_value).collect())
                    .unwrap_or_default(),
                checked: value.get("checked").and_then(Value::as_bool).unwrap_or(false),
                color: read_string(value.get("color")),
            }),
            BlockType::Layout => BlockContent::Layout(LayoutContent {
                style: LayoutStyle::coerce(style),
            }),
            BlockType::Link => BlockContent::Link(LinkContent {
                style: LinkStyle::coerce(style),
                target_block_id: read_string(value.get("targetBlockId")),
            }),
            // Dividers keep their style in the `type` field.
            BlockType::Div => BlockContent::Div(DivContent {
                style: DivStyle::coerce(kind),
            }),
            BlockType::File => BlockContent::File(FileContent {
                file_type: FileType::coerce(kind),
                hash: read_string(value.get("hash")),
                name: read_string(value.get("name")),
            }),
            BlockType::Bookmark => BlockContent::Bookmark(BookmarkContent {
                url: read_string(value.get("url")),
                title: read_string(value.get("title")),
            }),
            BlockType::Dataview => BlockContent::Dataview(DataviewContent {
                group_order: read_group_order(value.get("groupOrder")),
            }),
            _ => BlockContent::None,
        }
    }

    /// Wire form of the content, the inverse of [`BlockContent::from_value`].
    pub fn to_value(&self) -> Value {
        match self {
            BlockContent::None => Value::Object(Map::new()),
            BlockContent::Text(text) => json!({
                "style": text.style.code(),
                "text": text.text,
                "marks": text.marks.iter().map(Mark::to_value).collect::<Vec<_>>(),
                "checked": text.checked,
                "color": text.color,
            }),
            BlockContent::Layout(layout) => json!({ "style": layout.style.code() }),
            BlockContent::Link(link) => json!({
                "style": link.style.code(),
                "targetBlockId": link.target_block_id,
            }),
            BlockContent::Div(div) => json!({ "type": div.style.code() }),
            BlockContent::File(file) => json!({
                "type": file.file_type.code(),
                "hash": file.hash,
                "name": file.name,
            }),
            BlockContent::Bookmark(bookmark) => json!({
                "url": bookmark.url,
                "title": bookmark.title,
            }),
            BlockContent::Dataview(dataview) => json!({
                "groupOrder": dataview
                    .group_order
                    .iter()
                    .map(|order| json!({
                        "viewId": order.view_id,
                        "groups": order
                            .groups
                            .iter()
                            .map(|g| json!({ "groupId": g.group_id, "index": g.index }))
                            .collect::<Vec<_>>(),
                    }))
                    .collect::<Vec<_>>(),
            }),
        }
    }

    pub fn as_text(&self) -> Option<&TextContent> {
        match self {
            BlockContent::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextContent> {
        match self {
            BlockContent::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_dataview(&self) -> Option<&DataviewContent> {
        match self {
            BlockContent::Dataview(dataview) => Some(dataview),
            _ => None,
        }
    }
}

fn read_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn read_usize(value: Option<&Value>) -> usize {
    value
        .and_then(Value::as_f64)
        .filter(|n| *n >= 0.0)
        .map(|n| n as usize)
        .unwrap_or(0)
}

fn read_group_order(value: Option<&Value>) -> Vec<ViewGroupOrder> {
    let Some(orders) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    orders
        .iter()
        .map(|order| ViewGroupOrder {
            view_id: read_string(order.get("viewId")),
            groups: order
                .get("groups")
                .and_then(Value::as_array)
                .map(|groups| {
                    groups
                        .iter()
                        .map(|g| GroupIndex {
                            group_id: read_string(g.get("groupId")),
                            index: read_usize(g.get("index")),
                        })
                        .collect()
                })
                .unwrap_or_default(),
        })
        .collect()
}
