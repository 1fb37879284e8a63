//! Editable page head: width scaling, cover and icon blocks, and the
//! bundled-template note.

use pagecraft_model::{Block, BlockAlign, BlockIndex, BlockType};
use pagecraft_store::Analytics;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{Result, ViewError};
use crate::route::{Route, Router};
use crate::rpc::{BlockFieldsPatch, Command, CommandSink, RpcResponse};

/// Details of the root object that shape the head.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectDetails {
    pub layout_align: BlockAlign,
    pub with_cover: bool,
    pub with_icon: bool,
    pub template_is_bundled: bool,
    pub target_object_type: String,
    /// Extra class for the editor wrapper.
    pub class_name: String,
}

/// Synthetic blocks rendered above the header.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadBlocks {
    pub cover: Option<Block>,
    pub icon: Option<Block>,
}

/// Width label shown while scaling, e.g. `"75%"`.
pub fn width_label(value: f64) -> String {
    format!("{}%", (value * 100.0).ceil())
}

pub fn wrapper_class(details: &ObjectDetails) -> String {
    if details.class_name.is_empty() {
        "editorWrapper".to_string()
    } else {
        format!("editorWrapper {}", details.class_name)
    }
}

#[derive(Debug, Clone)]
pub struct PageHeadEdit {
    root_id: String,
    label: String,
    selecting_blocked: bool,
}

impl PageHeadEdit {
    pub fn new(root_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            label: width_label(0.0),
            selecting_blocked: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Block selection is suspended while scaling.
    pub fn is_selecting_blocked(&self) -> bool {
        self.selecting_blocked
    }

    /// Saved width of the root, the scale's starting value.
    pub fn initial_width(&self, index: &BlockIndex) -> f64 {
        index
            .get_leaf(&self.root_id, &self.root_id)
            .and_then(|root| root.fields.width)
            .unwrap_or(0.0)
    }

    pub fn scale_start(&mut self, value: f64) {
        self.selecting_blocked = true;
        self.label = width_label(value);
    }

    /// Returns the layout width to apply.
    pub fn scale_move(&mut self, value: f64) -> f64 {
        self.label = width_label(value);
        value
    }

    /// Persist the final width on the root block.
    pub fn scale_end(&mut self, value: f64, sink: &dyn CommandSink) {
        self.selecting_blocked = false;
        self.label = width_label(value);

        let mut fields = Map::new();
        fields.insert("width".to_string(), Value::from(value));
        sink.send(Command::BlockListSetFields {
            root_id: self.root_id.clone(),
            fields: vec![BlockFieldsPatch {
                block_id: self.root_id.clone(),
                fields,
            }],
        });
    }

    /// Cover and icon blocks for the head. Human objects get a user icon.
    pub fn head_blocks(&self, index: &BlockIndex, details: &ObjectDetails) -> Result<HeadBlocks> {
        let root = index
            .get_leaf(&self.root_id, &self.root_id)
            .ok_or_else(|| ViewError::MissingBlock {
                root_id: self.root_id.clone(),
                id: self.root_id.clone(),
            })?;

        let synthetic = |key: &str, block_type: BlockType| {
            let mut block = Block::new(BlockIndex::sub_id(&self.root_id, key), block_type);
            block.align = details.layout_align;
            block
        };
        let icon_type = if root.is_object_human() {
            BlockType::IconUser
        } else {
            BlockType::IconPage
        };

        Ok(HeadBlocks {
            cover: details.with_cover.then(|| synthetic("cover", BlockType::Cover)),
            icon: details.with_icon.then(|| synthetic("icon", icon_type)),
        })
    }

    /// Bundled templates are read-only and show a note offering a duplicate.
    pub fn shows_template_note(&self, details: &ObjectDetails) -> bool {
        details.template_is_bundled
    }

    pub fn on_clone(&self, sink: &dyn CommandSink) {
        sink.send(Command::TemplateClone {
            root_id: self.root_id.clone(),
        });
    }

    /// Open the duplicate and report it.
    pub fn on_clone_response(
        &self,
        response: RpcResponse<String>,
        details: &ObjectDetails,
        router: &dyn Router,
        analytics: &dyn Analytics,
    ) {
        let id = match response.into_result() {
            Ok(id) => id,
            Err(error) => {
                warn!(%error, "template clone failed");
                return;
            }
        };
        if !id.is_empty() {
            router.open_route(&Route::new(id, Default::default()));
        }
        let mut props = Map::new();
        props.insert(
            "objectType".to_string(),
            Value::from(details.target_object_type.as_str()),
        );
        analytics.event_with("CreateTemplate", &props);
    }
}
