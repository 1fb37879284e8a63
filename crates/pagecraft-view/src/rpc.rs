//! Commands sent to the middleware and the responses that come back.

use std::cell::RefCell;
use std::fmt;

use pagecraft_model::ViewGroupOrder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error part of every response. `code == 0` is success.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub description: String,
}

impl RpcError {
    pub fn is_err(&self) -> bool {
        self.code != 0
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rpc error {}: {}", self.code, self.description)
    }
}

impl std::error::Error for RpcError {}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RpcResponse<T> {
    pub error: RpcError,
    pub payload: T,
}

impl<T> RpcResponse<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            error: RpcError::default(),
            payload,
        }
    }

    pub fn into_result(self) -> Result<T, RpcError> {
        if self.error.is_err() {
            Err(self.error)
        } else {
            Ok(self.payload)
        }
    }
}

impl<T: Default> RpcResponse<T> {
    pub fn err(code: i64, description: impl Into<String>) -> Self {
        Self {
            error: RpcError {
                code,
                description: description.into(),
            },
            payload: T::default(),
        }
    }
}

/// Fields patch for one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockFieldsPatch {
    pub block_id: String,
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    /// Distinct values of a relation, used as board groups.
    #[serde(rename_all = "camelCase")]
    ObjectRelationSearchDistinct { relation_key: String },

    #[serde(rename_all = "camelCase")]
    BlockDataviewGroupOrderUpdate {
        root_id: String,
        block_id: String,
        order: ViewGroupOrder,
    },

    #[serde(rename_all = "camelCase")]
    BlockDataviewRecordCreate {
        root_id: String,
        block_id: String,
        details: Map<String, Value>,
        template_id: Option<String>,
    },

    /// Count templates of the given object types.
    #[serde(rename_all = "camelCase")]
    TemplateCount { type_ids: Vec<String> },

    #[serde(rename_all = "camelCase")]
    BlockListSetFields {
        root_id: String,
        fields: Vec<BlockFieldsPatch>,
    },

    #[serde(rename_all = "camelCase")]
    BlockTextListSetColor {
        root_id: String,
        block_ids: Vec<String>,
        color: String,
    },

    #[serde(rename_all = "camelCase")]
    BlockListSetBackgroundColor {
        root_id: String,
        block_ids: Vec<String>,
        color: String,
    },

    #[serde(rename_all = "camelCase")]
    TemplateClone { root_id: String },

    /// Move the local data directory.
    #[serde(rename_all = "camelCase")]
    SetUserDataPath { path: String },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::ObjectRelationSearchDistinct { .. } => "ObjectRelationSearchDistinct",
            Command::BlockDataviewGroupOrderUpdate { .. } => "BlockDataviewGroupOrderUpdate",
            Command::BlockDataviewRecordCreate { .. } => "BlockDataviewRecordCreate",
            Command::TemplateCount { .. } => "TemplateCount",
            Command::BlockListSetFields { .. } => "BlockListSetFields",
            Command::BlockTextListSetColor { .. } => "BlockTextListSetColor",
            Command::BlockListSetBackgroundColor { .. } => "BlockListSetBackgroundColor",
            Command::TemplateClone { .. } => "TemplateClone",
            Command::SetUserDataPath { .. } => "SetUserDataPath",
        }
    }
}

/// Outbound command channel. Responses are delivered back to the view
/// through its `on_*` handlers.
pub trait CommandSink {
    fn send(&self, command: Command);
}

/// Keeps sent commands in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: RefCell<Vec<Command>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Command> {
        self.sent.borrow().clone()
    }

    pub fn take(&self) -> Vec<Command> {
        std::mem::take(&mut self.sent.borrow_mut())
    }
}

impl CommandSink for RecordingSink {
    fn send(&self, command: Command) {
        tracing::debug!(command = command.name(), "send");
        self.sent.borrow_mut().push(command);
    }
}
