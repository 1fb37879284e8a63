//! View logic errors.

use thiserror::Error;

use crate::rpc::RpcError;

#[derive(Debug, Error)]
pub enum ViewError {
    /// A block the view needs is not in the index.
    #[error("block {id} not found in {root_id}")]
    MissingBlock { root_id: String, id: String },

    /// A table has no row or column container.
    #[error("table {block_id} has no {container} container")]
    MissingContainer {
        block_id: String,
        container: &'static str,
    },

    #[error(transparent)]
    Rpc(#[from] RpcError),
}

pub type Result<T> = std::result::Result<T, ViewError>;
