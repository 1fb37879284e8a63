//! View logic of the pagecraft editor: the state and geometry parts of the
//! board, table, header, page head and onboarding components.
//!
//! Rendering stays with the host. Views read the block index, mutate the
//! stores, and send [`Command`]s through a [`CommandSink`].

pub mod board;
pub mod error;
pub mod frame;
pub mod header;
pub mod onboarding;
pub mod page_head;
pub mod route;
pub mod rpc;
pub mod table;

pub use board::{Board, BoardGroup, BoardLayout, BoardSize, DataviewView, DropSide, DropTarget, array_move};
pub use error::{Result, ViewError};
pub use frame::{FrameCoalescer, FrameId};
pub use header::{Header, HeaderComponent, header_class};
pub use onboarding::{OnboardingForm, StorageChange, StorageStep};
pub use page_head::{HeadBlocks, ObjectDetails, PageHeadEdit, width_label};
pub use route::{RecordingRouter, Route, Router};
pub use rpc::{Command, CommandSink, RecordingSink, RpcError, RpcResponse};
pub use table::{TableAction, TableData, TableMenus, options_for, table_data};
