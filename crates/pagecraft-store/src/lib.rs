//! UI stores for the pagecraft editor core.
//!
//! - [`CommonStore`]: popup and menu layers plus cover, gateway, progress,
//!   filter, link preview and config
//! - [`AuthStore`]: account and session state
//! - [`LayerStack`]: the open/close/transition state machine behind popups
//!   and menus
//!
//! Stores are single-threaded. Every mutation records a [`StoreEvent`] in a
//! shared [`ChangeFeed`].

pub mod analytics;
pub mod auth;
pub mod common;
pub mod error;
pub mod event;
pub mod layer;
pub mod menu;
pub mod popup;
pub mod settings;
pub mod storage;

pub use analytics::{Analytics, NoopAnalytics, RecordingAnalytics, TracingAnalytics, to_camel_case};
pub use auth::{Account, AuthStore, NetworkConfig, NetworkMode};
pub use common::{CommonStore, Cover, CoverType, Filter, LinkPreview, Progress, filter_fix};
pub use error::{Result, StoreError};
pub use event::{ChangeFeed, LayerKind, StoreEvent};
pub use layer::{Callback, Hook, Layer, LayerParam, LayerPhase, LayerStack, LayerToken};
pub use menu::{MenuDirection, MenuParam, MenuType, Rect};
pub use popup::PopupParam;
pub use settings::{DefaultSettings, Settings, StorageSettings, TransitionSettings};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, SESSION_KEYS, SharedStorage, shared};
