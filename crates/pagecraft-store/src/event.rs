//! Change notification.
//!
//! Stores record a [`StoreEvent`] for every mutation into a shared
//! [`ChangeFeed`]. The host drains the feed after a batch of mutations and
//! re-derives its view from the stores; the revision counter lets it skip
//! work when nothing changed.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Which layer stack an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Popup,
    Menu,
}

impl LayerKind {
    /// Prefix used for analytics event names and element ids.
    pub fn label(&self) -> &'static str {
        match self {
            LayerKind::Popup => "Popup",
            LayerKind::Menu => "Menu",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label().to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// An entry was pushed onto a layer stack.
    LayerOpened { kind: LayerKind, id: String },
    /// An entry was patched in place.
    LayerUpdated { kind: LayerKind, id: String },
    /// An entry started its exit transition.
    LayerClosing { kind: LayerKind, id: String },
    /// An entry was removed.
    LayerClosed { kind: LayerKind, id: String },
    CoverChanged,
    GatewayChanged,
    ProgressChanged,
    FilterChanged,
    LinkPreviewChanged,
    ConfigChanged,
    DataPathChanged,
    AccountChanged,
    SessionChanged,
    NetworkConfigChanged,
    ThreadChanged { root_id: String },
    LoggedOut,
}

impl fmt::Display for StoreEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreEvent::LayerOpened { kind, id } => write!(f, "{kind} {id} opened"),
            StoreEvent::LayerUpdated { kind, id } => write!(f, "{kind} {id} updated"),
            StoreEvent::LayerClosing { kind, id } => write!(f, "{kind} {id} closing"),
            StoreEvent::LayerClosed { kind, id } => write!(f, "{kind} {id} closed"),
            StoreEvent::CoverChanged => write!(f, "cover changed"),
            StoreEvent::GatewayChanged => write!(f, "gateway changed"),
            StoreEvent::ProgressChanged => write!(f, "progress changed"),
            StoreEvent::FilterChanged => write!(f, "filter changed"),
            StoreEvent::LinkPreviewChanged => write!(f, "link preview changed"),
            StoreEvent::ConfigChanged => write!(f, "config changed"),
            StoreEvent::DataPathChanged => write!(f, "data path changed"),
            StoreEvent::AccountChanged => write!(f, "account changed"),
            StoreEvent::SessionChanged => write!(f, "session changed"),
            StoreEvent::NetworkConfigChanged => write!(f, "network config changed"),
            StoreEvent::ThreadChanged { root_id } => write!(f, "thread {root_id} changed"),
            StoreEvent::LoggedOut => write!(f, "logged out"),
        }
    }
}

#[derive(Debug, Default)]
struct FeedState {
    revision: u64,
    events: Vec<StoreEvent>,
}

/// Shared, single-threaded change feed. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct ChangeFeed {
    inner: Rc<RefCell<FeedState>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: StoreEvent) {
        let mut state = self.inner.borrow_mut();
        state.revision += 1;
        state.events.push(event);
    }

    /// Monotonic count of recorded events.
    pub fn revision(&self) -> u64 {
        self.inner.borrow().revision
    }

    /// Take every event recorded since the last drain.
    pub fn drain(&self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.inner.borrow_mut().events)
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().events.len()
    }
}
