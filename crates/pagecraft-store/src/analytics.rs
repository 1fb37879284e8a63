//! Analytics collaborator.
//!
//! Calls are fire-and-forget: no return value, no failure path.

use std::cell::RefCell;

use serde_json::{Map, Value};
use tracing::info;

use crate::auth::Account;

pub trait Analytics {
    /// Record a named event with properties.
    fn event_with(&self, name: &str, props: &Map<String, Value>);

    /// Record a named event.
    fn event(&self, name: &str) {
        self.event_with(name, &Map::new());
    }

    /// Attach the signed-in account to subsequent events.
    fn profile(&self, _account: &Account) {}

    /// Attach the user id to error reports.
    fn set_user(&self, _id: &str) {}
}

/// Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnalytics;

impl Analytics for NoopAnalytics {
    fn event_with(&self, _name: &str, _props: &Map<String, Value>) {}
}

/// Emits analytics as `tracing` events under the `analytics` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnalytics;

impl Analytics for TracingAnalytics {
    fn event_with(&self, name: &str, props: &Map<String, Value>) {
        if props.is_empty() {
            info!(target: "analytics", event = name);
        } else {
            info!(target: "analytics", event = name, props = %serde_json::Value::Object(props.clone()));
        }
    }

    fn profile(&self, account: &Account) {
        info!(target: "analytics", account_id = %account.id, "profile");
    }

    fn set_user(&self, id: &str) {
        info!(target: "analytics", user_id = id, "error reporting user");
    }
}

/// Keeps event names in memory, for hosts that batch uploads and for tests.
#[derive(Debug, Default)]
pub struct RecordingAnalytics {
    events: RefCell<Vec<(String, Map<String, Value>)>>,
    users: RefCell<Vec<String>>,
}

impl RecordingAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded event names, oldest first.
    pub fn names(&self) -> Vec<String> {
        self.events.borrow().iter().map(|(name, _)| name.clone()).collect()
    }

    /// Properties of the most recent event with this name.
    pub fn last_props(&self, name: &str) -> Option<Map<String, Value>> {
        self.events
            .borrow()
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, props)| props.clone())
    }

    pub fn users(&self) -> Vec<String> {
        self.users.borrow().clone()
    }
}

impl Analytics for RecordingAnalytics {
    fn event_with(&self, name: &str, props: &Map<String, Value>) {
        self.events
            .borrow_mut()
            .push((name.to_string(), props.clone()));
    }

    fn profile(&self, account: &Account) {
        self.event(&format!("profile:{}", account.id));
    }

    fn set_user(&self, id: &str) {
        self.users.borrow_mut().push(id.to_string());
    }
}

/// Lowercase the input and fold `-`/`_` separators into camel case.
///
/// `"Popup-settings"` becomes `"popupSettings"`.
pub fn to_camel_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut upper_next = false;
    for ch in input.chars() {
        if ch == '-' || ch == '_' {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}
