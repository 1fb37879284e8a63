//! Process-wide UI state: popup and menu layers, cover, gateway, progress,
//! filter, link preview, and config.

use std::rc::Rc;
use std::time::Duration;

use pagecraft_model::{Mark, TextRange};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::analytics::Analytics;
use crate::event::{ChangeFeed, LayerKind, StoreEvent};
use crate::layer::{Callback, LayerStack};
use crate::menu::MenuParam;
use crate::popup::PopupParam;
use crate::settings::Settings;
use crate::storage::SharedStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverType {
    #[default]
    None,
    Upload,
    Color,
    Gradient,
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cover {
    pub id: String,
    pub image: String,
    #[serde(rename = "type")]
    pub cover_type: CoverType,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Progress {
    pub status: String,
    pub current: u64,
    pub total: u64,
    pub is_unlocked: bool,
    pub can_cancel: bool,
}

impl Progress {
    /// Completion in whole percent, 0 when the total is unknown.
    pub fn percent(&self) -> u64 {
        if self.total == 0 {
            return 0;
        }
        (self.current.min(self.total) * 100) / self.total
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filter {
    /// Caret offset the filter text starts at.
    pub from: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinkPreview {
    pub url: String,
    pub element: String,
    pub root_id: String,
    pub block_id: String,
    pub range: TextRange,
    pub marks: Vec<Mark>,
}

/// Remove characters that break filter matching.
pub fn filter_fix(text: &str) -> String {
    text.chars()
        .filter(|ch| !matches!(ch, '/' | '\\' | '*'))
        .collect()
}

pub struct CommonStore {
    popups: LayerStack<PopupParam>,
    menus: LayerStack<MenuParam>,
    storage: SharedStorage,
    feed: ChangeFeed,
    now: Duration,
    default_cover: u32,
    default_gateway: String,
    cover: Cover,
    cover_img: String,
    progress: Option<Progress>,
    filter: Filter,
    gateway_url: String,
    link_preview: Option<LinkPreview>,
    config: Map<String, Value>,
    data_path: String,
}

impl CommonStore {
    pub fn new(settings: &Settings, storage: SharedStorage, analytics: Rc<dyn Analytics>) -> Self {
        let feed = ChangeFeed::new();
        Self {
            popups: LayerStack::new(
                LayerKind::Popup,
                settings.transitions.popup(),
                Rc::clone(&analytics),
                feed.clone(),
            ),
            menus: LayerStack::new(
                LayerKind::Menu,
                settings.transitions.menu(),
                analytics,
                feed.clone(),
            ),
            storage,
            feed,
            now: Duration::ZERO,
            default_cover: settings.defaults.cover,
            default_gateway: settings.defaults.gateway.clone(),
            cover: Cover::default(),
            cover_img: String::new(),
            progress: None,
            filter: Filter::default(),
            gateway_url: String::new(),
            link_preview: None,
            config: Map::new(),
            data_path: String::new(),
        }
    }

    /// Change feed shared by every store built on top of this one.
    pub fn feed(&self) -> ChangeFeed {
        self.feed.clone()
    }

    pub fn revision(&self) -> u64 {
        self.feed.revision()
    }

    pub fn drain_events(&self) -> Vec<StoreEvent> {
        self.feed.drain()
    }

    pub fn storage(&self) -> SharedStorage {
        Rc::clone(&self.storage)
    }

    // =========================================================================
    // Popups
    // =========================================================================

    pub fn popups(&self) -> &LayerStack<PopupParam> {
        &self.popups
    }

    pub fn popups_mut(&mut self) -> &mut LayerStack<PopupParam> {
        &mut self.popups
    }

    /// Open a popup. Every open menu is closed.
    pub fn popup_open(&mut self, id: &str, param: PopupParam) {
        self.popups.open(id, param);
        self.menus.close_all(None, None);
    }

    pub fn popup_update<F>(&mut self, id: &str, patch: F) -> bool
    where
        F: FnOnce(&mut PopupParam),
    {
        self.popups.update(id, patch)
    }

    pub fn popup_close(&mut self, id: &str, callback: Option<Callback>) {
        self.popups.close(id, callback);
    }

    /// Close popups (all when `ids` is `None`) and every open menu.
    pub fn popup_close_all(&mut self, ids: Option<&[&str]>, callback: Option<Callback>) {
        self.menus.close_all(None, None);
        self.popups.close_all(ids, callback);
    }

    /// Close the listed popups and every menu, then open `id` once the
    /// popups are gone.
    pub fn popup_close_all_and_open(&mut self, ids: Option<&[&str]>, id: &str, param: PopupParam) {
        self.menus.close_all(None, None);
        self.popups.close_all_and_open(ids, id, param);
    }

    pub fn popup_is_open(&self, id: Option<&str>) -> bool {
        self.popups.is_open(id)
    }

    pub fn popup_is_open_list(&self, ids: &[&str]) -> bool {
        self.popups.is_open_list(ids)
    }

    // =========================================================================
    // Menus
    // =========================================================================

    pub fn menus(&self) -> &LayerStack<MenuParam> {
        &self.menus
    }

    pub fn menus_mut(&mut self) -> &mut LayerStack<MenuParam> {
        &mut self.menus
    }

    pub fn menu_open(&mut self, id: &str, param: MenuParam) {
        self.menus.open(id, param);
    }

    pub fn menu_update<F>(&mut self, id: &str, patch: F) -> bool
    where
        F: FnOnce(&mut MenuParam),
    {
        self.menus.update(id, patch)
    }

    pub fn menu_update_data(&mut self, id: &str, data: Map<String, Value>) -> bool {
        self.menus.update_data(id, data)
    }

    pub fn menu_close(&mut self, id: &str, callback: Option<Callback>) {
        self.menus.close(id, callback);
    }

    pub fn menu_close_all(&mut self, ids: Option<&[&str]>, callback: Option<Callback>) {
        self.menus.close_all(ids, callback);
    }

    /// Close the listed menus and open `id` once they are gone.
    pub fn menu_close_all_and_open(&mut self, ids: Option<&[&str]>, id: &str, param: MenuParam) {
        self.menus.close_all_and_open(ids, id, param);
    }

    pub fn menu_close_all_forced(&mut self, ids: Option<&[&str]>, callback: Option<Callback>) {
        self.menus.close_all_forced(ids, callback);
    }

    pub fn menu_is_open(&self, id: Option<&str>) -> bool {
        self.menus.is_open(id)
    }

    pub fn menu_is_open_list(&self, ids: &[&str]) -> bool {
        self.menus.is_open_list(ids)
    }

    // =========================================================================
    // Clock
    // =========================================================================

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Earliest pending removal across both layer stacks.
    pub fn next_due(&self) -> Option<Duration> {
        [self.popups.next_due(), self.menus.next_due()]
            .into_iter()
            .flatten()
            .min()
    }

    pub fn advance(&mut self, elapsed: Duration) {
        self.advance_to(self.now + elapsed);
    }

    /// Move both layer clocks to `time`, interleaving their removals in
    /// due-time order.
    pub fn advance_to(&mut self, time: Duration) {
        while let Some(due) = self.next_due().filter(|due| *due <= time) {
            self.popups.advance_to(due);
            self.menus.advance_to(due);
        }
        self.popups.advance_to(time);
        self.menus.advance_to(time);
        self.now = self.now.max(time);
    }

    // =========================================================================
    // Cover
    // =========================================================================

    pub fn cover(&self) -> &Cover {
        &self.cover
    }

    pub fn cover_set(&mut self, id: &str, image: &str, cover_type: CoverType) {
        self.cover = Cover {
            id: id.to_string(),
            image: image.to_string(),
            cover_type,
        };
        if let Ok(value) = serde_json::to_value(&self.cover) {
            self.storage.borrow_mut().set("cover", value);
        }
        self.feed.record(StoreEvent::CoverChanged);
    }

    pub fn cover_set_uploaded_image(&mut self, image: &str) {
        self.cover_img = image.to_string();
        self.storage
            .borrow_mut()
            .set("coverImg", Value::from(image));
        self.feed.record(StoreEvent::CoverChanged);
    }

    /// Uploaded cover image, falling back to the stored one.
    pub fn cover_image(&self) -> String {
        if !self.cover_img.is_empty() {
            return self.cover_img.clone();
        }
        self.storage
            .borrow()
            .get_string("coverImg")
            .unwrap_or_default()
    }

    pub fn cover_set_default(&mut self) {
        let id = format!("c{}", self.default_cover);
        self.cover_set(&id, "", CoverType::Image);
    }

    // =========================================================================
    // Gateway
    // =========================================================================

    /// Gateway URL: the set value, then storage, then the configured default.
    pub fn gateway(&self) -> String {
        if !self.gateway_url.is_empty() {
            return self.gateway_url.clone();
        }
        self.storage
            .borrow()
            .get_string("gateway")
            .unwrap_or_else(|| self.default_gateway.clone())
    }

    pub fn gateway_set(&mut self, url: &str) {
        self.gateway_url = url.to_string();
        self.storage.borrow_mut().set("gateway", Value::from(url));
        self.feed.record(StoreEvent::GatewayChanged);
    }

    pub fn file_url(&self, hash: &str) -> String {
        format!("{}/file/{}", self.gateway(), hash)
    }

    pub fn image_url(&self, hash: &str, width: u32) -> String {
        format!("{}/image/{}?width={}", self.gateway(), hash, width)
    }

    // =========================================================================
    // Progress, filter, link preview
    // =========================================================================

    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }

    pub fn progress_set(&mut self, progress: Progress) {
        self.progress = Some(progress);
        self.feed.record(StoreEvent::ProgressChanged);
    }

    pub fn progress_clear(&mut self) {
        self.progress = None;
        self.feed.record(StoreEvent::ProgressChanged);
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn filter_set_from(&mut self, from: usize) {
        self.filter.from = from;
        self.feed.record(StoreEvent::FilterChanged);
    }

    pub fn filter_set_text(&mut self, text: &str) {
        self.filter.text = filter_fix(text);
        self.feed.record(StoreEvent::FilterChanged);
    }

    pub fn filter_set(&mut self, from: usize, text: &str) {
        self.filter_set_from(from);
        self.filter_set_text(text);
    }

    pub fn link_preview(&self) -> Option<&LinkPreview> {
        self.link_preview.as_ref()
    }

    pub fn link_preview_set(&mut self, preview: Option<LinkPreview>) {
        self.link_preview = preview;
        self.feed.record(StoreEvent::LinkPreviewChanged);
    }

    // =========================================================================
    // Config, data path
    // =========================================================================

    /// Config object with a guaranteed `debug` object.
    pub fn config(&self) -> Value {
        let mut config = self.config.clone();
        let has_debug = config.get("debug").is_some_and(Value::is_object);
        if !has_debug {
            config.insert("debug".to_string(), Value::Object(Map::new()));
        }
        Value::Object(config)
    }

    /// Replace the config. Non-object values clear it.
    pub fn config_set(&mut self, config: Value) {
        self.config = match config {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        debug!(keys = self.config.len(), "config set");
        self.feed.record(StoreEvent::ConfigChanged);
    }

    /// Whether a top-level config flag is set to `true`.
    pub fn config_flag(&self, key: &str) -> bool {
        self.config.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn data_path(&self) -> &str {
        &self.data_path
    }

    pub fn data_path_set(&mut self, path: &str) {
        self.data_path = path.to_string();
        self.feed.record(StoreEvent::DataPathChanged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::NoopAnalytics;
    use crate::storage::{MemoryStorage, shared};
    use serde_json::json;

    fn store() -> CommonStore {
        CommonStore::new(
            &Settings::default(),
            shared(MemoryStorage::new()),
            Rc::new(NoopAnalytics),
        )
    }

    #[test]
    fn filter_text_is_fixed() {
        let mut common = store();
        common.filter_set(3, "a/b\\c*d");
        assert_eq!(common.filter(), &Filter { from: 3, text: "abcd".to_string() });
    }

    #[test]
    fn gateway_falls_back_to_storage() {
        let mut common = store();
        assert_eq!(common.gateway(), "");
        common
            .storage()
            .borrow_mut()
            .set("gateway", json!("http://127.0.0.1:31009"));
        assert_eq!(common.file_url("abc"), "http://127.0.0.1:31009/file/abc");
        common.gateway_set("http://gw");
        assert_eq!(common.image_url("abc", 640), "http://gw/image/abc?width=640");
    }

    #[test]
    fn default_cover_is_persisted() {
        let mut common = store();
        common.cover_set_default();
        assert_eq!(common.cover().id, "c1");
        assert_eq!(common.cover().cover_type, CoverType::Image);
        let stored = common.storage().borrow().get("cover");
        assert_eq!(stored, Some(json!({ "id": "c1", "image": "", "type": "image" })));
    }

    #[test]
    fn cover_image_falls_back_to_storage() {
        let mut common = store();
        common.storage().borrow_mut().set("coverImg", json!("hash1"));
        assert_eq!(common.cover_image(), "hash1");
        common.cover_set_uploaded_image("hash2");
        assert_eq!(common.cover_image(), "hash2");
    }

    #[test]
    fn config_always_has_debug() {
        let mut common = store();
        assert_eq!(common.config(), json!({ "debug": {} }));
        common.config_set(json!({ "experimental": true, "debug": { "ui": true } }));
        assert_eq!(common.config()["debug"]["ui"], true);
        assert!(common.config_flag("experimental"));
        assert!(!common.config_flag("missing"));
    }

    #[test]
    fn progress_percent() {
        let mut common = store();
        common.progress_set(Progress {
            current: 3,
            total: 4,
            ..Progress::default()
        });
        assert_eq!(common.progress().map(Progress::percent), Some(75));
        common.progress_clear();
        assert!(common.progress().is_none());
    }
}
