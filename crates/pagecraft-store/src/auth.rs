//! Session state: account, credentials, per-document thread metadata and
//! network config.

use std::collections::HashMap;
use std::rc::Rc;

use pagecraft_model::BlockIndex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::analytics::Analytics;
use crate::common::CommonStore;
use crate::event::{ChangeFeed, StoreEvent};
use crate::storage::SharedStorage;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub config: Value,
}

impl Account {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    #[default]
    Default,
    Local,
    Custom,
}

impl NetworkMode {
    pub const ALL: [NetworkMode; 3] = [NetworkMode::Default, NetworkMode::Local, NetworkMode::Custom];

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkMode::Default => "default",
            NetworkMode::Local => "local",
            NetworkMode::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub mode: NetworkMode,
    /// Custom network configuration file.
    pub path: String,
}

pub struct AuthStore {
    storage: SharedStorage,
    analytics: Rc<dyn Analytics>,
    feed: ChangeFeed,
    data_path: String,
    account: Option<Account>,
    accounts: Vec<Account>,
    pin: String,
    pin_checked: bool,
    icon: String,
    name: String,
    phrase: String,
    code: String,
    threads: HashMap<String, Map<String, Value>>,
    network_config: NetworkConfig,
}

impl AuthStore {
    /// Build the store, restoring the network config from storage.
    pub fn new(storage: SharedStorage, analytics: Rc<dyn Analytics>, feed: ChangeFeed) -> Self {
        let network_config = storage
            .borrow()
            .get("networkConfig")
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default();
        Self {
            storage,
            analytics,
            feed,
            data_path: String::new(),
            account: None,
            accounts: Vec::new(),
            pin: String::new(),
            pin_checked: false,
            icon: String::new(),
            name: String::new(),
            phrase: String::new(),
            code: String::new(),
            threads: HashMap::new(),
            network_config,
        }
    }

    /// Build the store on the storage and feed of a common store.
    pub fn attached(common: &CommonStore, analytics: Rc<dyn Analytics>) -> Self {
        Self::new(common.storage(), analytics, common.feed())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Data directory: the set value, falling back to storage.
    pub fn path(&self) -> String {
        if !self.data_path.is_empty() {
            return self.data_path.clone();
        }
        self.storage
            .borrow()
            .get_string("dataPath")
            .unwrap_or_default()
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn pin(&self) -> &str {
        &self.pin
    }

    pub fn pin_checked(&self) -> bool {
        self.pin_checked
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn network_config(&self) -> &NetworkConfig {
        &self.network_config
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    pub fn path_set(&mut self, path: &str) {
        self.data_path = path.to_string();
        self.storage.borrow_mut().set("dataPath", Value::from(path));
        self.feed.record(StoreEvent::DataPathChanged);
    }

    pub fn pin_set(&mut self, pin: &str) {
        self.pin = pin.to_string();
        self.feed.record(StoreEvent::SessionChanged);
    }

    pub fn pin_check_set(&mut self, checked: bool) {
        self.pin_checked = checked;
        self.feed.record(StoreEvent::SessionChanged);
    }

    /// Set the recovery phrase, keeping a backup copy in storage.
    pub fn phrase_set(&mut self, phrase: &str) {
        self.phrase = phrase.to_string();
        {
            let mut storage = self.storage.borrow_mut();
            storage.set("phrase", Value::from(phrase));
            storage.set("phraseBackup", Value::from(phrase));
        }
        self.feed.record(StoreEvent::SessionChanged);
    }

    pub fn code_set(&mut self, code: &str) {
        self.code = code.to_string();
        self.feed.record(StoreEvent::SessionChanged);
    }

    pub fn icon_set(&mut self, icon: &str) {
        self.icon = icon.to_string();
        self.feed.record(StoreEvent::SessionChanged);
    }

    pub fn name_set(&mut self, name: &str) {
        self.name = name.to_string();
        self.feed.record(StoreEvent::SessionChanged);
    }

    pub fn account_add(&mut self, account: Account) {
        self.accounts.push(account);
        self.feed.record(StoreEvent::AccountChanged);
    }

    pub fn account_clear(&mut self) {
        self.accounts.clear();
        self.feed.record(StoreEvent::AccountChanged);
    }

    /// Select the active account and attach it to analytics and error
    /// reporting.
    pub fn account_set(&mut self, account: Account) {
        info!(account_id = %account.id, "account selected");
        self.analytics.profile(&account);
        self.analytics.set_user(&account.id);
        self.account = Some(account);
        self.feed.record(StoreEvent::AccountChanged);
    }

    // =========================================================================
    // Threads
    // =========================================================================

    /// Merge keys into the thread metadata of a document.
    pub fn thread_set(&mut self, root_id: &str, patch: Map<String, Value>) {
        self.threads
            .entry(root_id.to_string())
            .or_default()
            .extend(patch);
        self.feed.record(StoreEvent::ThreadChanged {
            root_id: root_id.to_string(),
        });
    }

    pub fn thread_remove(&mut self, root_id: &str) {
        if self.threads.remove(root_id).is_some() {
            self.feed.record(StoreEvent::ThreadChanged {
                root_id: root_id.to_string(),
            });
        }
    }

    /// Thread metadata of a document; empty when none is set.
    pub fn thread_get(&self, root_id: &str) -> Map<String, Value> {
        self.threads.get(root_id).cloned().unwrap_or_default()
    }

    // =========================================================================
    // Network
    // =========================================================================

    pub fn network_config_set(&mut self, config: NetworkConfig) {
        debug!(mode = config.mode.as_str(), path = %config.path, "network config set");
        if let Ok(value) = serde_json::to_value(&config) {
            self.storage.borrow_mut().set("networkConfig", value);
        }
        self.network_config = config;
        self.feed.record(StoreEvent::NetworkConfigChanged);
    }

    // =========================================================================
    // Logout
    // =========================================================================

    /// End the session: drop stored credentials, reset the cover, and
    /// forget every loaded block.
    pub fn logout(&mut self, common: &mut CommonStore, blocks: &mut BlockIndex) {
        info!("logout");
        self.storage.borrow_mut().logout();
        self.pin_checked = false;

        common.cover_set_default();

        blocks.breadcrumbs_set("");
        blocks.blocks_clear_all();

        self.account = None;
        self.phrase_set("");
        self.feed.record(StoreEvent::LoggedOut);
    }
}
