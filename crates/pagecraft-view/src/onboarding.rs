//! Network and storage settings form shown during onboarding.

use pagecraft_store::{Analytics, AuthStore, CommonStore, NetworkConfig, NetworkMode, PopupParam};
use serde_json::{Map, Value, json};
use tracing::info;

use crate::rpc::{Command, CommandSink};

/// Popup hosting the form.
pub const SETTINGS_POPUP: &str = "settings";

/// Popup asking to confirm a storage move in local-only mode.
pub const CONFIRM_POPUP: &str = "confirm";

const ROUTE: &str = "Onboarding";

/// Entry of the network mode select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeOption {
    pub mode: NetworkMode,
    /// Translation key of the title.
    pub name_key: String,
    /// Translation key of the description.
    pub description_key: String,
}

pub fn mode_options() -> Vec<ModeOption> {
    NetworkMode::ALL
        .into_iter()
        .map(|mode| {
            let name = capitalize(mode.as_str());
            ModeOption {
                mode,
                name_key: format!("networkMode{name}Title"),
                description_key: format!("networkMode{name}Text"),
            }
        })
        .collect()
}

/// Storage change waiting for confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageChange {
    /// Let the user pick a new directory.
    Pick,
    /// Go back to the default directory.
    Reset,
}

/// What the host should do after a storage request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageStep {
    /// Confirmation popup opened; call [`OnboardingForm::confirm_storage`]
    /// when the user accepts.
    Confirm(StorageChange),
    /// Show a directory picker and pass the result to
    /// [`OnboardingForm::set_user_path`].
    PickDirectory,
    /// Applied immediately.
    Done,
}

/// Draft of the form. Nothing is stored until [`OnboardingForm::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingForm {
    pub mode: NetworkMode,
    pub path: String,
    pub user_path: String,
    default_path: String,
}

impl OnboardingForm {
    /// Start from the stored network config and the current data directory.
    pub fn new(auth: &AuthStore, user_path: &str, default_path: &str) -> Self {
        let config = auth.network_config();
        Self {
            mode: config.mode,
            path: config.path.clone(),
            user_path: user_path.to_string(),
            default_path: default_path.to_string(),
        }
    }

    pub fn is_default_path(&self) -> bool {
        self.user_path == self.default_path
    }

    /// Custom mode takes a network configuration file.
    pub fn shows_config_file(&self) -> bool {
        self.mode == NetworkMode::Custom
    }

    pub fn set_mode(&mut self, mode: NetworkMode) {
        self.mode = mode;
    }

    /// Network configuration file picked by the user.
    pub fn set_config_file(&mut self, path: &str) {
        self.path = path.to_string();
    }

    pub fn set_user_path(&mut self, path: &str) {
        self.user_path = path.to_string();
    }

    /// Ask to pick another data directory.
    pub fn change_storage(&mut self, common: &mut CommonStore) -> StorageStep {
        self.request(common, StorageChange::Pick)
    }

    /// Ask to go back to the default data directory.
    pub fn reset_storage(&mut self, common: &mut CommonStore) -> StorageStep {
        self.request(common, StorageChange::Reset)
    }

    /// The user accepted the confirmation popup.
    pub fn confirm_storage(&mut self, change: &StorageChange) -> StorageStep {
        self.apply(change)
    }

    /// Store the draft.
    ///
    /// Reports a mode or config file change, moves the data directory when
    /// it changed, saves the network config and closes the settings popup.
    pub fn save(
        &self,
        auth: &mut AuthStore,
        common: &mut CommonStore,
        analytics: &dyn Analytics,
        sink: &dyn CommandSink,
        current_user_path: &str,
    ) {
        let stored = auth.network_config().clone();

        if self.mode != stored.mode {
            let props = props(json!({ "route": ROUTE, "type": self.mode.as_str() }));
            analytics.event_with("SelectNetwork", &props);
        }
        if self.path != stored.path {
            analytics.event_with("UploadNetworkConfiguration", &props(json!({ "route": ROUTE })));
        }
        if self.user_path != current_user_path {
            info!(path = %self.user_path, "moving data directory");
            sink.send(Command::SetUserDataPath {
                path: self.user_path.clone(),
            });
            common.data_path_set(&self.user_path);
        }

        auth.network_config_set(NetworkConfig {
            mode: self.mode,
            path: self.path.clone(),
        });
        common.popup_close(SETTINGS_POPUP, None);
    }

    fn request(&mut self, common: &mut CommonStore, change: StorageChange) -> StorageStep {
        if self.mode == NetworkMode::Local {
            common.popup_open(
                CONFIRM_POPUP,
                PopupParam::with_data(json!({
                    "title": "commonAreYouSure",
                    "text": "popupSettingsOnboardingLocalOnlyWarningText",
                    "textConfirm": "popupSettingsOnboardingLocalOnlyWarningConfirm",
                })),
            );
            return StorageStep::Confirm(change);
        }
        self.apply(&change)
    }

    fn apply(&mut self, change: &StorageChange) -> StorageStep {
        match change {
            StorageChange::Pick => StorageStep::PickDirectory,
            StorageChange::Reset => {
                self.user_path = self.default_path.clone();
                StorageStep::Done
            }
        }
    }
}

fn props(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
