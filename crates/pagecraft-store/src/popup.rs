//! Popup parameters.

use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::layer::{Hook, LayerParam};

#[derive(Clone, Default)]
pub struct PopupParam {
    /// Free-form payload read by the popup component.
    pub data: Map<String, Value>,
    /// Extra class for the popup wrapper.
    pub class_name: String,
    /// Called as soon as the popup is asked to close.
    pub on_close: Option<Hook>,
}

impl PopupParam {
    pub fn new() -> Self {
        Self::default()
    }

    /// Param with a data payload. Non-object values are ignored.
    pub fn with_data(data: Value) -> Self {
        let data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn with_on_close(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_close = Some(Rc::new(hook));
        self
    }
}

impl LayerParam for PopupParam {
    fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    fn data_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.data
    }

    fn on_close(&self) -> Option<Hook> {
        self.on_close.clone()
    }
}

impl fmt::Debug for PopupParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopupParam")
            .field("data", &self.data)
            .field("class_name", &self.class_name)
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}
