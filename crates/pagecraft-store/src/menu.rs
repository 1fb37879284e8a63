//! Menu parameters and placement enums.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::layer::{Hook, LayerParam};

/// Menu item layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuType {
    /// Not set; becomes `Vertical` when the menu opens.
    #[default]
    Unset,
    Vertical,
    Horizontal,
}

/// Side of the anchor element the menu is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuDirection {
    #[default]
    None,
    Top,
    Bottom,
    Left,
    Right,
    Center,
}

/// Screen rectangle in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Whether the two rectangles overlap. Touching edges do not count.
    pub fn collides(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

#[derive(Clone, Default)]
pub struct MenuParam {
    /// Menu component to render.
    pub component: String,
    pub menu_type: MenuType,
    pub vertical: MenuDirection,
    pub horizontal: MenuDirection,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Absolute Y position; overrides placement relative to the anchor.
    pub fixed_y: Option<f64>,
    /// Selector of the anchor element.
    pub element: String,
    /// Anchor rectangle, used instead of `element` for pointer menus.
    pub rect: Option<Rect>,
    pub class_name: String,
    pub class_name_wrap: String,
    /// Ids of submenus closed together with this one.
    pub sub_ids: Vec<String>,
    pub is_sub: bool,
    pub no_animation: bool,
    pub data: Map<String, Value>,
    pub on_open: Option<Hook>,
    pub on_close: Option<Hook>,
}

impl MenuParam {
    pub fn new() -> Self {
        Self::default()
    }

    /// Param anchored to an element selector.
    pub fn anchored(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            ..Self::default()
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        if let Value::Object(map) = data {
            self.data = map;
        }
        self
    }

    pub fn with_on_open(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_open = Some(Rc::new(hook));
        self
    }

    pub fn with_on_close(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_close = Some(Rc::new(hook));
        self
    }
}

impl LayerParam for MenuParam {
    fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    fn data_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.data
    }

    fn on_open(&self) -> Option<Hook> {
        self.on_open.clone()
    }

    fn on_close(&self) -> Option<Hook> {
        self.on_close.clone()
    }

    fn no_animation(&self) -> bool {
        self.no_animation
    }

    fn normalize(&mut self) {
        if self.menu_type == MenuType::Unset {
            self.menu_type = MenuType::Vertical;
        }
        if self.vertical == MenuDirection::None {
            self.vertical = MenuDirection::Bottom;
        }
        if self.horizontal == MenuDirection::None {
            self.horizontal = MenuDirection::Left;
        }
        if !self.offset_x.is_finite() {
            self.offset_x = 0.0;
        }
        if !self.offset_y.is_finite() {
            self.offset_y = 0.0;
        }
    }
}

impl fmt::Debug for MenuParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuParam")
            .field("component", &self.component)
            .field("menu_type", &self.menu_type)
            .field("vertical", &self.vertical)
            .field("horizontal", &self.horizontal)
            .field("offset_x", &self.offset_x)
            .field("offset_y", &self.offset_y)
            .field("fixed_y", &self.fixed_y)
            .field("element", &self.element)
            .field("rect", &self.rect)
            .field("class_name_wrap", &self.class_name_wrap)
            .field("sub_ids", &self.sub_ids)
            .field("no_animation", &self.no_animation)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_fills_defaults() {
        let mut param = MenuParam {
            offset_y: f64::NAN,
            horizontal: MenuDirection::Center,
            ..MenuParam::default()
        };
        param.normalize();
        assert_eq!(param.menu_type, MenuType::Vertical);
        assert_eq!(param.vertical, MenuDirection::Bottom);
        assert_eq!(param.horizontal, MenuDirection::Center);
        assert_eq!(param.offset_y, 0.0);
    }

    #[test]
    fn touching_rects_do_not_collide() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.collides(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.collides(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.collides(&Rect::new(0.0, 20.0, 1.0, 1.0)));
    }
}
