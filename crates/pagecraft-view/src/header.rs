//! Page header: component selection, tabs, and header menus.

use std::rc::Rc;
use std::str::FromStr;

use pagecraft_model::ObjectLayout;
use pagecraft_store::{CommonStore, MenuParam, PopupParam, Rect};
use serde_json::json;
use tracing::debug;

use crate::route::{Route, Router};

/// Gap between the header element and a menu opened from it.
pub const MENU_OFFSET: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderComponent {
    AuthIndex,
    MainObject,
    MainHistory,
    MainGraph,
    MainNavigation,
    MainStore,
    MainEmpty,
}

impl HeaderComponent {
    pub const ALL: [HeaderComponent; 7] = [
        HeaderComponent::AuthIndex,
        HeaderComponent::MainObject,
        HeaderComponent::MainHistory,
        HeaderComponent::MainGraph,
        HeaderComponent::MainNavigation,
        HeaderComponent::MainStore,
        HeaderComponent::MainEmpty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderComponent::AuthIndex => "authIndex",
            HeaderComponent::MainObject => "mainObject",
            HeaderComponent::MainHistory => "mainHistory",
            HeaderComponent::MainGraph => "mainGraph",
            HeaderComponent::MainNavigation => "mainNavigation",
            HeaderComponent::MainStore => "mainStore",
            HeaderComponent::MainEmpty => "mainEmpty",
        }
    }

    /// Whether the component shows the tab strip in its center.
    pub fn has_tabs(&self) -> bool {
        matches!(self, HeaderComponent::MainStore)
    }
}

impl FromStr for HeaderComponent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HeaderComponent::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown header component: {s}"))
    }
}

/// Class list of the header wrapper.
pub fn header_class(component: &str, class_name: &str) -> String {
    let mut class = vec!["header", component];
    if !class_name.is_empty() {
        class.push(class_name);
    }
    if !matches!(component, "authIndex" | "mainIndex") {
        class.push("isCommon");
    }
    class.join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderTab {
    pub id: String,
    pub name: String,
    pub tooltip: String,
    pub tooltip_caption: String,
}

pub fn tab_class(tab: &HeaderTab, active: &str) -> &'static str {
    if tab.id == active { "tab active" } else { "tab" }
}

/// Caption of the sidebar toggle tooltip.
pub fn toggle_caption(cmd: &str) -> String {
    format!("{cmd} + \\, {cmd} + .")
}

#[derive(Debug, Clone)]
pub struct Header {
    /// Component name; unknown names render nothing.
    pub component: String,
    pub class_name: String,
    pub root_id: String,
    pub layout: ObjectLayout,
    pub is_popup: bool,
}

impl Header {
    pub fn new(component: impl Into<String>, root_id: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            class_name: String::new(),
            root_id: root_id.into(),
            layout: ObjectLayout::default(),
            is_popup: false,
        }
    }

    pub fn resolved(&self) -> Option<HeaderComponent> {
        self.component.parse().ok()
    }

    pub fn class(&self) -> String {
        header_class(&self.component, &self.class_name)
    }

    /// Selector of the header inside its container.
    pub fn container(&self) -> String {
        let prefix = if self.is_popup { ".popup" } else { "" };
        format!("{prefix} .header")
    }

    /// Open a menu anchored to a header element.
    ///
    /// `element` is the element's rectangle and `scroll_top` the window
    /// scroll offset. Outside a popup the menu is pinned below the element.
    /// Every open menu is closed first.
    pub fn menu_open(
        &self,
        common: &mut CommonStore,
        id: &str,
        element_id: &str,
        element: Rect,
        scroll_top: f64,
        mut param: MenuParam,
    ) {
        param.element = format!("{} {}", self.container(), element_id);
        if param.offset_y == 0.0 {
            param.offset_y = MENU_OFFSET;
        }
        if !self.is_popup {
            param.fixed_y = Some(element.y + element.height - scroll_top + MENU_OFFSET);
            param.class_name_wrap = "fixed fromHeader".to_string();
        }
        debug!(id, element = %param.element, "header menu");
        common.menu_close_all_forced(None, None);
        common.menu_open(id, param);
    }

    /// Close every popup, then open the header's object.
    pub fn on_expand(&self, common: &mut CommonStore, router: Rc<dyn Router>) {
        let route = Route::new(self.root_id.clone(), self.layout);
        common.popup_close_all(None, Some(Box::new(move || router.open_route(&route))));
    }

    pub fn on_search(&self, common: &mut CommonStore) {
        common.popup_open("search", PopupParam::with_data(json!({ "route": "Header" })));
    }
}
