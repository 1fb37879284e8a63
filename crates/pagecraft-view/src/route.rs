//! Navigation collaborator.

use std::cell::RefCell;

use pagecraft_model::ObjectLayout;

/// Object to navigate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub id: String,
    pub layout: ObjectLayout,
}

impl Route {
    pub fn new(id: impl Into<String>, layout: ObjectLayout) -> Self {
        Self {
            id: id.into(),
            layout,
        }
    }
}

pub trait Router {
    fn open_route(&self, route: &Route);
}

/// Keeps requested routes in memory.
#[derive(Debug, Default)]
pub struct RecordingRouter {
    routes: RefCell<Vec<Route>>,
}

impl RecordingRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.borrow().clone()
    }
}

impl Router for RecordingRouter {
    fn open_route(&self, route: &Route) {
        self.routes.borrow_mut().push(route.clone());
    }
}
