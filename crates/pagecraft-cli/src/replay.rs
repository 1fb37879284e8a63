//! Scripted popup and menu sessions for the `replay` command.
//!
//! A script is a TOML file of `[[step]]` tables run in order against a
//! fresh [`CommonStore`]. Every store event is stamped with the virtual
//! time and the step that produced it.
//!
//! ```toml
//! [transitions]
//! popup_ms = 200
//!
//! [[step]]
//! action = "open"
//! layer = "popup"
//! id = "settings"
//!
//! [[step]]
//! action = "advance"
//! ms = 250
//! ```

use std::cell::RefCell;
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use pagecraft_store::{
    CommonStore, LayerKind, MemoryStorage, MenuParam, PopupParam, Settings, StoreEvent,
    TracingAnalytics, TransitionSettings, shared,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Popup,
    Menu,
}

impl From<Layer> for LayerKind {
    fn from(layer: Layer) -> Self {
        match layer {
            Layer::Popup => LayerKind::Popup,
            Layer::Menu => LayerKind::Menu,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Open {
        layer: Layer,
        id: String,
        #[serde(default)]
        data: Map<String, Value>,
    },
    Close {
        layer: Layer,
        id: String,
    },
    CloseAll {
        layer: Layer,
        /// Every open entry when absent.
        #[serde(default)]
        ids: Option<Vec<String>>,
    },
    /// Merge keys into an open entry's data.
    Update {
        layer: Layer,
        id: String,
        data: Map<String, Value>,
    },
    Advance {
        ms: u64,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Script {
    /// Overrides the configured exit transitions.
    pub transitions: Option<TransitionSettings>,
    #[serde(rename = "step")]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn parse(input: &str) -> Result<Self> {
        toml::from_str(input).context("parse replay script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        Self::parse(&input).with_context(|| format!("in {}", path.display()))
    }
}

/// Something that happened during a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub at: Duration,
    /// 1-based step number.
    pub step: usize,
    pub event: String,
}

impl fmt::Display for TimelineEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}ms step {}: {}", self.at.as_millis(), self.step, self.event)
    }
}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    pub timeline: Vec<TimelineEntry>,
    pub open_popups: Vec<String>,
    pub open_menus: Vec<String>,
}

impl Replay {
    pub fn timeline_text(&self) -> String {
        self.timeline
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Close callbacks report here; the runner merges them into the timeline.
type Notes = Rc<RefCell<Vec<String>>>;

struct Runner {
    common: CommonStore,
    notes: Notes,
    timeline: Vec<TimelineEntry>,
}

impl Runner {
    fn new(settings: &Settings) -> Self {
        Self {
            common: CommonStore::new(settings, shared(MemoryStorage::new()), Rc::new(TracingAnalytics)),
            notes: Rc::default(),
            timeline: Vec::new(),
        }
    }

    fn run(&mut self, step_no: usize, step: &Step) {
        trace!(step = step_no, ?step, "replay step");
        match step {
            Step::Open { layer, id, data } => {
                let data = Value::Object(data.clone());
                match layer {
                    Layer::Popup => self.common.popup_open(id, PopupParam::with_data(data)),
                    Layer::Menu => self.common.menu_open(id, MenuParam::new().with_data(data)),
                }
            }
            Step::Close { layer, id } => {
                let callback = self.callback(*layer, id);
                match layer {
                    Layer::Popup => self.common.popup_close(id, Some(callback)),
                    Layer::Menu => self.common.menu_close(id, Some(callback)),
                }
            }
            Step::CloseAll { layer, ids } => {
                let callback = self.callback(*layer, "all");
                let ids: Option<Vec<&str>> =
                    ids.as_ref().map(|ids| ids.iter().map(String::as_str).collect());
                let ids = ids.as_deref();
                match layer {
                    Layer::Popup => self.common.popup_close_all(ids, Some(callback)),
                    Layer::Menu => self.common.menu_close_all(ids, Some(callback)),
                }
            }
            Step::Update { layer, id, data } => {
                let updated = match layer {
                    Layer::Popup => self.common.popups_mut().update_data(id, data.clone()),
                    Layer::Menu => self.common.menu_update_data(id, data.clone()),
                };
                if !updated {
                    let kind = LayerKind::from(*layer);
                    self.notes.borrow_mut().push(format!("{kind} {id} not open"));
                }
            }
            Step::Advance { ms } => {
                let target = self.common.now() + Duration::from_millis(*ms);
                while let Some(due) = self.common.next_due().filter(|due| *due <= target) {
                    self.common.advance_to(due);
                    self.collect(step_no);
                }
                self.common.advance_to(target);
            }
        }
        self.collect(step_no);
    }

    fn callback(&self, layer: Layer, id: &str) -> Box<dyn FnOnce()> {
        let notes = Rc::clone(&self.notes);
        let note = format!("{} {id} callback", LayerKind::from(layer));
        Box::new(move || notes.borrow_mut().push(note))
    }

    fn collect(&mut self, step: usize) {
        let at = self.common.now();
        let events = self.common.drain_events();
        let notes = std::mem::take(&mut *self.notes.borrow_mut());
        self.timeline.extend(
            events
                .iter()
                .map(StoreEvent::to_string)
                .chain(notes)
                .map(|event| TimelineEntry { at, step, event }),
        );
    }
}

/// Run every step of `script`. A trailing removal still in flight is
/// left pending.
pub fn run(script: &Script, settings: &Settings) -> Replay {
    let mut settings = settings.clone();
    if let Some(transitions) = &script.transitions {
        settings.transitions = transitions.clone();
    }

    let mut runner = Runner::new(&settings);
    for (index, step) in script.steps.iter().enumerate() {
        runner.run(index + 1, step);
    }
    debug!(steps = script.steps.len(), events = runner.timeline.len(), "replay finished");

    let ids = |stack: Vec<&str>| stack.into_iter().map(str::to_string).collect();
    Replay {
        open_popups: ids(runner.common.popups().open_ids()),
        open_menus: ids(runner.common.menus().open_ids()),
        timeline: runner.timeline,
    }
}

pub fn render_table(replay: &Replay) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Time", "Step", "Event"]);
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
    for index in 0..2 {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    for entry in &replay.timeline {
        let event = if entry.event.ends_with("callback") || entry.event.ends_with("not open") {
            Cell::new(&entry.event).fg(Color::Yellow)
        } else {
            Cell::new(&entry.event)
        };
        table.add_row(vec![
            Cell::new(format!("{}ms", entry.at.as_millis())),
            Cell::new(entry.step),
            event,
        ]);
    }
    table
}
