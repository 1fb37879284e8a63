//! Popup and menu layer stacks.
//!
//! A [`LayerStack`] holds the open entries of one layer kind in push order.
//! At most one entry per id is open at a time. Closing is logically
//! immediate: the entry leaves the open set at once and stays in
//! [`LayerStack::entries`] in the [`LayerPhase::Closing`] phase only so the
//! host can play its exit transition. Removal happens when the stack's
//! virtual clock passes the transition delay.
//!
//! Removal is keyed by [`LayerToken`], never by id, so a stale removal can
//! not take out an entry that was reopened under the same id.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::analytics::{Analytics, to_camel_case};
use crate::event::{ChangeFeed, LayerKind, StoreEvent};

/// One-shot completion callback.
///
/// Runs while the owning stack is mutably borrowed. A stack held in a
/// `RefCell` must not be borrowed again from inside the callback; chain
/// an open after a close with [`LayerStack::close_all_and_open`] instead.
pub type Callback = Box<dyn FnOnce()>;

/// Reusable hook stored inside a param.
///
/// Same borrowing rule as [`Callback`]: hooks fire from inside stack
/// operations.
pub type Hook = Rc<dyn Fn()>;

/// Parameters carried by a layer entry.
pub trait LayerParam {
    fn data(&self) -> &Map<String, Value>;

    fn data_mut(&mut self) -> &mut Map<String, Value>;

    /// Called right after the entry is pushed.
    fn on_open(&self) -> Option<Hook> {
        None
    }

    /// Called when the entry closes.
    fn on_close(&self) -> Option<Hook> {
        None
    }

    /// Skip the exit transition.
    fn no_animation(&self) -> bool {
        false
    }

    /// Fill defaults before the entry is pushed.
    fn normalize(&mut self) {}
}

/// Identity of one open instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerPhase {
    Open,
    Closing,
}

pub struct Layer<P> {
    id: String,
    param: P,
    token: LayerToken,
    phase: LayerPhase,
}

impl<P> Layer<P> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn param(&self) -> &P {
        &self.param
    }

    pub fn token(&self) -> LayerToken {
        self.token
    }

    pub fn phase(&self) -> LayerPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase == LayerPhase::Open
    }
}

impl<P: fmt::Debug> fmt::Debug for Layer<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("id", &self.id)
            .field("token", &self.token)
            .field("phase", &self.phase)
            .field("param", &self.param)
            .finish()
    }
}

enum Followup<P> {
    Notify(Callback),
    /// Deferred open; dropped when a newer open of the same id came in.
    Open { id: String, param: P, generation: u64 },
    Barrier(u64),
}

struct Barrier<P> {
    remaining: usize,
    then: Vec<Followup<P>>,
}

struct Removal<P> {
    due: Duration,
    seq: u64,
    token: LayerToken,
    followups: Vec<Followup<P>>,
}

pub struct LayerStack<P> {
    kind: LayerKind,
    delay: Duration,
    layers: Vec<Layer<P>>,
    removals: Vec<Removal<P>>,
    barriers: HashMap<u64, Barrier<P>>,
    now: Duration,
    next_token: u64,
    next_seq: u64,
    /// Open requests seen per id.
    generations: HashMap<String, u64>,
    analytics: Rc<dyn Analytics>,
    feed: ChangeFeed,
}

impl<P: LayerParam> LayerStack<P> {
    pub fn new(
        kind: LayerKind,
        delay: Duration,
        analytics: Rc<dyn Analytics>,
        feed: ChangeFeed,
    ) -> Self {
        Self {
            kind,
            delay,
            layers: Vec::new(),
            removals: Vec::new(),
            barriers: HashMap::new(),
            now: Duration::ZERO,
            next_token: 0,
            next_seq: 0,
            generations: HashMap::new(),
            analytics,
            feed,
        }
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All entries in push order, including those still closing.
    pub fn entries(&self) -> &[Layer<P>] {
        &self.layers
    }

    /// The open entry with this id.
    pub fn get(&self, id: &str) -> Option<&Layer<P>> {
        self.layers.iter().find(|l| l.is_open() && l.id == id)
    }

    /// With an id: whether that id is open. Without: whether anything is open.
    pub fn is_open(&self, id: Option<&str>) -> bool {
        match id {
            Some(id) => self.get(id).is_some(),
            None => self.layers.iter().any(Layer::is_open),
        }
    }

    /// Whether any of the ids is open.
    pub fn is_open_list(&self, ids: &[&str]) -> bool {
        ids.iter().any(|id| self.is_open(Some(id)))
    }

    /// Ids of open entries in push order.
    pub fn open_ids(&self) -> Vec<&str> {
        self.layers
            .iter()
            .filter(|l| l.is_open())
            .map(|l| l.id.as_str())
            .collect()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Open an entry, replacing an open entry with the same id.
    ///
    /// The replacement is pushed once the previous instance has finished
    /// closing. The latest request for an id wins: a replacement still
    /// waiting when a newer open arrives is dropped.
    pub fn open(&mut self, id: &str, mut param: P) {
        param.normalize();
        self.track_open(id);
        let generation = self.next_generation(id);
        self.open_inner(id.to_string(), param, generation);
    }

    /// Patch the open entry in place. Returns false when `id` is not open.
    pub fn update<F>(&mut self, id: &str, patch: F) -> bool
    where
        F: FnOnce(&mut P),
    {
        let Some(layer) = self.layers.iter_mut().find(|l| l.is_open() && l.id == id) else {
            return false;
        };
        patch(&mut layer.param);
        self.feed.record(StoreEvent::LayerUpdated {
            kind: self.kind,
            id: id.to_string(),
        });
        true
    }

    /// Merge keys into the open entry's data object.
    pub fn update_data(&mut self, id: &str, data: Map<String, Value>) -> bool {
        self.update(id, |param| param.data_mut().extend(data))
    }

    /// Close an entry.
    ///
    /// When `id` is not open the callback runs synchronously. Otherwise it
    /// runs after the entry has been removed.
    pub fn close(&mut self, id: &str, callback: Option<Callback>) {
        let followups = callback.map(Followup::Notify).into_iter().collect();
        self.close_with(id, followups);
    }

    /// Close the listed ids (every open entry when `None`).
    ///
    /// The callback runs once after the last of them is removed, or
    /// synchronously when none of them is open.
    pub fn close_all(&mut self, ids: Option<&[&str]>, callback: Option<Callback>) {
        let targets = self.targets(ids);
        self.close_many(targets, callback.map(Followup::Notify));
    }

    /// Close the listed ids, then open `id` once they are all gone.
    pub fn close_all_and_open(&mut self, ids: Option<&[&str]>, id: &str, mut param: P) {
        param.normalize();
        self.track_open(id);
        let generation = self.next_generation(id);
        let targets = self.targets(ids);
        self.close_many(
            targets,
            Some(Followup::Open {
                id: id.to_string(),
                param,
                generation,
            }),
        );
    }

    /// Remove the listed ids immediately, skipping exit transitions.
    pub fn close_all_forced(&mut self, ids: Option<&[&str]>, callback: Option<Callback>) {
        for id in self.targets(ids) {
            let Some(pos) = self.layers.iter().position(|l| l.is_open() && l.id == id) else {
                continue;
            };
            let layer = self.layers.remove(pos);
            debug!(kind = %self.kind, id = %layer.id, "forced close");
            self.feed.record(StoreEvent::LayerClosed {
                kind: self.kind,
                id: layer.id.clone(),
            });
            if let Some(hook) = layer.param.on_close() {
                hook();
            }
        }
        if let Some(callback) = callback {
            callback();
        }
    }

    // =========================================================================
    // Clock
    // =========================================================================

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Due time of the earliest pending removal.
    pub fn next_due(&self) -> Option<Duration> {
        self.removals.iter().map(|r| r.due).min()
    }

    /// Whether any entry is still waiting for removal.
    pub fn has_pending(&self) -> bool {
        !self.removals.is_empty()
    }

    pub fn advance(&mut self, elapsed: Duration) {
        self.advance_to(self.now + elapsed);
    }

    /// Move the clock to `time`, completing every removal due by then in
    /// due-time order.
    pub fn advance_to(&mut self, time: Duration) {
        while let Some(idx) = self
            .removals
            .iter()
            .enumerate()
            .filter(|(_, r)| r.due <= time)
            .min_by_key(|(_, r)| (r.due, r.seq))
            .map(|(idx, _)| idx)
        {
            let removal = self.removals.remove(idx);
            self.now = self.now.max(removal.due);
            self.finish_removal(removal);
        }
        self.now = self.now.max(time);
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn track_open(&self, id: &str) {
        let name = to_camel_case(&format!("{}-{}", self.kind.label(), id));
        self.analytics.event(&name);
    }

    fn targets(&self, ids: Option<&[&str]>) -> Vec<String> {
        match ids {
            Some(ids) => ids
                .iter()
                .filter(|id| self.is_open(Some(id)))
                .map(|id| (*id).to_string())
                .collect(),
            None => self.open_ids().into_iter().map(str::to_string).collect(),
        }
    }

    fn next_generation(&mut self, id: &str) -> u64 {
        let generation = self.generations.entry(id.to_string()).or_insert(0);
        *generation += 1;
        *generation
    }

    fn is_latest(&self, id: &str, generation: u64) -> bool {
        self.generations.get(id) == Some(&generation)
    }

    fn open_inner(&mut self, id: String, param: P, generation: u64) {
        if self.is_open(Some(&id)) {
            debug!(kind = %self.kind, %id, "replacing open entry");
            let key = id.clone();
            self.close_with(
                &key,
                vec![Followup::Open {
                    id,
                    param,
                    generation,
                }],
            );
        } else {
            self.push(id, param);
        }
    }

    fn push(&mut self, id: String, param: P) {
        let token = LayerToken(self.next_token);
        self.next_token += 1;
        let on_open = param.on_open();
        debug!(kind = %self.kind, %id, "open");
        self.feed.record(StoreEvent::LayerOpened {
            kind: self.kind,
            id: id.clone(),
        });
        self.layers.push(Layer {
            id,
            param,
            token,
            phase: LayerPhase::Open,
        });
        if let Some(hook) = on_open {
            hook();
        }
    }

    fn close_many(&mut self, targets: Vec<String>, then: Option<Followup<P>>) {
        match then {
            None => {
                for id in targets {
                    self.close_with(&id, Vec::new());
                }
            }
            Some(followup) if targets.is_empty() => self.run_followups(vec![followup]),
            Some(followup) => {
                let barrier = self.next_seq;
                self.next_seq += 1;
                self.barriers.insert(
                    barrier,
                    Barrier {
                        remaining: targets.len(),
                        then: vec![followup],
                    },
                );
                for id in targets {
                    self.close_with(&id, vec![Followup::Barrier(barrier)]);
                }
            }
        }
    }

    fn close_with(&mut self, id: &str, followups: Vec<Followup<P>>) {
        let Some(layer) = self
            .layers
            .iter_mut()
            .find(|l| l.phase == LayerPhase::Open && l.id == id)
        else {
            trace!(kind = %self.kind, id, "close of an entry that is not open");
            self.run_followups(followups);
            return;
        };

        layer.phase = LayerPhase::Closing;
        let token = layer.token;
        let delay = if layer.param.no_animation() {
            Duration::ZERO
        } else {
            self.delay
        };
        let early_hook = match self.kind {
            LayerKind::Popup => layer.param.on_close(),
            LayerKind::Menu => None,
        };

        debug!(kind = %self.kind, id, delay_ms = delay.as_millis() as u64, "closing");
        self.feed.record(StoreEvent::LayerClosing {
            kind: self.kind,
            id: id.to_string(),
        });
        if let Some(hook) = early_hook {
            hook();
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.removals.push(Removal {
            due: self.now + delay,
            seq,
            token,
            followups,
        });
    }

    fn finish_removal(&mut self, removal: Removal<P>) {
        if let Some(pos) = self.layers.iter().position(|l| l.token == removal.token) {
            let layer = self.layers.remove(pos);
            debug!(kind = %self.kind, id = %layer.id, "removed");
            self.feed.record(StoreEvent::LayerClosed {
                kind: self.kind,
                id: layer.id.clone(),
            });
            if self.kind == LayerKind::Menu {
                if let Some(hook) = layer.param.on_close() {
                    hook();
                }
            }
        }
        self.run_followups(removal.followups);
    }

    fn run_followups(&mut self, followups: Vec<Followup<P>>) {
        for followup in followups {
            match followup {
                Followup::Notify(callback) => callback(),
                Followup::Open {
                    id,
                    param,
                    generation,
                } => {
                    if self.is_latest(&id, generation) {
                        self.open_inner(id, param, generation);
                    } else {
                        trace!(kind = %self.kind, %id, "superseded open dropped");
                    }
                }
                Followup::Barrier(key) => {
                    let done = match self.barriers.get_mut(&key) {
                        Some(barrier) => {
                            barrier.remaining = barrier.remaining.saturating_sub(1);
                            barrier.remaining == 0
                        }
                        None => false,
                    };
                    if done {
                        if let Some(barrier) = self.barriers.remove(&key) {
                            self.run_followups(barrier.then);
                        }
                    }
                }
            }
        }
    }
}

impl<P> fmt::Debug for LayerStack<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerStack")
            .field("kind", &self.kind)
            .field("delay", &self.delay)
            .field("now", &self.now)
            .field("entries", &self.layers.len())
            .field("pending", &self.removals.len())
            .finish_non_exhaustive()
    }
}
