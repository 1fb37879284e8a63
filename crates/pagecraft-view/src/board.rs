//! Board (kanban) view of a dataview block.
//!
//! Groups come from a distinct-value search over the view's group
//! relation. Columns and cards are reordered by dragging; the host passes
//! in measured rectangles and pointer positions and paints the drop ghost
//! from [`Board::take_frame`].

use std::collections::HashMap;

use pagecraft_model::{BlockIndex, DataviewContent, GroupIndex, ViewGroupOrder};
use pagecraft_store::{Analytics, CommonStore, PopupParam, Rect};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::frame::FrameCoalescer;
use crate::rpc::{Command, CommandSink, RpcError, RpcResponse};

/// Extra height added to the dragged card when testing for overlap.
const CARD_DRAG_SLACK: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardSize {
    pub card: f64,
    pub margin: f64,
    /// Horizontal space reserved next to the board.
    pub sidebar: f64,
}

impl Default for BoardSize {
    fn default() -> Self {
        Self {
            card: 262.0,
            margin: 16.0,
            sidebar: 192.0,
        }
    }
}

/// One dataview view as the board needs it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataviewView {
    pub id: String,
    pub group_relation_key: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoardGroup {
    pub id: String,
    /// Relation value shared by the group's records.
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub id: String,
    pub template_is_bundled: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub layout: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropSide {
    /// Left of a column, above a card.
    Before,
    /// Right of a column, below a card.
    After,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTarget {
    pub id: String,
    pub side: DropSide,
}

/// Measured rectangle of a column or card.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedRect {
    pub id: String,
    pub rect: Rect,
    /// Column position the element belongs to.
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardLayout {
    pub scroll_width: f64,
    /// Negative left margin and matching padding of the scroll area.
    pub margin: f64,
    pub view_width: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DragSubject {
    Column(String),
    Card(String),
}

#[derive(Debug)]
struct DragState {
    subject: DragSubject,
    cache: Vec<CachedRect>,
    width: f64,
    height: f64,
    old_index: Option<usize>,
    new_index: Option<usize>,
}

impl DragState {
    fn rect(&self, id: &str) -> Option<&CachedRect> {
        self.cache.iter().find(|c| c.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingAdd {
    group_id: String,
    type_id: String,
}

/// Move the element at `from` so it ends up at `to`.
///
/// Out-of-range `from` leaves the slice unchanged; `to` is clamped to the
/// last position.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() {
        return;
    }
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
}

#[derive(Debug)]
pub struct Board {
    root_id: String,
    block_id: String,
    size: BoardSize,
    group_relation_key: String,
    groups: Vec<BoardGroup>,
    pending_order: HashMap<String, usize>,
    loading: bool,
    drag: Option<DragState>,
    frames: FrameCoalescer<Option<DropTarget>>,
    pending_add: Option<PendingAdd>,
}

impl Board {
    pub fn new(root_id: impl Into<String>, block_id: impl Into<String>) -> Self {
        Self::with_size(root_id, block_id, BoardSize::default())
    }

    pub fn with_size(root_id: impl Into<String>, block_id: impl Into<String>, size: BoardSize) -> Self {
        Self {
            root_id: root_id.into(),
            block_id: block_id.into(),
            size,
            group_relation_key: String::new(),
            groups: Vec::new(),
            pending_order: HashMap::new(),
            loading: false,
            drag: None,
            frames: FrameCoalescer::new(),
            pending_add: None,
        }
    }

    pub fn groups(&self) -> &[BoardGroup] {
        &self.groups
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Reload groups when the view's group relation changed.
    ///
    /// Returns true when a distinct search was requested.
    pub fn load_group_list(
        &mut self,
        view: &DataviewView,
        content: &DataviewContent,
        sink: &dyn CommandSink,
    ) -> bool {
        if self.group_relation_key == view.group_relation_key {
            return false;
        }

        self.groups.clear();
        self.group_relation_key = view.group_relation_key.clone();
        if view.group_relation_key.is_empty() {
            return false;
        }

        self.pending_order = content
            .group_order_for(&view.id)
            .map(|order| {
                order
                    .groups
                    .iter()
                    .map(|g| (g.group_id.clone(), g.index))
                    .collect()
            })
            .unwrap_or_default();
        self.loading = true;

        debug!(relation = %view.group_relation_key, "loading board groups");
        sink.send(Command::ObjectRelationSearchDistinct {
            relation_key: view.group_relation_key.clone(),
        });
        true
    }

    /// Apply the distinct search result, ordered by the saved group order.
    ///
    /// Groups without a saved position keep their relative order after the
    /// positioned ones. A failed search leaves the board untouched.
    pub fn on_groups_loaded(&mut self, response: RpcResponse<Vec<BoardGroup>>) -> Result<(), RpcError> {
        let mut groups = response.into_result().inspect_err(|error| {
            warn!(%error, "group search failed");
        })?;
        let order = &self.pending_order;
        groups.sort_by_key(|g| order.get(&g.id).copied().unwrap_or(usize::MAX));
        self.groups = groups;
        self.loading = false;
        Ok(())
    }

    /// Subscription ids of every group's record list.
    pub fn subscription_ids(&self) -> Vec<String> {
        self.groups
            .iter()
            .map(|g| BlockIndex::sub_id(&self.root_id, &format!("{}:{}", self.block_id, g.id)))
            .collect()
    }

    /// Tear down: returns the subscriptions to cancel and forgets the groups.
    pub fn unmount(&mut self) -> Vec<String> {
        let ids = self.subscription_ids();
        self.groups.clear();
        self.group_relation_key.clear();
        self.frames.cancel();
        self.drag = None;
        ids
    }

    // =========================================================================
    // Column drag
    // =========================================================================

    /// Start dragging a column. `rects` are the measured columns by group id.
    pub fn column_drag_start(&mut self, group_id: &str, clone: (f64, f64), rects: &[(String, Rect)]) {
        let cache = self
            .groups
            .iter()
            .enumerate()
            .filter_map(|(index, group)| {
                rects.iter().find(|(id, _)| *id == group.id).map(|(id, rect)| CachedRect {
                    id: id.clone(),
                    rect: *rect,
                    index,
                })
            })
            .collect();
        self.drag = Some(DragState {
            subject: DragSubject::Column(group_id.to_string()),
            cache,
            width: clone.0,
            height: clone.1,
            old_index: None,
            new_index: None,
        });
    }

    /// Track the pointer over the columns. Returns the hovered drop target.
    pub fn column_drag_move(&mut self, x: f64, y: f64) -> Option<DropTarget> {
        let drag = self.drag.as_mut()?;
        let DragSubject::Column(group_id) = &drag.subject else {
            return None;
        };

        drag.old_index = self.groups.iter().position(|g| g.id == *group_id);
        let pointer = Rect::new(x, y, drag.width, drag.height);
        let mut target = None;

        if drag.rect(group_id).is_some() {
            for group in self.groups.iter().filter(|g| g.id != *group_id) {
                let Some(cached) = drag.rect(&group.id) else {
                    continue;
                };
                if pointer.collides(&cached.rect) {
                    let is_left = x <= cached.rect.center_x();
                    let index = cached.index;
                    drag.new_index = Some(if is_left { index } else { index + 1 });
                    target = Some(DropTarget {
                        id: group.id.clone(),
                        side: if is_left { DropSide::Before } else { DropSide::After },
                    });
                    break;
                }
            }
        }

        self.frames.request(target.clone());
        target
    }

    /// Drop the dragged column. Returns true when the group order changed
    /// and was sent.
    pub fn column_drag_end(&mut self, view_id: &str, sink: &dyn CommandSink) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        self.frames.cancel();

        let (Some(old), Some(new)) = (drag.old_index, drag.new_index) else {
            return false;
        };
        // The drop index counts the dragged column itself.
        let to = if new > old { new - 1 } else { new };
        if to == old {
            return false;
        }

        array_move(&mut self.groups, old, to);
        let order = ViewGroupOrder {
            view_id: view_id.to_string(),
            groups: self
                .groups
                .iter()
                .enumerate()
                .map(|(index, g)| GroupIndex {
                    group_id: g.id.clone(),
                    index,
                })
                .collect(),
        };
        debug!(from = old, to, "board column moved");
        sink.send(Command::BlockDataviewGroupOrderUpdate {
            root_id: self.root_id.clone(),
            block_id: self.block_id.clone(),
            order,
        });
        true
    }

    // =========================================================================
    // Card drag
    // =========================================================================

    /// Start dragging a card. `cards` are measured cards in column order.
    pub fn card_drag_start(&mut self, record_id: &str, clone: (f64, f64), cards: Vec<CachedRect>) {
        self.drag = Some(DragState {
            subject: DragSubject::Card(record_id.to_string()),
            cache: cards,
            width: clone.0,
            height: clone.1,
            old_index: None,
            new_index: None,
        });
    }

    pub fn card_drag_move(&mut self, x: f64, y: f64) -> Option<DropTarget> {
        let drag = self.drag.as_ref()?;
        let DragSubject::Card(record_id) = &drag.subject else {
            return None;
        };

        let pointer = Rect::new(x, y, drag.width, drag.height + CARD_DRAG_SLACK);
        let target = if drag.rect(record_id).is_some() {
            drag.cache
                .iter()
                .filter(|c| c.id != *record_id)
                .find(|c| pointer.collides(&c.rect))
                .map(|c| DropTarget {
                    id: c.id.clone(),
                    side: if y <= c.rect.center_y() {
                        DropSide::Before
                    } else {
                        DropSide::After
                    },
                })
        } else {
            None
        };

        self.frames.request(target.clone());
        target
    }

    pub fn card_drag_end(&mut self) {
        self.drag = None;
        self.frames.cancel();
    }

    /// Paint the pending ghost placement, if any.
    pub fn take_frame(&mut self) -> Option<Option<DropTarget>> {
        self.frames.take()
    }

    // =========================================================================
    // Layout
    // =========================================================================

    pub fn layout(&self, window_width: f64) -> BoardLayout {
        let max_width = window_width - self.size.sidebar;
        let width = self.groups.len() as f64 * (self.size.card + self.size.margin);
        let (view_width, margin) = if width < max_width {
            (max_width, 0.0)
        } else {
            (width, (window_width - max_width) / 2.0)
        };
        BoardLayout {
            scroll_width: window_width,
            margin,
            view_width,
        }
    }

    // =========================================================================
    // Adding records
    // =========================================================================

    /// Add a record to a group.
    ///
    /// Without a type to pick templates from the record is created at once.
    /// Otherwise the template count is requested first.
    pub fn on_add(&mut self, group_id: &str, set_of: &[String], sink: &dyn CommandSink) -> bool {
        if !self.groups.iter().any(|g| g.id == group_id) {
            return false;
        }
        match set_of.first() {
            None => self.create_record(group_id, None, sink),
            Some(type_id) => {
                self.pending_add = Some(PendingAdd {
                    group_id: group_id.to_string(),
                    type_id: type_id.clone(),
                });
                sink.send(Command::TemplateCount {
                    type_ids: set_of.to_vec(),
                });
            }
        }
        true
    }

    /// With several templates, ask the user through the `template` popup.
    /// Otherwise create with the only template, or none.
    pub fn on_template_count(
        &mut self,
        response: RpcResponse<Vec<TemplateRecord>>,
        common: &mut CommonStore,
        sink: &dyn CommandSink,
    ) {
        let Some(pending) = self.pending_add.take() else {
            return;
        };
        let records = match response.into_result() {
            Ok(records) => records,
            Err(error) => {
                warn!(%error, "template count failed");
                return;
            }
        };

        if records.len() > 1 {
            common.popup_open(
                "template",
                PopupParam::with_data(json!({
                    "typeId": pending.type_id,
                    "groupId": pending.group_id,
                })),
            );
        } else {
            self.create_record(&pending.group_id, records.first(), sink);
        }
    }

    /// Template picked in the `template` popup.
    pub fn on_template_selected(&mut self, group_id: &str, template: &TemplateRecord, sink: &dyn CommandSink) {
        self.create_record(group_id, Some(template), sink);
    }

    /// Report the created record. `template` is the one it was created from.
    pub fn on_record_created(
        &self,
        response: RpcResponse<CreatedRecord>,
        template: Option<&TemplateRecord>,
        analytics: &dyn Analytics,
    ) {
        let record = match response.into_result() {
            Ok(record) => record,
            Err(error) => {
                warn!(%error, "record create failed");
                return;
            }
        };
        let template = match template {
            Some(t) if t.template_is_bundled => t.id.clone(),
            Some(_) => "custom".to_string(),
            None => String::new(),
        };
        let mut props = Map::new();
        props.insert("route".to_string(), Value::from("Set"));
        props.insert("objectType".to_string(), Value::from(record.object_type));
        props.insert("layout".to_string(), Value::from(record.layout));
        props.insert("template".to_string(), Value::from(template));
        analytics.event_with("CreateObject", &props);
    }

    fn create_record(&self, group_id: &str, template: Option<&TemplateRecord>, sink: &dyn CommandSink) {
        let Some(group) = self.groups.iter().find(|g| g.id == group_id) else {
            return;
        };
        let mut details = Map::new();
        details.insert(self.group_relation_key.clone(), group.value.clone());
        sink.send(Command::BlockDataviewRecordCreate {
            root_id: self.root_id.clone(),
            block_id: self.block_id.clone(),
            details,
            template_id: template.map(|t| t.id.clone()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_move_clamps() {
        let mut items = vec![1, 2, 3];
        array_move(&mut items, 0, 2);
        assert_eq!(items, vec![2, 3, 1]);
        array_move(&mut items, 2, 9);
        assert_eq!(items, vec![2, 3, 1]);
        array_move(&mut items, 5, 0);
        assert_eq!(items, vec![2, 3, 1]);
        array_move(&mut items, 2, 0);
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn layout_centers_overflowing_board() {
        let mut board = Board::new("root", "dv");
        assert_eq!(
            board.layout(1200.0),
            BoardLayout {
                scroll_width: 1200.0,
                margin: 0.0,
                view_width: 1008.0,
            }
        );

        board.groups = (0..5)
            .map(|i| BoardGroup {
                id: format!("g{i}"),
                value: Value::Null,
            })
            .collect();
        // 5 * 278 = 1390 >= 1008
        assert_eq!(
            board.layout(1200.0),
            BoardLayout {
                scroll_width: 1200.0,
                margin: 96.0,
                view_width: 1390.0,
            }
        );
    }
}
