//! View logic against real stores.

use std::rc::Rc;
use std::time::Duration;

use pagecraft_model::{
    Block, BlockContent, BlockIndex, BlockType, DataviewContent, GroupIndex, LayoutContent,
    LayoutStyle, ObjectLayout, ViewGroupOrder,
};
use pagecraft_store::{
    AuthStore, CommonStore, MemoryStorage, MenuParam, NetworkConfig, NetworkMode, PopupParam,
    RecordingAnalytics, Rect, Settings, shared,
};
use pagecraft_view::board::{CachedRect, TemplateRecord};
use pagecraft_view::table::{ColorTarget, MenuOption, OPTIONS_MENU};
use pagecraft_view::{
    Board, BoardGroup, Command, DataviewView, DropSide, DropTarget, Header, ObjectDetails,
    OnboardingForm, PageHeadEdit, RecordingRouter, RecordingSink, Route, RpcResponse,
    StorageChange, StorageStep, TableMenus, ViewError, options_for, table_data,
};
use serde_json::{Value, json};

fn stores() -> (CommonStore, Rc<RecordingAnalytics>) {
    let analytics = Rc::new(RecordingAnalytics::new());
    let common = CommonStore::new(
        &Settings::default(),
        shared(MemoryStorage::new()),
        analytics.clone(),
    );
    (common, analytics)
}

fn group(id: &str) -> BoardGroup {
    BoardGroup {
        id: id.to_string(),
        value: Value::from(id.to_uppercase()),
    }
}

fn view() -> DataviewView {
    DataviewView {
        id: "view1".to_string(),
        group_relation_key: "status".to_string(),
    }
}

fn loaded_board(ids: &[&str]) -> Board {
    let mut board = Board::new("root", "dv");
    let sink = RecordingSink::new();
    assert!(board.load_group_list(&view(), &DataviewContent::default(), &sink));
    board
        .on_groups_loaded(RpcResponse::ok(ids.iter().map(|id| group(id)).collect()))
        .unwrap();
    board
}

fn column_rects(ids: &[&str]) -> Vec<(String, Rect)> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| (id.to_string(), Rect::new(i as f64 * 300.0, 0.0, 262.0, 500.0)))
        .collect()
}

fn ids(board: &Board) -> Vec<&str> {
    board.groups().iter().map(|g| g.id.as_str()).collect()
}

// =============================================================================
// Board
// =============================================================================

#[test]
fn groups_follow_saved_order() {
    let mut board = Board::new("root", "dv");
    let sink = RecordingSink::new();
    let content = DataviewContent {
        group_order: vec![ViewGroupOrder {
            view_id: "view1".to_string(),
            groups: vec![
                GroupIndex {
                    group_id: "done".to_string(),
                    index: 0,
                },
                GroupIndex {
                    group_id: "todo".to_string(),
                    index: 1,
                },
            ],
        }],
    };

    assert!(board.load_group_list(&view(), &content, &sink));
    assert!(board.is_loading());
    assert_eq!(
        sink.sent(),
        vec![Command::ObjectRelationSearchDistinct {
            relation_key: "status".to_string(),
        }]
    );

    board
        .on_groups_loaded(RpcResponse::ok(vec![group("new"), group("todo"), group("done")]))
        .unwrap();
    assert_eq!(ids(&board), vec!["done", "todo", "new"]);
    assert!(!board.is_loading());

    // Same relation: nothing to reload.
    assert!(!board.load_group_list(&view(), &content, &sink));
    assert_eq!(sink.sent().len(), 1);
}

#[test]
fn failed_group_search_leaves_state() {
    let mut board = Board::new("root", "dv");
    let sink = RecordingSink::new();
    board.load_group_list(&view(), &DataviewContent::default(), &sink);
    let result = board.on_groups_loaded(RpcResponse::err(1, "boom"));
    assert_eq!(result.unwrap_err().code, 1);
    assert!(board.groups().is_empty());
    assert!(board.is_loading());
}

#[test]
fn column_dropped_right_of_neighbour() {
    let mut board = loaded_board(&["a", "b", "c"]);
    let sink = RecordingSink::new();

    board.column_drag_start("a", (262.0, 500.0), &column_rects(&["a", "b", "c"]));
    let target = board.column_drag_move(450.0, 10.0);
    assert_eq!(
        target,
        Some(DropTarget {
            id: "b".to_string(),
            side: DropSide::After,
        })
    );
    assert_eq!(board.take_frame(), Some(target));

    assert!(board.column_drag_end("view1", &sink));
    assert_eq!(ids(&board), vec!["b", "a", "c"]);
    let Some(Command::BlockDataviewGroupOrderUpdate { order, .. }) = sink.sent().pop() else {
        panic!("group order not sent");
    };
    assert_eq!(order.view_id, "view1");
    let sent: Vec<_> = order.groups.iter().map(|g| (g.group_id.as_str(), g.index)).collect();
    assert_eq!(sent, vec![("b", 0), ("a", 1), ("c", 2)]);
}

#[test]
fn column_dropped_left_of_first() {
    let mut board = loaded_board(&["a", "b", "c"]);
    let sink = RecordingSink::new();

    board.column_drag_start("c", (262.0, 500.0), &column_rects(&["a", "b", "c"]));
    let target = board.column_drag_move(10.0, 10.0);
    assert_eq!(target.map(|t| t.side), Some(DropSide::Before));
    assert!(board.column_drag_end("view1", &sink));
    assert_eq!(ids(&board), vec!["c", "a", "b"]);
}

#[test]
fn column_drop_halves_around_neighbour() {
    let rects = column_rects(&["a", "b", "c"]);
    let drag_to = |dragged: &str, x: f64| {
        let mut board = loaded_board(&["a", "b", "c"]);
        let sink = RecordingSink::new();
        board.column_drag_start(dragged, (262.0, 500.0), &rects);
        let side = board.column_drag_move(x, 10.0).map(|t| (t.id, t.side));
        let moved = board.column_drag_end("view1", &sink);
        assert_eq!(moved, !sink.sent().is_empty());
        (side, ids(&board).join(""))
    };

    // Moving right: the left half of `b` is the slot `a` already holds.
    assert_eq!(
        drag_to("a", 320.0),
        (Some(("b".to_string(), DropSide::Before)), "abc".to_string())
    );
    assert_eq!(
        drag_to("a", 450.0),
        (Some(("b".to_string(), DropSide::After)), "bac".to_string())
    );
    // Moving left: the right half of `b` is the slot `c` already holds.
    assert_eq!(
        drag_to("c", 310.0),
        (Some(("b".to_string(), DropSide::Before)), "acb".to_string())
    );
    assert_eq!(
        drag_to("c", 450.0),
        (Some(("b".to_string(), DropSide::After)), "abc".to_string())
    );
}

#[test]
fn column_drop_without_target_is_noop() {
    let mut board = loaded_board(&["a", "b"]);
    let sink = RecordingSink::new();

    board.column_drag_start("a", (262.0, 500.0), &column_rects(&["a", "b"]));
    assert_eq!(board.column_drag_move(2000.0, 10.0), None);
    assert!(!board.column_drag_end("view1", &sink));
    assert!(sink.sent().is_empty());
    assert_eq!(board.take_frame(), None);
    assert!(!board.is_dragging());
}

#[test]
fn card_hover_picks_half() {
    let mut board = loaded_board(&["a"]);
    let card = |id: &str, y: f64| CachedRect {
        id: id.to_string(),
        rect: Rect::new(0.0, y, 262.0, 100.0),
        index: 0,
    };
    board.card_drag_start("c1", (262.0, 100.0), vec![card("c1", 0.0), card("c2", 110.0)]);

    let above = board.card_drag_move(0.0, 150.0);
    assert_eq!(above.map(|t| (t.id, t.side)), Some(("c2".to_string(), DropSide::Before)));
    let below = board.card_drag_move(0.0, 170.0);
    assert_eq!(below.map(|t| t.side), Some(DropSide::After));

    board.card_drag_end();
    assert_eq!(board.take_frame(), None);
}

#[test]
fn subscription_ids_per_group() {
    let mut board = loaded_board(&["a", "b"]);
    assert_eq!(board.subscription_ids(), vec!["root-dv:a", "root-dv:b"]);
    assert_eq!(board.unmount().len(), 2);
    assert!(board.groups().is_empty());
}

#[test]
fn add_without_types_creates_at_once() {
    let mut board = loaded_board(&["todo"]);
    let sink = RecordingSink::new();
    assert!(board.on_add("todo", &[], &sink));
    assert!(!board.on_add("missing", &[], &sink));

    let Some(Command::BlockDataviewRecordCreate {
        details,
        template_id,
        ..
    }) = sink.sent().pop()
    else {
        panic!("record not created");
    };
    assert_eq!(Value::Object(details), json!({ "status": "TODO" }));
    assert_eq!(template_id, None);
}

#[test]
fn add_with_several_templates_asks() {
    let (mut common, _) = stores();
    let mut board = loaded_board(&["todo"]);
    let sink = RecordingSink::new();
    let types = vec!["type1".to_string()];

    board.on_add("todo", &types, &sink);
    assert_eq!(
        sink.take(),
        vec![Command::TemplateCount {
            type_ids: types.clone(),
        }]
    );
    let templates = vec![TemplateRecord::default(), TemplateRecord::default()];
    board.on_template_count(RpcResponse::ok(templates), &mut common, &sink);
    assert!(common.popup_is_open(Some("template")));
    assert!(sink.sent().is_empty());

    board.on_add("todo", &types, &sink);
    sink.take();
    let only = TemplateRecord {
        id: "tpl".to_string(),
        template_is_bundled: true,
    };
    board.on_template_count(RpcResponse::ok(vec![only]), &mut common, &sink);
    let Some(Command::BlockDataviewRecordCreate { template_id, .. }) = sink.sent().pop() else {
        panic!("record not created");
    };
    assert_eq!(template_id.as_deref(), Some("tpl"));
}

#[test]
fn created_record_is_reported() {
    let (_, analytics) = stores();
    let board = loaded_board(&["todo"]);
    let custom = TemplateRecord {
        id: "t1".to_string(),
        template_is_bundled: false,
    };
    let record = pagecraft_view::board::CreatedRecord {
        id: "obj".to_string(),
        object_type: "ot-task".to_string(),
        layout: 2,
    };
    board.on_record_created(RpcResponse::ok(record), Some(&custom), analytics.as_ref());
    let props = analytics.last_props("CreateObject").unwrap();
    assert_eq!(
        Value::Object(props),
        json!({ "route": "Set", "objectType": "ot-task", "layout": 2, "template": "custom" })
    );
}

// =============================================================================
// Table
// =============================================================================

fn layout(id: &str, style: LayoutStyle, children: &[&str]) -> Block {
    Block::new(id, BlockType::Layout)
        .with_content(BlockContent::Layout(LayoutContent { style }))
        .with_children(children.iter().copied())
}

fn table_index(columns: &[&str]) -> BlockIndex {
    let mut index = BlockIndex::new();
    let mut cells = Vec::new();
    for column in columns {
        cells.push(format!("r1-{column}"));
        index.insert("root", Block::new(*column, BlockType::TableColumn));
    }
    index.insert("root", Block::new("table", BlockType::Table).with_children(["cols", "rows"]));
    index.insert("root", layout("cols", LayoutStyle::TableColumns, columns));
    index.insert("root", layout("rows", LayoutStyle::TableRows, &["r1"]));
    let mut row = Block::new("r1", BlockType::TableRow).with_children(cells.clone());
    row.bg_color = "yellow".to_string();
    index.insert("root", row);
    for cell in cells {
        index.insert("root", Block::new(cell, BlockType::TableCell));
    }
    index
}

fn option_ids(options: &[MenuOption]) -> String {
    options
        .iter()
        .map(|o| if o.is_div { "--" } else { o.id.as_str() })
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn cell_options_compose_all_groups() {
    let index = table_index(&["c1", "c2"]);
    let data = table_data(&index, "root", "table").unwrap();
    assert_eq!(data.columns.len(), 2);
    assert_eq!(data.rows.len(), 1);

    let cell = index.get_leaf("root", "r1-c1").unwrap();
    insta::assert_snapshot!(
        option_ids(&options_for(cell, &data)),
        @"color background -- rowBefore rowAfter rowRemove -- columnBefore columnAfter columnRemove -- horizontal vertical"
    );
}

#[test]
fn single_column_cannot_be_removed() {
    let index = table_index(&["c1"]);
    let data = table_data(&index, "root", "table").unwrap();
    let column = index.get_leaf("root", "c1").unwrap();
    insta::assert_snapshot!(
        option_ids(&options_for(column, &data)),
        @"color background -- columnBefore columnAfter -- horizontal vertical"
    );

    let row = index.get_leaf("root", "r1").unwrap();
    let background = &options_for(row, &data)[1];
    assert_eq!(background.inner, "inner bgColor bgColor-yellow");
}

#[test]
fn missing_container_is_an_error() {
    let mut index = BlockIndex::new();
    index.insert("root", Block::new("table", BlockType::Table).with_children(["cols"]));
    index.insert("root", layout("cols", LayoutStyle::TableColumns, &[]));
    let err = table_data(&index, "root", "table").unwrap_err();
    assert!(matches!(err, ViewError::MissingContainer { container: "rows", .. }));
}

#[test]
fn cell_background_falls_back() {
    let index = table_index(&["c1"]);
    let cell = index.get_leaf("root", "r1-c1").unwrap();
    let column = index.get_leaf("root", "c1").unwrap();
    let row = index.get_leaf("root", "r1").unwrap();
    assert_eq!(pagecraft_view::table::cell_background(cell, column, row), Some("yellow"));
    assert_eq!(
        pagecraft_view::table::cell_class(cell, column, row, true),
        vec!["cell", "columnr1-c1", "isHead", "bgColor bgColor-yellow"]
    );
}

#[test]
fn color_submenu_flow() {
    let index = table_index(&["c1", "c2"]);
    let (mut common, _) = stores();
    let sink = RecordingSink::new();
    let menus = TableMenus::new("root", "table");

    menus.open_options(&index, &mut common, "r1-c1", 120.0, 80.0).unwrap();
    let select = common.menus().get(OPTIONS_MENU).unwrap().param().clone();
    assert_eq!(select.rect, Some(Rect::new(120.0, 80.0, 1.0, 1.0)));
    assert_eq!(select.data["options"].as_array().map(Vec::len), Some(13));

    let color = MenuOption {
        id: "color".to_string(),
        arrow: true,
        ..MenuOption::default()
    };
    menus.on_option_over(&index, &mut common, "r1-c1", &color, 240.0);
    let sub = common.menus().get("blockColor").unwrap().param().clone();
    assert!(sub.is_sub);
    assert_eq!(sub.offset_x, 240.0);
    assert_eq!(sub.element, "#menuSelect1 #item-color");

    menus.on_option_over(&index, &mut common, "r1-c1", &MenuOption::item("rowAfter", "Row after"), 240.0);
    assert!(!common.menu_is_open(Some("blockColor")));

    menus.on_color_change(&mut common, &sink, "r1-c1", ColorTarget::Background, "red");
    assert_eq!(
        sink.sent(),
        vec![Command::BlockListSetBackgroundColor {
            root_id: "root".to_string(),
            block_ids: vec!["r1-c1".to_string()],
            color: "red".to_string(),
        }]
    );
    assert!(!common.menu_is_open(Some(OPTIONS_MENU)));
}

#[test]
fn options_for_missing_block_fail() {
    let index = table_index(&["c1"]);
    let (mut common, _) = stores();
    let menus = TableMenus::new("root", "table");
    let err = menus.open_options(&index, &mut common, "nope", 0.0, 0.0).unwrap_err();
    assert!(matches!(err, ViewError::MissingBlock { .. }));
    assert!(!common.menu_is_open(None));
}

// =============================================================================
// Header
// =============================================================================

#[test]
fn header_menu_is_pinned_outside_popups() {
    let (mut common, _) = stores();
    common.menu_open("other", MenuParam::new());
    let header = Header::new("mainObject", "root");

    header.menu_open(
        &mut common,
        "object",
        "#button-more",
        Rect::new(900.0, 40.0, 28.0, 20.0),
        0.0,
        MenuParam::new(),
    );
    assert!(!common.menu_is_open(Some("other")));
    assert!(common.menus().entries().iter().all(|l| l.id() != "other"));

    let param = common.menus().get("object").unwrap().param().clone();
    assert_eq!(param.element, " .header #button-more");
    assert_eq!(param.offset_y, 4.0);
    assert_eq!(param.fixed_y, Some(64.0));
    assert_eq!(param.class_name_wrap, "fixed fromHeader");
}

#[test]
fn expand_routes_after_popups_close() {
    let (mut common, _) = stores();
    let router = Rc::new(RecordingRouter::new());
    let mut header = Header::new("mainObject", "obj1");
    header.layout = ObjectLayout::Set;

    common.popup_open("page", PopupParam::new());
    header.on_expand(&mut common, router.clone());
    assert!(router.routes().is_empty());
    common.advance(Duration::from_millis(200));
    assert_eq!(router.routes(), vec![Route::new("obj1", ObjectLayout::Set)]);

    // Nothing open: routes right away.
    header.on_expand(&mut common, router.clone());
    assert_eq!(router.routes().len(), 2);
}

// =============================================================================
// Page head
// =============================================================================

#[test]
fn head_blocks_for_human_object() {
    let mut index = BlockIndex::new();
    let mut root = Block::page("root", ObjectLayout::Human);
    root.fields.width = Some(0.75);
    index.insert("root", root);

    let head = PageHeadEdit::new("root");
    let details = ObjectDetails {
        with_icon: true,
        ..ObjectDetails::default()
    };
    let blocks = head.head_blocks(&index, &details).unwrap();
    assert!(blocks.cover.is_none());
    let icon = blocks.icon.unwrap();
    assert_eq!(icon.id, "root-icon");
    assert_eq!(icon.block_type, BlockType::IconUser);
    assert_eq!(head.initial_width(&index), 0.75);

    let missing = PageHeadEdit::new("other").head_blocks(&index, &details);
    assert!(matches!(missing, Err(ViewError::MissingBlock { .. })));
}

#[test]
fn scale_end_saves_width() {
    let mut head = PageHeadEdit::new("root");
    let sink = RecordingSink::new();
    head.scale_start(0.5);
    assert!(head.is_selecting_blocked());
    assert_eq!(head.scale_move(0.75), 0.75);
    assert_eq!(head.label(), "75%");
    head.scale_end(0.6, &sink);
    assert!(!head.is_selecting_blocked());

    let Some(Command::BlockListSetFields { root_id, fields }) = sink.sent().pop() else {
        panic!("fields not sent");
    };
    assert_eq!(root_id, "root");
    assert_eq!(fields[0].block_id, "root");
    assert_eq!(fields[0].fields["width"], 0.6);
}

#[test]
fn clone_opens_duplicate() {
    let (_, analytics) = stores();
    let router = RecordingRouter::new();
    let head = PageHeadEdit::new("root");
    let details = ObjectDetails {
        template_is_bundled: true,
        target_object_type: "ot-note".to_string(),
        ..ObjectDetails::default()
    };
    assert!(head.shows_template_note(&details));

    head.on_clone_response(RpcResponse::ok("copy".to_string()), &details, &router, analytics.as_ref());
    assert_eq!(router.routes()[0].id, "copy");
    assert_eq!(
        analytics.last_props("CreateTemplate").map(Value::Object),
        Some(json!({ "objectType": "ot-note" }))
    );

    head.on_clone_response(RpcResponse::err(2, "denied"), &details, &router, analytics.as_ref());
    assert_eq!(router.routes().len(), 1);
}

// =============================================================================
// Onboarding
// =============================================================================

#[test]
fn local_mode_confirms_storage_change() {
    let (mut common, analytics) = stores();
    let mut auth = AuthStore::attached(&common, analytics);
    auth.network_config_set(NetworkConfig {
        mode: NetworkMode::Local,
        path: String::new(),
    });
    let mut form = OnboardingForm::new(&auth, "/data/custom", "/data/default");
    assert!(!form.is_default_path());

    let step = form.reset_storage(&mut common);
    assert_eq!(step, StorageStep::Confirm(StorageChange::Reset));
    assert!(common.popup_is_open(Some("confirm")));
    assert_eq!(form.user_path, "/data/custom");

    assert_eq!(form.confirm_storage(&StorageChange::Reset), StorageStep::Done);
    assert!(form.is_default_path());

    form.set_mode(NetworkMode::Default);
    assert_eq!(form.change_storage(&mut common), StorageStep::PickDirectory);
}

#[test]
fn save_reports_and_stores() {
    let (mut common, analytics) = stores();
    let mut auth = AuthStore::attached(&common, analytics.clone());
    let sink = RecordingSink::new();
    common.popup_open("settings", PopupParam::new());

    let mut form = OnboardingForm::new(&auth, "/data/old", "/data/old");
    form.set_mode(NetworkMode::Custom);
    assert!(form.shows_config_file());
    form.set_user_path("/data/new");
    form.save(&mut auth, &mut common, analytics.as_ref(), &sink, "/data/old");

    assert_eq!(
        analytics.last_props("SelectNetwork").map(Value::Object),
        Some(json!({ "route": "Onboarding", "type": "custom" }))
    );
    assert!(analytics.last_props("UploadNetworkConfiguration").is_none());
    assert_eq!(
        sink.sent(),
        vec![Command::SetUserDataPath {
            path: "/data/new".to_string(),
        }]
    );
    assert_eq!(common.data_path(), "/data/new");
    assert_eq!(auth.network_config().mode, NetworkMode::Custom);
    assert!(!common.popup_is_open(Some("settings")));
}
