//! Popup and menu behavior through the common store.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use pagecraft_model::{Block, BlockIndex, TextStyle};
use pagecraft_store::{
    AuthStore, CommonStore, LayerKind, LayerPhase, MemoryStorage, MenuDirection, MenuParam,
    MenuType, PopupParam, RecordingAnalytics, Settings, StoreEvent, shared,
};
use serde_json::json;

const POPUP: Duration = Duration::from_millis(200);
const MENU: Duration = Duration::from_millis(100);

fn setup() -> (CommonStore, Rc<RecordingAnalytics>) {
    let analytics = Rc::new(RecordingAnalytics::new());
    let common = CommonStore::new(
        &Settings::default(),
        shared(MemoryStorage::new()),
        analytics.clone(),
    );
    (common, analytics)
}

fn counter() -> (Rc<Cell<u32>>, Box<dyn FnOnce()>) {
    let count = Rc::new(Cell::new(0));
    let inner = Rc::clone(&count);
    (count, Box::new(move || inner.set(inner.get() + 1)))
}

#[test]
fn reopening_settings_leaves_one_entry() {
    let (mut common, analytics) = setup();
    common.popup_open("settings", PopupParam::new());
    common.popup_open("settings", PopupParam::new());

    // First instance closing, replacement not yet pushed.
    assert!(!common.popup_is_open(Some("settings")));

    common.advance(POPUP);
    common.advance(POPUP);
    let ids: Vec<_> = common.popups().entries().iter().map(|l| l.id()).collect();
    assert_eq!(ids, vec!["settings"]);
    assert!(common.popup_is_open(Some("settings")));
    assert_eq!(analytics.names(), vec!["popupSettings", "popupSettings"]);
}

#[test]
fn closing_missing_id_calls_back_synchronously() {
    let (mut common, _) = setup();
    common.popup_open("settings", PopupParam::new());
    let (count, callback) = counter();
    common.popup_close("search", Some(callback));
    assert_eq!(count.get(), 1);
    assert_eq!(common.popups().entries().len(), 1);
    assert!(common.popup_is_open(Some("settings")));
}

#[test]
fn close_all_on_empty_is_noop() {
    let (mut common, _) = setup();
    let revision = common.revision();
    common.popup_close_all(None, None);
    common.menu_close_all(None, None);
    common.advance(POPUP);
    assert_eq!(common.revision(), revision);
    assert!(common.popups().entries().is_empty());
}

#[test]
fn close_all_callback_runs_after_last_removal() {
    let (mut common, _) = setup();
    common.menu_open("a", MenuParam::new());
    common.menu_open(
        "b",
        MenuParam {
            no_animation: true,
            ..MenuParam::new()
        },
    );
    let (count, callback) = counter();
    common.menu_close_all(None, Some(callback));
    common.advance(Duration::ZERO);
    assert_eq!(count.get(), 0);
    common.advance(MENU);
    assert_eq!(count.get(), 1);
    assert!(common.menus().entries().is_empty());
}

#[test]
fn stale_removal_does_not_drop_reopened_popup() {
    let (mut common, _) = setup();
    common.popup_open("search", PopupParam::new());
    common.popup_close("search", None);
    common.advance(Duration::from_millis(50));
    common.popup_open("search", PopupParam::new());

    common.advance(POPUP);
    assert!(common.popup_is_open(Some("search")));
    let phases: Vec<_> = common.popups().entries().iter().map(|l| l.phase()).collect();
    assert_eq!(phases, vec![LayerPhase::Open]);
}

#[test]
fn rapid_reopen_keeps_latest_payload() {
    let (mut common, _) = setup();
    for page in [1, 2, 3] {
        common.popup_open("settings", PopupParam::with_data(json!({ "page": page })));
    }
    for _ in 0..3 {
        common.advance(POPUP);
    }
    let entries = common.popups().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].param().data["page"], 3);
}

#[test]
fn popup_close_all_and_open_chains_without_reborrow() {
    let (mut common, _) = setup();
    common.menu_open("blockMore", MenuParam::new());
    common.popup_open("search", PopupParam::new());
    common.popup_close_all_and_open(
        Some(&["search"]),
        "settings",
        PopupParam::with_data(json!({ "page": "account" })),
    );
    assert!(!common.popup_is_open(None));
    assert!(!common.menu_is_open(None));

    common.advance(POPUP);
    assert!(common.popup_is_open(Some("settings")));
    let ids: Vec<_> = common.popups().entries().iter().map(|l| l.id()).collect();
    assert_eq!(ids, vec!["settings"]);
}

#[test]
fn opening_popup_closes_menus() {
    let (mut common, _) = setup();
    common.menu_open("blockMore", MenuParam::new());
    common.popup_open("page", PopupParam::new());
    assert!(!common.menu_is_open(None));
    common.advance(MENU);
    assert!(common.menus().entries().is_empty());
}

#[test]
fn menu_params_are_normalized_and_hooks_ordered() {
    let (mut common, analytics) = setup();
    let log = Rc::new(RefCell::new(Vec::new()));
    let on_open = Rc::clone(&log);
    let on_close = Rc::clone(&log);
    common.menu_open(
        "blockColor",
        MenuParam::anchored("#button")
            .with_on_open(move || on_open.borrow_mut().push("open"))
            .with_on_close(move || on_close.borrow_mut().push("close")),
    );
    assert_eq!(*log.borrow(), vec!["open"]);
    let param = common.menus().get("blockColor").map(|l| l.param().clone());
    let param = param.expect("menu is open");
    assert_eq!(param.menu_type, MenuType::Vertical);
    assert_eq!(param.vertical, MenuDirection::Bottom);
    assert_eq!(param.horizontal, MenuDirection::Left);

    let sink = Rc::clone(&log);
    common.menu_close(
        "blockColor",
        Some(Box::new(move || sink.borrow_mut().push("callback"))),
    );
    assert_eq!(*log.borrow(), vec!["open"]);
    common.advance(MENU);
    assert_eq!(*log.borrow(), vec!["open", "close", "callback"]);
    assert_eq!(analytics.names(), vec!["menuBlockColor"]);
}

#[test]
fn popup_on_close_runs_at_request() {
    let (mut common, _) = setup();
    let closed = Rc::new(Cell::new(false));
    let flag = Rc::clone(&closed);
    common.popup_open("help", PopupParam::new().with_on_close(move || flag.set(true)));
    common.popup_close("help", None);
    assert!(closed.get());
    assert_eq!(common.popups().entries().len(), 1);
}

#[test]
fn menu_update_data_merges() {
    let (mut common, _) = setup();
    common.menu_open(
        "select",
        MenuParam::new().with_data(json!({ "value": "a", "options": [] })),
    );
    let Some(patch) = json!({ "value": "b" }).as_object().cloned() else {
        unreachable!()
    };
    assert!(common.menu_update_data("select", patch));
    let data = &common.menus().get("select").unwrap().param().data;
    assert_eq!(data["value"], "b");
    assert_eq!(data["options"], json!([]));
}

#[test]
fn removals_interleave_across_stacks() {
    let (mut common, _) = setup();
    common.popup_open("a", PopupParam::new());
    common.popup_close("a", None);
    common.advance(Duration::from_millis(150));
    common.menu_open("m", MenuParam::new());
    common.menu_close("m", None);
    common.drain_events();

    // Menu due at 250ms, popup at 200ms.
    common.advance(Duration::from_millis(200));
    let closed: Vec<_> = common
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            StoreEvent::LayerClosed { kind, id } => Some((kind, id)),
            _ => None,
        })
        .collect();
    assert_eq!(
        closed,
        vec![
            (LayerKind::Popup, "a".to_string()),
            (LayerKind::Menu, "m".to_string()),
        ]
    );
}

#[test]
fn forced_close_skips_transition() {
    let (mut common, _) = setup();
    common.menu_open("a", MenuParam::new());
    common.menu_open("b", MenuParam::new());
    let (count, callback) = counter();
    common.menu_close_all_forced(None, Some(callback));
    assert_eq!(count.get(), 1);
    assert!(common.menus().entries().is_empty());
}

#[test]
fn logout_resets_session() {
    let (mut common, analytics) = setup();
    let mut auth = AuthStore::attached(&common, analytics);
    let mut blocks = BlockIndex::new();
    blocks.insert("root", Block::text("t1", TextStyle::Paragraph, "hello"));
    blocks.breadcrumbs_set("crumbs");

    auth.pin_set("1234");
    auth.pin_check_set(true);
    auth.phrase_set("alpha beta");
    common.storage().borrow_mut().set("accountId", json!("acc1"));
    common.storage().borrow_mut().set("gateway", json!("http://gw"));

    auth.logout(&mut common, &mut blocks);

    let storage = common.storage();
    assert_eq!(storage.borrow().get("accountId"), None);
    assert_eq!(storage.borrow().get_string("phrase"), None);
    assert_eq!(storage.borrow().get_string("gateway").as_deref(), Some("http://gw"));
    assert!(!auth.pin_checked());
    assert!(auth.account().is_none());
    assert_eq!(auth.phrase(), "");
    assert_eq!(common.cover().id, "c1");
    assert_eq!(blocks.breadcrumbs(), "");
    assert!(blocks.is_empty());
    assert!(common.drain_events().contains(&StoreEvent::LoggedOut));
}
