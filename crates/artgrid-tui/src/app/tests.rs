use super::*;
use crate::action::Action;
use crate::backend;
use artgrid_core::source::mock::{ID_BASE, MockSource};
use artgrid_core::{FetchError, Notice};

/// App wired to a command channel whose receiving end the test drives.
fn test_app() -> (App, mpsc::UnboundedReceiver<FetchCommand>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut app = App::new(12, &[12, 25, 50], Theme::hacker());
    app.connect(tx);
    (app, rx)
}

/// Answer every queued command from `source` until the app stops asking.
async fn serve(app: &mut App, rx: &mut mpsc::UnboundedReceiver<FetchCommand>, source: &MockSource) {
    while let Ok(cmd) = rx.try_recv() {
        let msg = backend::execute(source, cmd, 4).await;
        app.handle_backend_message(msg);
    }
}

async fn started(source: &MockSource) -> (App, mpsc::UnboundedReceiver<FetchCommand>) {
    let (mut app, mut rx) = test_app();
    app.start();
    serve(&mut app, &mut rx, source).await;
    (app, rx)
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.update(Action::InputChar(c));
    }
}

// ── Startup & paging ────────────────────────────────────────────

#[tokio::test]
async fn start_loads_first_page() {
    let source = MockSource::new(100);
    let (app, _rx) = started(&source).await;
    assert_eq!(app.controller.visible_records().len(), 12);
    assert_eq!(app.controller.page_count(), Some(9));
    assert!(!app.controller.is_loading());
}

#[test]
fn start_sends_fetch_and_marks_loading() {
    let (mut app, mut rx) = test_app();
    app.start();
    assert!(matches!(rx.try_recv(), Ok(FetchCommand::Page { page: 1, .. })));
    assert!(app.controller.is_loading());
}

#[tokio::test]
async fn next_page_resets_cursor() {
    let source = MockSource::new(100);
    let (mut app, mut rx) = started(&source).await;
    app.update(Action::MoveDown);
    app.update(Action::MoveDown);
    assert_eq!(app.cursor, 2);

    app.update(Action::NextPage);
    serve(&mut app, &mut rx, &source).await;
    assert_eq!(app.controller.view().page, 2);
    assert_eq!(app.cursor, 0);
}

#[tokio::test]
async fn prev_page_from_cache_sends_nothing() {
    let source = MockSource::new(100);
    let (mut app, mut rx) = started(&source).await;
    app.update(Action::NextPage);
    serve(&mut app, &mut rx, &source).await;
    let calls = source.call_count();

    app.update(Action::PrevPage);
    assert!(rx.try_recv().is_err());
    assert_eq!(app.controller.view().page, 1);
    assert_eq!(source.call_count(), calls);
}

#[tokio::test]
async fn cursor_stays_within_page() {
    let source = MockSource::new(100);
    let (mut app, _rx) = started(&source).await;
    app.update(Action::GoBottom);
    assert_eq!(app.cursor, 11);
    app.update(Action::MoveDown);
    assert_eq!(app.cursor, 11);
    app.update(Action::GoTop);
    app.update(Action::MoveUp);
    assert_eq!(app.cursor, 0);
}

#[tokio::test]
async fn cycle_page_size_keeps_first_row() {
    let source = MockSource::new(100);
    let (mut app, mut rx) = started(&source).await;
    app.update(Action::NextPage);
    serve(&mut app, &mut rx, &source).await;

    app.update(Action::CyclePageSize);
    serve(&mut app, &mut rx, &source).await;
    let view = app.controller.view();
    assert_eq!(view.page_size, 25);
    // Row 12 lives on page 1 at size 25.
    assert_eq!(view.page, 1);
    assert_eq!(app.controller.visible_records().len(), 25);
}

#[test]
fn page_size_options_include_configured_size() {
    let app = App::new(30, &[12, 25, 50], Theme::hacker());
    assert_eq!(app.page_size_options, vec![12, 25, 30, 50]);
    assert_eq!(app.next_page_size(), Some(50));
}

// ── Selection ───────────────────────────────────────────────────

#[tokio::test]
async fn toggle_row_survives_paging() {
    let source = MockSource::new(100);
    let (mut app, mut rx) = started(&source).await;
    app.update(Action::MoveDown);
    app.update(Action::ToggleRow);
    assert!(app.controller.selection().contains(ID_BASE + 1));

    app.update(Action::NextPage);
    serve(&mut app, &mut rx, &source).await;
    app.update(Action::ToggleAll);
    assert_eq!(app.controller.selected_count(), 13);

    app.update(Action::PrevPage);
    let visible: Vec<u64> = app
        .controller
        .visible_selection()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(visible, vec![ID_BASE + 1]);
}

#[tokio::test]
async fn clear_selection_empties_everything() {
    let source = MockSource::new(100);
    let (mut app, _rx) = started(&source).await;
    app.update(Action::ToggleAll);
    app.update(Action::ClearSelection);
    assert_eq!(app.controller.selected_count(), 0);
}

// ── Row selector overlay ────────────────────────────────────────

#[tokio::test]
async fn row_selector_bulk_selects_across_pages() {
    let source = MockSource::new(100);
    let (mut app, mut rx) = started(&source).await;

    app.update(Action::OpenRowSelector);
    assert_eq!(app.input_mode, InputMode::RowSelector);
    type_text(&mut app, "15");
    assert_eq!(app.row_selector.submit_label(), "Select 15 rows");
    app.update(Action::InputConfirm);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.controller.bulk_in_flight());

    serve(&mut app, &mut rx, &source).await;
    assert_eq!(app.controller.selected_count(), 15);
    let ids: Vec<u64> = app.controller.selection().ids().collect();
    assert_eq!(ids, (0..15).map(|i| ID_BASE + i).collect::<Vec<_>>());
}

#[tokio::test]
async fn row_selector_rejects_invalid_count() {
    let source = MockSource::new(100);
    let (mut app, mut rx) = started(&source).await;

    app.update(Action::OpenRowSelector);
    type_text(&mut app, "0");
    app.update(Action::InputConfirm);

    assert!(app.row_selector.active);
    assert_eq!(app.input_mode, InputMode::RowSelector);
    assert!(app.row_selector.error().is_some());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn row_selector_swallows_normal_keys() {
    let source = MockSource::new(100);
    let (mut app, _rx) = started(&source).await;
    app.update(Action::OpenRowSelector);
    app.update(Action::ToggleAll);
    assert_eq!(app.controller.selected_count(), 0);
    app.update(Action::InputCancel);
    assert!(!app.row_selector.active);
    assert_eq!(app.input_mode, InputMode::Normal);
}

#[tokio::test]
async fn failed_bulk_keeps_selection_and_shows_error() {
    let source = MockSource::new(100).failing_page(2, FetchError::Timeout);
    let (mut app, mut rx) = started(&source).await;
    app.update(Action::ToggleRow);
    let before = app.controller.selection().clone();

    app.update(Action::OpenRowSelector);
    type_text(&mut app, "20");
    app.update(Action::InputConfirm);
    serve(&mut app, &mut rx, &source).await;

    assert_eq!(app.controller.selection(), &before);
    assert!(matches!(app.controller.notice(), Some(Notice::Error(_))));
    app.update(Action::NavigateBack);
    assert!(app.controller.notice().is_none());
}

// ── Help & quit ─────────────────────────────────────────────────

#[test]
fn help_toggles_and_blocks_navigation() {
    let (mut app, mut rx) = test_app();
    app.update(Action::ToggleHelp);
    assert!(app.show_help);
    app.update(Action::NextPage);
    assert!(rx.try_recv().is_err());
    app.update(Action::NavigateBack);
    assert!(!app.show_help);
}

#[test]
fn quit_from_any_mode() {
    let (mut app, _rx) = test_app();
    app.update(Action::OpenRowSelector);
    assert!(app.update(Action::Quit));
    assert!(app.should_quit);
}

#[test]
fn tick_advances_spinner() {
    let (mut app, _rx) = test_app();
    app.update(Action::Tick);
    app.update(Action::Tick);
    assert_eq!(app.tick, 2);
}
