//! Integration tests for bulk "select first N" and the table controller.
//!
//! Everything runs against [`MockSource`], so no HTTP requests are made.

use std::time::Duration;

use artgrid_core::bulk::{fetch_pages, select_first};
use artgrid_core::source::mock::{ID_BASE, MockSource, mock_record};
use artgrid_core::{
    CatalogSource, FetchCommand, FetchError, PageCache, SelectionSet, TableController,
    TableMessage,
};

const CONCURRENCY: usize = 4;

fn ids(selection: &SelectionSet) -> Vec<u64> {
    selection.ids().collect()
}

fn first_ids(n: u64) -> Vec<u64> {
    (0..n).map(|i| ID_BASE + i).collect()
}

/// Run a controller command against `source` and feed completions back until
/// the controller stops asking for I/O.
async fn drive(
    controller: &mut TableController,
    source: &dyn CatalogSource,
    mut cmd: Option<FetchCommand>,
) {
    while let Some(c) = cmd.take() {
        let message = match c {
            FetchCommand::Page {
                token,
                page,
                page_size,
            } => TableMessage::PageFetched {
                token,
                page,
                page_size,
                result: source.fetch_page(page, page_size).await,
            },
            FetchCommand::Pages {
                token,
                pages,
                page_size,
            } => TableMessage::BulkPagesFetched {
                token,
                page_size,
                result: fetch_pages(source, &pages, page_size, CONCURRENCY).await,
            },
        };
        cmd = controller.handle(message);
    }
}

#[tokio::test]
async fn count_within_one_page_fetches_only_page_one() {
    let source = MockSource::new(500);
    let mut cache = PageCache::new(12);
    let mut selection = SelectionSet::new();

    let report = select_first(&source, 5, &mut cache, &mut selection, CONCURRENCY)
        .await
        .unwrap();

    assert_eq!(source.requested_pages(), vec![1]);
    assert_eq!(ids(&selection), first_ids(5));
    assert_eq!(report.selected, 5);
    assert_eq!(report.fetched_pages, vec![1]);
}

#[tokio::test]
async fn count_spanning_two_pages_concatenates_in_order() {
    let source = MockSource::new(500);
    let mut cache = PageCache::new(12);
    let mut selection = SelectionSet::new();

    select_first(&source, 15, &mut cache, &mut selection, CONCURRENCY)
        .await
        .unwrap();

    assert_eq!(source.distinct_pages(), [1, 2].into_iter().collect());
    assert_eq!(ids(&selection), first_ids(15));
}

#[tokio::test(start_paused = true)]
async fn missing_pages_are_fetched_concurrently_when_total_known() {
    let source = MockSource::new(500).with_delay(Duration::from_millis(50));
    let mut cache = PageCache::new(12);
    cache.put_fetched(1, source.fetch_page(1, 12).await.unwrap());
    let mut selection = SelectionSet::new();

    let started = tokio::time::Instant::now();
    select_first(&source, 48, &mut cache, &mut selection, CONCURRENCY)
        .await
        .unwrap();

    // Pages 2..=4 in one concurrent round, not three sequential ones.
    assert!(started.elapsed() < Duration::from_millis(100));
    assert_eq!(source.requested_pages()[1..].len(), 3);
    assert_eq!(ids(&selection), first_ids(48));
}

#[tokio::test]
async fn failing_page_leaves_selection_unchanged() {
    let source = MockSource::new(500).failing_page(2, FetchError::Status(503));
    let mut cache = PageCache::new(12);
    let mut selection = SelectionSet::from_records(vec![mock_record(200), mock_record(201)]);
    let before = selection.clone();

    let err = select_first(&source, 15, &mut cache, &mut selection, CONCURRENCY)
        .await
        .unwrap_err();

    assert_eq!(err, FetchError::Status(503));
    assert_eq!(selection, before);
    // Page 1 was fetched successfully and stays cached.
    assert!(cache.contains(1));
    assert!(!cache.contains(2));
}

#[tokio::test]
async fn repeated_bulk_select_is_idempotent() {
    let source = MockSource::new(500);
    let mut cache = PageCache::new(12);
    let mut first = SelectionSet::new();
    let mut second = SelectionSet::new();

    select_first(&source, 27, &mut cache, &mut first, CONCURRENCY)
        .await
        .unwrap();
    let calls_after_first = source.call_count();
    let report = select_first(&source, 27, &mut cache, &mut second, CONCURRENCY)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert!(report.fetched_pages.is_empty());
    assert_eq!(source.call_count(), calls_after_first);
}

#[tokio::test]
async fn duplicate_ids_across_pages_appear_once() {
    // Page 2 repeats the last record of page 1.
    let mut page2: Vec<_> = (12..24).map(mock_record).collect();
    page2[0] = mock_record(11);
    let source = MockSource::new(500).with_page(2, page2);
    let mut cache = PageCache::new(12);
    let mut selection = SelectionSet::new();

    select_first(&source, 24, &mut cache, &mut selection, CONCURRENCY)
        .await
        .unwrap();

    assert_eq!(selection.len(), 23);
    assert_eq!(
        selection.ids().filter(|&id| id == mock_record(11).id).count(),
        1
    );
}

#[tokio::test]
async fn bulk_replaces_previous_selection() {
    let source = MockSource::new(500);
    let mut cache = PageCache::new(12);
    let mut selection = SelectionSet::from_records(vec![mock_record(300)]);

    select_first(&source, 3, &mut cache, &mut selection, CONCURRENCY)
        .await
        .unwrap();

    assert_eq!(ids(&selection), first_ids(3));
}

#[tokio::test]
async fn count_larger_than_catalog_returns_everything() {
    let source = MockSource::new(30);
    let mut cache = PageCache::new(12);
    let mut selection = SelectionSet::new();

    let report = select_first(&source, 10_000, &mut cache, &mut selection, CONCURRENCY)
        .await
        .unwrap();

    assert_eq!(report.selected, 30);
    assert_eq!(report.total, Some(30));
    assert_eq!(ids(&selection), first_ids(30));
    // Probe page 1, then pages 2 and 3; never past the end.
    assert_eq!(source.distinct_pages(), [1, 2, 3].into_iter().collect());
}

#[tokio::test]
async fn empty_catalog_selects_nothing() {
    let source = MockSource::new(0);
    let mut cache = PageCache::new(12);
    let mut selection = SelectionSet::from_records(vec![mock_record(1)]);

    let report = select_first(&source, 40, &mut cache, &mut selection, CONCURRENCY)
        .await
        .unwrap();

    assert_eq!(report.selected, 0);
    assert!(selection.is_empty());
}

// ── Controller end to end ───────────────────────────────────────────────

#[tokio::test]
async fn controller_pages_and_bulk_selects() {
    let source = MockSource::new(100);
    let mut controller = TableController::new(12);
    let cmd = controller.start();
    drive(&mut controller, &source, cmd).await;
    assert_eq!(controller.view().total_records, Some(100));

    // Check two rows on page 1, then move to page 2 and check one there.
    let a = controller.visible_records()[0].id;
    let b = controller.visible_records()[5].id;
    let msg = controller.toggle_row(a).unwrap();
    controller.handle(msg);
    let msg = controller.toggle_row(b).unwrap();
    controller.handle(msg);

    let cmd = controller.handle(controller.next_page().unwrap());
    drive(&mut controller, &source, cmd).await;
    assert_eq!(controller.view().page, 2);
    assert!(controller.visible_selection().is_empty());
    let c = controller.visible_records()[2].id;
    controller.handle(controller.toggle_row(c).unwrap());

    // Back to page 1 comes from the cache and still shows both checks.
    let calls = source.call_count();
    let cmd = controller.handle(controller.prev_page().unwrap());
    assert!(cmd.is_none());
    assert_eq!(source.call_count(), calls);
    let visible: Vec<u64> = controller.visible_selection().iter().map(|r| r.id).collect();
    assert_eq!(visible, vec![a, b]);
    assert_eq!(controller.selected_count(), 3);

    // Bulk select 30 rows: pages 1-2 cached, page 3 fetched.
    let cmd = controller.handle(TableMessage::BulkSelectRequested { count: 30 });
    assert!(matches!(&cmd, Some(FetchCommand::Pages { pages, .. }) if pages == &vec![3]));
    drive(&mut controller, &source, cmd).await;
    assert_eq!(ids(controller.selection()), first_ids(30));
}

#[tokio::test]
async fn controller_bulk_failure_then_retry() {
    let source = MockSource::new(100).failing_page(3, FetchError::Timeout);
    let mut controller = TableController::new(12);
    let cmd = controller.start();
    drive(&mut controller, &source, cmd).await;

    controller.handle(controller.toggle_all_visible().unwrap());
    let before = controller.selection().clone();

    let cmd = controller.handle(TableMessage::BulkSelectRequested { count: 36 });
    drive(&mut controller, &source, cmd).await;
    assert_eq!(controller.selection(), &before);

    source.heal(3);
    let cmd = controller.handle(TableMessage::BulkSelectRequested { count: 36 });
    drive(&mut controller, &source, cmd).await;
    assert_eq!(ids(controller.selection()), first_ids(36));
}

#[tokio::test]
async fn controller_page_failure_keeps_view() {
    let source = MockSource::new(100).failing_page(2, FetchError::Http("connection reset".into()));
    let mut controller = TableController::new(12);
    let cmd = controller.start();
    drive(&mut controller, &source, cmd).await;

    let cmd = controller.handle(controller.next_page().unwrap());
    drive(&mut controller, &source, cmd).await;

    assert_eq!(controller.view().page, 1);
    assert!(!controller.is_loading());
    assert_eq!(controller.visible_records()[0].id, ID_BASE);
}
