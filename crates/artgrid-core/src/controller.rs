//! Table view controller: owns the session state and turns UI messages into
//! fetch commands.
//!
//! The controller never performs I/O. Each [`TableMessage`] may produce one
//! [`FetchCommand`]; whoever runs the command reports back with a completion
//! message ([`TableMessage::PageFetched`] / [`TableMessage::BulkPagesFetched`])
//! carrying the same [`RequestToken`]. Completions for superseded tokens are
//! still cached but never change what is displayed or selected.

use crate::bulk::{BulkPlan, pages_for, store_pages};
use crate::cache::PageCaches;
use crate::selection::SelectionSet;
use crate::{FetchError, FetchedPage, Page, Record};

/// Monotonic id attached to every fetch command.
pub type RequestToken = u64;

/// Input to [`TableController::handle`].
#[derive(Debug, Clone)]
pub enum TableMessage {
    /// Paginator moved. `offset` is a multiple of `page_size`.
    PageChangeRequested { offset: usize, page_size: usize },
    /// Checkbox state of the rendered rows changed.
    SelectionToggled {
        visible: Vec<Record>,
        newly_checked: Vec<Record>,
    },
    /// Select the first `count` rows of the catalog.
    BulkSelectRequested { count: usize },
    ClearSelection,
    /// Completion of [`FetchCommand::Page`].
    PageFetched {
        token: RequestToken,
        page: u32,
        page_size: usize,
        result: Result<FetchedPage, FetchError>,
    },
    /// Completion of [`FetchCommand::Pages`].
    BulkPagesFetched {
        token: RequestToken,
        page_size: usize,
        result: Result<Vec<(u32, FetchedPage)>, FetchError>,
    },
}

/// I/O the controller needs performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCommand {
    Page {
        token: RequestToken,
        page: u32,
        page_size: usize,
    },
    /// Fetch all of `pages` concurrently, failing as a whole.
    Pages {
        token: RequestToken,
        pages: Vec<u32>,
        page_size: usize,
    },
}

impl FetchCommand {
    pub fn token(&self) -> RequestToken {
        match self {
            FetchCommand::Page { token, .. } | FetchCommand::Pages { token, .. } => *token,
        }
    }
}

/// Last user-facing outcome worth showing in a status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// What the table currently shows.
#[derive(Debug, Clone)]
pub struct ViewState {
    /// 1-based index of the displayed page.
    pub page: u32,
    pub page_size: usize,
    pub offset: usize,
    pub displayed: Page,
    /// Authoritative catalog size from the most recent page fetch.
    pub total_records: Option<u64>,
    pub loading: bool,
}

#[derive(Debug, Clone, Copy)]
struct PendingPage {
    token: RequestToken,
    page: u32,
    page_size: usize,
}

#[derive(Debug, Clone, Copy)]
struct PendingBulk {
    token: RequestToken,
    count: usize,
    page_size: usize,
}

pub struct TableController {
    view: ViewState,
    caches: PageCaches,
    selection: SelectionSet,
    next_token: RequestToken,
    pending_page: Option<PendingPage>,
    pending_bulk: Option<PendingBulk>,
    notice: Option<Notice>,
}

impl TableController {
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            view: ViewState {
                page: 1,
                page_size,
                offset: 0,
                displayed: Page::empty(page_size),
                total_records: None,
                loading: false,
            },
            caches: PageCaches::new(),
            selection: SelectionSet::new(),
            next_token: 1,
            pending_page: None,
            pending_bulk: None,
            notice: None,
        }
    }

    /// Request the first page at the configured page size.
    pub fn start(&mut self) -> Option<FetchCommand> {
        let page_size = self.view.page_size;
        self.handle(TableMessage::PageChangeRequested {
            offset: 0,
            page_size,
        })
    }

    pub fn handle(&mut self, message: TableMessage) -> Option<FetchCommand> {
        match message {
            TableMessage::PageChangeRequested { offset, page_size } => {
                self.page_change(offset, page_size)
            }
            TableMessage::SelectionToggled {
                visible,
                newly_checked,
            } => {
                self.selection
                    .apply_visible_selection_change(&visible, &newly_checked);
                None
            }
            TableMessage::BulkSelectRequested { count } => self.bulk_requested(count),
            TableMessage::ClearSelection => {
                self.selection.clear();
                self.notice = Some(Notice::Info("Selection cleared".to_string()));
                None
            }
            TableMessage::PageFetched {
                token,
                page,
                page_size,
                result,
            } => {
                self.page_fetched(token, page, page_size, result);
                None
            }
            TableMessage::BulkPagesFetched {
                token,
                page_size,
                result,
            } => self.bulk_fetched(token, page_size, result),
        }
    }

    fn issue_token(&mut self) -> RequestToken {
        let token = self.next_token;
        self.next_token = self.next_token.wrapping_add(1);
        token
    }

    fn page_change(&mut self, offset: usize, page_size: usize) -> Option<FetchCommand> {
        if page_size == 0 {
            return None;
        }
        let page = u32::try_from(offset / page_size + 1).unwrap_or(u32::MAX);
        let token = self.issue_token();

        let cached = self.caches.for_size(page_size).get(page).cloned();
        if let Some(cached) = cached {
            tracing::debug!(page, page_size, "page change served from cache");
            // Supersede any fetch still in flight.
            self.pending_page = None;
            self.view.loading = false;
            self.show(cached);
            return None;
        }

        tracing::debug!(page, page_size, token, "page change needs fetch");
        self.pending_page = Some(PendingPage {
            token,
            page,
            page_size,
        });
        self.view.loading = true;
        Some(FetchCommand::Page {
            token,
            page,
            page_size,
        })
    }

    fn show(&mut self, page: Page) {
        self.view.page = page.index;
        self.view.page_size = page.size;
        self.view.offset = (page.index as usize - 1) * page.size;
        self.view.displayed = page;
    }

    fn page_fetched(
        &mut self,
        token: RequestToken,
        page: u32,
        page_size: usize,
        result: Result<FetchedPage, FetchError>,
    ) {
        let current = self.pending_page.is_some_and(|p| p.token == token);

        match result {
            Ok(fetched) => {
                let total = fetched.total;
                let cache = self.caches.for_size(page_size);
                cache.put_fetched(page, fetched);
                if !current {
                    tracing::debug!(page, token, "discarding stale page response");
                    return;
                }
                let stored = cache.get(page).cloned();
                self.pending_page = None;
                self.view.loading = false;
                self.view.total_records = Some(total);
                if let Some(stored) = stored {
                    self.show(stored);
                }
            }
            Err(e) => {
                if !current {
                    tracing::debug!(page, token, error = %e, "ignoring stale page failure");
                    return;
                }
                self.pending_page = None;
                self.view.loading = false;
                tracing::warn!(page, page_size, error = %e, "page fetch failed");
                self.notice = Some(Notice::Error(format!("Could not load page {page}: {e}")));
            }
        }
    }

    fn bulk_requested(&mut self, count: usize) -> Option<FetchCommand> {
        if count == 0 {
            self.notice = Some(Notice::Error(
                crate::ValidationError::BelowMinimum.to_string(),
            ));
            return None;
        }
        let token = self.issue_token();
        self.pending_bulk = Some(PendingBulk {
            token,
            count,
            page_size: self.view.page_size,
        });
        self.advance_bulk()
    }

    /// Re-plan the pending bulk select; commit it when nothing is missing.
    fn advance_bulk(&mut self) -> Option<FetchCommand> {
        let pending = self.pending_bulk?;
        let cache = self.caches.for_size(pending.page_size);
        let plan = BulkPlan::new(pending.count, cache);

        if !plan.is_ready() {
            tracing::debug!(missing = ?plan.missing, token = pending.token, "bulk select needs pages");
            return Some(FetchCommand::Pages {
                token: pending.token,
                pages: plan.missing,
                page_size: pending.page_size,
            });
        }

        let result = plan.assemble(cache);
        let selected = result.len();
        self.selection = result;
        self.pending_bulk = None;
        tracing::info!(requested = pending.count, selected, "bulk select committed");
        self.notice = Some(Notice::Info(if selected < pending.count {
            format!(
                "Selected {selected} rows (only {selected} available of {} requested)",
                pending.count
            )
        } else {
            format!("Selected {selected} row{}", if selected == 1 { "" } else { "s" })
        }));
        None
    }

    fn bulk_fetched(
        &mut self,
        token: RequestToken,
        page_size: usize,
        result: Result<Vec<(u32, FetchedPage)>, FetchError>,
    ) -> Option<FetchCommand> {
        let current = self.pending_bulk.is_some_and(|b| b.token == token);

        match result {
            Ok(fetched) => {
                let stored = store_pages(self.caches.for_size(page_size), fetched);
                if !current {
                    tracing::debug!(token, ?stored, "discarding stale bulk response");
                    return None;
                }
                self.advance_bulk()
            }
            Err(e) => {
                if !current {
                    tracing::debug!(token, error = %e, "ignoring stale bulk failure");
                    return None;
                }
                self.pending_bulk = None;
                tracing::warn!(error = %e, "bulk select failed, selection unchanged");
                self.notice = Some(Notice::Error(format!("Bulk select failed: {e}")));
                None
            }
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    pub fn caches(&self) -> &PageCaches {
        &self.caches
    }

    pub fn visible_records(&self) -> &[Record] {
        &self.view.displayed.records
    }

    /// Selected records on the displayed page, in row order.
    pub fn visible_selection(&self) -> Vec<Record> {
        self.selection.restricted_to(&self.view.displayed.records)
    }

    pub fn is_loading(&self) -> bool {
        self.view.loading
    }

    pub fn bulk_in_flight(&self) -> bool {
        self.pending_bulk.is_some()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Number of pages at the current page size, once the total is known.
    pub fn page_count(&self) -> Option<u32> {
        self.view
            .total_records
            .map(|total| pages_for(total, self.view.page_size).max(1))
    }

    // ── Message builders ────────────────────────────────────────────────

    /// Page and page size navigation is relative to: the in-flight target
    /// if a page load is pending, else the displayed page.
    fn nav_base(&self) -> (u32, usize) {
        match self.pending_page {
            Some(p) => (p.page, p.page_size),
            None => (self.view.page, self.view.page_size),
        }
    }

    /// Page change to 1-based `page` at the current page size, if in range.
    pub fn go_to_page(&self, page: u32) -> Option<TableMessage> {
        let (_, page_size) = self.nav_base();
        if page == 0 {
            return None;
        }
        if let Some(total) = self.view.total_records {
            let last = pages_for(total, page_size).max(1);
            if page > last {
                return None;
            }
        }
        Some(TableMessage::PageChangeRequested {
            offset: (page as usize - 1) * page_size,
            page_size,
        })
    }

    pub fn next_page(&self) -> Option<TableMessage> {
        let (page, _) = self.nav_base();
        self.go_to_page(page.saturating_add(1))
    }

    pub fn prev_page(&self) -> Option<TableMessage> {
        let (page, _) = self.nav_base();
        self.go_to_page(page.saturating_sub(1))
    }

    pub fn first_page(&self) -> Option<TableMessage> {
        self.go_to_page(1)
    }

    pub fn last_page(&self) -> Option<TableMessage> {
        self.page_count().and_then(|last| self.go_to_page(last))
    }

    /// Switch page size, keeping the first row of the current page in view.
    pub fn change_page_size(&self, page_size: usize) -> Option<TableMessage> {
        let (page, current_size) = self.nav_base();
        if page_size == 0 || page_size == current_size {
            return None;
        }
        let first_row = (page as usize - 1) * current_size;
        Some(TableMessage::PageChangeRequested {
            offset: (first_row / page_size) * page_size,
            page_size,
        })
    }

    /// Checkbox click on the row with `id` on the displayed page.
    pub fn toggle_row(&self, id: u64) -> Option<TableMessage> {
        let visible = self.view.displayed.records.clone();
        let record = visible.iter().find(|r| r.id == id)?.clone();
        let mut newly_checked = self.visible_selection();
        if self.selection.contains(id) {
            newly_checked.retain(|r| r.id != id);
        } else {
            newly_checked.push(record);
        }
        Some(TableMessage::SelectionToggled {
            visible,
            newly_checked,
        })
    }

    /// Header checkbox: check every visible row, or uncheck them all when
    /// they are already checked.
    pub fn toggle_all_visible(&self) -> Option<TableMessage> {
        let visible = self.view.displayed.records.clone();
        if visible.is_empty() {
            return None;
        }
        let all_checked = visible.iter().all(|r| self.selection.contains(r.id));
        let newly_checked = if all_checked { Vec::new() } else { visible.clone() };
        Some(TableMessage::SelectionToggled {
            visible,
            newly_checked,
        })
    }
}
