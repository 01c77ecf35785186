mod update;

use ratatui::Frame;
use tokio::sync::mpsc;

use artgrid_core::{FetchCommand, Record, TableController, TableMessage};

use crate::model::overlay::RowSelectorState;
use crate::theme::Theme;

/// Input mode determines how keyboard input is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    RowSelector,
}

pub struct App {
    pub controller: TableController,
    pub theme: Theme,
    /// Highlighted row on the displayed page.
    pub cursor: usize,
    pub row_selector: RowSelectorState,
    pub show_help: bool,
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub tick: usize,
    /// Page sizes offered by the paginator, ascending.
    pub page_size_options: Vec<usize>,
    /// Label of the data source shown in the header.
    pub source_name: String,
    backend_cmd_tx: Option<mpsc::UnboundedSender<FetchCommand>>,
    /// (page, page_size) the cursor was last positioned for.
    cursor_page: (u32, usize),
}

impl App {
    pub fn new(page_size: usize, page_size_options: &[usize], theme: Theme) -> Self {
        let page_size = page_size.max(1);
        let mut options: Vec<usize> = page_size_options.iter().copied().filter(|&s| s > 0).collect();
        if !options.contains(&page_size) {
            options.push(page_size);
        }
        options.sort_unstable();
        options.dedup();

        Self {
            controller: TableController::new(page_size),
            theme,
            cursor: 0,
            row_selector: RowSelectorState::default(),
            show_help: false,
            should_quit: false,
            input_mode: InputMode::Normal,
            tick: 0,
            page_size_options: options,
            source_name: String::new(),
            backend_cmd_tx: None,
            cursor_page: (1, page_size),
        }
    }

    pub fn connect(&mut self, tx: mpsc::UnboundedSender<FetchCommand>) {
        self.backend_cmd_tx = Some(tx);
    }

    /// Kick off the initial page load.
    pub fn start(&mut self) {
        let cmd = self.controller.start();
        self.send(cmd);
    }

    /// Feed a message to the controller and forward any resulting command.
    pub(crate) fn dispatch(&mut self, message: TableMessage) {
        let cmd = self.controller.handle(message);
        self.send(cmd);
        self.sync_cursor();
    }

    /// Completion from the backend task.
    pub fn handle_backend_message(&mut self, message: TableMessage) {
        self.dispatch(message);
    }

    fn send(&mut self, cmd: Option<FetchCommand>) {
        let Some(cmd) = cmd else { return };
        match &self.backend_cmd_tx {
            Some(tx) => {
                if tx.send(cmd).is_err() {
                    tracing::warn!("backend channel closed, command dropped");
                }
            }
            None => tracing::debug!(?cmd, "no backend connected"),
        }
    }

    /// Reset the cursor when a different page is shown, else keep it in range.
    fn sync_cursor(&mut self) {
        let view = self.controller.view();
        let shown = (view.page, view.page_size);
        if shown != self.cursor_page {
            self.cursor_page = shown;
            self.cursor = 0;
        }
        let len = view.displayed.len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    pub fn current_record(&self) -> Option<&Record> {
        self.controller.visible_records().get(self.cursor)
    }

    /// Next configured page size after the current one, wrapping around.
    pub fn next_page_size(&self) -> Option<usize> {
        let current = self.controller.view().page_size;
        if self.page_size_options.len() < 2 {
            return None;
        }
        let next = self
            .page_size_options
            .iter()
            .copied()
            .find(|&s| s > current)
            .unwrap_or(self.page_size_options[0]);
        Some(next)
    }

    /// Render the whole UI.
    pub fn view(&mut self, f: &mut Frame) {
        crate::view::table::render(f, self);

        if self.row_selector.active {
            crate::view::overlay::render(f, &self.row_selector, &self.theme);
        }

        if self.show_help {
            crate::view::help::render(f, &self.theme);
        }
    }
}

#[cfg(test)]
mod tests;
