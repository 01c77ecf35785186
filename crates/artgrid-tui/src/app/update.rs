use super::{App, InputMode};
use crate::action::Action;

impl App {
    /// Process a user action and update state. Returns true if the app should quit.
    pub fn update(&mut self, action: Action) -> bool {
        match action {
            Action::Tick => {
                self.tick = self.tick.wrapping_add(1);
                return false;
            }
            Action::Quit => {
                self.should_quit = true;
                return true;
            }
            _ => {}
        }

        // Row selector overlay intercepts all input
        if self.row_selector.active {
            self.update_row_selector(action);
            return false;
        }

        // Help popup: any dismiss key closes it, everything else is swallowed
        if self.show_help {
            if matches!(action, Action::ToggleHelp | Action::NavigateBack) {
                self.show_help = false;
            }
            return false;
        }

        match action {
            Action::MoveDown => {
                let len = self.controller.visible_records().len();
                if self.cursor + 1 < len {
                    self.cursor += 1;
                }
            }
            Action::MoveUp => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            Action::GoTop => self.cursor = 0,
            Action::GoBottom => {
                self.cursor = self.controller.visible_records().len().saturating_sub(1);
            }
            Action::NextPage => {
                if let Some(msg) = self.controller.next_page() {
                    self.dispatch(msg);
                }
            }
            Action::PrevPage => {
                if let Some(msg) = self.controller.prev_page() {
                    self.dispatch(msg);
                }
            }
            Action::FirstPage => {
                if let Some(msg) = self.controller.first_page() {
                    self.dispatch(msg);
                }
            }
            Action::LastPage => {
                if let Some(msg) = self.controller.last_page() {
                    self.dispatch(msg);
                }
            }
            Action::CyclePageSize => {
                if let Some(msg) = self
                    .next_page_size()
                    .and_then(|size| self.controller.change_page_size(size))
                {
                    self.dispatch(msg);
                }
            }
            Action::ToggleRow => {
                if let Some(msg) = self
                    .current_record()
                    .map(|r| r.id)
                    .and_then(|id| self.controller.toggle_row(id))
                {
                    self.dispatch(msg);
                }
            }
            Action::ToggleAll => {
                if let Some(msg) = self.controller.toggle_all_visible() {
                    self.dispatch(msg);
                }
            }
            Action::ClearSelection => {
                self.dispatch(artgrid_core::TableMessage::ClearSelection);
            }
            Action::OpenRowSelector => {
                self.row_selector.open();
                self.input_mode = InputMode::RowSelector;
            }
            Action::ToggleHelp => self.show_help = true,
            Action::NavigateBack => self.controller.dismiss_notice(),
            Action::Resize(..) | Action::None => {}
            // Text input outside the overlay has nothing to edit.
            Action::InputChar(_)
            | Action::InputBackspace
            | Action::InputConfirm
            | Action::InputCancel => {}
            Action::Tick | Action::Quit => {}
        }
        false
    }

    fn update_row_selector(&mut self, action: Action) {
        match action {
            Action::InputChar(c) => self.row_selector.push(c),
            Action::InputBackspace => self.row_selector.backspace(),
            Action::InputCancel => {
                self.row_selector.close();
                self.input_mode = InputMode::Normal;
            }
            Action::InputConfirm => {
                if let Some(count) = self.row_selector.submit() {
                    self.input_mode = InputMode::Normal;
                    self.dispatch(artgrid_core::TableMessage::BulkSelectRequested { count });
                }
            }
            _ => {}
        }
    }
}
