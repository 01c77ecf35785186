use artgrid_core::{ValidationError, parse_bulk_count};

/// Text input for "select the first N rows".
#[derive(Debug, Clone, Default)]
pub struct RowSelectorState {
    pub active: bool,
    pub input: String,
    /// Set once the user has typed or tried to submit; an untouched empty
    /// field shows no error.
    pub touched: bool,
}

impl RowSelectorState {
    pub fn open(&mut self) {
        self.active = true;
        self.input.clear();
        self.touched = false;
    }

    pub fn close(&mut self) {
        self.active = false;
    }

    pub fn push(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        self.input.push(ch);
        self.touched = true;
    }

    pub fn backspace(&mut self) {
        self.input.pop();
        self.touched = true;
    }

    pub fn parsed(&self) -> Result<usize, ValidationError> {
        parse_bulk_count(&self.input)
    }

    /// Message shown under the field, if any.
    pub fn error(&self) -> Option<String> {
        if !self.touched {
            return None;
        }
        self.parsed().err().map(|e| e.to_string())
    }

    pub fn submit_label(&self) -> String {
        match self.parsed() {
            Ok(1) => "Select 1 row".to_string(),
            Ok(n) => format!("Select {n} rows"),
            Err(_) => "Submit".to_string(),
        }
    }

    /// Validate and close. Invalid input keeps the overlay open and marks it
    /// touched so the error becomes visible.
    pub fn submit(&mut self) -> Option<usize> {
        self.touched = true;
        let count = self.parsed().ok()?;
        self.active = false;
        Some(count)
    }
}
