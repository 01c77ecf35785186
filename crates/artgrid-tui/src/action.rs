/// User or system intent, produced by [`crate::input::map_event`] and consumed
/// by [`crate::app::App::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Tick,
    Resize(u16, u16),

    // Row cursor
    MoveUp,
    MoveDown,
    GoTop,
    GoBottom,

    // Paginator
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    CyclePageSize,

    // Selection
    ToggleRow,
    ToggleAll,
    ClearSelection,
    OpenRowSelector,

    // Row selector text input
    InputChar(char),
    InputBackspace,
    InputConfirm,
    InputCancel,

    ToggleHelp,
    /// Esc in normal mode: close help, else dismiss the status notice.
    NavigateBack,
}
