use crate::*;

/// In-memory editor. Writes raise the events a real editor would, so echo handling can be
/// observed.
#[derive(Debug, Default)]
pub(super) struct MockHost {
    pub code: String,
    pub cursor: CursorState,
    pub gui: GuiState,
    pub events: Vec<SyncEvent>,
    pub notifications: Vec<Notification>,
    pub projections: usize,
    pub writes: usize,
    pub echoed: usize,
    pub fail_projection: bool,
    pub fail_write: bool,
}

impl MockHost {
    pub fn with_code(code: &str) -> Self {
        Self {
            code: code.to_string(),
            ..Self::default()
        }
    }

    pub fn with_gui(gui: GuiState) -> Self {
        Self {
            gui,
            ..Self::default()
        }
    }
}

impl SyncHost for MockHost {
    fn code(&self) -> String {
        self.code.clone()
    }

    fn set_code(&mut self, code: &str) -> std::result::Result<(), HostError> {
        if self.fail_write {
            return Err(HostError::new("editor is read-only"));
        }
        self.code = code.to_string();
        self.writes += 1;
        self.events.push(SyncEvent::TextInput);
        Ok(())
    }

    fn cursor(&self) -> CursorState {
        self.cursor
    }

    fn set_cursor(&mut self, cursor: CursorState) {
        self.cursor = cursor;
    }

    fn gui_state(&self) -> GuiState {
        self.gui.clone()
    }

    fn apply_projection(&mut self, state: &GuiState) -> std::result::Result<(), HostError> {
        if self.fail_projection {
            return Err(HostError::new("gui rejected update"));
        }
        self.gui = state.clone();
        self.projections += 1;
        self.events.push(SyncEvent::ActionChanged);
        Ok(())
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    fn drain_events(&mut self) -> Vec<SyncEvent> {
        self.echoed += self.events.len();
        std::mem::take(&mut self.events)
    }
}

pub(super) type TestEngine = SyncEngine<MockHost, umlsync_core::PlantUmlParser, ManualClock>;

pub(super) fn engine(host: MockHost) -> (TestEngine, ManualClock) {
    engine_with(host, SyncConfig::default())
}

pub(super) fn engine_with(host: MockHost, config: SyncConfig) -> (TestEngine, ManualClock) {
    let clock = ManualClock::new();
    let engine = SyncEngine::with_parts(
        host,
        umlsync_core::PlantUmlParser::new(),
        clock.clone(),
        config,
    );
    (engine, clock)
}

pub(super) fn gui(actors: &[&str], actions: Vec<Action>) -> GuiState {
    GuiState {
        selected_actors: actors.iter().map(|a| a.to_string()).collect(),
        actions,
        ..GuiState::default()
    }
}
