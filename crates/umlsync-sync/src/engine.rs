use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::Serialize;
use umlsync_core::{Document, ParseOutcome, PlantUmlParser, extract, repair_source};

use crate::clock::{Clock, PendingTask, SystemClock};
use crate::codegen::generate;
use crate::config::SyncConfig;
use crate::convert::document_to_gui;
use crate::cursor::CursorState;
use crate::diff::{CodeDiff, GuiDiff};
use crate::error::{SyncError, panic_message};
use crate::export::ExportDocument;
use crate::host::{Notification, SyncEvent, SyncHost};
use crate::metrics::{MetricsReport, SyncMetrics};
use crate::model::{GuiState, SyncDirection};

/// Turns source text into a parse result. The engine uses the [`PlantUmlParser`] facade unless
/// told otherwise.
pub trait DiagramParser {
    fn parse(&mut self, text: &str) -> ParseOutcome;
}

impl DiagramParser for PlantUmlParser {
    fn parse(&mut self, text: &str) -> ParseOutcome {
        PlantUmlParser::parse(self, text).clone()
    }
}

impl<F> DiagramParser for F
where
    F: FnMut(&str) -> ParseOutcome,
{
    fn parse(&mut self, text: &str) -> ParseOutcome {
        self(text)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncState {
    #[default]
    Idle,
    SyncingCodeToGui,
    SyncingGuiToCode,
    Paused,
}

impl SyncState {
    fn in_flight(direction: SyncDirection) -> Self {
        match direction {
            SyncDirection::CodeToGui => Self::SyncingCodeToGui,
            SyncDirection::GuiToCode => Self::SyncingGuiToCode,
        }
    }
}

/// Why a structured parse was not used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// The parser produced diagnostics (or no document at all).
    Invalid { errors: usize },
    Timeout { elapsed: Duration },
    MaxAttemptsExceeded,
    Panicked { message: String },
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid { errors } => write!(f, "Parse failed with {errors} error(s)"),
            Self::Timeout { elapsed } => write!(f, "Timeout after {} ms", elapsed.as_millis()),
            Self::MaxAttemptsExceeded => f.write_str("Max attempts exceeded"),
            Self::Panicked { message } => write!(f, "Parser error: {message}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Paused,
    RateLimited,
}

#[derive(Debug)]
pub enum SyncOutcome {
    Applied {
        direction: SyncDirection,
        duration: Duration,
    },
    /// The structured parse was rejected and the regex extraction was projected instead.
    Fallback {
        reason: ParseFailure,
        actors: usize,
        messages: usize,
    },
    Unchanged,
    Scheduled {
        direction: SyncDirection,
        deadline: Instant,
    },
    Skipped(SkipReason),
    Failed(SyncError),
}

impl SyncOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub state: SyncState,
    pub error_count: u32,
    pub parse_attempts: u32,
    pub code_to_gui_pending: bool,
    pub gui_to_code_pending: bool,
    pub metrics: MetricsReport,
}

/// Puts the engine into an in-flight state and puts it back to `Idle` when dropped, unless
/// something in between moved it elsewhere (the circuit breaker pausing the engine).
struct StateGuard {
    state: Rc<Cell<SyncState>>,
    entered: SyncState,
}

impl StateGuard {
    fn enter(state: &Rc<Cell<SyncState>>, entered: SyncState) -> Self {
        state.set(entered);
        Self {
            state: Rc::clone(state),
            entered,
        }
    }
}

impl Drop for StateGuard {
    fn drop(&mut self) {
        if self.state.get() == self.entered {
            self.state.set(SyncState::Idle);
        }
    }
}

/// Two-way synchronization between a host's PlantUML text and its GUI model.
pub struct SyncEngine<H, P = PlantUmlParser, C = SystemClock> {
    host: H,
    parser: P,
    clock: C,
    config: SyncConfig,
    state: Rc<Cell<SyncState>>,

    code_debounce: PendingTask,
    gui_debounce: PendingTask,
    parse_timeout: PendingTask,
    metrics_timer: PendingTask,

    last_synced_code: Option<String>,
    previous_gui: Option<GuiState>,
    current_ast: Option<Document>,
    last_parse_at: Option<Instant>,
    parse_attempts: u32,
    error_count: u32,
    metrics: SyncMetrics,
}

impl<H: SyncHost> SyncEngine<H> {
    pub fn new(host: H) -> Self {
        Self::with_parts(host, PlantUmlParser::new(), SystemClock, SyncConfig::default())
    }
}

impl<H, P, C> SyncEngine<H, P, C>
where
    H: SyncHost,
    P: DiagramParser,
    C: Clock,
{
    pub fn with_parts(host: H, parser: P, clock: C, config: SyncConfig) -> Self {
        let metrics = SyncMetrics::new(config.metrics_window);
        Self {
            host,
            parser,
            clock,
            config,
            state: Rc::new(Cell::new(SyncState::Idle)),
            code_debounce: PendingTask::new(),
            gui_debounce: PendingTask::new(),
            parse_timeout: PendingTask::new(),
            metrics_timer: PendingTask::new(),
            last_synced_code: None,
            previous_gui: None,
            current_ast: None,
            last_parse_at: None,
            parse_attempts: 0,
            error_count: 0,
            metrics,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn state(&self) -> SyncState {
        self.state.get()
    }

    pub fn is_paused(&self) -> bool {
        self.state.get() == SyncState::Paused
    }

    pub fn current_ast(&self) -> Option<&Document> {
        self.current_ast.as_ref()
    }

    pub fn metrics(&self) -> &SyncMetrics {
        &self.metrics
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            state: self.state.get(),
            error_count: self.error_count,
            parse_attempts: self.parse_attempts,
            code_to_gui_pending: self.code_debounce.is_pending(),
            gui_to_code_pending: self.gui_debounce.is_pending(),
            metrics: self.metrics.report(),
        }
    }

    /// First sync after the host is ready: text wins when there is any, otherwise the GUI
    /// writes the initial text. Also starts the periodic metrics report.
    pub fn initial_sync(&mut self) -> SyncOutcome {
        let deadline = self.clock.now() + self.config.metrics_interval();
        self.metrics_timer.schedule(deadline);

        if self.host.code().trim().is_empty() {
            self.force_gui_to_code()
        } else {
            self.force_code_to_gui()
        }
    }

    pub fn handle_event(&mut self, event: SyncEvent) -> SyncOutcome {
        tracing::trace!(?event, state = ?self.state.get(), "sync event");
        match event {
            SyncEvent::TextInput => self.request_code_to_gui(),
            SyncEvent::TextBlur => self.force_code_to_gui(),
            SyncEvent::ActorSelectionChanged
            | SyncEvent::ActionChanged
            | SyncEvent::ActionAdded
            | SyncEvent::ActionRemoved => self.request_gui_to_code(),
            SyncEvent::ActionReordered => self.force_gui_to_code(),
        }
    }

    pub fn request_code_to_gui(&mut self) -> SyncOutcome {
        self.request(SyncDirection::CodeToGui)
    }

    pub fn request_gui_to_code(&mut self) -> SyncOutcome {
        self.request(SyncDirection::GuiToCode)
    }

    pub fn force_code_to_gui(&mut self) -> SyncOutcome {
        self.code_debounce.cancel();
        self.code_to_gui()
    }

    pub fn force_gui_to_code(&mut self) -> SyncOutcome {
        self.gui_debounce.cancel();
        self.gui_to_code()
    }

    pub fn manual_sync(&mut self, direction: SyncDirection) -> SyncOutcome {
        match direction {
            SyncDirection::CodeToGui => {
                // A manual request re-reads the text even if it looks unchanged.
                self.last_synced_code = None;
                self.force_code_to_gui()
            }
            SyncDirection::GuiToCode => self.force_gui_to_code(),
        }
    }

    /// Runs whatever is due: debounced syncs first, then the periodic metrics report.
    pub fn poll(&mut self) -> Vec<SyncOutcome> {
        let mut ran = Vec::new();
        let now = self.clock.now();

        if self.code_debounce.take_due(now).is_some() {
            ran.push(self.code_to_gui());
        }
        if self.gui_debounce.take_due(now).is_some() {
            ran.push(self.gui_to_code());
        }
        if self.metrics_timer.take_due(now).is_some() {
            self.report_metrics();
            let next = now + self.config.metrics_interval();
            self.metrics_timer.schedule(next);
        }
        ran
    }

    /// When `poll` next has something to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.code_debounce.deadline(),
            self.gui_debounce.deadline(),
            self.metrics_timer.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn pause(&mut self) {
        if self.state.get() == SyncState::Paused {
            return;
        }
        self.code_debounce.cancel();
        self.gui_debounce.cancel();
        self.state.set(SyncState::Paused);
        tracing::info!("sync paused");
    }

    /// Clears the pause and the error counter, then re-reads the text.
    pub fn resume(&mut self) -> SyncOutcome {
        if self.state.get() == SyncState::Paused {
            self.state.set(SyncState::Idle);
        }
        self.error_count = 0;
        self.parse_attempts = 0;
        self.last_synced_code = None;
        self.last_parse_at = None;
        self.host.notify(Notification::SyncResumed);
        tracing::info!("sync resumed");
        self.force_code_to_gui()
    }

    pub fn export(&self) -> crate::Result<ExportDocument> {
        ExportDocument::from_state(&self.host.gui_state(), chrono::Utc::now())
    }

    fn request(&mut self, direction: SyncDirection) -> SyncOutcome {
        if let Some(reason) = self.blocked() {
            tracing::debug!(%direction, ?reason, "sync request dropped");
            return SyncOutcome::Skipped(reason);
        }
        let deadline = self.clock.now() + self.config.debounce();
        let task = match direction {
            SyncDirection::CodeToGui => &mut self.code_debounce,
            SyncDirection::GuiToCode => &mut self.gui_debounce,
        };
        task.schedule(deadline);
        SyncOutcome::Scheduled {
            direction,
            deadline,
        }
    }

    /// Callers hold `&mut self` for the whole sync, so the only thing that can block a run
    /// is a pause. Feedback from our own writes is handled by [`Self::drop_echoed_events`].
    fn blocked(&self) -> Option<SkipReason> {
        (self.state.get() == SyncState::Paused).then_some(SkipReason::Paused)
    }

    fn code_to_gui(&mut self) -> SyncOutcome {
        let direction = SyncDirection::CodeToGui;
        if let Some(reason) = self.blocked() {
            tracing::debug!(%direction, ?reason, "sync skipped");
            return SyncOutcome::Skipped(reason);
        }

        let code = self.host.code();
        if self.last_synced_code.as_deref() == Some(code.as_str()) {
            return SyncOutcome::Unchanged;
        }

        let diff = CodeDiff::compute(self.last_synced_code.as_deref().unwrap_or(""), &code);
        tracing::debug!(
            added = diff.added,
            removed = diff.removed,
            lines = diff.new_len,
            "code changed"
        );

        let now = self.clock.now();
        let too_soon = self
            .last_parse_at
            .is_some_and(|last| now.duration_since(last) < self.config.min_parse_interval());
        if too_soon {
            self.metrics.rate_limited += 1;
            tracing::debug!(%direction, "Rate limited");
            return SyncOutcome::Skipped(SkipReason::RateLimited);
        }

        let cursor = self.host.cursor();
        let guard = StateGuard::enter(&self.state, SyncState::in_flight(direction));
        let outcome = match catch_unwind(AssertUnwindSafe(|| self.sync_code(&code, cursor))) {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => self.record_error(err),
            Err(payload) => self.record_error(SyncError::panic(direction, payload.as_ref())),
        };
        self.drop_echoed_events(direction);
        drop(guard);
        outcome
    }

    fn sync_code(&mut self, code: &str, cursor: CursorState) -> crate::Result<SyncOutcome> {
        let started = self.clock.now();

        if self.parse_attempts >= self.config.max_parse_attempts {
            tracing::warn!(attempts = self.parse_attempts, "Max attempts exceeded");
            self.parse_attempts = 0;
            return self.apply_fallback(code, ParseFailure::MaxAttemptsExceeded, cursor);
        }
        self.parse_attempts += 1;
        self.last_parse_at = Some(started);

        let repaired = repair_source(code, self.config.max_lines);
        if repaired.changed_from(code) {
            tracing::debug!(truncated = repaired.truncated, "source repaired before parse");
        }

        let race = self
            .parse_timeout
            .schedule(started + self.config.parse_timeout());
        let parser = &mut self.parser;
        let parsed = catch_unwind(AssertUnwindSafe(|| parser.parse(&repaired.code)));
        let finished = self.clock.now();
        let in_time = self.parse_timeout.finish(race, finished);

        let outcome = match parsed {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(%message, "parser panicked");
                self.count_error();
                return self.apply_fallback(code, ParseFailure::Panicked { message }, cursor);
            }
        };

        if !in_time {
            let elapsed = finished.duration_since(started);
            tracing::warn!(elapsed_ms = elapsed.as_millis() as u64, "parse timed out");
            self.metrics.timeouts += 1;
            return self.apply_fallback(code, ParseFailure::Timeout { elapsed }, cursor);
        }

        let document = match outcome.document {
            Some(document) if outcome.errors.is_empty() => document,
            _ => {
                let errors = outcome.errors.len().max(1);
                return self.apply_fallback(code, ParseFailure::Invalid { errors }, cursor);
            }
        };

        let projection = document_to_gui(&document);
        let state = projection.apply_to(self.host.gui_state());
        self.write_projection(&state, code, cursor)?;

        let duration = self.clock.now().duration_since(started);
        self.metrics.record(SyncDirection::CodeToGui, duration);
        self.parse_attempts = 0;
        self.error_count = 0;
        self.last_synced_code = Some(code.to_string());
        self.current_ast = Some(document);
        self.previous_gui = Some(self.host.gui_state());

        tracing::info!(
            direction = %SyncDirection::CodeToGui,
            duration_ms = duration.as_millis() as u64,
            actions = state.actions.len(),
            "sync complete"
        );
        Ok(SyncOutcome::Applied {
            direction: SyncDirection::CodeToGui,
            duration,
        })
    }

    /// Projects the regex extraction of `code` so the GUI never goes blank on bad input.
    fn apply_fallback(
        &mut self,
        code: &str,
        reason: ParseFailure,
        cursor: CursorState,
    ) -> crate::Result<SyncOutcome> {
        let extracted = extract(code);
        tracing::warn!(
            %reason,
            actors = extracted.actors.len(),
            messages = extracted.messages.len(),
            "using fallback extraction"
        );

        let projection = document_to_gui(&extracted.to_document());
        let state = projection.apply_to(self.host.gui_state());
        self.write_projection(&state, code, cursor)?;

        self.metrics.fallbacks += 1;
        if reason != ParseFailure::MaxAttemptsExceeded {
            self.last_synced_code = Some(code.to_string());
        }
        self.previous_gui = Some(self.host.gui_state());

        Ok(SyncOutcome::Fallback {
            reason,
            actors: extracted.actors.len(),
            messages: extracted.messages.len(),
        })
    }

    fn write_projection(
        &mut self,
        state: &GuiState,
        code: &str,
        cursor: CursorState,
    ) -> crate::Result<()> {
        self.host
            .apply_projection(state)
            .map_err(SyncError::host(SyncDirection::CodeToGui))?;
        self.host
            .refresh_ui()
            .map_err(SyncError::host(SyncDirection::CodeToGui))?;
        self.host.set_cursor(cursor.clamped(code));
        Ok(())
    }

    fn gui_to_code(&mut self) -> SyncOutcome {
        let direction = SyncDirection::GuiToCode;
        if let Some(reason) = self.blocked() {
            tracing::debug!(%direction, ?reason, "sync skipped");
            return SyncOutcome::Skipped(reason);
        }

        let guard = StateGuard::enter(&self.state, SyncState::in_flight(direction));
        let outcome = match catch_unwind(AssertUnwindSafe(|| self.sync_gui())) {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => self.record_error(err),
            Err(payload) => self.record_error(SyncError::panic(direction, payload.as_ref())),
        };
        self.drop_echoed_events(direction);
        drop(guard);
        outcome
    }

    fn sync_gui(&mut self) -> crate::Result<SyncOutcome> {
        let started = self.clock.now();
        let state = self.host.gui_state();

        if let Some(previous) = &self.previous_gui {
            let diff = GuiDiff::compute(previous, &state);
            tracing::debug!(
                actors_added = diff.actors_added.len(),
                actors_removed = diff.actors_removed.len(),
                actions_modified = diff.actions_modified.len(),
                "gui changed"
            );
            if !diff.affects_code() {
                self.previous_gui = Some(state);
                return Ok(SyncOutcome::Unchanged);
            }
        }

        let old = self.host.code();
        let new = generate(&state);
        if new == old {
            self.last_synced_code = Some(new);
            self.previous_gui = Some(state);
            return Ok(SyncOutcome::Unchanged);
        }

        let cursor = self.host.cursor();
        self.host
            .set_code(&new)
            .map_err(SyncError::host(SyncDirection::GuiToCode))?;
        self.host.set_cursor(cursor.shifted(&old, &new));
        self.host
            .refresh_ui()
            .map_err(SyncError::host(SyncDirection::GuiToCode))?;

        let duration = self.clock.now().duration_since(started);
        self.metrics.record(SyncDirection::GuiToCode, duration);
        self.error_count = 0;
        self.last_synced_code = Some(new);
        self.previous_gui = Some(state);

        tracing::info!(
            direction = %SyncDirection::GuiToCode,
            duration_ms = duration.as_millis() as u64,
            "sync complete"
        );
        Ok(SyncOutcome::Applied {
            direction: SyncDirection::GuiToCode,
            duration,
        })
    }

    /// Events the host raised because of our own write. Draining them before the guard drops
    /// is what keeps a write from triggering a sync in the opposite direction.
    fn drop_echoed_events(&mut self, direction: SyncDirection) {
        let echoed = self.host.drain_events();
        if !echoed.is_empty() {
            tracing::debug!(
                %direction,
                count = echoed.len(),
                "dropping events raised during sync"
            );
        }
    }

    fn count_error(&mut self) {
        self.error_count += 1;
        self.metrics.errors += 1;
        if self.error_count >= self.config.max_errors {
            self.code_debounce.cancel();
            self.gui_debounce.cancel();
            self.state.set(SyncState::Paused);
            tracing::warn!(errors = self.error_count, "too many sync errors, pausing");
            self.host.notify(Notification::SyncPaused {
                errors: self.error_count,
            });
        }
    }

    fn record_error(&mut self, err: SyncError) -> SyncOutcome {
        tracing::error!(errors = self.error_count + 1, %err, "sync failed");
        self.count_error();
        SyncOutcome::Failed(err)
    }

    fn report_metrics(&self) {
        let report = self.metrics.report();
        tracing::info!(
            syncs = report.syncs,
            fallbacks = report.fallbacks,
            timeouts = report.timeouts,
            errors = report.errors,
            avg_code_to_gui_ms = report.avg_code_to_gui_ms,
            avg_gui_to_code_ms = report.avg_gui_to_code_ms,
            "sync metrics"
        );
    }
}
