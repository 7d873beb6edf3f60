use std::io::Write;
use std::time::{Duration, Instant};

use viewer_core::{update, AppState, AppViewModel, ImageFormat, Msg, StatusView, ViewKind};
use viewer_engine::EngineHandle;
use viewer_logging::{viewer_debug, viewer_error, viewer_warn};

use super::effects::{Clipboard, EffectRunner};
use super::ui::render::render_changes;

const POLL_INTERVAL: Duration = Duration::from_millis(75);

/// What a single invocation should do once the card is on screen.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub kind: ViewKind,
    pub identifier: String,
    pub copy: bool,
    pub export: Option<ImageFormat>,
    /// Upper bound for each wait: the query, then the export.
    pub wait: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Shown,
    QueryFailed,
    TimedOut,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Shown => 0,
            Outcome::QueryFailed | Outcome::TimedOut => 1,
        }
    }
}

/// Drives the core state machine: dispatches messages, runs effects and
/// prints whatever changed.
struct Dispatcher<'a, C: Clipboard, W: Write> {
    state: AppState,
    runner: EffectRunner<'a, C>,
    out: W,
    rendered: Option<AppViewModel>,
}

impl<C: Clipboard, W: Write> Dispatcher<'_, C, W> {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (next, effects) = update(state, msg);
        self.state = next;
        self.runner.run(effects);
        if self.state.consume_dirty() {
            self.render();
        }
    }

    fn render(&mut self) {
        let view = self.state.view();
        for line in render_changes(self.rendered.as_ref(), &view) {
            if let Err(err) = writeln!(self.out, "{line}") {
                viewer_error!("Failed to write output: {}", err);
                break;
            }
        }
        self.rendered = Some(view);
    }

    /// Feed engine events into the state machine until `done` holds or the
    /// deadline passes. Returns false on timeout.
    fn pump_until(&mut self, deadline: Instant, done: impl Fn(&AppState) -> bool) -> bool {
        while !done(&self.state) {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let wait = POLL_INTERVAL.min(deadline - now);
            match self.runner.next_msg(wait) {
                Some(msg) => self.dispatch(msg),
                None => self.dispatch(Msg::Tick),
            }
        }
        true
    }
}

pub fn run_app(
    engine: &EngineHandle,
    options: RunOptions,
    clipboard: impl Clipboard,
    out: impl Write,
) -> Outcome {
    let mut dispatcher = Dispatcher {
        state: AppState::new(options.kind),
        runner: EffectRunner::new(engine, clipboard, options.kind),
        out,
        rendered: None,
    };

    dispatcher.dispatch(Msg::InputChanged(options.identifier.clone()));
    dispatcher.dispatch(Msg::Submitted);

    let loaded = dispatcher.pump_until(Instant::now() + options.wait, |state| {
        state.view().status != StatusView::Loading
    });
    if !loaded {
        viewer_warn!("No response for '{}' within {:?}", options.identifier, options.wait);
        return Outcome::TimedOut;
    }

    if let StatusView::Error { message } = dispatcher.state.view().status {
        viewer_debug!("Query failed: {}", message);
        return Outcome::QueryFailed;
    }

    if options.copy {
        dispatcher.dispatch(Msg::CopyClicked);
    }

    if let Some(format) = options.export {
        dispatcher.dispatch(Msg::ExportClicked { format });
        let finished = dispatcher.pump_until(Instant::now() + options.wait, |state| {
            !state.is_exporting()
        });
        if !finished {
            viewer_warn!("Export did not finish within {:?}", options.wait);
        }
    }

    Outcome::Shown
}
