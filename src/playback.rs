//! Replays a fill trace one step per timer tick.
//!
//! The controller owns the only mutable state of an animation: the cursor
//! into the trace and the running flag. Time comes from a [`TickScheduler`],
//! which the browser host backs with `setInterval`, the terminal host with a
//! ticker thread and tests with [`ManualScheduler`].
//!
//! Every schedule is stamped with a [`TickToken`]. Cancelling a schedule
//! retires its token, so a tick that was already queued for an old trace is
//! dropped instead of moving the cursor over a new one.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace, warn};
use serde::Serialize;

use crate::error::{Result, VisualizerError};
use crate::step::Step;

/// Generation stamp of one schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickToken(u64);

impl TickToken {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// A cancellable repeating timer.
pub trait TickScheduler {
    type Handle;

    /// Starts delivering `token` every `interval` until cancelled. Fails when
    /// the host has no timer to offer.
    fn schedule(&mut self, interval: Duration, token: TickToken) -> Result<Self::Handle>;

    /// Stops the schedule. No tick may be delivered for it afterwards, apart
    /// from ones already in flight, which the controller discards.
    fn cancel(&mut self, handle: Self::Handle);
}

/// Scheduler whose ticks are fired by the caller.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    active: Option<(Duration, TickToken)>,
    scheduled: Vec<TickToken>,
    cancellations: usize,
    unavailable: bool,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token of the schedule that is currently live, if any.
    pub fn active(&self) -> Option<TickToken> {
        self.active.map(|(_, token)| token)
    }

    pub fn interval(&self) -> Option<Duration> {
        self.active.map(|(interval, _)| interval)
    }

    /// Every token ever scheduled, oldest first.
    pub fn scheduled(&self) -> &[TickToken] {
        &self.scheduled
    }

    pub fn cancellations(&self) -> usize {
        self.cancellations
    }

    /// While set, every `schedule` call fails.
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }
}

impl TickScheduler for ManualScheduler {
    type Handle = TickToken;

    fn schedule(&mut self, interval: Duration, token: TickToken) -> Result<TickToken> {
        if self.unavailable {
            return Err(VisualizerError::Scheduler("manual timer unavailable".to_string()));
        }
        self.active = Some((interval, token));
        self.scheduled.push(token);
        Ok(token)
    }

    fn cancel(&mut self, handle: TickToken) {
        if self.active() == Some(handle) {
            self.active = None;
        }
        self.cancellations += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Idle,
    Running,
    Finished,
}

/// How a matrix cell relates to the step under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    None,
    Current,
    Related,
}

impl Highlight {
    pub fn css_class(self) -> &'static str {
        match self {
            Highlight::None => "",
            Highlight::Current => "current-cell",
            Highlight::Related => "related-cell",
        }
    }
}

pub struct PlaybackController<S: TickScheduler> {
    scheduler: S,
    interval: Duration,
    steps: Arc<[Step]>,
    cursor: usize,
    state: PlaybackState,
    generation: u64,
    pending: Option<S::Handle>,
}

impl<S: TickScheduler> PlaybackController<S> {
    pub fn new(scheduler: S, interval: Duration) -> Self {
        PlaybackController {
            scheduler,
            interval,
            steps: Arc::from(Vec::new()),
            cursor: 0,
            state: PlaybackState::Idle,
            generation: 0,
            pending: None,
        }
    }

    /// Swaps in a new trace. Any running animation is cancelled first.
    pub fn install(&mut self, steps: Arc<[Step]>) {
        self.cancel_pending();
        debug!("installing trace of {} steps", steps.len());
        self.steps = steps;
        self.cursor = 0;
        self.state = PlaybackState::Idle;
    }

    /// Restarts the animation from the first step.
    ///
    /// Returns `false` without doing anything when the trace is empty or an
    /// animation is already running. A one-step trace finishes immediately.
    /// When no timer can be scheduled the controller stays Idle at step 0 and
    /// `false` is returned.
    pub fn start(&mut self) -> bool {
        if self.steps.is_empty() || self.state == PlaybackState::Running {
            return false;
        }
        self.cancel_pending();
        self.cursor = 0;
        if self.last_index() == 0 {
            self.state = PlaybackState::Finished;
            return true;
        }
        let token = TickToken(self.generation);
        match self.scheduler.schedule(self.interval, token) {
            Ok(handle) => self.pending = Some(handle),
            Err(err) => {
                warn!("animation not started: {}", err);
                self.state = PlaybackState::Idle;
                return false;
            }
        }
        self.state = PlaybackState::Running;
        debug!(
            "animation started over {} steps (generation {})",
            self.steps.len(),
            self.generation
        );
        true
    }

    /// Advances the cursor by one step. Stale tokens and ticks outside the
    /// running state are ignored; returns whether the cursor moved.
    pub fn tick(&mut self, token: TickToken) -> bool {
        if token.0 != self.generation || self.state != PlaybackState::Running {
            trace!(
                "ignoring tick of generation {} (current {}, {:?})",
                token.0,
                self.generation,
                self.state
            );
            return false;
        }
        let last = self.last_index();
        let moved = self.cursor < last;
        if moved {
            self.cursor += 1;
        }
        if self.cursor == last {
            self.cancel_pending();
            self.state = PlaybackState::Finished;
            debug!("animation finished at step {}", self.cursor);
        }
        moved
    }

    /// Stops the animation and rewinds to the first step, keeping the trace.
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.cursor = 0;
        self.state = PlaybackState::Idle;
        debug!("animation reset");
    }

    pub fn highlight(&self, i: usize, j: usize) -> Highlight {
        let Some(step) = self.current_step() else {
            return Highlight::None;
        };
        if step.cell() == (i, j) {
            Highlight::Current
        } else if step.reads(i, j) {
            Highlight::Related
        } else {
            Highlight::None
        }
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.steps.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PlaybackState::Running
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
        // retire the old token even if nothing was scheduled
        self.generation = self.generation.wrapping_add(1);
    }
}
