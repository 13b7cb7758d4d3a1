//! The two inputs, their computation and the animation over it.
//!
//! Hosts call the setters whenever they observe new input values; each
//! change recomputes the whole matrix and installs the new trace.

use log::{debug, info};

use crate::config::VisualizerConfig;
use crate::error::Result;
use crate::export;
use crate::levenshtein::{compute_with, Computation};
use crate::playback::{Highlight, PlaybackController, PlaybackState, TickScheduler, TickToken};
use crate::presets;
use crate::view::{MatrixView, PlaybackStatus};

pub struct Session<S: TickScheduler> {
    config: VisualizerConfig,
    source: String,
    target: String,
    computation: Computation,
    playback: PlaybackController<S>,
}

impl<S: TickScheduler> Session<S> {
    /// Starts on the first preset pair. Fails when the config is invalid or
    /// its input limit rejects that pair.
    pub fn new(config: VisualizerConfig, scheduler: S) -> Result<Self> {
        config.validate()?;
        let mut session = Self::with_validated_config(config, scheduler);
        session.select_preset(0)?;
        Ok(session)
    }

    /// An empty pair over a config that already passed
    /// [`VisualizerConfig::validate`]. Callers load the first preset
    /// themselves.
    pub(crate) fn with_validated_config(config: VisualizerConfig, scheduler: S) -> Self {
        let computation = Computation::empty();
        let mut playback = PlaybackController::new(scheduler, config.tick_interval());
        playback.install(computation.steps().clone());
        Session {
            config,
            source: String::new(),
            target: String::new(),
            computation,
            playback,
        }
    }

    /// Recomputes when either string differs from the current pair.
    ///
    /// On error nothing changes: the previous inputs, matrix and trace stay.
    pub fn set_inputs(&mut self, source: &str, target: &str) -> Result<()> {
        if source == self.source && target == self.target {
            return Ok(());
        }
        let computation = compute_with(source, target, &self.config.engine)?;
        info!(
            "distance between {:?} and {:?} is {}",
            source,
            target,
            computation.distance()
        );
        self.playback.install(computation.steps().clone());
        self.source = source.to_string();
        self.target = target.to_string();
        self.computation = computation;
        Ok(())
    }

    pub fn set_source(&mut self, source: &str) -> Result<()> {
        let target = self.target.clone();
        self.set_inputs(source, &target)
    }

    pub fn set_target(&mut self, target: &str) -> Result<()> {
        let source = self.source.clone();
        self.set_inputs(&source, target)
    }

    pub fn select_preset(&mut self, index: usize) -> Result<()> {
        let pair = presets::preset(index)?;
        debug!("selecting preset {:?}", pair.label);
        self.set_inputs(pair.source, pair.target)
    }

    pub fn start(&mut self) -> bool {
        self.playback.start()
    }

    pub fn reset(&mut self) {
        self.playback.reset()
    }

    pub fn tick(&mut self, token: TickToken) -> bool {
        self.playback.tick(token)
    }

    pub fn highlight(&self, i: usize, j: usize) -> Highlight {
        self.playback.highlight(i, j)
    }

    pub fn state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn distance(&self) -> u32 {
        self.computation.distance()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn computation(&self) -> &Computation {
        &self.computation
    }

    pub fn playback(&self) -> &PlaybackController<S> {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackController<S> {
        &mut self.playback
    }

    pub fn matrix_view(&self) -> MatrixView {
        MatrixView::build(&self.computation, &self.playback)
    }

    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus::of(&self.playback)
    }

    pub fn matrix_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.matrix_view())?)
    }

    pub fn status_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.status())?)
    }

    pub fn computation_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.computation)?)
    }

    pub fn trace_ipc_bytes(&self) -> Result<Vec<u8>> {
        export::trace_to_ipc_bytes(self.computation.steps())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VisualizerError;
    use crate::levenshtein::EngineOptions;
    use crate::playback::ManualScheduler;

    fn session() -> Session<ManualScheduler> {
        Session::new(VisualizerConfig::default(), ManualScheduler::new()).unwrap()
    }

    #[test]
    fn starts_on_first_preset() {
        let session = session();
        assert_eq!(session.source(), "Levenshtein");
        assert_eq!(session.target(), "Lavenstaein");
        assert_eq!(session.distance(), 3);
        assert_eq!(session.state(), PlaybackState::Idle);
        assert_eq!(session.playback().len(), 12 + 12 + 121);
    }

    #[test]
    fn input_change_reinstalls_trace() {
        let mut session = session();
        session.start();
        let token = session.playback().scheduler().active().unwrap();
        session.tick(token);
        assert_eq!(session.playback().cursor(), 1);

        session.set_target("Levenshtein").unwrap();
        assert_eq!(session.distance(), 0);
        assert_eq!(session.playback().cursor(), 0);
        assert_eq!(session.state(), PlaybackState::Idle);
        assert!(!session.tick(token));
    }

    #[test]
    fn unchanged_input_keeps_animation() {
        let mut session = session();
        session.start();
        session.set_inputs("Levenshtein", "Lavenstaein").unwrap();
        assert_eq!(session.state(), PlaybackState::Running);
        assert_eq!(session.playback().scheduler().cancellations(), 0);
    }

    #[test]
    fn failed_recompute_keeps_previous_state() {
        let config = VisualizerConfig {
            engine: EngineOptions {
                max_input_units: Some(12),
                ..EngineOptions::default()
            },
            ..VisualizerConfig::default()
        };
        let mut session = Session::new(config, ManualScheduler::new()).unwrap();
        session.select_preset(1).unwrap();
        session.start();

        let err = session.set_source("a much longer source").unwrap_err();
        assert!(matches!(err, VisualizerError::InputTooLarge { .. }));
        assert_eq!(session.source(), "TryHackMe");
        assert_eq!(session.distance(), 4);
        assert_eq!(session.state(), PlaybackState::Running);
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let mut session = session();
        assert!(matches!(
            session.select_preset(9),
            Err(VisualizerError::UnknownPreset(9))
        ));
        assert_eq!(session.source(), "Levenshtein");
    }

    #[test]
    fn limit_below_first_preset_fails_construction() {
        let config = VisualizerConfig {
            engine: EngineOptions {
                max_input_units: Some(10),
                ..EngineOptions::default()
            },
            ..VisualizerConfig::default()
        };
        assert!(matches!(
            Session::new(config, ManualScheduler::new()),
            Err(VisualizerError::InputTooLarge { len: 11, limit: 10, .. })
        ));
    }

    #[test]
    fn timer_failure_keeps_session_idle() {
        let mut session = session();
        session.playback_mut().scheduler_mut().set_unavailable(true);
        assert!(!session.start());
        assert_eq!(session.state(), PlaybackState::Idle);
        assert_eq!(session.status().label, "Step 1 of 145");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = VisualizerConfig {
            tick_interval_ms: 0,
            ..VisualizerConfig::default()
        };
        assert!(Session::new(config, ManualScheduler::new()).is_err());
    }

    #[test]
    fn json_snapshots() {
        let mut session = session();
        session.set_inputs("ab", "b").unwrap();

        let matrix: serde_json::Value = serde_json::from_str(&session.matrix_json().unwrap()).unwrap();
        assert_eq!(matrix["distance"], 1);
        assert_eq!(matrix["column_labels"], serde_json::json!(["b"]));
        assert_eq!(matrix["rows"][0]["cells"][0]["class"], "current-cell");

        let status: serde_json::Value = serde_json::from_str(&session.status_json().unwrap()).unwrap();
        assert_eq!(status["total"], 7);

        let computation: serde_json::Value =
            serde_json::from_str(&session.computation_json().unwrap()).unwrap();
        assert_eq!(computation["matrix"], serde_json::json!([[0, 1], [1, 1], [2, 1]]));
        assert_eq!(computation["steps"][6]["type"], "calculation");
    }
}
