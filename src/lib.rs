//! Step-by-step visualization of the Levenshtein edit-distance matrix.
//!
//! [`levenshtein::compute`] fills the full matrix and records every cell
//! write; [`playback::PlaybackController`] replays that trace on a timer and
//! tells a renderer which cells to highlight. [`session::Session`] ties the
//! two to a pair of inputs. The browser build exports `Visualizer` through
//! `wasm-bindgen`.

pub mod config;
pub mod error;
pub mod export;
pub mod levenshtein;
pub mod playback;
pub mod presets;
pub mod session;
pub mod step;
pub mod view;

#[cfg(not(target_arch = "wasm32"))]
pub mod ticker;

#[cfg(target_arch = "wasm32")]
mod logging;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::Visualizer;

pub use config::VisualizerConfig;
pub use error::{Result, VisualizerError};
pub use levenshtein::{compute, compute_with, Computation, DistanceMatrix, EngineOptions, Granularity};
pub use playback::{Highlight, PlaybackController, PlaybackState, TickScheduler, TickToken};
pub use session::Session;
pub use step::Step;
