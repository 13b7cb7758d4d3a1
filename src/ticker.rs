//! Thread-backed tick scheduler for native hosts.
//!
//! Each schedule gets its own thread that forwards `crossbeam_channel::tick`
//! events as tokens on a shared channel. The host owns the receiving end and
//! feeds every token back into the session on its own thread, so the
//! session itself is never shared.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use log::{trace, warn};

use crate::error::{Result, VisualizerError};
use crate::playback::{TickScheduler, TickToken};

pub struct ThreadTicker {
    tx: Sender<TickToken>,
}

pub struct TickerHandle {
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

impl ThreadTicker {
    /// The receiver yields tokens from every schedule made by this ticker.
    pub fn new() -> (Self, Receiver<TickToken>) {
        let (tx, rx) = unbounded();
        (ThreadTicker { tx }, rx)
    }
}

impl TickScheduler for ThreadTicker {
    type Handle = TickerHandle;

    fn schedule(&mut self, interval: Duration, token: TickToken) -> Result<TickerHandle> {
        let (stop, stop_rx) = bounded::<()>(1);
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("ticker-{}", token.generation()))
            .spawn(move || {
                let ticks = crossbeam_channel::tick(interval);
                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticks) -> _ => {
                            if tx.send(token).is_err() {
                                break;
                            }
                        }
                    }
                }
                trace!("ticker thread for generation {} stopped", token.generation());
            });
        let thread = spawned.map_err(|e| VisualizerError::Scheduler(e.to_string()))?;
        Ok(TickerHandle { stop, thread })
    }

    fn cancel(&mut self, handle: TickerHandle) {
        let _ = handle.stop.send(());
        // joined so nothing is sent for this schedule once cancel returns
        if handle.thread.join().is_err() {
            warn!("ticker thread panicked");
        }
    }
}
