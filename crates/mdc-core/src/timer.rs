//! Periodic timer abstraction.
//!
//! On a microcontroller a [`Timer`] wraps the hardware timer peripheral and
//! runs the [`TickHandler`] from its interrupt. On a host, [`ThreadTimer`]
//! ticks from a dedicated thread and [`ManualTimer`] ticks only when told to.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};

use crate::compat::{Arc, Mutex};

/// Callback run once per timer period.
///
/// Runs in interrupt context: must be short, must not block, must not allocate.
pub trait TickHandler: Send + Sync {
    fn on_tick(&self);
}

/// Timer peripheral.
pub trait Timer: Send {
    /// Start calling `handler` every `interval_us` microseconds.
    ///
    /// Attaching while already attached replaces the previous handler and interval.
    fn attach(&mut self, interval_us: u32, handler: Arc<dyn TickHandler>);

    /// Stop calling the handler. No-op when not attached.
    fn detach(&mut self);

    fn is_attached(&self) -> bool;
}

#[derive(Default)]
struct ManualTimerState {
    interval_us: Option<u32>,
    handler: Option<Arc<dyn TickHandler>>,
    attach_count: usize,
}

/// Timer that only ticks when [`fire`](ManualTimer::fire) is called.
///
/// Clones share state, so a host can hand one clone to the scheduler and keep
/// another to drive ticks.
#[derive(Clone, Default)]
pub struct ManualTimer {
    inner: Arc<Mutex<ManualTimerState>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the attached handler once. Returns false if nothing is attached.
    pub fn fire(&self) -> bool {
        // Clone out so the handler never runs under our lock
        let handler = self.inner.lock().handler.clone();
        match handler {
            Some(handler) => {
                handler.on_tick();
                true
            }
            None => false,
        }
    }

    /// Run the attached handler `count` times. Returns the number of ticks delivered.
    pub fn fire_n(&self, count: usize) -> usize {
        (0..count).take_while(|_| self.fire()).count()
    }

    /// Interval of the current attachment.
    pub fn interval_us(&self) -> Option<u32> {
        self.inner.lock().interval_us
    }

    /// Total number of `attach` calls so far.
    pub fn attach_count(&self) -> usize {
        self.inner.lock().attach_count
    }
}

impl Timer for ManualTimer {
    fn attach(&mut self, interval_us: u32, handler: Arc<dyn TickHandler>) {
        let mut state = self.inner.lock();
        state.interval_us = Some(interval_us);
        state.handler = Some(handler);
        state.attach_count += 1;
    }

    fn detach(&mut self) {
        let mut state = self.inner.lock();
        state.interval_us = None;
        state.handler = None;
    }

    fn is_attached(&self) -> bool {
        self.inner.lock().handler.is_some()
    }
}

struct TimerWorker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Timer backed by a dedicated std thread.
#[derive(Default)]
pub struct ThreadTimer {
    worker: Option<TimerWorker>,
}

impl ThreadTimer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Timer for ThreadTimer {
    fn attach(&mut self, interval_us: u32, handler: Arc<dyn TickHandler>) {
        self.detach();

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let interval = Duration::from_micros(u64::from(interval_us));

        let spawned = thread::Builder::new()
            .name("mdc-tick".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => handler.on_tick(),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            });

        match spawned {
            Ok(handle) => {
                tracing::debug!("Tick thread attached at {}us", interval_us);
                self.worker = Some(TimerWorker { stop_tx, handle });
            }
            Err(e) => tracing::warn!("Failed to spawn tick thread: {}", e),
        }
    }

    fn detach(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            let _ = worker.handle.join();
            tracing::debug!("Tick thread detached");
        }
    }

    fn is_attached(&self) -> bool {
        self.worker.is_some()
    }
}

impl Drop for ThreadTimer {
    fn drop(&mut self) {
        self.detach();
    }
}
