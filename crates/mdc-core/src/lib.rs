//! Device slots and interrupt-driven processing for MIDI-controlled actuators.
//!
//! # Primary API
//!
//! - [`DeviceScheduler`]: Fixed-capacity device table, duration watchdog and
//!   processing lifecycle
//! - [`DeviceSlot`] / [`Device`]: Per-device note state shared with the tick handler
//! - [`Actuator`]: Hardware output behind one slot
//! - [`Timer`] / [`Clock`]: Host abstractions for the periodic interrupt and
//!   millisecond time
//!
//! # Example
//!
//! ```ignore
//! use mdc_core::*;
//!
//! let mut scheduler = DeviceScheduler::new(
//!     SchedulerConfig::default(),
//!     Box::new(ThreadTimer::new()),
//!     Arc::new(SystemClock::new()),
//! )?;
//! scheduler.add_device(0, Box::new(NullActuator))?;
//!
//! scheduler.assign_note(0, 60);
//! loop {
//!     scheduler.reset_processing();
//! }
//! ```

pub mod compat;

pub mod error;
pub use error::{Error, Result};

mod config;
pub use config::{
    SchedulerConfig, DEFAULT_IDLE_TIMEOUT_MS, DEFAULT_MAX_DURATION_MS, DEFAULT_RESOLUTION_US,
    MAX_DEVICES,
};

mod lockfree;
pub use lockfree::{AtomicFlag, AtomicMillis};

mod actuator;
pub use actuator::{ActivityIndicator, Actuator, NullActuator};

mod clock;
pub use clock::{Clock, ManualClock, SystemClock};

mod timer;
pub use timer::{ManualTimer, ThreadTimer, TickHandler, Timer};

mod device;
pub use device::{Device, DeviceSlot, NoteState, MAX_NOTE};

mod scheduler;
pub use scheduler::{
    DeviceScheduler, DeviceStatus, ProcessingEvent, ProcessingFsm, ProcessingState,
    SchedulerStatus, Transition,
};

pub use compat::Arc;
