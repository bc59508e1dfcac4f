//! # MDC - MIDI Device Controller
//!
//! Drives a small, fixed set of note-producing actuators (solenoids, buzzers,
//! stepper drives) from a MIDI byte stream.
//!
//! ## Architecture
//!
//! MDC is an umbrella crate that coordinates:
//! - **mdc-core** - Device slots, timer-driven scheduler, duration watchdog, idle shutdown
//! - **mdc-chain** - Voice allocation chains (direct, first-available, round-robin)
//! - **mdc-midi** - Running-status parser, handler dispatch, serial polling
//!
//! ```text
//! bytes → NoteEventParser → ChannelRouting → ChainRegistry / DeviceScheduler → DeviceSlot → Actuator
//!                                                   timer tick → DeviceScheduler (watchdog)
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use mdc::prelude::*;
//!
//! let mut mdc = MidiDeviceController::builder().build()?;
//! mdc.add_devices(buzzers);
//! mdc.create_chain(0, ChainType::RoundRobin, &[0, 1, 2, 3])?;
//!
//! let (mut uart, mut rx) = serial_buffer(256);
//! loop {
//!     mdc.poll(&mut rx);
//! }
//! ```

/// Re-export of mdc-core for direct access
pub use mdc_core as core;

/// Re-export of mdc-chain for direct access
pub use mdc_chain as chain;

/// Re-export of mdc-midi for direct access
pub use mdc_midi as midi;

pub use mdc_core::{
    ActivityIndicator,
    Actuator,
    Arc,
    Clock,
    Device,
    DeviceScheduler,
    DeviceSlot,
    ManualClock,
    ManualTimer,
    NullActuator,
    ProcessingState,
    SchedulerConfig,
    SchedulerStatus,
    SystemClock,
    ThreadTimer,
    Timer,
    Transition,
    MAX_DEVICES,
};

pub use mdc_chain::{ChainRegistry, ChainType, DeviceChain, RegistryStatus, MAX_CHAINS};

pub use mdc_midi::{
    serial_buffer, ByteSource, Handlers, MidiSerial, NoteEvent, NoteEventParser, NoteHandler,
};

mod builder;
mod controller;
mod error;
mod routing;

pub use builder::MdcBuilder;
pub use controller::{ControllerStatus, MidiDeviceController};
pub use error::{Error, Result};
pub use routing::{ChannelRouting, Route, CHANNELS};

/// Convenience prelude for common imports
pub mod prelude {
    // Main controller
    pub use crate::{MdcBuilder, MidiDeviceController};

    // Routing
    pub use crate::{ChannelRouting, Route};

    // Hardware seams
    pub use crate::core::{ActivityIndicator, Actuator, Arc, Clock, Timer};

    // Chains
    pub use crate::chain::ChainType;

    // MIDI input
    pub use crate::midi::{serial_buffer, ByteSource, MidiSerial, NoteHandler};
}
