//! Test helpers and fixtures for MDC integration tests
//!
//! Devices record every output call, the timer fires only when told to and the
//! clock only moves when advanced, so each test controls time completely.

#![allow(dead_code)]

use mdc::core::compat::Mutex;
use mdc::prelude::*;
use mdc::{Device, ManualClock, ManualTimer};

/// Tick interval used by the rig (1ms, so tick counts read as milliseconds)
pub const TEST_RESOLUTION_US: u32 = 1_000;

/// Watchdog ceiling used by the rig
pub const TEST_MAX_DURATION_MS: u32 = 50;

/// Idle shutdown used by the rig
pub const TEST_IDLE_TIMEOUT_MS: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    On(u8),
    Off,
    Bend(u16),
    Reset,
    Calibrate,
}

/// Shared record of `(device, output)` calls in order.
#[derive(Clone, Default)]
pub struct OutputLog(Arc<Mutex<Vec<(usize, Output)>>>);

impl OutputLog {
    pub fn actuator(&self, device: usize) -> Box<dyn Actuator> {
        Box::new(RecordingActuator {
            device,
            log: self.clone(),
        })
    }

    pub fn take(&self) -> Vec<(usize, Output)> {
        std::mem::take(&mut *self.0.lock())
    }

    pub fn for_device(&self, device: usize) -> Vec<Output> {
        self.0
            .lock()
            .iter()
            .filter(|(d, _)| *d == device)
            .map(|(_, o)| *o)
            .collect()
    }

    fn push(&self, device: usize, output: Output) {
        self.0.lock().push((device, output));
    }
}

struct RecordingActuator {
    device: usize,
    log: OutputLog,
}

impl Actuator for RecordingActuator {
    fn note_on(&mut self, note: u8) {
        self.log.push(self.device, Output::On(note));
    }

    fn note_off(&mut self) {
        self.log.push(self.device, Output::Off);
    }

    fn pitch_bend(&mut self, bend: u16) {
        self.log.push(self.device, Output::Bend(bend));
    }

    fn reset(&mut self) {
        self.log.push(self.device, Output::Reset);
    }

    fn calibrate(&mut self) {
        self.log.push(self.device, Output::Calibrate);
    }
}

/// Controller with recording devices and manual time.
pub struct TestRig {
    pub mdc: MidiDeviceController,
    pub timer: ManualTimer,
    pub clock: Arc<ManualClock>,
    pub log: OutputLog,
}

impl TestRig {
    /// Note currently held by each device slot in `0..count`.
    pub fn notes(&self, count: usize) -> Vec<Option<u8>> {
        (0..count)
            .map(|i| self.mdc.device(i).and_then(|d| d.current_note()))
            .collect()
    }
}

/// Create a rig with `devices` recording devices at slots `0..devices`.
pub fn test_rig(devices: usize) -> TestRig {
    let timer = ManualTimer::new();
    let clock = Arc::new(ManualClock::new(0));
    let log = OutputLog::default();

    let mut mdc = MidiDeviceController::builder()
        .resolution_us(TEST_RESOLUTION_US)
        .max_duration_ms(TEST_MAX_DURATION_MS)
        .idle_timeout_ms(TEST_IDLE_TIMEOUT_MS)
        .timer(timer.clone())
        .clock(clock.clone())
        .build()
        .expect("Failed to create test controller");

    let added = mdc.add_devices((0..devices).map(|i| log.actuator(i)));
    assert_eq!(added, devices);

    TestRig {
        mdc,
        timer,
        clock,
        log,
    }
}

/// Rig with one round-robin chain at slot 0 over every device.
pub fn round_robin_rig(devices: usize) -> TestRig {
    let mut rig = test_rig(devices);
    let members: Vec<usize> = (0..devices).collect();
    rig.mdc
        .create_chain(0, ChainType::RoundRobin, &members)
        .expect("Failed to create chain");
    rig
}
