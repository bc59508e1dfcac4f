//! Device table and interrupt-driven processing loop.
//!
//! # Contexts
//!
//! - **Main loop**: every `&mut self` method, plus note assignment through
//!   [`Device`]. Call [`DeviceScheduler::reset_processing`] once per iteration.
//! - **Interrupt**: the tick handler attached to the [`Timer`]. It only reads the
//!   published enabled-device list and updates per-device atomics.
//!
//! # Processing lifecycle
//!
//! ```text
//!            start_processing() / pending start seen by reset_processing()
//!   ┌──────┐ ───────────────────────────────────────────────────────────→ ┌────────┐
//!   │ Idle │                                                              │ Active │
//!   └──────┘ ←─────────────────────────────────────────────────────────── └────────┘
//!            stop_processing() / idle timeout seen by reset_processing()
//! ```
//!
//! A note assignment while idle never attaches the timer directly; it arms a
//! pending start that the next main-loop poll performs.

mod activity;
mod fsm;
mod status;
mod tick;

pub(crate) use activity::Activity;
pub use fsm::{ProcessingEvent, ProcessingFsm, ProcessingState, Transition};
pub use status::{DeviceStatus, SchedulerStatus};

use tick::TickContext;

use crate::compat::Arc;
use crate::config::{validate_max_duration, validate_resolution};
use crate::{
    ActivityIndicator, Actuator, Clock, Device, DeviceSlot, Error, Result, SchedulerConfig, Timer,
};

/// Fixed-capacity device table plus the processing loop that drives it.
pub struct DeviceScheduler {
    devices: Vec<Option<Arc<DeviceSlot>>>,
    fsm: ProcessingFsm,
    activity: Arc<Activity>,
    tick: Arc<TickContext>,
    timer: Box<dyn Timer>,
    indicator: Option<Box<dyn ActivityIndicator>>,
    resolution_us: u32,
    idle_timeout_ms: u32,
}

impl DeviceScheduler {
    pub fn new(config: SchedulerConfig, timer: Box<dyn Timer>, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            devices: vec![None; config.max_devices],
            fsm: ProcessingFsm::new(),
            activity: Arc::new(Activity::new(clock, config.auto_processing)),
            tick: Arc::new(TickContext::new(config.resolution_us, config.max_duration_ms)),
            timer,
            indicator: None,
            resolution_us: config.resolution_us,
            idle_timeout_ms: config.idle_timeout_ms,
        })
    }

    /// Status light driven on start/stop.
    pub fn set_activity_indicator(&mut self, mut indicator: Box<dyn ActivityIndicator>) {
        indicator.set_active(self.is_processing());
        self.indicator = Some(indicator);
    }

    // ------------------------------------------------------------------
    // Device table
    // ------------------------------------------------------------------

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.devices.len() {
            return Err(Error::SlotOutOfRange {
                index,
                capacity: self.devices.len(),
            });
        }
        Ok(())
    }

    /// Install an actuator at `index`.
    ///
    /// Fails without mutation if the index is out of range or occupied.
    pub fn add_device(&mut self, index: usize, actuator: Box<dyn Actuator>) -> Result<Arc<DeviceSlot>> {
        if let Err(e) = self.check_index(index) {
            tracing::warn!("Can't add device: {}", e);
            return Err(e);
        }
        if self.devices[index].is_some() {
            tracing::warn!("Device already exists at index {}", index);
            return Err(Error::SlotOccupied(index));
        }

        let slot = Arc::new(DeviceSlot::new(index, actuator, self.activity.clone()));
        self.devices[index] = Some(slot.clone());
        self.reload_enabled_devices();
        tracing::debug!("Added device at index {}", index);
        Ok(slot)
    }

    /// Install actuators at consecutive slots from 0. Returns the number added.
    pub fn add_devices<I>(&mut self, actuators: I) -> usize
    where
        I: IntoIterator<Item = Box<dyn Actuator>>,
    {
        let capacity = self.devices.len();
        let mut added = 0;
        for (index, actuator) in actuators.into_iter().take(capacity).enumerate() {
            if self.add_device(index, actuator).is_ok() {
                added += 1;
            }
        }
        added
    }

    /// Shared handle to the device at `index`, if populated.
    pub fn device(&self, index: usize) -> Option<Arc<DeviceSlot>> {
        self.devices.get(index).and_then(|slot| slot.clone())
    }

    /// Silence and remove the device at `index`. Returns false if nothing was there.
    ///
    /// Chains that referenced the device stop seeing it immediately.
    pub fn delete_device(&mut self, index: usize) -> bool {
        let Some(slot) = self.devices.get_mut(index) else {
            tracing::debug!("Max device index is {}", self.devices.len().saturating_sub(1));
            return false;
        };

        match slot.take() {
            Some(device) => {
                device.mark_removed();
                self.reload_enabled_devices();
                device.force_clear();
                tracing::debug!("Deleted device at {}", index);
                true
            }
            None => {
                tracing::debug!("No device at {}", index);
                false
            }
        }
    }

    /// Recompute the working set scanned by the tick handler.
    ///
    /// Main loop only; publishing is lock-free for a tick in progress.
    pub fn reload_enabled_devices(&self) -> usize {
        let enabled: Vec<Arc<DeviceSlot>> = self.devices.iter().flatten().cloned().collect();
        let count = enabled.len();
        self.tick.publish(enabled);
        count
    }

    pub fn enabled_count(&self) -> usize {
        self.tick.enabled_count()
    }

    pub fn device_count(&self) -> usize {
        self.devices.iter().flatten().count()
    }

    /// Iterate over populated slots.
    pub fn devices(&self) -> impl Iterator<Item = &Arc<DeviceSlot>> {
        self.devices.iter().flatten()
    }

    // ------------------------------------------------------------------
    // Note lifecycle by device slot
    // ------------------------------------------------------------------

    pub fn assign_note(&self, index: usize, note: u8) -> bool {
        self.device(index).is_some_and(|d| d.try_assign(note))
    }

    pub fn clear_note(&self, index: usize, note: u8) -> bool {
        self.device(index).is_some_and(|d| d.try_clear(note))
    }

    pub fn pitch_bend(&self, index: usize, bend: u16) -> bool {
        match self.device(index) {
            Some(device) => {
                device.pitch_bend(bend);
                true
            }
            None => false,
        }
    }

    pub fn reset_positions(&self) {
        for device in self.devices() {
            device.reset();
        }
    }

    pub fn calibrate_positions(&self) {
        for device in self.devices() {
            device.calibrate();
        }
    }

    // ------------------------------------------------------------------
    // Processing
    // ------------------------------------------------------------------

    /// Attach the tick handler. Returns false if already active.
    pub fn start_processing(&mut self) -> bool {
        if self.fsm.transition(ProcessingEvent::Start) != Transition::Started {
            return false;
        }
        self.enter_active();
        true
    }

    /// Detach the timer immediately and silence every device.
    ///
    /// Unconditional: in-flight assignments are dropped rather than drained.
    pub fn stop_processing(&mut self) {
        let transition = self.fsm.transition(ProcessingEvent::Stop);
        self.enter_idle();
        if transition == Transition::Stopped {
            tracing::debug!("Processing stopped");
        }
    }

    /// Main-loop poll. Performs a pending auto start or an idle shutdown.
    pub fn reset_processing(&mut self) -> Transition {
        for device in self.devices.iter().flatten() {
            device.sync_output();
        }

        if self.activity.pending_start.swap(false)
            && self.activity.auto_processing.get()
            && self.fsm.transition(ProcessingEvent::PendingStart) == Transition::Started
        {
            self.enter_active();
            return Transition::Started;
        }

        if self.fsm.state() == ProcessingState::Active
            && self.idle_timeout_ms > 0
            && self.activity.idle_for_ms() >= u64::from(self.idle_timeout_ms)
            && self.fsm.transition(ProcessingEvent::IdleTimeout) == Transition::Stopped
        {
            self.enter_idle();
            tracing::debug!("Processing stopped after {}ms idle", self.idle_timeout_ms);
            return Transition::Stopped;
        }

        Transition::None
    }

    fn enter_active(&mut self) {
        self.activity.touch();
        self.activity.pending_start.set(false);
        self.timer.attach(self.resolution_us, self.tick.clone());
        self.activity.processing.set(true);
        if let Some(indicator) = self.indicator.as_mut() {
            indicator.set_active(true);
        }
        tracing::debug!("Processing started at {}us resolution", self.resolution_us);
    }

    fn enter_idle(&mut self) {
        self.timer.detach();
        self.activity.processing.set(false);
        self.activity.pending_start.set(false);
        for device in self.devices.iter().flatten() {
            device.force_clear();
        }
        if let Some(indicator) = self.indicator.as_mut() {
            indicator.set_active(false);
        }
    }

    pub fn is_processing(&self) -> bool {
        self.fsm.state() == ProcessingState::Active
    }

    pub fn processing_state(&self) -> ProcessingState {
        self.fsm.state()
    }

    pub fn is_auto_processing(&self) -> bool {
        self.activity.auto_processing.get()
    }

    pub fn is_start_pending(&self) -> bool {
        self.activity.pending_start.get()
    }

    /// Milliseconds since the last note assignment (or start).
    pub fn idle_for_ms(&self) -> u64 {
        self.activity.idle_for_ms()
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Change the tick interval. Re-attaches the timer when active.
    pub fn set_resolution(&mut self, resolution_us: u32) -> Result<()> {
        validate_resolution(resolution_us)?;
        self.resolution_us = resolution_us;
        self.tick.set_resolution_us(resolution_us);

        if self.is_processing() {
            self.timer.detach();
            self.timer.attach(resolution_us, self.tick.clone());
        }
        Ok(())
    }

    /// Takes effect on the next tick.
    pub fn set_max_duration(&self, max_duration_ms: u32) -> Result<()> {
        validate_max_duration(max_duration_ms)?;
        self.tick.set_max_duration_ms(max_duration_ms);
        Ok(())
    }

    /// 0 disables idle shutdown.
    pub fn set_idle_timeout(&mut self, idle_timeout_ms: u32) {
        self.idle_timeout_ms = idle_timeout_ms;
    }

    pub fn set_auto_process(&self, enabled: bool) {
        self.activity.auto_processing.set(enabled);
        if !enabled {
            self.activity.pending_start.set(false);
        }
    }

    pub fn max_devices(&self) -> usize {
        self.devices.len()
    }

    pub fn max_duration_ms(&self) -> u32 {
        self.tick.max_duration_ms()
    }

    pub fn resolution_us(&self) -> u32 {
        self.resolution_us
    }

    pub fn idle_timeout_ms(&self) -> u32 {
        self.idle_timeout_ms
    }

    /// Ticks handled since construction.
    pub fn tick_count(&self) -> u64 {
        self.tick.ticks()
    }

    /// Assignments cleared by the duration watchdog since construction.
    pub fn expiration_count(&self) -> u64 {
        self.tick.expirations()
    }

    // ------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            state: self.fsm.state(),
            auto_processing: self.is_auto_processing(),
            pending_start: self.is_start_pending(),
            resolution_us: self.resolution_us,
            max_duration_ms: self.max_duration_ms(),
            idle_timeout_ms: self.idle_timeout_ms,
            ticks: self.tick.ticks(),
            expirations: self.tick.expirations(),
            slots: self
                .devices
                .iter()
                .enumerate()
                .map(|(index, slot)| {
                    slot.as_ref().map(|device| {
                        let state = device.state();
                        DeviceStatus {
                            index,
                            note: state.note,
                            elapsed_us: state.elapsed_us,
                            enabled: self.tick.is_enabled(index),
                        }
                    })
                })
                .collect(),
        }
    }

    pub fn log_status(&self) {
        tracing::info!("{}", self.status());
    }
}

impl Drop for DeviceScheduler {
    fn drop(&mut self) {
        self.timer.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::{AtomicU32, Ordering};
    use crate::{ManualClock, ManualTimer, NullActuator};

    #[derive(Default)]
    struct Counts {
        on: AtomicU32,
        off: AtomicU32,
        reset: AtomicU32,
    }

    struct Counting(Arc<Counts>);

    impl Actuator for Counting {
        fn note_on(&mut self, _note: u8) {
            self.0.on.fetch_add(1, Ordering::Relaxed);
        }
        fn note_off(&mut self) {
            self.0.off.fetch_add(1, Ordering::Relaxed);
        }
        fn reset(&mut self) {
            self.0.reset.fetch_add(1, Ordering::Relaxed);
        }
    }

    struct Led(Arc<AtomicU32>);

    impl ActivityIndicator for Led {
        fn set_active(&mut self, active: bool) {
            self.0.store(u32::from(active), Ordering::Relaxed);
        }
    }

    fn scheduler(config: SchedulerConfig) -> (DeviceScheduler, ManualTimer, Arc<ManualClock>) {
        let timer = ManualTimer::new();
        let clock = Arc::new(ManualClock::new(1_000));
        let scheduler =
            DeviceScheduler::new(config, Box::new(timer.clone()), clock.clone()).unwrap();
        (scheduler, timer, clock)
    }

    fn small() -> SchedulerConfig {
        SchedulerConfig {
            max_devices: 4,
            resolution_us: 1_000,
            max_duration_ms: 5,
            idle_timeout_ms: 100,
            auto_processing: true,
        }
    }

    #[test]
    fn test_add_device_bounds_and_occupancy() {
        let (mut sched, _, _) = scheduler(small());

        assert!(sched.add_device(0, Box::new(NullActuator)).is_ok());
        assert_eq!(
            sched.add_device(0, Box::new(NullActuator)).unwrap_err(),
            Error::SlotOccupied(0)
        );
        assert_eq!(
            sched.add_device(4, Box::new(NullActuator)).unwrap_err(),
            Error::SlotOutOfRange {
                index: 4,
                capacity: 4
            }
        );
        assert_eq!(sched.device_count(), 1);
        assert_eq!(sched.enabled_count(), 1);
    }

    #[test]
    fn test_add_devices_fills_from_zero() {
        let (mut sched, _, _) = scheduler(small());
        let actuators: Vec<Box<dyn Actuator>> = (0..6).map(|_| Box::new(NullActuator) as _).collect();

        assert_eq!(sched.add_devices(actuators), 4);
        assert_eq!(sched.device_count(), 4);
    }

    #[test]
    fn test_delete_device_silences_and_unpublishes() {
        let (mut sched, _, _) = scheduler(small());
        let counts = Arc::new(Counts::default());
        sched.add_device(1, Box::new(Counting(counts.clone()))).unwrap();

        assert!(sched.assign_note(1, 60));
        assert!(sched.delete_device(1));
        assert_eq!(counts.off.load(Ordering::Relaxed), 1);
        assert_eq!(sched.enabled_count(), 0);
        assert!(sched.device(1).is_none());

        assert!(!sched.delete_device(1));
        assert!(!sched.delete_device(99));
    }

    #[test]
    fn test_deleted_device_stays_silent_through_kept_handle() {
        let (mut sched, _, _) = scheduler(small());
        let counts = Arc::new(Counts::default());
        let kept = sched.add_device(0, Box::new(Counting(counts.clone()))).unwrap();

        assert!(sched.delete_device(0));
        assert!(kept.is_removed());
        assert!(!kept.is_available());
        assert!(!kept.try_assign(60));
        assert_eq!(kept.current_note(), None);
        assert_eq!(counts.on.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_out_of_range_note_ops_are_noops() {
        let (sched, _, _) = scheduler(small());
        assert!(!sched.assign_note(9, 60));
        assert!(!sched.clear_note(9, 60));
        assert!(!sched.pitch_bend(9, 0x2000));
        assert!(sched.device(9).is_none());
    }

    #[test]
    fn test_assignment_defers_start_to_main_loop() {
        let (mut sched, timer, _) = scheduler(small());
        sched.add_device(0, Box::new(NullActuator)).unwrap();

        assert!(sched.assign_note(0, 60));
        assert!(!sched.is_processing());
        assert!(sched.is_start_pending());
        assert!(!timer.is_attached());

        assert_eq!(sched.reset_processing(), Transition::Started);
        assert!(sched.is_processing());
        assert!(timer.is_attached());
        assert_eq!(timer.interval_us(), Some(1_000));
        assert!(!sched.is_start_pending());
    }

    #[test]
    fn test_manual_mode_never_arms_start() {
        let (mut sched, _, _) = scheduler(SchedulerConfig {
            auto_processing: false,
            ..small()
        });
        sched.add_device(0, Box::new(NullActuator)).unwrap();
        sched.assign_note(0, 60);

        assert!(!sched.is_start_pending());
        assert_eq!(sched.reset_processing(), Transition::None);
        assert!(!sched.is_processing());
    }

    #[test]
    fn test_tick_clears_device_past_max_duration() {
        let (mut sched, timer, _) = scheduler(small());
        let counts = Arc::new(Counts::default());
        sched.add_device(0, Box::new(Counting(counts.clone()))).unwrap();
        sched.start_processing();

        sched.assign_note(0, 60);
        // 5 ticks of 1ms reach the 5ms ceiling exactly; still held
        timer.fire_n(5);
        assert_eq!(sched.device(0).unwrap().current_note(), Some(60));

        // Next tick pushes past it
        timer.fire();
        assert!(sched.device(0).unwrap().is_available());
        assert_eq!(counts.off.load(Ordering::Relaxed), 1);
        assert_eq!(sched.expiration_count(), 1);
        assert_eq!(sched.tick_count(), 6);
    }

    #[test]
    fn test_idle_timeout_stops_processing() {
        let (mut sched, timer, clock) = scheduler(small());
        let counts = Arc::new(Counts::default());
        sched.add_device(0, Box::new(Counting(counts.clone()))).unwrap();

        sched.assign_note(0, 60);
        sched.reset_processing();
        assert!(sched.is_processing());

        clock.advance(99);
        assert_eq!(sched.reset_processing(), Transition::None);

        clock.advance(1);
        assert_eq!(sched.reset_processing(), Transition::Stopped);
        assert!(!sched.is_processing());
        assert!(!timer.is_attached());
        // Outputs fail safe to off
        assert!(sched.device(0).unwrap().is_available());
        assert_eq!(counts.off.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_zero_idle_timeout_never_stops() {
        let (mut sched, _, clock) = scheduler(SchedulerConfig {
            idle_timeout_ms: 0,
            ..small()
        });
        sched.start_processing();
        clock.advance(1_000_000);
        assert_eq!(sched.reset_processing(), Transition::None);
        assert!(sched.is_processing());
    }

    #[test]
    fn test_stop_is_immediate_and_unconditional() {
        let (mut sched, timer, _) = scheduler(small());
        sched.add_device(0, Box::new(NullActuator)).unwrap();
        sched.add_device(1, Box::new(NullActuator)).unwrap();
        sched.start_processing();
        sched.assign_note(0, 60);
        sched.assign_note(1, 62);

        sched.stop_processing();
        assert!(!timer.is_attached());
        assert!(sched.devices().all(|d| d.is_available()));

        // Stopping while idle is harmless
        sched.stop_processing();
        assert!(!sched.is_processing());
    }

    #[test]
    fn test_start_twice_returns_false() {
        let (mut sched, timer, _) = scheduler(small());
        assert!(sched.start_processing());
        assert!(!sched.start_processing());
        assert_eq!(timer.attach_count(), 1);
    }

    #[test]
    fn test_set_resolution_reattaches_when_active() {
        let (mut sched, timer, _) = scheduler(small());

        sched.set_resolution(500).unwrap();
        assert_eq!(timer.attach_count(), 0);

        sched.start_processing();
        sched.set_resolution(250).unwrap();
        assert_eq!(timer.interval_us(), Some(250));
        assert_eq!(timer.attach_count(), 2);
        assert_eq!(sched.resolution_us(), 250);

        assert!(sched.set_resolution(0).is_err());
        assert_eq!(sched.resolution_us(), 250);
    }

    #[test]
    fn test_set_max_duration_applies_to_running_assignment() {
        let (mut sched, timer, _) = scheduler(small());
        sched.add_device(0, Box::new(NullActuator)).unwrap();
        sched.start_processing();
        sched.assign_note(0, 60);

        timer.fire_n(3);
        sched.set_max_duration(2).unwrap();
        assert_eq!(sched.max_duration_ms(), 2);
        timer.fire();
        assert!(sched.device(0).unwrap().is_available());

        assert!(sched.set_max_duration(0).is_err());
    }

    #[test]
    fn test_disabling_auto_process_drops_pending_start() {
        let (mut sched, _, _) = scheduler(small());
        sched.add_device(0, Box::new(NullActuator)).unwrap();
        sched.assign_note(0, 60);
        assert!(sched.is_start_pending());

        sched.set_auto_process(false);
        assert!(!sched.is_start_pending());
        assert_eq!(sched.reset_processing(), Transition::None);
    }

    #[test]
    fn test_indicator_follows_processing() {
        let (mut sched, _, _) = scheduler(small());
        let led = Arc::new(AtomicU32::new(7));
        sched.set_activity_indicator(Box::new(Led(led.clone())));
        assert_eq!(led.load(Ordering::Relaxed), 0);

        sched.start_processing();
        assert_eq!(led.load(Ordering::Relaxed), 1);
        sched.stop_processing();
        assert_eq!(led.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_reset_positions_reaches_every_device() {
        let (mut sched, _, _) = scheduler(small());
        let counts = Arc::new(Counts::default());
        sched.add_device(0, Box::new(Counting(counts.clone()))).unwrap();
        sched.add_device(2, Box::new(Counting(counts.clone()))).unwrap();

        sched.reset_positions();
        assert_eq!(counts.reset.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_status_report() {
        let (mut sched, _, _) = scheduler(small());
        sched.add_device(0, Box::new(NullActuator)).unwrap();
        sched.add_device(2, Box::new(NullActuator)).unwrap();
        sched.assign_note(2, 64);

        let status = sched.status();
        assert_eq!(status.slots.len(), 4);
        assert_eq!(status.populated(), 2);
        assert_eq!(status.sounding(), 1);
        assert!(status.pending_start);

        let text = status.to_string();
        assert!(text.contains("Device 0: available"));
        assert!(text.contains("Device 1: empty"));
        assert!(text.contains("Device 2: note 64"));
    }
}
