//! MidiDeviceController that ties the device table, chains and MIDI input together

use core::fmt;

use mdc_chain::{ChainRegistry, ChainType, DeviceChain, RegistryStatus};
use mdc_core::{
    Actuator, Arc, DeviceScheduler, DeviceSlot, ProcessingState, SchedulerStatus, Transition,
};
use mdc_midi::{ByteSource, NoteEvent, NoteEventParser, NoteHandler};

use crate::{ChannelRouting, Result, Route};

/// Composition root: owns the device table, the chain registry, channel
/// routing and the byte parser.
///
/// Everything here runs on the main loop. The only interrupt-side work is the
/// tick handler the scheduler attaches to its timer.
///
/// # Example
///
/// ```ignore
/// use mdc::prelude::*;
///
/// let mut mdc = MidiDeviceController::builder().build()?;
/// mdc.add_device(0, Box::new(my_buzzer))?;
/// mdc.add_device(1, Box::new(my_other_buzzer))?;
/// mdc.create_chain(0, ChainType::RoundRobin, &[0, 1])?;
///
/// loop {
///     mdc.poll(&mut uart);
/// }
/// ```
pub struct MidiDeviceController {
    scheduler: DeviceScheduler,
    chains: ChainRegistry,
    routing: ChannelRouting,
    parser: NoteEventParser,
}

impl MidiDeviceController {
    pub fn builder() -> crate::MdcBuilder {
        crate::MdcBuilder::default()
    }

    pub(crate) fn from_parts(
        scheduler: DeviceScheduler,
        chains: ChainRegistry,
        routing: ChannelRouting,
    ) -> Self {
        Self {
            scheduler,
            chains,
            routing,
            parser: NoteEventParser::new(),
        }
    }

    pub fn scheduler(&self) -> &DeviceScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut DeviceScheduler {
        &mut self.scheduler
    }

    pub fn chains(&self) -> &ChainRegistry {
        &self.chains
    }

    pub fn chains_mut(&mut self) -> &mut ChainRegistry {
        &mut self.chains
    }

    pub fn routing(&self) -> &ChannelRouting {
        &self.routing
    }

    pub fn routing_mut(&mut self) -> &mut ChannelRouting {
        &mut self.routing
    }

    pub fn parser(&self) -> &NoteEventParser {
        &self.parser
    }

    // ------------------------------------------------------------------
    // Devices
    // ------------------------------------------------------------------

    pub fn add_device(&mut self, index: usize, actuator: Box<dyn Actuator>) -> Result<Arc<DeviceSlot>> {
        Ok(self.scheduler.add_device(index, actuator)?)
    }

    pub fn add_devices<I>(&mut self, actuators: I) -> usize
    where
        I: IntoIterator<Item = Box<dyn Actuator>>,
    {
        self.scheduler.add_devices(actuators)
    }

    pub fn device(&self, index: usize) -> Option<Arc<DeviceSlot>> {
        self.scheduler.device(index)
    }

    /// Chains referencing the device skip it from now on.
    pub fn delete_device(&mut self, index: usize) -> bool {
        self.scheduler.delete_device(index)
    }

    pub fn assign_device_note(&self, index: usize, note: u8) -> bool {
        self.scheduler.assign_note(index, note)
    }

    pub fn clear_device_note(&self, index: usize, note: u8) -> bool {
        self.scheduler.clear_note(index, note)
    }

    pub fn bend_device(&self, index: usize, bend: u16) -> bool {
        self.scheduler.pitch_bend(index, bend)
    }

    // ------------------------------------------------------------------
    // Chains
    // ------------------------------------------------------------------

    pub fn add_chain(&mut self, slot: usize, chain: DeviceChain) -> Result<()> {
        Ok(self.chains.add_chain(slot, chain)?)
    }

    /// Build a chain over existing device slots, in ring order.
    pub fn create_chain(&mut self, slot: usize, kind: ChainType, members: &[usize]) -> Result<()> {
        Ok(self.chains.create_chain(slot, kind, members, &self.scheduler)?)
    }

    pub fn chain(&self, slot: usize) -> Option<&DeviceChain> {
        self.chains.chain(slot)
    }

    /// Member devices keep whatever they are playing.
    pub fn delete_chain(&mut self, slot: usize) -> bool {
        self.chains.delete_chain(slot)
    }

    pub fn assign_chain_note(&mut self, slot: usize, note: u8) -> bool {
        self.chains.assign_note(slot, note)
    }

    pub fn clear_chain_note(&mut self, slot: usize, note: u8) -> bool {
        self.chains.clear_note(slot, note)
    }

    pub fn bend_chain(&self, slot: usize, bend: u16) -> bool {
        self.chains.pitch_bend(slot, bend)
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Parse `bytes` and route every complete note event.
    ///
    /// Returns the number of events dispatched. Partial messages carry over to
    /// the next call.
    pub fn process_bytes(&mut self, bytes: &[u8]) -> usize {
        let mut parser = core::mem::take(&mut self.parser);
        let dispatched = parser.parse(bytes, self);
        self.parser = parser;
        dispatched
    }

    /// Route one already-decoded event. Returns whether it was recognized.
    pub fn handle_event(&mut self, event: NoteEvent) -> bool {
        self.dispatch(event)
    }

    /// One main-loop iteration: drain `source`, then run the processing poll.
    pub fn poll<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> usize {
        let mut parser = core::mem::take(&mut self.parser);
        let mut dispatched = 0;
        while let Some(byte) = source.read_byte() {
            if let Some(event) = parser.feed(byte) {
                if self.dispatch(event) {
                    dispatched += 1;
                }
            }
        }
        self.parser = parser;

        self.update();
        dispatched
    }

    /// Processing poll: pending auto start and idle shutdown.
    pub fn update(&mut self) -> Transition {
        self.scheduler.reset_processing()
    }

    // ------------------------------------------------------------------
    // Processing and settings
    // ------------------------------------------------------------------

    pub fn start_processing(&mut self) -> bool {
        self.scheduler.start_processing()
    }

    pub fn stop_processing(&mut self) {
        self.scheduler.stop_processing();
    }

    pub fn is_processing(&self) -> bool {
        self.scheduler.is_processing()
    }

    pub fn set_auto_process(&self, enabled: bool) {
        self.scheduler.set_auto_process(enabled);
    }

    pub fn set_resolution(&mut self, resolution_us: u32) -> Result<()> {
        Ok(self.scheduler.set_resolution(resolution_us)?)
    }

    pub fn set_max_duration(&self, max_duration_ms: u32) -> Result<()> {
        Ok(self.scheduler.set_max_duration(max_duration_ms)?)
    }

    pub fn set_idle_timeout(&mut self, idle_timeout_ms: u32) {
        self.scheduler.set_idle_timeout(idle_timeout_ms);
    }

    pub fn reset_positions(&self) {
        self.scheduler.reset_positions();
    }

    pub fn calibrate_positions(&self) {
        self.scheduler.calibrate_positions();
    }

    pub fn status(&self) -> ControllerStatus {
        ControllerStatus {
            scheduler: self.scheduler.status(),
            chains: self.chains.status(),
        }
    }

    pub fn log_status(&self) {
        tracing::info!("{}", self.status());
    }
}

impl NoteHandler for MidiDeviceController {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        if velocity == 0 {
            return self.note_off(channel, note, velocity);
        }
        match self.routing.get(channel) {
            Some(Route::Chain(slot)) => {
                self.chains.assign_note(slot, note);
            }
            Some(Route::Device(index)) => {
                self.scheduler.assign_note(index, note);
            }
            None => {}
        }
    }

    fn note_off(&mut self, channel: u8, note: u8, _velocity: u8) {
        match self.routing.get(channel) {
            Some(Route::Chain(slot)) => {
                self.chains.clear_note(slot, note);
            }
            Some(Route::Device(index)) => {
                self.scheduler.clear_note(index, note);
            }
            None => {}
        }
    }

    fn pitch_bend(&mut self, channel: u8, bend: u16) {
        match self.routing.get(channel) {
            Some(Route::Chain(slot)) => {
                self.chains.pitch_bend(slot, bend);
            }
            Some(Route::Device(index)) => {
                self.scheduler.pitch_bend(index, bend);
            }
            None => {}
        }
    }
}

/// Combined device and chain report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerStatus {
    pub scheduler: SchedulerStatus,
    pub chains: RegistryStatus,
}

impl ControllerStatus {
    pub fn is_processing(&self) -> bool {
        self.scheduler.state == ProcessingState::Active
    }
}

impl fmt::Display for ControllerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.scheduler, self.chains)
    }
}

impl fmt::Debug for MidiDeviceController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MidiDeviceController")
            .field("devices", &self.scheduler.device_count())
            .field("chains", &self.chains.chain_count())
            .field("processing", &self.scheduler.is_processing())
            .finish()
    }
}
