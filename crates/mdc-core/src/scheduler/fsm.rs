//! Processing state machine.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingState {
    /// Timer detached, no output driven.
    #[default]
    Idle,
    /// Timer attached, tick handler running.
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingEvent {
    /// Explicit `start_processing()`.
    Start,
    /// Deferred start armed by a note assignment, observed by the main loop.
    PendingStart,
    /// Explicit `stop_processing()`.
    Stop,
    /// No note activity for the idle timeout.
    IdleTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transition {
    #[default]
    None,
    Started,
    Stopped,
}

#[derive(Debug, Default)]
pub struct ProcessingFsm {
    state: ProcessingState,
}

impl ProcessingFsm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ProcessingState {
        self.state
    }

    pub fn transition(&mut self, event: ProcessingEvent) -> Transition {
        use ProcessingEvent::*;
        use ProcessingState::*;

        match (self.state, event) {
            (Idle, Start | PendingStart) => {
                self.state = Active;
                Transition::Started
            }
            (Active, Stop | IdleTimeout) => {
                self.state = Idle;
                Transition::Stopped
            }
            (Idle, Stop | IdleTimeout) | (Active, Start | PendingStart) => Transition::None,
        }
    }
}
