//! Point-in-time status reports.

use core::fmt;

use super::ProcessingState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceStatus {
    pub index: usize,
    pub note: Option<u8>,
    pub elapsed_us: u64,
    /// Present in the working set scanned by the tick handler.
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerStatus {
    pub state: ProcessingState,
    pub auto_processing: bool,
    pub pending_start: bool,
    pub resolution_us: u32,
    pub max_duration_ms: u32,
    pub idle_timeout_ms: u32,
    pub ticks: u64,
    pub expirations: u64,
    /// One entry per slot; `None` for empty slots.
    pub slots: Vec<Option<DeviceStatus>>,
}

impl SchedulerStatus {
    pub fn populated(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn sounding(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|d| d.note.is_some())
            .count()
    }
}

impl fmt::Display for SchedulerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            ProcessingState::Idle => "idle",
            ProcessingState::Active => "active",
        };
        writeln!(
            f,
            "Processing {}{}{} | resolution {}us | max duration {}ms | idle timeout {}ms | {} ticks, {} expired",
            state,
            if self.auto_processing { " (auto)" } else { "" },
            if self.pending_start { " (start pending)" } else { "" },
            self.resolution_us,
            self.max_duration_ms,
            self.idle_timeout_ms,
            self.ticks,
            self.expirations,
        )?;

        for (index, slot) in self.slots.iter().enumerate() {
            match slot {
                None => writeln!(f, "Device {}: empty", index)?,
                Some(device) => match device.note {
                    Some(note) => writeln!(
                        f,
                        "Device {}: note {} ({}us){}",
                        index,
                        note,
                        device.elapsed_us,
                        if device.enabled { "" } else { " [disabled]" }
                    )?,
                    None => writeln!(
                        f,
                        "Device {}: available{}",
                        index,
                        if device.enabled { "" } else { " [disabled]" }
                    )?,
                },
            }
        }
        Ok(())
    }
}
