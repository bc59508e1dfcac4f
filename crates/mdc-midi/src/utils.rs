//! Note frequency and period helpers for pitch-generating actuators.

use crate::event::BEND_CENTER;

/// Default pitch bend range in semitones.
pub const DEFAULT_BEND_RANGE: f32 = 2.0;

#[inline]
pub fn note_to_hz(note: f32) -> f32 {
    440.0 * 2.0f32.powf((note - 69.0) / 12.0)
}

/// Full oscillation period of `note` in microseconds.
#[inline]
pub fn note_period_us(note: u8) -> u32 {
    (1_000_000.0 / note_to_hz(f32::from(note))).round() as u32
}

/// Frequency multiplier for a 14-bit bend over `range_semitones`.
#[inline]
pub fn bend_ratio(bend: u16, range_semitones: f32) -> f32 {
    let offset = (f32::from(bend) - f32::from(BEND_CENTER)) / f32::from(BEND_CENTER);
    2.0f32.powf(offset * range_semitones / 12.0)
}

/// Period of `note` shifted by `bend`, in microseconds.
#[inline]
pub fn bent_period_us(note: u8, bend: u16, range_semitones: f32) -> u32 {
    let hz = note_to_hz(f32::from(note)) * bend_ratio(bend, range_semitones);
    (1_000_000.0 / hz).round() as u32
}
