//! Note-level MIDI events.

use midi_msg::{Channel, ChannelVoiceMsg, MidiMsg};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Pitch bend center (no bend).
pub const BEND_CENTER: u16 = 0x2000;

/// Largest 14-bit bend value.
pub const BEND_MAX: u16 = 0x3FFF;

/// Event reconstructed from the byte stream.
///
/// Channels are 0-based (0-15).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteEvent {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Also produced for Note On with velocity 0.
    NoteOff { channel: u8, note: u8, velocity: u8 },
    /// 14-bit value, center [`BEND_CENTER`].
    PitchBend { channel: u8, bend: u16 },
    /// Any other complete channel message. Carries the status byte.
    Unrecognized { status: u8 },
}

fn check_channel(channel: u8) -> Result<u8> {
    if channel > 0x0F {
        return Err(Error::InvalidChannel(channel));
    }
    Ok(channel)
}

fn check_data(byte: u8) -> Result<u8> {
    if byte > 0x7F {
        return Err(Error::InvalidDataByte(byte));
    }
    Ok(byte)
}

impl NoteEvent {
    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Result<Self> {
        Ok(Self::NoteOn {
            channel: check_channel(channel)?,
            note: check_data(note)?,
            velocity: check_data(velocity)?,
        })
    }

    pub fn note_off(channel: u8, note: u8, velocity: u8) -> Result<Self> {
        Ok(Self::NoteOff {
            channel: check_channel(channel)?,
            note: check_data(note)?,
            velocity: check_data(velocity)?,
        })
    }

    pub fn pitch_bend(channel: u8, bend: u16) -> Result<Self> {
        if bend > BEND_MAX {
            return Err(Error::InvalidDataByte((bend >> 7) as u8));
        }
        Ok(Self::PitchBend {
            channel: check_channel(channel)?,
            bend,
        })
    }

    #[inline]
    pub fn channel(&self) -> Option<u8> {
        match *self {
            Self::NoteOn { channel, .. }
            | Self::NoteOff { channel, .. }
            | Self::PitchBend { channel, .. } => Some(channel),
            Self::Unrecognized { .. } => None,
        }
    }

    #[inline]
    pub fn note(&self) -> Option<u8> {
        match *self {
            Self::NoteOn { note, .. } | Self::NoteOff { note, .. } => Some(note),
            _ => None,
        }
    }

    #[inline]
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized { .. })
    }

    /// `None` for [`NoteEvent::Unrecognized`].
    pub fn to_midi_msg(&self) -> Option<MidiMsg> {
        let (channel, msg) = match *self {
            Self::NoteOn {
                channel,
                note,
                velocity,
            } => (channel, ChannelVoiceMsg::NoteOn { note, velocity }),
            Self::NoteOff {
                channel,
                note,
                velocity,
            } => (channel, ChannelVoiceMsg::NoteOff { note, velocity }),
            Self::PitchBend { channel, bend } => (channel, ChannelVoiceMsg::PitchBend { bend }),
            Self::Unrecognized { .. } => return None,
        };
        Some(MidiMsg::ChannelVoice {
            channel: Channel::from_u8(channel),
            msg,
        })
    }

    /// Wire encoding with an explicit status byte. Empty for unrecognized events.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_midi_msg()
            .map(|msg| msg.to_midi())
            .unwrap_or_default()
    }
}
