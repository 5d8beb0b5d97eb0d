/*
    This file is part of wii (Wii Remote driver over hidapi)
    which is licensed under the GNU Affero General Public License (version 3); see /COPYING.
*/
//! Extension controllers plugged into the remote's expansion port.
//!
//! Extensions are initialised in unencrypted mode, so the bytes carried by
//! input reports can be decoded directly.
use crate::{Acceleration, Event};

/// The controller plugged into the expansion port, identified by the six bytes at `0xa400fa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtensionType {
    #[default]
    None,
    Nunchuk,
    Classic,
    ClassicPro,
    BalanceBoard,
    MotionPlus,
    Unknown([u8; 6]),
}

impl ExtensionType {
    pub fn identify(id: [u8; 6]) -> Self {
        match id {
            [0x00, 0x00, 0xa4, 0x20, 0x00, 0x00] => Self::Nunchuk,
            [0x00, 0x00, 0xa4, 0x20, 0x01, 0x01] => Self::Classic,
            [0x01, 0x00, 0xa4, 0x20, 0x01, 0x01] => Self::ClassicPro,
            [0x00, 0x00, 0xa4, 0x20, 0x04, 0x02] => Self::BalanceBoard,
            [_, _, 0xa4, 0x20, 0x04 | 0x05 | 0x07, 0x05] => Self::MotionPlus,
            other => Self::Unknown(other),
        }
    }

    /// Decodes the extension bytes of an input report into an event.
    /// Returns `None` if there is no (known) extension or too few bytes.
    pub fn decode(&self, data: &[u8]) -> Option<Event> {
        match self {
            Self::Nunchuk => Nunchuk::from_report(data).map(Event::Nunchuk),
            Self::Classic | Self::ClassicPro => {
                ClassicController::from_report(data).map(Event::Classic)
            }
            Self::BalanceBoard => BalanceBoard::from_report(data).map(Event::Balance),
            Self::MotionPlus => MotionPlus::from_report(data).map(Event::MotionPlus),
            Self::None | Self::Unknown(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nunchuk {
    /// Analog stick, x then y, roughly centered at 0x80.
    pub stick: [u8; 2],
    pub acc: Acceleration,
    pub c: bool,
    pub z: bool,
}

impl Nunchuk {
    pub fn from_report(r: &[u8]) -> Option<Self> {
        let r: &[u8; 6] = r.get(..6)?.try_into().ok()?;
        let acc = |hi: u8, shift: u8| ((hi as i16) << 2 | (r[5] >> shift & 0b11) as i16) - 0x200;
        Some(Self {
            stick: [r[0], r[1]],
            acc: Acceleration {
                x: acc(r[2], 2),
                y: acc(r[3], 4),
                z: acc(r[4], 6),
            },
            // buttons are active low
            z: r[5] & 0b01 == 0,
            c: r[5] & 0b10 == 0,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassicButtons {
    pub d_pad_up: bool,
    pub d_pad_down: bool,
    pub d_pad_left: bool,
    pub d_pad_right: bool,
    pub a: bool,
    pub b: bool,
    pub x: bool,
    pub y: bool,
    pub l: bool,
    pub r: bool,
    pub zl: bool,
    pub zr: bool,
    pub plus: bool,
    pub minus: bool,
    pub home: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassicController {
    /// 6 bit per axis.
    pub left_stick: [u8; 2],
    /// 5 bit per axis.
    pub right_stick: [u8; 2],
    /// Analog trigger travel, 5 bit.
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub buttons: ClassicButtons,
}

impl ClassicController {
    pub fn from_report(r: &[u8]) -> Option<Self> {
        let r: &[u8; 6] = r.get(..6)?.try_into().ok()?;
        let (x, y) = (!r[4], !r[5]);
        Some(Self {
            left_stick: [r[0] & 0x3f, r[1] & 0x3f],
            right_stick: [
                (r[0] >> 6) << 3 | (r[1] >> 6) << 1 | r[2] >> 7,
                r[2] & 0x1f,
            ],
            left_trigger: (r[2] >> 5 & 0b11) << 3 | r[3] >> 5,
            right_trigger: r[3] & 0x1f,
            #[rustfmt::skip]
            buttons: ClassicButtons {
                r:           x & 0b00000010 != 0,
                plus:        x & 0b00000100 != 0,
                home:        x & 0b00001000 != 0,
                minus:       x & 0b00010000 != 0,
                l:           x & 0b00100000 != 0,
                d_pad_down:  x & 0b01000000 != 0,
                d_pad_right: x & 0b10000000 != 0,
                d_pad_up:    y & 0b00000001 != 0,
                d_pad_left:  y & 0b00000010 != 0,
                zr:          y & 0b00000100 != 0,
                x:           y & 0b00001000 != 0,
                a:           y & 0b00010000 != 0,
                y:           y & 0b00100000 != 0,
                b:           y & 0b01000000 != 0,
                zl:          y & 0b10000000 != 0,
            },
        })
    }
}

/// Raw load cell readings of the Wii Balance Board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceBoard {
    pub top_right: u16,
    pub bottom_right: u16,
    pub top_left: u16,
    pub bottom_left: u16,
}

impl BalanceBoard {
    pub fn from_report(r: &[u8]) -> Option<Self> {
        let r = r.get(..8)?;
        let at = |i: usize| u16::from_be_bytes([r[i], r[i + 1]]);
        Some(Self {
            top_right: at(0),
            bottom_right: at(2),
            top_left: at(4),
            bottom_left: at(6),
        })
    }
}

/// Raw gyroscope readings of an active Wii MotionPlus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionPlus {
    pub yaw: u16,
    pub roll: u16,
    pub pitch: u16,
    pub yaw_slow: bool,
    pub roll_slow: bool,
    pub pitch_slow: bool,
    /// Another extension is plugged into the MotionPlus.
    pub extension_connected: bool,
}

impl MotionPlus {
    pub fn from_report(r: &[u8]) -> Option<Self> {
        let r: &[u8; 6] = r.get(..6)?.try_into().ok()?;
        // pass-through frames carry the other extension's data
        if r[5] & 0b10 == 0 {
            return None;
        }
        Some(Self {
            yaw: r[0] as u16 | ((r[3] >> 2) as u16) << 8,
            roll: r[1] as u16 | ((r[4] >> 2) as u16) << 8,
            pitch: r[2] as u16 | ((r[5] >> 2) as u16) << 8,
            yaw_slow: r[3] & 0b10 != 0,
            pitch_slow: r[3] & 0b01 != 0,
            roll_slow: r[4] & 0b10 != 0,
            extension_connected: r[4] & 0b01 != 0,
        })
    }
}
