/*
    This file is part of wii (Wii Remote driver over hidapi)
    which is licensed under the GNU Affero General Public License (version 3); see /COPYING.
*/
use crate::consts::*;
use crate::error::{Error, Result};
use crate::{Acceleration, ButtonState, IRObject, MemoryData, Report, Status};
use log::warn;

/// Minimum length of each input report type, including the type byte.
fn min_len(ty: u8) -> Option<usize> {
    Some(match ty {
        TY_STATUS_INFORMATION => 7,
        TY_READ_MEMORY_AND_REGISTERS_DATA => 22,
        TY_RESULT => 5,
        TY_CORE_BUTTONS => 3,
        TY_CORE_BUTTONS_ACCELEROMETER => 6,
        TY_CORE_BUTTONS_EXTENSION8 => 11,
        TY_CORE_BUTTONS_ACCELEROMETER_IR12 => 18,
        TY_CORE_BUTTONS_EXTENSION19
        | TY_CORE_BUTTONS_ACCELEROMETER_EXTENSION16
        | TY_CORE_BUTTONS_IR10_EXTENSION9
        | TY_CORE_BUTTONS_ACCELEROMETER_IR10_EXTENSION6
        | TY_EXTENSION21 => 22,
        _ => return None,
    })
}

/// Splits one input report into its decoded parts.
/// Unknown report types are logged and yield nothing.
pub fn parse_report(buf: &[u8]) -> Result<Vec<Report>> {
    let Some(&ty) = buf.first() else {
        return Ok(Vec::new());
    };
    let Some(len) = min_len(ty) else {
        warn!("unknown report type: {ty:02x}");
        return Ok(Vec::new());
    };
    if buf.len() < len {
        return Err(Error::ShortReport {
            ty,
            len: buf.len(),
        });
    }

    let mut out = Vec::with_capacity(4);
    if ty != TY_EXTENSION21 {
        out.push(Report::Buttons(ButtonState::from_flags([buf[1], buf[2]])));
    }
    match ty {
        TY_CORE_BUTTONS => {}
        TY_CORE_BUTTONS_ACCELEROMETER => {
            out.push(Report::Acceleration(Acceleration::from_report(buf)));
        }
        TY_CORE_BUTTONS_EXTENSION8 => {
            out.push(Report::Extension(buf[3..11].to_vec()));
        }
        TY_CORE_BUTTONS_ACCELEROMETER_IR12 => {
            out.push(Report::Acceleration(Acceleration::from_report(buf)));
            out.push(Report::IRDetection(IRObject::from_extended(
                buf[6..18].try_into().unwrap(),
            )));
        }
        TY_CORE_BUTTONS_EXTENSION19 => {
            out.push(Report::Extension(buf[3..22].to_vec()));
        }
        TY_CORE_BUTTONS_ACCELEROMETER_EXTENSION16 => {
            out.push(Report::Acceleration(Acceleration::from_report(buf)));
            out.push(Report::Extension(buf[6..22].to_vec()));
        }
        TY_CORE_BUTTONS_IR10_EXTENSION9 => {
            out.push(Report::IRDetection(IRObject::from_basic(
                buf[3..13].try_into().unwrap(),
            )));
            out.push(Report::Extension(buf[13..22].to_vec()));
        }
        TY_CORE_BUTTONS_ACCELEROMETER_IR10_EXTENSION6 => {
            out.push(Report::Acceleration(Acceleration::from_report(buf)));
            out.push(Report::IRDetection(IRObject::from_basic(
                buf[6..16].try_into().unwrap(),
            )));
            out.push(Report::Extension(buf[16..22].to_vec()));
        }
        TY_EXTENSION21 => {
            out.push(Report::Extension(buf[1..22].to_vec()));
        }
        TY_STATUS_INFORMATION => {
            out.push(Report::Status(Status::from_report(buf)));
        }
        TY_READ_MEMORY_AND_REGISTERS_DATA => {
            let size = (buf[3] >> 4) as usize + 1;
            out.push(Report::MemoryData(MemoryData {
                addr: u16::from_be_bytes([buf[4], buf[5]]),
                error: buf[3] & 0x0f,
                data: buf[6..6 + size].to_vec(),
            }));
        }
        TY_RESULT => out.push(Report::Acknowledge {
            report: buf[3],
            error: buf[4],
        }),
        _ => unreachable!("min_len covers every handled type"),
    }
    Ok(out)
}

impl ButtonState {
    // Parse ButtonState from the first two bytes of the report
    #[rustfmt::skip]
    pub fn from_flags([x, y]: [u8; 2]) -> Self {
        Self {
            d_pad_left:  x & 0b00000001 != 0,
            d_pad_right: x & 0b00000010 != 0,
            d_pad_down:  x & 0b00000100 != 0,
            d_pad_up:    x & 0b00001000 != 0,
            plus:        x & 0b00010000 != 0,
            two:         y & 0b00000001 != 0,
            one:         y & 0b00000010 != 0,
            b:           y & 0b00000100 != 0,
            a:           y & 0b00001000 != 0,
            minus:       y & 0b00010000 != 0,
            home:        y & 0b10000000 != 0,
        }
    }

    /// Builds the state from a `BTN_*` mask.
    pub fn from_bits(bits: u16) -> Self {
        Self::from_flags((bits & BTN_MASK).to_be_bytes())
    }

    /// The pressed buttons as a `BTN_*` mask.
    #[rustfmt::skip]
    pub fn bits(&self) -> u16 {
        [
            (self.d_pad_left,  BTN_LEFT),
            (self.d_pad_right, BTN_RIGHT),
            (self.d_pad_down,  BTN_DOWN),
            (self.d_pad_up,    BTN_UP),
            (self.plus,        BTN_PLUS),
            (self.two,         BTN_2),
            (self.one,         BTN_1),
            (self.b,           BTN_B),
            (self.a,           BTN_A),
            (self.minus,       BTN_MINUS),
            (self.home,        BTN_HOME),
        ]
        .into_iter()
        .filter(|(pressed, _)| *pressed)
        .fold(0, |acc, (_, bit)| acc | bit)
    }

    pub fn is_empty(&self) -> bool {
        self.bits() == 0
    }

    /// Buttons pressed in `self` but not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        Self::from_bits(self.bits() & !other.bits())
    }
}

impl IRObject {
    // Parse a pair or detections from 5 bytes like in the 10-byte report.
    fn from_basic_pair(r: [u8; 5]) -> [Option<Self>; 2] {
        [
            if r[0] == 0xff && r[1] == 0xff {
                None
            } else {
                Some(Self {
                    size_or_intensity: 0,
                    x: r[0] as u16 | ((r[2] & 0b00110000) as u16) << 4,
                    y: r[1] as u16 | ((r[2] & 0b11000000) as u16) << 2,
                })
            },
            if r[3] == 0xff && r[4] == 0xff {
                None
            } else {
                Some(Self {
                    size_or_intensity: 0,
                    x: r[3] as u16 | ((r[2] & 0b00000011) as u16) << 8,
                    y: r[4] as u16 | ((r[2] & 0b00001100) as u16) << 6,
                })
            },
        ]
    }

    // Parse objects from 10-byte report
    pub fn from_basic(r: [u8; 10]) -> [Option<Self>; 4] {
        let [a, b] = Self::from_basic_pair([r[0], r[1], r[2], r[3], r[4]]);
        let [c, d] = Self::from_basic_pair([r[5], r[6], r[7], r[8], r[9]]);
        [a, b, c, d]
    }

    // Parse objects from 12-byte report, 3 bytes each
    pub fn from_extended(r: [u8; 12]) -> [Option<Self>; 4] {
        let one = |o: &[u8]| {
            if o.iter().all(|&b| b == 0xff) {
                None
            } else {
                Some(Self {
                    x: o[0] as u16 | ((o[2] & 0b00110000) as u16) << 4,
                    y: o[1] as u16 | ((o[2] & 0b11000000) as u16) << 2,
                    size_or_intensity: o[2] & 0b00001111,
                })
            }
        };
        [one(&r[0..3]), one(&r[3..6]), one(&r[6..9]), one(&r[9..12])]
    }
}

impl Acceleration {
    /// Parse acceleration from report format, centered around zero
    pub fn from_report(r: &[u8]) -> Self {
        let x = (r[3] as i16) << 2 | (r[1] >> 5 & 0b11) as i16;
        let y = (r[4] as i16) << 2 | (r[2] >> 4 & 0b10) as i16;
        let z = (r[5] as i16) << 2 | (r[2] >> 5 & 0b10) as i16;
        Acceleration {
            x: x - 0x200,
            y: y - 0x200,
            z: z - 0x200,
        }
    }
}

impl Status {
    pub fn from_report(r: &[u8]) -> Self {
        Self {
            battery_low: r[3] & 0b00000001 != 0,
            extension_connected: r[3] & 0b00000010 != 0,
            speaker: r[3] & 0b00000100 != 0,
            ir: r[3] & 0b00001000 != 0,
            leds: r[3] >> 4,
            battery: r[6],
        }
    }
}
