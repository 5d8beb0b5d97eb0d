/*
    This file is part of wii (Wii Remote driver over hidapi)
    which is licensed under the GNU Affero General Public License (version 3); see /COPYING.
*/
use crate::BdAddr;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("hid: {0}")]
    Hid(#[from] hidapi::HidError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid bluetooth address {0:?}")]
    InvalidAddress(String),
    #[error("no wiimote found")]
    NoDevice,
    /// No wiimote with this address is known to hidapi.
    #[error("no wiimote found at {0}")]
    NotFound(BdAddr),
    #[error("wiimote is not connected")]
    NotConnected,
    #[error("wiimote is already connected")]
    AlreadyConnected,
    #[error("unknown event {0:?}")]
    UnknownEvent(String),
    #[error("led index {0} out of range 1..=4")]
    InvalidLed(u8),
    #[error("report {ty:#04x} too short ({len} bytes)")]
    ShortReport { ty: u8, len: usize },
    #[error("memory read at {addr:#06x} failed with code {code}")]
    MemoryRead { addr: u16, code: u8 },
}

/// Asynchronous failures delivered through the `error` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorEvent {
    /// The device went away; the session is over.
    Disconnect,
    /// A command could not be delivered while handling input.
    Communication(String),
}
