/*
    This file is part of wii (Wii Remote driver over hidapi)
    which is licensed under the GNU Affero General Public License (version 3); see /COPYING.
*/
//! Wii Remote driver over hidapi.
//!
//! ```no_run
//! use wii::{Event, EventKind, WiiMote};
//!
//! let wiimote = WiiMote::new();
//! wiimote.connect("00:17:AB:39:42:B1")?;
//! wiimote.ext(true)?;
//! wiimote.on(EventKind::Nunchuk, |event| {
//!     if let Event::Nunchuk(n) = event {
//!         println!("{:?}", n.stick);
//!     }
//! });
//! # Ok::<(), wii::Error>(())
//! ```
mod address;
mod config;
mod consts;
mod device;
mod error;
mod event;
mod extension;
mod read;
mod transport;
mod worker;
mod write;

pub use address::BdAddr;
pub use config::Config;
pub use consts::{
    BATTERY_MAX, BTN_1, BTN_2, BTN_A, BTN_B, BTN_DOWN, BTN_HOME, BTN_LEFT, BTN_MINUS, BTN_PLUS,
    BTN_RIGHT, BTN_UP, IR_X_MAX, IR_Y_MAX,
};
pub use error::{Error, ErrorEvent, Result};
pub use event::{Event, EventKind, Listener};
pub use extension::{
    BalanceBoard, ClassicButtons, ClassicController, ExtensionType, MotionPlus, Nunchuk,
};
pub use read::parse_report;
pub use transport::Transport;

use consts::*;
use event::Listeners;
use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    thread::JoinHandle,
};

/// Handle to one Wii Remote. Created disconnected; see [`WiiMote::connect`].
pub struct WiiMote {
    shared: Arc<Shared>,
}

/// Everything the handle and its reader thread share.
pub(crate) struct Shared {
    config: Config,
    transport: Mutex<Option<Box<dyn Transport>>>,
    /// Writers waiting for the transport.
    writers: AtomicUsize,
    rumble: AtomicBool,
    running: AtomicBool,
    state: Mutex<State>,
    /// Held while the reporting mode is worked out and sent.
    reporting: Mutex<()>,
    listeners: Mutex<Listeners>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Debug, Default)]
pub(crate) struct State {
    flags: ReportFlags,
    leds: u8,
    buttons: ButtonState,
    extension: ExtensionType,
    ir_camera: Option<IRMode>,
    pending_read: Option<u16>,
}

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One decoded piece of an input report.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Buttons(ButtonState),
    Acceleration(Acceleration),
    IRDetection([Option<IRObject>; 4]),
    Extension(Vec<u8>),
    Status(Status),
    MemoryData(MemoryData),
    Acknowledge { report: u8, error: u8 },
}

/// Actions control outputs like rumble, player leds, etc.
#[derive(Debug)]
pub enum Action {
    /// Sets the reporting mode, required to receive the data you need.
    SetReporting {
        mode: ReportingMode,
        continuous: bool,
    },
    /// Enables the IR Camera, given mode and sensitivity. Requires 50ms to perform.
    IRCameraEnable(Option<(IRMode, IRSensitivity)>),
    /// Set player LEDs to the lower 4 bit of the provided mask.
    PlayerLeds(u8),
    /// Enables/Disables rumble
    RumbleEnable(bool),
    /// Asks for a status report.
    RequestStatus,
    /// Asks for `size` bytes of registers starting at `addr`.
    ReadRegisters { addr: u32, size: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IRSensitivity {
    Level1,
    Level2,
    Level3,
    Level4,
    Level5,
    Maximum,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportingMode {
    Buttons = TY_CORE_BUTTONS,
    ButtonsAccel = TY_CORE_BUTTONS_ACCELEROMETER,
    ButtonsAccelExt16 = TY_CORE_BUTTONS_ACCELEROMETER_EXTENSION16,
    ButtonsAccelIR10Ext6 = TY_CORE_BUTTONS_ACCELEROMETER_IR10_EXTENSION6,
    ButtonsAccelIR12 = TY_CORE_BUTTONS_ACCELEROMETER_IR12,
    ButtonsExt19 = TY_CORE_BUTTONS_EXTENSION19,
    ButtonsExt8 = TY_CORE_BUTTONS_EXTENSION8,
    ButtonsIR10Ext9 = TY_CORE_BUTTONS_IR10_EXTENSION9,
}

/// Which kinds of data the user asked to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportFlags {
    pub buttons: bool,
    pub acc: bool,
    pub ir: bool,
    pub ext: bool,
}

impl Default for ReportFlags {
    fn default() -> Self {
        Self {
            buttons: true,
            acc: false,
            ir: false,
            ext: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Acceleration {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IRMode {
    Basic = 1,
    Extended = 3,
    Full = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IRObject {
    pub x: u16,
    pub y: u16,
    pub size_or_intensity: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    pub d_pad_left: bool,
    pub d_pad_right: bool,
    pub d_pad_down: bool,
    pub d_pad_up: bool,
    pub plus: bool,
    pub two: bool,
    pub one: bool,
    pub b: bool,
    pub a: bool,
    pub minus: bool,
    pub home: bool,
}

/// Contents of a status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Status {
    pub battery: u8,
    pub battery_low: bool,
    pub extension_connected: bool,
    pub speaker: bool,
    pub ir: bool,
    /// Player LEDs in the lower 4 bit.
    pub leds: u8,
}

/// Answer to a register read request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryData {
    /// Lower 16 bit of the address the data starts at.
    pub addr: u16,
    /// Non-zero if the read failed.
    pub error: u8,
    pub data: Vec<u8>,
}
