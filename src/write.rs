/*
    This file is part of wii (Wii Remote driver over hidapi)
    which is licensed under the GNU Affero General Public License (version 3); see /COPYING.
*/
use crate::{
    consts::*,
    error::{Error, Result},
    lock, Action, IRMode, IRSensitivity, ReportFlags, ReportingMode, Shared,
};
use log::{debug, trace};
use std::{sync::atomic::Ordering, thread::sleep, time::Duration};

impl Shared {
    /// Sends a packet to the wiimote and makes sure that we dont influence rumble :)
    fn write_inner(&self, bytes: &mut [u8]) -> Result<()> {
        if self.rumble.load(Ordering::Relaxed) {
            bytes[1] |= 1;
        } else {
            bytes[1] &= !1;
        }
        trace!("send {bytes:02x?}");
        self.writers.fetch_add(1, Ordering::AcqRel);
        let mut transport = lock(&self.transport);
        self.writers.fetch_sub(1, Ordering::AcqRel);
        let transport = transport.as_mut().ok_or(Error::NotConnected)?;
        transport.write(bytes)?;
        Ok(())
    }

    /// Writes data to wiimotes internal registers or memory.
    pub(crate) fn write_registers(&self, addr: u32, data: &[u8]) -> Result<()> {
        let mut bytes = [0; 22];
        bytes[0] = TY_WRITE_MEMORY_AND_REGISTERS;
        bytes[1] = VA_REGISTER_SPACE;
        bytes[2..5].copy_from_slice(&addr.to_be_bytes()[1..]);
        let data_len = 16.min(data.len());
        bytes[5] = data_len as u8;
        bytes[6..6 + data_len].copy_from_slice(&data[0..data_len]);
        self.write_inner(&mut bytes)?;
        sleep(Duration::from_millis(10));
        Ok(())
    }

    /// Enable/Disable a feature
    fn set_enabled(&self, feature: u8, enable: bool) -> Result<()> {
        self.write_inner(&mut [
            feature,
            if enable {
                VA_FEATURE_ENABLE
            } else {
                VA_FEATURE_DISABLE
            },
        ])
    }

    /// Send an action to the wiimote. (Enabling the camera takes 50ms)
    pub(crate) fn write(&self, a: Action) -> Result<()> {
        match a {
            Action::RumbleEnable(enable) => {
                self.rumble.store(enable, Ordering::Relaxed);
                self.write_inner(&mut [TY_RUMBLE, enable as u8])
            }
            Action::IRCameraEnable(enable) => {
                if let Some((mode, sens)) = enable {
                    let sens = sens.blocks();
                    self.set_enabled(TY_IR_CAMERA_PIXEL_CLOCK_ENABLE, true)?;
                    self.set_enabled(TY_IR_CAMERA_CHIP_ENABLE, true)?;
                    self.write_registers(REG_IR, &[0x01])?;
                    sleep(Duration::from_millis(50)); // wiibrew wiki says this might help...
                    self.write_registers(REG_IR_SENS_BLOCK1, &sens.0)?;
                    self.write_registers(REG_IR_SENS_BLOCK2, &sens.1)?;
                    self.write_registers(REG_IR_MODE, &[mode as u8])?;
                    self.write_registers(REG_IR, &[0x08])
                } else {
                    self.set_enabled(TY_IR_CAMERA_CHIP_ENABLE, false)?;
                    self.set_enabled(TY_IR_CAMERA_PIXEL_CLOCK_ENABLE, false)
                }
            }
            Action::PlayerLeds(mask) => self.write_inner(&mut [TY_PLAYER_LEDS, (mask & 0x0f) << 4]),
            Action::RequestStatus => self.write_inner(&mut [TY_STATUS_INFORMATION_REQUEST, 0x00]),
            Action::ReadRegisters { addr, size } => {
                let mut bytes = [0; 7];
                bytes[0] = TY_READ_MEMORY_AND_REGISTERS;
                bytes[1] = VA_REGISTER_SPACE;
                bytes[2..5].copy_from_slice(&addr.to_be_bytes()[1..]);
                bytes[5..7].copy_from_slice(&size.to_be_bytes());
                self.write_inner(&mut bytes)
            }
            Action::SetReporting { mode, continuous } => self.write_inner(&mut [
                TY_DATA_REPORTING_MODE,
                if continuous { VA_CONTINUOUS } else { 0x00 },
                mode as u8,
            ]),
        }
    }

    /// Brings camera and reporting mode in line with the requested flags.
    pub(crate) fn apply_reporting(&self) -> Result<()> {
        // user and reader thread both get here; the last flags must be the last ones sent
        let _reporting = lock(&self.reporting);
        let (mode, prev, want) = {
            let mut state = lock(&self.state);
            let want = state.flags.ir_mode();
            let prev = std::mem::replace(&mut state.ir_camera, want);
            (state.flags.mode(), prev, want)
        };
        match (prev, want) {
            (None, Some(ir)) => {
                debug!("enabling ir camera in {ir:?} mode");
                self.write(Action::IRCameraEnable(Some((ir, self.config.ir_sensitivity))))?
            }
            (Some(_), None) => {
                debug!("disabling ir camera");
                self.write(Action::IRCameraEnable(None))?
            }
            (Some(a), Some(b)) if a != b => self.write_registers(REG_IR_MODE, &[b as u8])?,
            _ => {}
        }
        debug!("reporting mode {mode:?}");
        self.write(Action::SetReporting {
            mode,
            continuous: self.config.continuous,
        })
    }
}

impl ReportFlags {
    /// The smallest reporting mode carrying everything requested.
    pub fn mode(&self) -> ReportingMode {
        match (self.ir, self.ext, self.acc) {
            (true, true, true) => ReportingMode::ButtonsAccelIR10Ext6,
            (true, true, false) => ReportingMode::ButtonsIR10Ext9,
            (true, false, _) => ReportingMode::ButtonsAccelIR12,
            (false, true, true) => ReportingMode::ButtonsAccelExt16,
            (false, true, false) => ReportingMode::ButtonsExt19,
            (false, false, true) => ReportingMode::ButtonsAccel,
            (false, false, false) => ReportingMode::Buttons,
        }
    }

    /// Camera mode matching `mode()`: 10-byte reports need basic, 12-byte extended.
    pub fn ir_mode(&self) -> Option<IRMode> {
        match (self.ir, self.ext) {
            (false, _) => None,
            (true, true) => Some(IRMode::Basic),
            (true, false) => Some(IRMode::Extended),
        }
    }
}

impl IRSensitivity {
    pub fn blocks(&self) -> ([u8; 9], [u8; 2]) {
        match self {
            IRSensitivity::Level1 => IR_SENS_LEVEL1,
            IRSensitivity::Level2 => IR_SENS_LEVEL2,
            IRSensitivity::Level3 => IR_SENS_LEVEL3,
            IRSensitivity::Level4 => IR_SENS_LEVEL4,
            IRSensitivity::Level5 => IR_SENS_LEVEL5,
            IRSensitivity::Maximum => IR_SENS_MAX,
        }
    }
}
