/*
    This file is part of wii (Wii Remote driver over hidapi)
    which is licensed under the GNU Affero General Public License (version 3); see /COPYING.
*/
use crate::{
    consts::*,
    error::{Error, Result},
    BdAddr,
};
use hidapi::{HidApi, HidDevice};
use log::{debug, info};
use std::time::Duration;

/// A byte pipe to a wiimote. Reports include the report type as first byte.
pub trait Transport: Send {
    fn write(&mut self, data: &[u8]) -> Result<usize>;
    /// Reads one report; returns 0 if none arrived within `timeout`.
    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;
}

impl Transport for HidDevice {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        Ok(HidDevice::write(self, data)?)
    }
    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let millis = timeout.as_millis().min(i32::MAX as u128) as i32;
        Ok(HidDevice::read_timeout(self, buf, millis)?)
    }
}

/// Finds and opens a wiimote HID device via hidapi.
/// Without an address the first wiimote found is used.
///
/// Over Bluetooth the HID serial number is the device address.
pub(crate) fn open_hid(addr: Option<BdAddr>) -> Result<HidDevice> {
    let api = HidApi::new()?;
    for device in api.device_list() {
        debug!("dev: {:?}", device);
        if device.vendor_id() != HID_VENDOR
            || !matches!(device.product_id(), HID_PRODUCT | HID_PRODUCT_TR)
        {
            continue;
        }
        let serial = device.serial_number().and_then(|s| s.parse::<BdAddr>().ok());
        if addr.is_none() || serial == addr {
            info!("wiimote found at {:?}", device.path());
            return Ok(device.open_device(&api)?);
        }
    }
    Err(match addr {
        Some(addr) => Error::NotFound(addr),
        None => Error::NoDevice,
    })
}
