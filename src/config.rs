/*
    This file is part of wii (Wii Remote driver over hidapi)
    which is licensed under the GNU Affero General Public License (version 3); see /COPYING.
*/
use crate::IRSensitivity;
use std::time::Duration;

/// Session settings. `Config::default()` matches what most remotes need.
#[derive(Debug, Clone)]
pub struct Config {
    /// How long the reader waits for a report before checking whether it should stop.
    pub poll_interval: Duration,
    /// Camera sensitivity used when IR reporting is switched on.
    pub ir_sensitivity: IRSensitivity,
    /// Ask the remote to send reports even when nothing changed.
    pub continuous: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(20),
            ir_sensitivity: IRSensitivity::Level3,
            continuous: false,
        }
    }
}
