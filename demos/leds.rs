/*
    This file is part of wii (Wii Remote driver over hidapi)
    which is licensed under the GNU Affero General Public License (version 3); see /COPYING.
*/
use std::{thread::sleep, time::Duration};
use wii::WiiMote;

fn main() -> wii::Result<()> {
    env_logger::init_from_env("LOG");
    let w = WiiMote::new();
    w.connect_any()?;
    loop {
        for i in 1..=4 {
            w.led(i, true)?;
            sleep(Duration::from_millis(100));
            w.led(i, false)?;
        }
    }
}
