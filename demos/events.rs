/*
    This file is part of wii (Wii Remote driver over hidapi)
    which is licensed under the GNU Affero General Public License (version 3); see /COPYING.
*/
use std::{thread::sleep, time::Duration};
use wii::{EventKind, WiiMote};

fn main() -> wii::Result<()> {
    env_logger::init_from_env("LOG");
    let w = WiiMote::new();
    match std::env::var("WIIMOTE_ADDR") {
        Ok(addr) => w.connect(&addr)?,
        Err(_) => w.connect_any()?,
    }
    for kind in std::env::args().skip(1) {
        let kind: EventKind = kind.parse()?;
        match kind {
            EventKind::Ir => w.ir(true)?,
            EventKind::Acc => w.acc(true)?,
            EventKind::Nunchuk
            | EventKind::Classic
            | EventKind::Balance
            | EventKind::MotionPlus => w.ext(true)?,
            _ => {}
        }
        w.on(kind, |event| eprintln!("{event:?}"));
    }
    w.request_status()?;
    while w.is_connected() {
        sleep(Duration::from_millis(100));
    }
    Ok(())
}
