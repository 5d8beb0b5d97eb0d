/*
    This file is part of wii (Wii Remote driver over hidapi)
    which is licensed under the GNU Affero General Public License (version 3); see /COPYING.
*/
use log::{error, info};
use std::{
    sync::Arc,
    thread::{self, sleep},
    time::Duration,
};
use wii::{Event, EventKind, WiiMote};

fn main() {
    env_logger::init_from_env("LOG");
    let address = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("WIIMOTE_ADDR").ok())
        .unwrap_or_else(|| "00:17:AB:39:42:B1".to_owned());

    let wiimote = Arc::new(WiiMote::new());
    let w = wiimote.clone();
    let name = address.clone();
    let connecting = wiimote.connect_with(&address, move |result| {
        if let Err(e) = result {
            error!("{e}");
            return;
        }
        info!("connected to {name}");
        let run = || -> wii::Result<()> {
            w.rumble(true)?;
            let off = w.clone();
            thread::spawn(move || {
                sleep(Duration::from_millis(1000));
                if let Err(e) = off.rumble(false) {
                    error!("{e}");
                }
            });

            w.ext(true)?;
            w.on(EventKind::Nunchuk, |event| {
                if let Event::Nunchuk(data) = event {
                    println!("{data:?}");
                }
            });
            Ok(())
        };
        if let Err(e) = run() {
            error!("{e}");
        }
    });
    if connecting.join().is_err() {
        std::process::exit(1);
    }
    while wiimote.is_connected() {
        sleep(Duration::from_millis(100));
    }
}
