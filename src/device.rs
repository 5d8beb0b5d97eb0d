/*
    This file is part of wii (Wii Remote driver over hidapi)
    which is licensed under the GNU Affero General Public License (version 3); see /COPYING.
*/
use crate::{
    error::{Error, Result},
    event::{EventKind, Listeners},
    lock, transport, worker, Action, Config, Event, ExtensionType, ReportFlags, Shared, State,
    Transport, WiiMote,
};
use log::{error, info, warn};
use std::{
    sync::{atomic::Ordering, Arc, Mutex},
    thread::{self, JoinHandle},
};

impl WiiMote {
    /// Creates a disconnected handle.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                transport: Mutex::new(None),
                writers: 0.into(),
                rumble: false.into(),
                running: false.into(),
                state: Mutex::new(State::default()),
                reporting: Mutex::new(()),
                listeners: Mutex::new(Listeners::default()),
                worker: Mutex::new(None),
            }),
        }
    }

    /// Connects to the wiimote with the given bluetooth address, e.g. `00:17:AB:39:42:B1`.
    /// The remote has to be paired and connected on the system already.
    pub fn connect(&self, address: &str) -> Result<()> {
        let addr = address.parse()?;
        let device = transport::open_hid(Some(addr))?;
        self.shared.attach(Box::new(device))
    }

    /// Connects to the first wiimote found.
    pub fn connect_any(&self) -> Result<()> {
        let device = transport::open_hid(None)?;
        self.shared.attach(Box::new(device))
    }

    /// Connects on a separate thread and calls `callback` once with the outcome.
    pub fn connect_with<F>(&self, address: &str, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let address = address.to_owned();
        self.connect_in_background(
            move || {
                let addr = address.parse()?;
                let device = transport::open_hid(Some(addr))?;
                Ok(Box::new(device) as Box<dyn Transport>)
            },
            callback,
        )
    }

    fn connect_in_background<O, F>(&self, open: O, callback: F) -> JoinHandle<()>
    where
        O: FnOnce() -> Result<Box<dyn Transport>> + Send + 'static,
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let shared = self.shared.clone();
        thread::spawn(move || callback(open().and_then(|device| shared.attach(device))))
    }

    /// Starts a session over an already opened transport.
    pub fn attach(&self, transport: Box<dyn Transport>) -> Result<()> {
        self.shared.attach(transport)
    }

    /// Stops the reader and closes the device. Does nothing when not connected.
    pub fn disconnect(&self) -> Result<()> {
        self.shared.detach();
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        lock(&self.shared.transport).is_some()
    }

    /// Switches the rumble motor on or off.
    pub fn rumble(&self, enabled: bool) -> Result<()> {
        self.shared.write(Action::RumbleEnable(enabled))
    }

    /// Switches one of the player LEDs, numbered 1 to 4.
    pub fn led(&self, index: u8, on: bool) -> Result<()> {
        if !(1..=4).contains(&index) {
            return Err(Error::InvalidLed(index));
        }
        self.ensure_connected()?;
        let mask = {
            let mut state = lock(&self.shared.state);
            let bit = 1 << (index - 1);
            if on {
                state.leds |= bit;
            } else {
                state.leds &= !bit;
            }
            state.leds
        };
        self.shared.write(Action::PlayerLeds(mask))
    }

    /// Sets all player LEDs from the lower 4 bit of `mask`.
    pub fn leds(&self, mask: u8) -> Result<()> {
        self.ensure_connected()?;
        lock(&self.shared.state).leds = mask & 0x0f;
        self.shared.write(Action::PlayerLeds(mask))
    }

    /// Asks for a status report, delivered as [`Event::Status`].
    pub fn request_status(&self) -> Result<()> {
        self.shared.write(Action::RequestStatus)
    }

    /// IR camera reporting.
    pub fn ir(&self, on: bool) -> Result<()> {
        self.set_flags(|f| f.ir = on)
    }

    /// Accelerometer reporting.
    pub fn acc(&self, on: bool) -> Result<()> {
        self.set_flags(|f| f.acc = on)
    }

    /// Extension controller reporting.
    pub fn ext(&self, on: bool) -> Result<()> {
        self.set_flags(|f| f.ext = on)
    }

    /// Button events. Buttons are always part of reports, this only mutes the events.
    pub fn button(&self, on: bool) -> Result<()> {
        self.set_flags(|f| f.buttons = on)
    }

    /// Subscribes `handler` to events of `kind`. Handlers run on the reader thread
    /// in the order they were added.
    pub fn on<F>(&self, kind: EventKind, handler: F)
    where
        F: FnMut(&Event) + Send + 'static,
    {
        lock(&self.shared.listeners).add(kind, Box::new(handler));
    }

    pub fn remove_listeners(&self, kind: EventKind) {
        lock(&self.shared.listeners).remove(kind);
    }

    /// Send a raw action to the wiimote.
    pub fn write(&self, action: Action) -> Result<()> {
        self.shared.write(action)
    }

    pub fn extension(&self) -> ExtensionType {
        lock(&self.shared.state).extension
    }

    pub fn flags(&self) -> ReportFlags {
        lock(&self.shared.state).flags
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    fn set_flags(&self, f: impl FnOnce(&mut ReportFlags)) -> Result<()> {
        self.ensure_connected()?;
        f(&mut lock(&self.shared.state).flags);
        self.shared.apply_reporting()
    }
}

impl Default for WiiMote {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WiiMote {
    fn drop(&mut self) {
        self.shared.detach();
    }
}

impl Shared {
    fn attach(self: &Arc<Self>, transport: Box<dyn Transport>) -> Result<()> {
        if lock(&self.transport).is_some() {
            return Err(Error::AlreadyConnected);
        }
        // the previous session's reader may still be winding down
        self.join_worker();
        {
            let mut slot = lock(&self.transport);
            if slot.is_some() {
                return Err(Error::AlreadyConnected);
            }
            *slot = Some(transport);
        }
        {
            let mut state = lock(&self.state);
            *state = State {
                flags: state.flags,
                ..State::default()
            };
        }
        self.rumble.store(false, Ordering::Relaxed);
        self.running.store(true, Ordering::Release);

        let shared = self.clone();
        let handle = thread::Builder::new()
            .name("wiimote-reader".into())
            .spawn(move || worker::run(shared));
        match handle {
            Ok(handle) => *lock(&self.worker) = Some(handle),
            Err(e) => {
                self.detach();
                return Err(e.into());
            }
        }

        let init = self
            .write(Action::RequestStatus)
            .and_then(|_| self.apply_reporting());
        if let Err(e) = init {
            warn!("initialising wiimote: {e}");
            self.detach();
            return Err(e);
        }
        info!("wiimote connected");
        Ok(())
    }

    fn detach(&self) {
        self.running.store(false, Ordering::Release);
        let was_connected = lock(&self.transport).take().is_some();
        self.join_worker();
        if was_connected {
            info!("wiimote disconnected");
        }
    }

    fn join_worker(&self) {
        let Some(handle) = lock(&self.worker).take() else {
            return;
        };
        // called from a listener; the reader exits on its own once `running` is off
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            error!("reader thread panicked");
        }
    }
}
