/*
    This file is part of wii (Wii Remote driver over hidapi)
    which is licensed under the GNU Affero General Public License (version 3); see /COPYING.
*/
use crate::{
    consts::*,
    error::{Error, ErrorEvent, Result},
    lock, parse_report, Action, Event, ExtensionType, MemoryData, Report, Shared, Status,
};
use log::{debug, error, info, trace, warn};
use std::{
    sync::{atomic::Ordering, Arc},
    thread,
};

const EXT_ID_ADDR: u16 = (REG_EXT_ID & 0xffff) as u16;

/// Reader loop: polls the device and dispatches until stopped or the device fails.
pub(crate) fn run(shared: Arc<Shared>) {
    let mut buf = [0u8; 64];
    while shared.running.load(Ordering::Acquire) {
        let size = match shared.read(&mut buf) {
            Ok(0) => continue,
            Ok(size) => size,
            Err(e) => {
                if shared.running.swap(false, Ordering::AcqRel) {
                    error!("read failed: {e}");
                    lock(&shared.transport).take();
                    shared.emit(Event::Error(ErrorEvent::Disconnect));
                }
                break;
            }
        };
        trace!("recv {:?}", &buf[..size]);
        match parse_report(&buf[..size]) {
            Ok(reports) => {
                for report in reports {
                    match shared.handle(report) {
                        Ok(()) => {}
                        // disconnected while handling
                        Err(_) if !shared.running.load(Ordering::Acquire) => break,
                        Err(e) => {
                            warn!("handling report: {e}");
                            shared.emit(Event::Error(ErrorEvent::Communication(e.to_string())));
                        }
                    }
                }
            }
            Err(e) => warn!("{e}"),
        }
    }
    debug!("reader stopped");
}

impl Shared {
    fn read(&self, buf: &mut [u8]) -> Result<usize> {
        // let queued writes go first, the lock is not fair
        while self.writers.load(Ordering::Acquire) > 0 {
            thread::yield_now();
        }
        let mut transport = lock(&self.transport);
        let transport = transport.as_mut().ok_or(Error::NotConnected)?;
        transport.read_timeout(buf, self.config.poll_interval)
    }

    /// Calls every listener of the event's kind.
    pub(crate) fn emit(&self, event: Event) {
        let kind = event.kind();
        let mut taken = lock(&self.listeners).take(kind);
        for listener in taken.iter_mut() {
            listener(&event);
        }
        lock(&self.listeners).restore(kind, taken);
    }

    fn handle(&self, report: Report) -> Result<()> {
        match report {
            Report::Buttons(buttons) => {
                let (previous, enabled) = {
                    let mut state = lock(&self.state);
                    let previous = std::mem::replace(&mut state.buttons, buttons);
                    (previous, state.flags.buttons)
                };
                if enabled && previous != buttons {
                    let down = buttons.difference(&previous);
                    let up = previous.difference(&buttons);
                    if !down.is_empty() {
                        self.emit(Event::ButtonDown(down));
                    }
                    if !up.is_empty() {
                        self.emit(Event::ButtonUp(up));
                    }
                }
            }
            Report::Acceleration(acc) => self.emit(Event::Acc(acc)),
            Report::IRDetection(objects) => self.emit(Event::Ir(objects)),
            Report::Extension(data) => {
                let extension = lock(&self.state).extension;
                if let Some(event) = extension.decode(&data) {
                    self.emit(event);
                }
            }
            Report::Status(status) => self.handle_status(status)?,
            Report::MemoryData(data) => self.handle_memory(data)?,
            Report::Acknowledge { report, error } => {
                if error != 0 {
                    warn!("report {report:02x} failed with code {error}");
                }
            }
        }
        Ok(())
    }

    fn handle_status(&self, status: Status) -> Result<()> {
        let (identify, removed) = {
            let mut state = lock(&self.state);
            state.leds = status.leds;
            let known = state.extension != ExtensionType::None;
            let identify = status.extension_connected && !known && state.pending_read.is_none();
            let removed = !status.extension_connected && known;
            if removed {
                state.extension = ExtensionType::None;
            }
            if !status.extension_connected {
                state.pending_read = None;
            }
            if identify {
                state.pending_read = Some(EXT_ID_ADDR);
            }
            (identify, removed)
        };
        self.emit(Event::Status(status));
        if removed {
            info!("extension removed");
            self.emit(Event::Extension(ExtensionType::None));
        }
        if identify {
            debug!("extension connected, identifying");
            let requested = self
                .write_registers(REG_EXT_INIT1, &[0x55])
                .and_then(|_| self.write_registers(REG_EXT_INIT2, &[0x00]))
                .and_then(|_| {
                    self.write(Action::ReadRegisters {
                        addr: REG_EXT_ID,
                        size: 6,
                    })
                });
            if let Err(e) = requested {
                // the next status report retries
                lock(&self.state).pending_read = None;
                return Err(e);
            }
        }
        // the remote stops streaming after a status report until the mode is set again
        self.apply_reporting()
    }

    fn handle_memory(&self, data: MemoryData) -> Result<()> {
        {
            let mut state = lock(&self.state);
            if state.pending_read != Some(data.addr) {
                debug!("unexpected memory data at {:04x}", data.addr);
                return Ok(());
            }
            state.pending_read = None;
        }
        let extension = match <[u8; 6]>::try_from(data.data.as_slice()) {
            Ok(id) if data.error == 0 => ExtensionType::identify(id),
            _ => {
                let e = Error::MemoryRead {
                    addr: data.addr,
                    code: data.error,
                };
                warn!("{e}");
                ExtensionType::Unknown([0xff; 6])
            }
        };
        info!("extension identified: {extension:?}");
        lock(&self.state).extension = extension;
        self.emit(Event::Extension(extension));
        self.apply_reporting()
    }
}
