/*
    This file is part of wii (Wii Remote driver over hidapi)
    which is licensed under the GNU Affero General Public License (version 3); see /COPYING.
*/
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc::{self, Receiver},
        Arc, Mutex,
    },
    thread::{self, sleep},
    time::{Duration, Instant},
};
use wii::{
    ButtonState, Config, Error, ErrorEvent, Event, EventKind, ExtensionType, Transport, WiiMote,
    BTN_A, BTN_B,
};

const TIMEOUT: Duration = Duration::from_secs(2);

enum Incoming {
    Report(Vec<u8>),
    Fail,
}

/// Both ends of an in-memory wiimote: what it will send and what it received.
#[derive(Clone, Default)]
struct Script {
    incoming: Arc<Mutex<VecDeque<Incoming>>>,
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    /// The next write starting with this prefix fails.
    refuse: Arc<Mutex<Option<Vec<u8>>>>,
}

impl Script {
    fn push(&self, report: &[u8]) {
        let mut r = report.to_vec();
        if r.len() < 22 && r[0] >= 0x32 {
            r.resize(22, 0);
        }
        self.incoming
            .lock()
            .unwrap()
            .push_back(Incoming::Report(r));
    }
    fn fail(&self) {
        self.incoming.lock().unwrap().push_back(Incoming::Fail);
    }
    fn refuse_next(&self, prefix: &[u8]) {
        *self.refuse.lock().unwrap() = Some(prefix.to_vec());
    }
    fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }
    fn has_sent(&self, prefix: &[u8]) -> bool {
        self.sent().iter().any(|s| s.starts_with(prefix))
    }
}

struct Scripted(Script);

impl Transport for Scripted {
    fn write(&mut self, data: &[u8]) -> wii::Result<usize> {
        let mut refuse = self.0.refuse.lock().unwrap();
        if refuse.as_ref().is_some_and(|p| data.starts_with(p)) {
            *refuse = None;
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "write timed out",
            )));
        }
        self.0.sent.lock().unwrap().push(data.to_vec());
        Ok(data.len())
    }
    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> wii::Result<usize> {
        let next = self.0.incoming.lock().unwrap().pop_front();
        match next {
            Some(Incoming::Report(r)) => {
                buf[..r.len()].copy_from_slice(&r);
                Ok(r.len())
            }
            Some(Incoming::Fail) => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "device gone",
            ))),
            None => {
                sleep(timeout);
                Ok(0)
            }
        }
    }
}

fn session() -> (WiiMote, Script) {
    let script = Script::default();
    let w = WiiMote::with_config(Config {
        poll_interval: Duration::from_millis(5),
        ..Config::default()
    });
    w.attach(Box::new(Scripted(script.clone()))).unwrap();
    (w, script)
}

fn listen(w: &WiiMote, kind: EventKind) -> Receiver<Event> {
    let (tx, rx) = mpsc::channel();
    w.on(kind, move |event| {
        let _ = tx.send(event.clone());
    });
    rx
}

fn wait_for(mut cond: impl FnMut() -> bool) {
    let start = Instant::now();
    while !cond() {
        assert!(start.elapsed() < TIMEOUT, "timed out");
        sleep(Duration::from_millis(1));
    }
}

const NUNCHUK_ID: [u8; 6] = [0x00, 0x00, 0xa4, 0x20, 0x00, 0x00];
const STATUS_WITH_EXT: [u8; 7] = [0x20, 0x00, 0x00, 0x02, 0, 0, 0x64];

fn memory_data(addr: u16, data: &[u8]) -> Vec<u8> {
    let mut r = vec![0u8; 22];
    r[0] = 0x21;
    r[3] = ((data.len() - 1) as u8) << 4;
    r[4..6].copy_from_slice(&addr.to_be_bytes());
    r[6..6 + data.len()].copy_from_slice(data);
    r
}

/// Reports an extension with the given id and waits until it is identified.
fn plug(script: &Script, ext: &Receiver<Event>, id: [u8; 6]) -> ExtensionType {
    script.push(&STATUS_WITH_EXT);
    script.push(&memory_data(0x00fa, &id));
    match ext.recv_timeout(TIMEOUT).unwrap() {
        Event::Extension(t) => t,
        other => panic!("{other:?}"),
    }
}

#[test]
fn attach_requests_status_and_core_buttons() {
    let (_w, script) = session();
    let sent = script.sent();
    assert_eq!(sent[0], [0x15, 0x00]);
    assert_eq!(sent[1], [0x12, 0x00, 0x30]);
}

#[test]
fn rumble_bit_survives_other_commands() {
    let (w, script) = session();
    w.rumble(true).unwrap();
    w.led(2, true).unwrap();
    w.rumble(false).unwrap();
    w.led(2, false).unwrap();
    let sent = script.sent();
    assert_eq!(
        sent[sent.len() - 4..],
        [
            vec![0x10, 0x01],
            vec![0x11, 0x21],
            vec![0x10, 0x00],
            vec![0x11, 0x00],
        ]
    );
}

#[test]
fn leds_accumulate_and_validate_index() {
    let (w, script) = session();
    w.led(1, true).unwrap();
    w.led(4, true).unwrap();
    assert_eq!(script.sent().last().unwrap(), &[0x11, 0x90]);
    assert!(matches!(w.led(0, true), Err(Error::InvalidLed(0))));
    assert!(matches!(w.led(5, true), Err(Error::InvalidLed(5))));
    w.leds(0b0110).unwrap();
    assert_eq!(script.sent().last().unwrap(), &[0x11, 0x60]);
}

#[test]
fn disconnected_handle_refuses_commands() {
    let w = WiiMote::new();
    assert!(!w.is_connected());
    assert!(matches!(w.rumble(true), Err(Error::NotConnected)));
    assert!(matches!(w.ext(true), Err(Error::NotConnected)));
    assert!(matches!(w.led(1, true), Err(Error::NotConnected)));
    assert!(matches!(w.request_status(), Err(Error::NotConnected)));
    w.disconnect().unwrap();
}

#[test]
fn second_attach_is_rejected() {
    let (w, _script) = session();
    let other = Scripted(Script::default());
    assert!(matches!(
        w.attach(Box::new(other)),
        Err(Error::AlreadyConnected)
    ));
}

#[test]
fn invalid_address_is_reported() {
    let w = WiiMote::new();
    assert!(matches!(
        w.connect("not-an-address"),
        Err(Error::InvalidAddress(_))
    ));

    let (tx, rx) = mpsc::channel();
    w.connect_with("00:17:AB:39:42", move |result| {
        tx.send(result).unwrap();
    })
    .join()
    .unwrap();
    assert!(matches!(rx.recv().unwrap(), Err(Error::InvalidAddress(_))));
}

#[test]
fn reporting_flags_select_mode() {
    let (w, script) = session();
    w.acc(true).unwrap();
    assert!(script.has_sent(&[0x12, 0x00, 0x31]));
    w.ext(true).unwrap();
    assert!(script.has_sent(&[0x12, 0x00, 0x35]));
    w.acc(false).unwrap();
    assert_eq!(script.sent().last().unwrap(), &[0x12, 0x00, 0x34]);
    assert!(w.flags().ext && !w.flags().acc);
}

#[test]
fn ir_enables_camera_and_switches_mode() {
    let (w, script) = session();
    w.ir(true).unwrap();
    assert!(script.has_sent(&[0x13, 0x04]));
    assert!(script.has_sent(&[0x1a, 0x04]));
    // extended mode without extension
    assert!(script.has_sent(&[0x16, 0x04, 0xb0, 0x00, 0x33, 0x01, 0x03]));
    assert_eq!(script.sent().last().unwrap(), &[0x12, 0x00, 0x33]);

    w.ext(true).unwrap();
    assert!(script.has_sent(&[0x16, 0x04, 0xb0, 0x00, 0x33, 0x01, 0x01]));
    assert_eq!(script.sent().last().unwrap(), &[0x12, 0x00, 0x36]);

    w.ir(false).unwrap();
    assert!(script.has_sent(&[0x1a, 0x00]));
    assert_eq!(script.sent().last().unwrap(), &[0x12, 0x00, 0x34]);
}

#[test]
fn button_edges() {
    let (w, script) = session();
    let down = listen(&w, EventKind::ButtonDown);
    let up = listen(&w, EventKind::ButtonUp);
    script.push(&[0x30, 0x00, 0x08]);
    script.push(&[0x30, 0x00, 0x0c]);
    script.push(&[0x30, 0x00, 0x0c]);
    script.push(&[0x30, 0x00, 0x04]);
    script.push(&[0x30, 0x00, 0x00]);

    let bits = |rx: &Receiver<Event>| match rx.recv_timeout(TIMEOUT).unwrap() {
        Event::ButtonDown(b) | Event::ButtonUp(b) => b.bits(),
        other => panic!("{other:?}"),
    };
    assert_eq!(bits(&down), BTN_A);
    assert_eq!(bits(&down), BTN_B);
    assert_eq!(bits(&up), BTN_A);
    assert_eq!(bits(&up), BTN_B);
    assert!(down.recv_timeout(Duration::from_millis(50)).is_err());
}

#[test]
fn muted_buttons_emit_nothing() {
    let (w, script) = session();
    w.button(false).unwrap();
    let down = listen(&w, EventKind::ButtonDown);
    let status = listen(&w, EventKind::Status);
    script.push(&[0x30, 0x00, 0x08]);
    script.push(&[0x20, 0x00, 0x00, 0x10, 0, 0, 0x64]);
    status.recv_timeout(TIMEOUT).unwrap();
    assert!(down.try_recv().is_err());
}

#[test]
fn nunchuk_is_identified_and_decoded() {
    let (w, script) = session();
    let ext = listen(&w, EventKind::Extension);
    let nunchuk = listen(&w, EventKind::Nunchuk);
    w.ext(true).unwrap();

    script.push(&[0x20, 0x00, 0x00, 0x02, 0, 0, 0x64]);
    script.push(&memory_data(0x00fa, &NUNCHUK_ID));
    script.push(&[0x34, 0x00, 0x00, 0x85, 0x7a, 0x80, 0x80, 0x80, 0b0000_0010]);

    assert_eq!(
        ext.recv_timeout(TIMEOUT).unwrap(),
        Event::Extension(ExtensionType::Nunchuk)
    );
    let Event::Nunchuk(n) = nunchuk.recv_timeout(TIMEOUT).unwrap() else {
        unreachable!()
    };
    assert_eq!(n.stick, [0x85, 0x7a]);
    assert!(n.z && !n.c);
    assert_eq!(w.extension(), ExtensionType::Nunchuk);

    assert!(script.has_sent(&[0x16, 0x04, 0xa4, 0x00, 0xf0, 0x01, 0x55]));
    assert!(script.has_sent(&[0x16, 0x04, 0xa4, 0x00, 0xfb, 0x01, 0x00]));
    assert!(script.has_sent(&[0x17, 0x04, 0xa4, 0x00, 0xfa, 0x00, 0x06]));
}

#[test]
fn removed_extension_resets_type() {
    let (w, script) = session();
    let ext = listen(&w, EventKind::Extension);
    script.push(&[0x20, 0x00, 0x00, 0x02, 0, 0, 0x64]);
    script.push(&memory_data(0x00fa, &NUNCHUK_ID));
    assert_eq!(
        ext.recv_timeout(TIMEOUT).unwrap(),
        Event::Extension(ExtensionType::Nunchuk)
    );
    script.push(&[0x20, 0x00, 0x00, 0x00, 0, 0, 0x64]);
    assert_eq!(
        ext.recv_timeout(TIMEOUT).unwrap(),
        Event::Extension(ExtensionType::None)
    );
    assert_eq!(w.extension(), ExtensionType::None);
}

#[test]
fn failed_identification_leaves_unknown_extension() {
    let (w, script) = session();
    let ext = listen(&w, EventKind::Extension);
    script.push(&[0x20, 0x00, 0x00, 0x02, 0, 0, 0x64]);
    let mut failed = memory_data(0x00fa, &[0xff]);
    failed[3] |= 0x08;
    script.push(&failed);
    assert!(matches!(
        ext.recv_timeout(TIMEOUT).unwrap(),
        Event::Extension(ExtensionType::Unknown(_))
    ));
}

#[test]
fn status_is_delivered_and_mode_resent() {
    let (w, script) = session();
    let status = listen(&w, EventKind::Status);
    let before = script.sent().len();
    w.request_status().unwrap();
    script.push(&[0x20, 0x00, 0x00, 0b0101_0000, 0, 0, 0xc8]);
    let Event::Status(s) = status.recv_timeout(TIMEOUT).unwrap() else {
        unreachable!()
    };
    assert_eq!(s.battery, wii::BATTERY_MAX);
    assert_eq!(s.leds, 0b0101);
    assert!(!s.extension_connected);
    wait_for(|| {
        script.sent()[before..]
            .iter()
            .any(|s| s.as_slice() == [0x12, 0x00, 0x30])
    });
}

#[test]
fn listeners_run_in_registration_order() {
    let (w, script) = session();
    let order = Arc::new(Mutex::new(Vec::new()));
    for n in 0..3 {
        let order = order.clone();
        w.on(EventKind::Acc, move |_| order.lock().unwrap().push(n));
    }
    w.acc(true).unwrap();
    script.push(&[0x31, 0x00, 0x00, 0x80, 0x80, 0x80]);
    wait_for(|| order.lock().unwrap().len() == 3);
    assert_eq!(*order.lock().unwrap(), [0, 1, 2]);

    w.remove_listeners(EventKind::Acc);
    script.push(&[0x31, 0x00, 0x00, 0x80, 0x80, 0x80]);
    sleep(Duration::from_millis(50));
    assert_eq!(order.lock().unwrap().len(), 3);
}

#[test]
fn listener_can_remove_its_own_kind() {
    let (w, script) = session();
    let w = Arc::new(w);
    let calls = Arc::new(AtomicUsize::new(0));
    {
        let calls = calls.clone();
        let handle = w.clone();
        w.on(EventKind::Acc, move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            handle.remove_listeners(EventKind::Acc);
        });
    }
    let status = listen(&w, EventKind::Status);
    w.acc(true).unwrap();
    for _ in 0..3 {
        script.push(&[0x31, 0x00, 0x00, 0x80, 0x80, 0x80]);
    }
    script.push(&[0x20, 0x00, 0x00, 0x00, 0, 0, 0x64]);
    status.recv_timeout(TIMEOUT).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    w.disconnect().unwrap();
}

#[test]
fn identification_retries_after_failed_write() {
    let (w, script) = session();
    let ext = listen(&w, EventKind::Extension);
    let errors = listen(&w, EventKind::Error);
    script.refuse_next(&[0x16, 0x04, 0xa4, 0x00, 0xf0]);
    script.push(&STATUS_WITH_EXT);
    assert!(matches!(
        errors.recv_timeout(TIMEOUT).unwrap(),
        Event::Error(ErrorEvent::Communication(_))
    ));
    assert!(!script.has_sent(&[0x17, 0x04, 0xa4, 0x00, 0xfa]));
    assert!(w.is_connected());

    assert_eq!(plug(&script, &ext, NUNCHUK_ID), ExtensionType::Nunchuk);
    assert!(script.has_sent(&[0x17, 0x04, 0xa4, 0x00, 0xfa, 0x00, 0x06]));
}

#[test]
fn concurrent_mode_changes_end_with_current_flags() {
    let (w, script) = session();
    let w = Arc::new(w);
    let status = listen(&w, EventKind::Status);
    let toggler = {
        let w = w.clone();
        thread::spawn(move || {
            for i in 0..50 {
                w.acc(i % 2 == 0).unwrap();
            }
        })
    };
    for _ in 0..50 {
        script.push(&[0x20, 0x00, 0x00, 0x00, 0, 0, 0x64]);
    }
    toggler.join().unwrap();
    for _ in 0..50 {
        status.recv_timeout(TIMEOUT).unwrap();
    }
    sleep(Duration::from_millis(50));

    assert!(!w.flags().acc);
    let last_mode = script
        .sent()
        .into_iter()
        .filter(|s| s[0] == 0x12)
        .last()
        .unwrap();
    assert_eq!(last_mode, [0x12, 0x00, 0x30]);
}

#[test]
fn ir_objects_are_delivered() {
    let (w, script) = session();
    let ir = listen(&w, EventKind::Ir);
    w.ir(true).unwrap();
    let mut report = vec![0x33, 0x00, 0x00, 0x80, 0x80, 0x80];
    report.extend([0x10, 0x20, 0b0101_0011]);
    report.extend([0xff; 9]);
    script.push(&report);

    let Event::Ir(objects) = ir.recv_timeout(TIMEOUT).unwrap() else {
        unreachable!()
    };
    let first = objects[0].unwrap();
    assert_eq!((first.x, first.y, first.size_or_intensity), (0x110, 0x120, 3));
    assert!(objects[1..].iter().all(Option::is_none));
}

#[test]
fn classic_controller_is_identified_and_decoded() {
    let (w, script) = session();
    let ext = listen(&w, EventKind::Extension);
    let classic = listen(&w, EventKind::Classic);
    w.ext(true).unwrap();
    let id = [0x00, 0x00, 0xa4, 0x20, 0x01, 0x01];
    assert_eq!(plug(&script, &ext, id), ExtensionType::Classic);

    // A held, everything else released (active low)
    script.push(&[0x34, 0x00, 0x00, 0x20, 0x1f, 0x10, 0x00, 0xff, 0xef]);
    let Event::Classic(c) = classic.recv_timeout(TIMEOUT).unwrap() else {
        unreachable!()
    };
    assert_eq!(c.left_stick, [0x20, 0x1f]);
    assert!(c.buttons.a && !c.buttons.b && !c.buttons.home);
}

#[test]
fn balance_board_is_identified_and_decoded() {
    let (w, script) = session();
    let ext = listen(&w, EventKind::Extension);
    let balance = listen(&w, EventKind::Balance);
    w.ext(true).unwrap();
    let id = [0x00, 0x00, 0xa4, 0x20, 0x04, 0x02];
    assert_eq!(plug(&script, &ext, id), ExtensionType::BalanceBoard);

    script.push(&[0x34, 0x00, 0x00, 0x12, 0x34, 0x00, 0x10, 0x00, 0x00, 0x00, 0x01]);
    let Event::Balance(b) = balance.recv_timeout(TIMEOUT).unwrap() else {
        unreachable!()
    };
    assert_eq!(
        (b.top_right, b.bottom_right, b.top_left, b.bottom_left),
        (0x1234, 0x0010, 0, 1)
    );
}

#[test]
fn motion_plus_is_identified_and_decoded() {
    let (w, script) = session();
    let ext = listen(&w, EventKind::Extension);
    let motion = listen(&w, EventKind::MotionPlus);
    w.ext(true).unwrap();
    let id = [0x00, 0x00, 0xa4, 0x20, 0x04, 0x05];
    assert_eq!(plug(&script, &ext, id), ExtensionType::MotionPlus);

    // pass-through frame first, it carries no gyro data
    script.push(&[0x34, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x04]);
    script.push(&[0x34, 0x00, 0x00, 0x10, 0x20, 0x30, 0x06, 0x08, 0x06]);
    let Event::MotionPlus(m) = motion.recv_timeout(TIMEOUT).unwrap() else {
        unreachable!()
    };
    assert_eq!((m.yaw, m.roll, m.pitch), (0x110, 0x220, 0x130));
    assert!(m.yaw_slow && !m.pitch_slow && !m.roll_slow);
    assert!(!m.extension_connected);
    assert!(motion.try_recv().is_err());
}

#[test]
fn read_failure_ends_session() {
    let (w, script) = session();
    let errors = listen(&w, EventKind::Error);
    script.fail();
    assert_eq!(
        errors.recv_timeout(TIMEOUT).unwrap(),
        Event::Error(ErrorEvent::Disconnect)
    );
    assert!(!w.is_connected());
    assert!(matches!(w.rumble(true), Err(Error::NotConnected)));

    // a new session can start on the same handle
    w.attach(Box::new(Scripted(Script::default()))).unwrap();
    assert!(w.is_connected());
}

#[test]
fn disconnect_is_idempotent() {
    let (w, _script) = session();
    w.disconnect().unwrap();
    assert!(!w.is_connected());
    w.disconnect().unwrap();
    assert!(matches!(w.ext(true), Err(Error::NotConnected)));
}

#[test]
fn button_state_masks_match_constants() {
    let b = ButtonState::from_bits(BTN_A | BTN_B);
    assert!(b.a && b.b && !b.home);
}
