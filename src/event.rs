/*
    This file is part of wii (Wii Remote driver over hidapi)
    which is licensed under the GNU Affero General Public License (version 3); see /COPYING.
*/
use crate::{
    error::{Error, ErrorEvent},
    Acceleration, BalanceBoard, ButtonState, ClassicController, ExtensionType, IRObject,
    MotionPlus, Nunchuk, Status,
};
use std::{
    collections::{HashMap, HashSet},
    fmt,
    str::FromStr,
};

/// Decoded data delivered to listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Ir([Option<IRObject>; 4]),
    Acc(Acceleration),
    Nunchuk(Nunchuk),
    Classic(ClassicController),
    Balance(BalanceBoard),
    MotionPlus(MotionPlus),
    /// Buttons that went down since the last report.
    ButtonDown(ButtonState),
    /// Buttons that went up since the last report.
    ButtonUp(ButtonState),
    Status(Status),
    /// An extension was identified or removed.
    Extension(ExtensionType),
    Error(ErrorEvent),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Ir(_) => EventKind::Ir,
            Event::Acc(_) => EventKind::Acc,
            Event::Nunchuk(_) => EventKind::Nunchuk,
            Event::Classic(_) => EventKind::Classic,
            Event::Balance(_) => EventKind::Balance,
            Event::MotionPlus(_) => EventKind::MotionPlus,
            Event::ButtonDown(_) => EventKind::ButtonDown,
            Event::ButtonUp(_) => EventKind::ButtonUp,
            Event::Status(_) => EventKind::Status,
            Event::Extension(_) => EventKind::Extension,
            Event::Error(_) => EventKind::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ir,
    Acc,
    Nunchuk,
    Classic,
    Balance,
    MotionPlus,
    ButtonDown,
    ButtonUp,
    Status,
    Extension,
    Error,
}

impl EventKind {
    pub const ALL: [EventKind; 11] = [
        EventKind::Ir,
        EventKind::Acc,
        EventKind::Nunchuk,
        EventKind::Classic,
        EventKind::Balance,
        EventKind::MotionPlus,
        EventKind::ButtonDown,
        EventKind::ButtonUp,
        EventKind::Status,
        EventKind::Extension,
        EventKind::Error,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Ir => "ir",
            EventKind::Acc => "acc",
            EventKind::Nunchuk => "nunchuk",
            EventKind::Classic => "classic",
            EventKind::Balance => "balance",
            EventKind::MotionPlus => "motionplus",
            EventKind::ButtonDown => "buttondown",
            EventKind::ButtonUp => "buttonup",
            EventKind::Status => "status",
            EventKind::Extension => "extension",
            EventKind::Error => "error",
        }
    }
}

impl FromStr for EventKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| Error::UnknownEvent(s.to_owned()))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Event handler. Runs on the reader thread.
pub type Listener = Box<dyn FnMut(&Event) + Send>;

#[derive(Default)]
pub(crate) struct Listeners {
    map: HashMap<EventKind, Vec<Listener>>,
    /// Kinds removed since their listeners were last taken.
    removed: HashSet<EventKind>,
}

impl Listeners {
    pub fn add(&mut self, kind: EventKind, listener: Listener) {
        self.map.entry(kind).or_default().push(listener);
    }

    pub fn remove(&mut self, kind: EventKind) {
        self.map.remove(&kind);
        self.removed.insert(kind);
    }

    /// Takes the listeners of a kind out so they can run without the table locked.
    pub fn take(&mut self, kind: EventKind) -> Vec<Listener> {
        self.removed.remove(&kind);
        self.map.remove(&kind).unwrap_or_default()
    }

    /// Puts taken listeners back in front of any registered while they ran.
    /// Drops them instead if the kind was removed in the meantime.
    pub fn restore(&mut self, kind: EventKind, mut taken: Vec<Listener>) {
        if self.removed.remove(&kind) || taken.is_empty() {
            return;
        }
        let added = self.map.remove(&kind).unwrap_or_default();
        taken.extend(added);
        self.map.insert(kind, taken);
    }

    #[cfg(test)]
    pub fn has(&self, kind: EventKind) -> bool {
        self.map.get(&kind).is_some_and(|l| !l.is_empty())
    }
}
