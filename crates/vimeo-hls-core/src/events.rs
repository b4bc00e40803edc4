//! Media events and the listener registry owned by the adapter

use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Events forwarded from the media element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaEvent {
    Play,
    Pause,
    Ended,
    TimeUpdate,
    LoadedMetadata,
    Error,
}

impl MediaEvent {
    pub const ALL: [MediaEvent; 6] = [
        MediaEvent::Play,
        MediaEvent::Pause,
        MediaEvent::Ended,
        MediaEvent::TimeUpdate,
        MediaEvent::LoadedMetadata,
        MediaEvent::Error,
    ];

    /// DOM event name
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaEvent::Play => "play",
            MediaEvent::Pause => "pause",
            MediaEvent::Ended => "ended",
            MediaEvent::TimeUpdate => "timeupdate",
            MediaEvent::LoadedMetadata => "loadedmetadata",
            MediaEvent::Error => "error",
        }
    }
}

impl fmt::Display for MediaEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaEvent::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| Error::InvalidConfig(format!("unknown event: {}", s)))
    }
}

/// Error part of an [`EventDetail`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl From<&Error> for ErrorDetail {
    fn from(err: &Error) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Payload handed to listeners, read from the media element at dispatch time
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    #[serde(rename = "type")]
    pub event: MediaEvent,
    pub current_time: f64,
    /// `None` until metadata is known
    pub duration: Option<f64>,
    pub paused: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

/// A registered callback
pub trait Listener: Clone {
    /// Run the callback; an `Err` is logged and does not stop dispatch
    fn invoke(&self, detail: &EventDetail) -> Result<(), String>;

    /// Identity used by `off`
    fn same_as(&self, other: &Self) -> bool;
}

/// Rust closure listener, compared by pointer
#[derive(Clone)]
pub struct FnListener(Rc<dyn Fn(&EventDetail) -> Result<(), String>>);

impl FnListener {
    pub fn new(f: impl Fn(&EventDetail) -> Result<(), String> + 'static) -> Self {
        Self(Rc::new(f))
    }
}

impl Listener for FnListener {
    fn invoke(&self, detail: &EventDetail) -> Result<(), String> {
        (self.0)(detail)
    }

    fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for FnListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnListener")
    }
}

/// Handle returned by [`EventRegistry::on`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered listeners per event; insertion order is dispatch order
#[derive(Debug)]
pub struct EventRegistry<L> {
    next_id: u64,
    listeners: HashMap<MediaEvent, Vec<(ListenerId, L)>>,
}

impl<L> Default for EventRegistry<L> {
    fn default() -> Self {
        Self {
            next_id: 0,
            listeners: HashMap::new(),
        }
    }
}

impl<L: Listener> EventRegistry<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, event: MediaEvent, listener: L) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.entry(event).or_default().push((id, listener));
        id
    }

    /// Remove the first registration of `listener` for `event`
    pub fn off(&mut self, event: MediaEvent, listener: &L) -> bool {
        let Some(list) = self.listeners.get_mut(&event) else {
            return false;
        };
        match list.iter().position(|(_, l)| l.same_as(listener)) {
            Some(index) => {
                list.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        for list in self.listeners.values_mut() {
            if let Some(index) = list.iter().position(|(lid, _)| *lid == id) {
                list.remove(index);
                return true;
            }
        }
        false
    }

    /// Copy of the listeners for `event`, in dispatch order.
    ///
    /// Dispatch iterates this copy, so `on`/`off` calls made by a listener
    /// take effect from the next emission.
    pub fn snapshot(&self, event: MediaEvent) -> Vec<L> {
        self.listeners
            .get(&event)
            .map(|list| list.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self, event: MediaEvent) -> usize {
        self.listeners.get(&event).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.values().all(Vec::is_empty)
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

/// Invoke every listener in order; failures are logged and counted
pub fn dispatch<L: Listener>(listeners: &[L], detail: &EventDetail) -> usize {
    let mut failures = 0;
    for listener in listeners {
        if let Err(e) = listener.invoke(detail) {
            failures += 1;
            tracing::warn!(event = %detail.event, error = %e, "Listener failed");
        }
    }
    failures
}
