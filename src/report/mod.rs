//! Event sink for the optimization run plus end-of-run reports.
//!
//! The model never prints: progress, changes and warnings go through an
//! injected [`Observer`]. [`ConsoleObserver`] forwards them to the
//! `log!` / `debug!` macros; tests use [`RecordingObserver`].

pub mod debug;
pub mod stats;

use crate::pipeline::Phase;
use crate::{debug, log};
use std::rc::Rc;

pub trait Observer {
    fn on_phase_start(&self, phase: Phase);

    /// A change recorded on an entity.
    fn on_change(&self, subject: &str, change: &str);

    fn on_warning(&self, message: &str);

    /// Progress message, `module` is a short tag like `"minify"`.
    fn on_info(&self, module: &str, message: &str);

    /// Verbose-only detail.
    fn on_detail(&self, module: &str, message: &str);
}

impl<O: Observer + ?Sized> Observer for Rc<O> {
    fn on_phase_start(&self, phase: Phase) {
        (**self).on_phase_start(phase)
    }

    fn on_change(&self, subject: &str, change: &str) {
        (**self).on_change(subject, change)
    }

    fn on_warning(&self, message: &str) {
        (**self).on_warning(message)
    }

    fn on_info(&self, module: &str, message: &str) {
        (**self).on_info(module, message)
    }

    fn on_detail(&self, module: &str, message: &str) {
        (**self).on_detail(module, message)
    }
}

// ============================================================================
// Console
// ============================================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

impl Observer for ConsoleObserver {
    fn on_phase_start(&self, phase: Phase) {
        debug!("phase"; "{}", phase);
    }

    fn on_change(&self, subject: &str, change: &str) {
        debug!("change"; "{}: {}", subject, change);
    }

    fn on_warning(&self, message: &str) {
        log!("warning"; "{}", message);
    }

    fn on_info(&self, module: &str, message: &str) {
        log!(module; "{}", message);
    }

    fn on_detail(&self, module: &str, message: &str) {
        debug!(module; "{}", message);
    }
}

// ============================================================================
// Recording
// ============================================================================

#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    PhaseStart(Phase),
    Change { subject: String, change: String },
    Warning(String),
    Info { module: String, message: String },
    Detail { module: String, message: String },
}

/// Keeps every event in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: std::cell::RefCell<Vec<Event>>,
}

#[cfg(test)]
impl RecordingObserver {
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Warning(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn changes(&self) -> Vec<(String, String)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Change { subject, change } => Some((subject.clone(), change.clone())),
                _ => None,
            })
            .collect()
    }

    /// Info and detail messages of `module`.
    pub fn messages(&self, module: &str) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Info { module: m, message } | Event::Detail { module: m, message }
                    if m == module =>
                {
                    Some(message.clone())
                }
                _ => None,
            })
            .collect()
    }

    pub fn phases(&self) -> Vec<Phase> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::PhaseStart(phase) => Some(*phase),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
impl Observer for RecordingObserver {
    fn on_phase_start(&self, phase: Phase) {
        self.events.borrow_mut().push(Event::PhaseStart(phase));
    }

    fn on_change(&self, subject: &str, change: &str) {
        self.events.borrow_mut().push(Event::Change {
            subject: subject.to_string(),
            change: change.to_string(),
        });
    }

    fn on_warning(&self, message: &str) {
        self.events
            .borrow_mut()
            .push(Event::Warning(message.to_string()));
    }

    fn on_info(&self, module: &str, message: &str) {
        self.events.borrow_mut().push(Event::Info {
            module: module.to_string(),
            message: message.to_string(),
        });
    }

    fn on_detail(&self, module: &str, message: &str) {
        self.events.borrow_mut().push(Event::Detail {
            module: module.to_string(),
            message: message.to_string(),
        });
    }
}
