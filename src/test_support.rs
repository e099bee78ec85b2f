//! Stub actions and cues shared by the unit tests.

use crate::action::{Action, ActionCatalog, SharedAction};
use crate::engine::FailureCue;
use crate::keymask::Chord;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Copy, Debug)]
pub(crate) enum Behavior {
    Succeed,
    Fail,
    Panic,
}

pub(crate) struct StubAction {
    name: String,
    behavior: Behavior,
    pub performed: Mutex<Vec<Chord>>,
    pub operands: Mutex<Vec<(Chord, String)>>,
}

impl StubAction {
    pub fn new(name: &str, behavior: Behavior) -> Self {
        Self {
            name: name.to_owned(),
            behavior,
            performed: Mutex::new(Vec::new()),
            operands: Mutex::new(Vec::new()),
        }
    }

    pub fn shared(name: &str, behavior: Behavior) -> SharedAction {
        Arc::new(Self::new(name, behavior))
    }

    pub fn perform_count(&self) -> usize {
        self.performed.lock().len()
    }
}

impl Action for StubAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn perform(&self, chord: Chord) -> bool {
        self.performed.lock().push(chord);
        match self.behavior {
            Behavior::Succeed => true,
            Behavior::Fail => false,
            Behavior::Panic => panic!("{} blew up", self.name),
        }
    }

    /// Accepts anything except the literal `bad`.
    fn parse_operand(&self, chord: Chord, operand: &str) -> bool {
        if operand == "bad" {
            return false;
        }
        self.operands.lock().push((chord, operand.to_owned()));
        true
    }
}

/// Catalog whose actions all succeed.
pub(crate) fn stub_catalog(names: &[&'static str]) -> ActionCatalog {
    let mut catalog = ActionCatalog::new();
    for name in names.iter().copied() {
        catalog.register(name, move || StubAction::shared(name, Behavior::Succeed));
    }
    catalog
}

#[derive(Clone, Default)]
pub(crate) struct CountingCue(pub Arc<AtomicUsize>);

impl CountingCue {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl FailureCue for CountingCue {
    fn beep(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}
