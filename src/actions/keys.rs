use crate::io::VirtualKeyboard;
use chordkeys::{Action, Chord};
use evdev::KeyCode;
use log::warn;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

/// Taps a fixed key combination.
pub(crate) struct KeyAction {
    name: String,
    keys: Vec<KeyCode>,
    keyboard: Arc<VirtualKeyboard>,
}

impl KeyAction {
    pub fn new(name: &str, keys: Vec<KeyCode>, keyboard: Arc<VirtualKeyboard>) -> Self {
        Self {
            name: name.to_owned(),
            keys,
            keyboard,
        }
    }
}

impl Action for KeyAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn perform(&self, _chord: Chord) -> bool {
        tap(&self.keyboard, &self.keys, &self.name)
    }
}

/// Taps the key combination configured for each of its chords, e.g.
/// `1s SendKey KEY_LEFTCTRL+KEY_S`.
pub(crate) struct SendKey {
    keys: RwLock<HashMap<Chord, Vec<KeyCode>>>,
    keyboard: Arc<VirtualKeyboard>,
}

impl SendKey {
    pub fn new(keyboard: Arc<VirtualKeyboard>) -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
            keyboard,
        }
    }
}

impl Action for SendKey {
    fn name(&self) -> &str {
        "SendKey"
    }

    fn perform(&self, chord: Chord) -> bool {
        match self.keys.read().get(&chord) {
            Some(keys) => tap(&self.keyboard, keys, self.name()),
            None => {
                warn!("{}: no key for {}", self.name(), chord);
                false
            }
        }
    }

    fn parse_operand(&self, chord: Chord, operand: &str) -> bool {
        match parse_key_combination(operand) {
            Some(keys) => {
                self.keys.write().insert(chord, keys);
                true
            }
            None => false,
        }
    }
}

/// Parses `KEY_A+KEY_B`.
pub(crate) fn parse_key_combination(operand: &str) -> Option<Vec<KeyCode>> {
    operand
        .split('+')
        .map(|name| KeyCode::from_str(name).ok())
        .collect()
}

fn tap(keyboard: &VirtualKeyboard, keys: &[KeyCode], source: &str) -> bool {
    match keyboard.tap(keys, source) {
        Ok(()) => true,
        Err(e) => {
            warn!("{source}: {e}");
            false
        }
    }
}
