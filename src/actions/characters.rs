use crate::io::VirtualKeyboard;
use chordkeys::{Action, Chord};
use evdev::KeyCode as K;
use log::warn;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Types the character configured for each of its chords, e.g. `12 InsertCharacter b`.
pub(crate) struct InsertCharacter {
    characters: RwLock<HashMap<Chord, char>>,
    keyboard: Arc<VirtualKeyboard>,
}

impl InsertCharacter {
    pub fn new(keyboard: Arc<VirtualKeyboard>) -> Self {
        Self {
            characters: RwLock::new(HashMap::new()),
            keyboard,
        }
    }

    pub fn character(&self, chord: Chord) -> Option<char> {
        self.characters.read().get(&chord).copied()
    }
}

impl Action for InsertCharacter {
    fn name(&self) -> &str {
        "InsertCharacter"
    }

    fn perform(&self, chord: Chord) -> bool {
        let Some(character) = self.character(chord) else {
            warn!("not mapped to a character: {}", chord);
            return false;
        };
        let Some(keys) = keys_for(character) else {
            return false;
        };

        match self.keyboard.tap(&keys, self.name()) {
            Ok(()) => true,
            Err(e) => {
                warn!("{}: {e}", self.name());
                false
            }
        }
    }

    /// Accepts exactly one character that can be typed on a US layout.
    fn parse_operand(&self, chord: Chord, operand: &str) -> bool {
        let mut chars = operand.chars();
        match (chars.next(), chars.next()) {
            (Some(character), None) if keys_for(character).is_some() => {
                self.characters.write().insert(chord, character);
                true
            }
            _ => false,
        }
    }
}

/// Key combination that types `character` on a US layout.
pub(crate) fn keys_for(character: char) -> Option<Vec<K>> {
    if character.is_ascii_uppercase() {
        let key = unshifted_key(character.to_ascii_lowercase())?;
        return Some(vec![K::KEY_LEFTSHIFT, key]);
    }
    if let Some(key) = unshifted_key(character) {
        return Some(vec![key]);
    }
    shifted_key(character).map(|key| vec![K::KEY_LEFTSHIFT, key])
}

fn unshifted_key(character: char) -> Option<K> {
    let key = match character {
        'a' => K::KEY_A,
        'b' => K::KEY_B,
        'c' => K::KEY_C,
        'd' => K::KEY_D,
        'e' => K::KEY_E,
        'f' => K::KEY_F,
        'g' => K::KEY_G,
        'h' => K::KEY_H,
        'i' => K::KEY_I,
        'j' => K::KEY_J,
        'k' => K::KEY_K,
        'l' => K::KEY_L,
        'm' => K::KEY_M,
        'n' => K::KEY_N,
        'o' => K::KEY_O,
        'p' => K::KEY_P,
        'q' => K::KEY_Q,
        'r' => K::KEY_R,
        's' => K::KEY_S,
        't' => K::KEY_T,
        'u' => K::KEY_U,
        'v' => K::KEY_V,
        'w' => K::KEY_W,
        'x' => K::KEY_X,
        'y' => K::KEY_Y,
        'z' => K::KEY_Z,
        '1' => K::KEY_1,
        '2' => K::KEY_2,
        '3' => K::KEY_3,
        '4' => K::KEY_4,
        '5' => K::KEY_5,
        '6' => K::KEY_6,
        '7' => K::KEY_7,
        '8' => K::KEY_8,
        '9' => K::KEY_9,
        '0' => K::KEY_0,
        '-' => K::KEY_MINUS,
        '=' => K::KEY_EQUAL,
        '[' => K::KEY_LEFTBRACE,
        ']' => K::KEY_RIGHTBRACE,
        '\\' => K::KEY_BACKSLASH,
        ';' => K::KEY_SEMICOLON,
        '\'' => K::KEY_APOSTROPHE,
        '`' => K::KEY_GRAVE,
        ',' => K::KEY_COMMA,
        '.' => K::KEY_DOT,
        '/' => K::KEY_SLASH,
        _ => return None,
    };
    Some(key)
}

fn shifted_key(character: char) -> Option<K> {
    let key = match character {
        '!' => K::KEY_1,
        '@' => K::KEY_2,
        '#' => K::KEY_3,
        '$' => K::KEY_4,
        '%' => K::KEY_5,
        '^' => K::KEY_6,
        '&' => K::KEY_7,
        '*' => K::KEY_8,
        '(' => K::KEY_9,
        ')' => K::KEY_0,
        '_' => K::KEY_MINUS,
        '+' => K::KEY_EQUAL,
        '{' => K::KEY_LEFTBRACE,
        '}' => K::KEY_RIGHTBRACE,
        '|' => K::KEY_BACKSLASH,
        ':' => K::KEY_SEMICOLON,
        '"' => K::KEY_APOSTROPHE,
        '~' => K::KEY_GRAVE,
        '<' => K::KEY_COMMA,
        '>' => K::KEY_DOT,
        '?' => K::KEY_SLASH,
        _ => return None,
    };
    Some(key)
}
