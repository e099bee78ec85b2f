use crate::error::BindingError;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// One physical key of the braille keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyBit {
    Dot1,
    Dot2,
    Dot3,
    Dot4,
    Dot5,
    Dot6,
    Dot7,
    Dot8,
    Space,
    Forward,
    Backward,
    Center,
    Up,
    Down,
    Left,
    Right,
}

impl KeyBit {
    /// Every key, in canonical symbol order.
    pub const ALL: [KeyBit; 16] = [
        KeyBit::Dot1,
        KeyBit::Dot2,
        KeyBit::Dot3,
        KeyBit::Dot4,
        KeyBit::Dot5,
        KeyBit::Dot6,
        KeyBit::Dot7,
        KeyBit::Dot8,
        KeyBit::Space,
        KeyBit::Forward,
        KeyBit::Backward,
        KeyBit::Center,
        KeyBit::Up,
        KeyBit::Down,
        KeyBit::Left,
        KeyBit::Right,
    ];

    pub fn from_code(code: char) -> Result<Self, BindingError> {
        let key = match code {
            '1' => KeyBit::Dot1,
            '2' => KeyBit::Dot2,
            '3' => KeyBit::Dot3,
            '4' => KeyBit::Dot4,
            '5' => KeyBit::Dot5,
            '6' => KeyBit::Dot6,
            '7' => KeyBit::Dot7,
            '8' => KeyBit::Dot8,
            's' => KeyBit::Space,
            'f' => KeyBit::Forward,
            'b' => KeyBit::Backward,
            'c' => KeyBit::Center,
            'u' => KeyBit::Up,
            'd' => KeyBit::Down,
            'l' => KeyBit::Left,
            'r' => KeyBit::Right,
            _ => return Err(BindingError::UnknownKey(code)),
        };
        Ok(key)
    }

    pub fn code(self) -> char {
        match self {
            KeyBit::Dot1 => '1',
            KeyBit::Dot2 => '2',
            KeyBit::Dot3 => '3',
            KeyBit::Dot4 => '4',
            KeyBit::Dot5 => '5',
            KeyBit::Dot6 => '6',
            KeyBit::Dot7 => '7',
            KeyBit::Dot8 => '8',
            KeyBit::Space => 's',
            KeyBit::Forward => 'f',
            KeyBit::Backward => 'b',
            KeyBit::Center => 'c',
            KeyBit::Up => 'u',
            KeyBit::Down => 'd',
            KeyBit::Left => 'l',
            KeyBit::Right => 'r',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            KeyBit::Dot1 => "Dot1",
            KeyBit::Dot2 => "Dot2",
            KeyBit::Dot3 => "Dot3",
            KeyBit::Dot4 => "Dot4",
            KeyBit::Dot5 => "Dot5",
            KeyBit::Dot6 => "Dot6",
            KeyBit::Dot7 => "Dot7",
            KeyBit::Dot8 => "Dot8",
            KeyBit::Space => "Space",
            KeyBit::Forward => "Forward",
            KeyBit::Backward => "Backward",
            KeyBit::Center => "Center",
            KeyBit::Up => "Up",
            KeyBit::Down => "Down",
            KeyBit::Left => "Left",
            KeyBit::Right => "Right",
        }
    }

    /// Power-of-two value; the position in `ALL` is the bit index.
    pub fn bit(self) -> u16 {
        1 << (self as u16)
    }

    pub fn is_dot(self) -> bool {
        (self as u16) < 8
    }
}

impl fmt::Display for KeyBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of keys pressed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Chord(u16);

impl Chord {
    pub const EMPTY: Chord = Chord(0);

    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, key: KeyBit) -> bool {
        self.0 & key.bit() != 0
    }

    /// Returns false if the key was already part of the chord.
    pub fn insert(&mut self, key: KeyBit) -> bool {
        let added = !self.contains(key);
        self.0 |= key.bit();
        added
    }

    pub fn remove(&mut self, key: KeyBit) {
        self.0 &= !key.bit();
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn keys(self) -> impl Iterator<Item = KeyBit> {
        KeyBit::ALL.into_iter().filter(move |key| self.contains(*key))
    }

    /// Configuration text for this chord, in canonical symbol order.
    pub fn to_spec(self) -> String {
        self.keys().map(KeyBit::code).collect()
    }
}

impl From<KeyBit> for Chord {
    fn from(key: KeyBit) -> Self {
        Chord(key.bit())
    }
}

impl BitOr for Chord {
    type Output = Chord;

    fn bitor(self, rhs: Chord) -> Chord {
        Chord(self.0 | rhs.0)
    }
}

impl BitOr<KeyBit> for Chord {
    type Output = Chord;

    fn bitor(self, rhs: KeyBit) -> Chord {
        Chord(self.0 | rhs.bit())
    }
}

impl BitOr for KeyBit {
    type Output = Chord;

    fn bitor(self, rhs: KeyBit) -> Chord {
        Chord(self.bit() | rhs.bit())
    }
}

impl BitOrAssign<KeyBit> for Chord {
    fn bitor_assign(&mut self, rhs: KeyBit) {
        self.0 |= rhs.bit();
    }
}

/// Renders dots compactly (`Dots125`) followed by the other keys, joined with `+`.
impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }

        let dots: String = self.keys().filter(|k| k.is_dot()).map(KeyBit::code).collect();
        let mut parts = Vec::new();
        match dots.len() {
            0 => {}
            1 => parts.push(format!("Dot{dots}")),
            _ => parts.push(format!("Dots{dots}")),
        }
        parts.extend(self.keys().filter(|k| !k.is_dot()).map(|k| k.name().to_owned()));

        f.write_str(&parts.join("+"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedChord {
    pub chord: Chord,
    /// Keys named more than once. They do not change the chord.
    pub duplicates: Vec<KeyBit>,
}

/// Decodes a chord-spec such as `125s`.
pub fn decode_chord(spec: &str) -> Result<DecodedChord, BindingError> {
    let mut chord = Chord::EMPTY;
    let mut duplicates = Vec::new();

    for code in spec.chars() {
        let key = KeyBit::from_code(code)?;
        if !chord.insert(key) {
            duplicates.push(key);
        }
    }

    Ok(DecodedChord { chord, duplicates })
}
