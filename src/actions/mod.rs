mod characters;
mod keys;

pub(crate) use characters::InsertCharacter;
pub(crate) use keys::{KeyAction, SendKey};

use crate::io::VirtualKeyboard;
use chordkeys::{ActionCatalog, Bindings, Chord, KeyBit, SharedAction};
use evdev::KeyCode as K;
use log::warn;
use std::sync::Arc;

/// Binding file loaded before any user file.
pub(crate) const BUILTIN_BINDINGS: &str = include_str!("../../assets/keys.conf");

const NAMED_KEYS: &[(&str, &[K])] = &[
    ("Enter", &[K::KEY_ENTER]),
    ("InsertSpace", &[K::KEY_SPACE]),
    ("Backspace", &[K::KEY_BACKSPACE]),
    ("Delete", &[K::KEY_DELETE]),
    ("Escape", &[K::KEY_ESC]),
    ("Tab", &[K::KEY_TAB]),
    ("MoveUp", &[K::KEY_UP]),
    ("MoveDown", &[K::KEY_DOWN]),
    ("MoveLeft", &[K::KEY_LEFT]),
    ("MoveRight", &[K::KEY_RIGHT]),
    ("MoveToStart", &[K::KEY_HOME]),
    ("MoveToEnd", &[K::KEY_END]),
    ("PageUp", &[K::KEY_PAGEUP]),
    ("PageDown", &[K::KEY_PAGEDOWN]),
    ("Copy", &[K::KEY_LEFTCTRL, K::KEY_C]),
    ("Cut", &[K::KEY_LEFTCTRL, K::KEY_X]),
    ("Paste", &[K::KEY_LEFTCTRL, K::KEY_V]),
    ("Undo", &[K::KEY_LEFTCTRL, K::KEY_Z]),
    ("SelectAll", &[K::KEY_LEFTCTRL, K::KEY_A]),
];

/// Bound in code before any file loads, so a broken configuration still
/// leaves a usable keyboard.
const ESSENTIAL_BINDINGS: &[(KeyBit, &str)] = &[
    (KeyBit::Center, "Enter"),
    (KeyBit::Space, "InsertSpace"),
];

/// Adds the bindings every host starts from and returns how many were added.
pub(crate) fn bind_essentials(bindings: &mut Bindings, catalog: &ActionCatalog) -> usize {
    let mut added = 0;
    for (key, name) in ESSENTIAL_BINDINGS {
        let result = catalog
            .create_by_name(name)
            .and_then(|action| bindings.add(Chord::from(*key), action));
        match result {
            Ok(()) => added += 1,
            Err(e) => warn!("{key}: {e}"),
        }
    }
    added
}

/// Every action a configuration file can name, writing to `keyboard`.
pub(crate) fn catalog(keyboard: &Arc<VirtualKeyboard>) -> ActionCatalog {
    let mut catalog = ActionCatalog::new();

    for (name, keys) in NAMED_KEYS {
        let keyboard = keyboard.clone();
        catalog.register(*name, move || {
            Arc::new(KeyAction::new(name, keys.to_vec(), keyboard.clone())) as SharedAction
        });
    }

    let kb = keyboard.clone();
    catalog.register("SendKey", move || Arc::new(SendKey::new(kb.clone())) as SharedAction);

    let kb = keyboard.clone();
    catalog.register("InsertCharacter", move || {
        Arc::new(InsertCharacter::new(kb.clone())) as SharedAction
    });

    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use chordkeys::Loader;

    fn offline_keyboard() -> Arc<VirtualKeyboard> {
        Arc::new(VirtualKeyboard::create("test", true).unwrap())
    }

    #[test]
    fn test_builtin_bindings_load_cleanly() {
        let catalog = catalog(&offline_keyboard());
        let mut bindings = Bindings::new();

        let report = Loader::new(&mut bindings, &catalog).load_str(BUILTIN_BINDINGS);

        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(report.bindings, bindings.len());
        assert_eq!(bindings.get(Chord::from(KeyBit::Space)).unwrap().name(), "InsertSpace");
        assert_eq!(bindings.get(Chord::from(KeyBit::Center)).unwrap().name(), "Enter");
        assert_eq!(bindings.get(Chord::from(KeyBit::Dot1)).unwrap().name(), "InsertCharacter");
    }

    #[test]
    fn test_builtin_letters_share_one_instance() {
        let catalog = catalog(&offline_keyboard());
        let mut bindings = Bindings::new();
        Loader::new(&mut bindings, &catalog).load_str(BUILTIN_BINDINGS);

        let a = bindings.get(Chord::from(KeyBit::Dot1)).unwrap();
        let b = bindings.get(KeyBit::Dot1 | KeyBit::Dot2).unwrap();
        assert!(Arc::ptr_eq(a, b));
        assert!(a.perform(Chord::from(KeyBit::Dot1)));
        assert!(b.perform(KeyBit::Dot1 | KeyBit::Dot2));
    }

    #[test]
    fn test_every_named_key_is_registered() {
        let catalog = catalog(&offline_keyboard());
        for (name, _) in NAMED_KEYS {
            let action = catalog.create_by_name(name).unwrap();
            assert_eq!(action.name(), *name);
            assert!(action.perform(Chord::from(KeyBit::Center)));
        }
        assert!(catalog.contains("SendKey"));
        assert!(catalog.contains("InsertCharacter"));
    }

    #[test]
    fn test_essential_bindings() {
        let catalog = catalog(&offline_keyboard());
        let mut bindings = Bindings::new();

        assert_eq!(bind_essentials(&mut bindings, &catalog), 2);
        assert_eq!(bindings.get(Chord::from(KeyBit::Center)).unwrap().name(), "Enter");
        assert_eq!(bindings.get(Chord::from(KeyBit::Space)).unwrap().name(), "InsertSpace");
    }

    #[test]
    fn test_essential_bindings_skip_missing_actions() {
        let mut bindings = Bindings::new();

        assert_eq!(bind_essentials(&mut bindings, &ActionCatalog::new()), 0);
        assert!(bindings.is_empty());
    }
}
