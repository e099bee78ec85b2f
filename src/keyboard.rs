use crate::actions::{self, BUILTIN_BINDINGS};
use crate::config::{Config, KeyboardConfig};
use crate::io::{Bell, PRESS, REPEAT, VirtualKeyboard};
use anyhow::{Result, bail};
use chordkeys::{ActionCatalog, Bindings, Engine, EngineHandle, KeyBit, LoadReport};
use crossbeam_channel::unbounded;
use evdev::Device as EvDevDevice;
use evdev::{EventType, InputEvent, KeyCode, SynchronizationCode};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use udev::Enumerator;

pub(crate) struct Keyboard {
    pub device: EvDevDevice,
    pub config: KeyboardConfig,
}

pub(crate) fn open_keyboard_devices(config: &Config) -> Result<Vec<Keyboard>> {
    debug!("Detecting keyboards");

    let mut enumerator = Enumerator::new()?;
    enumerator.match_subsystem("input")?;
    enumerator.match_property("ID_INPUT_KEYBOARD", "1")?;

    let mut keyboards = Vec::new();

    for device in enumerator.scan_devices()? {
        if let Some(devnode) = device.devnode()
            && let Ok(mut keyboard) = EvDevDevice::open(devnode)
        {
            let keyboard_config = keyboard
                .name()
                .and_then(|name| config.keyboards.get(name))
                .cloned();

            let Some(keyboard_config) = keyboard_config else {
                debug!("Keyboard Ignored: {:?}", keyboard.name());
                continue;
            };

            // Grabbing while keys are down leaves them stuck on the virtual keyboard
            let mut first = true;
            loop {
                let key_states = keyboard.get_key_state()?;
                if key_states.iter().len() == 0 {
                    break;
                }
                if first {
                    first = false;
                    warn!("Waiting for keys to be released");
                }
                thread::sleep(Duration::from_millis(20));
            }

            keyboard.grab()?;

            if let Some(name) = keyboard.name() {
                info!("Keyboard monitored: {}", name);
            } else {
                info!("Keyboard monitored");
            }

            keyboards.push(Keyboard {
                device: keyboard,
                config: keyboard_config,
            });
        }
    }

    if keyboards.is_empty() {
        bail!("No keyboards found");
    } else {
        Ok(keyboards)
    }
}

/// Essential bindings, then the built-in file, then the user's files in order.
pub(crate) fn load_bindings(
    engine: &EngineHandle,
    catalog: &ActionCatalog,
    config: &Config,
    config_path: &Path,
) -> LoadReport {
    let mut report = LoadReport {
        bindings: engine.with(|e| actions::bind_essentials(e.bindings_mut(), catalog)),
        ..Default::default()
    };

    if config.globals.builtin_bindings {
        report.merge(engine.load_str(catalog, BUILTIN_BINDINGS));
    }
    for path in config.binding_paths(config_path) {
        report.merge(engine.load_file(catalog, &path));
    }

    info!(
        "{} bindings loaded ({} warnings)",
        report.bindings,
        report.warnings.len()
    );
    report
}

pub(crate) fn process(keyboard: Keyboard, config: &Config, config_path: &Path) -> Result<()> {
    let name = keyboard.device.name().unwrap_or("Keyboard").to_owned();
    let virt = Arc::new(VirtualKeyboard::create(&name, config.globals.no_emit)?);
    let catalog = actions::catalog(&virt);

    let engine = EngineHandle::new(
        Engine::new(Bindings::new(), Bell).with_settings(config.globals.engine_settings()),
    );
    load_bindings(&engine, &catalog, config, config_path);

    let keymap = keyboard.config.resolve_keymap();
    let mut device = keyboard.device;
    let (tx, rx) = unbounded::<InputEvent>();

    let resetter = engine.clone();
    thread::spawn(move || {
        loop {
            match device.fetch_events() {
                Err(e) => {
                    warn!("Read failed: {e}");
                    // Whatever was held is gone with the device
                    resetter.reset();
                    break;
                }
                Ok(events) => {
                    for event in events {
                        if tx.send(event).is_err() {
                            return;
                        }
                    }
                }
            }
        }
    });

    for event in rx.iter() {
        handle_event(&engine, &keymap, &virt, event)?;
    }

    warn!("Keyboard disconnected: {}", name);
    Ok(())
}

/// Feeds one device event to the engine, or passes it through when the key
/// is not a braille key.
fn handle_event(
    engine: &EngineHandle,
    keymap: &HashMap<KeyCode, KeyBit>,
    virt: &VirtualKeyboard,
    event: InputEvent,
) -> Result<()> {
    match event.event_type() {
        EventType::SYNCHRONIZATION if event.code() == SynchronizationCode::SYN_DROPPED.0 => {
            warn!("Events dropped, resetting keys");
            engine.reset();
        }
        EventType::KEY if event.value() != REPEAT => {
            let key = KeyCode(event.code());
            match keymap.get(&key) {
                Some(bit) => {
                    engine.handle_key_event(*bit, event.value() == PRESS);
                }
                None => virt.passthrough(key, event.value())?,
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::RELEASE;
    use chordkeys::Chord;
    use std::fs;

    fn offline_engine() -> (EngineHandle, ActionCatalog) {
        let virt = Arc::new(VirtualKeyboard::create("test", true).unwrap());
        let catalog = actions::catalog(&virt);
        let engine = EngineHandle::new(Engine::new(Bindings::new(), || {}));
        (engine, catalog)
    }

    #[test]
    fn test_user_files_override_builtin_bindings() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(dir.path().join("mine.conf"), "c Escape\nx Broken\n").unwrap();

        let config = Config {
            bindings: vec!["mine.conf".into(), "missing.conf".into()],
            ..Default::default()
        };
        let (engine, catalog) = offline_engine();

        let report = load_bindings(&engine, &catalog, &config, &config_path);

        // Unknown key in mine.conf and the missing file
        assert_eq!(report.warnings.len(), 2);
        let center = engine.with(|e| e.bindings().get(Chord::from(KeyBit::Center)).cloned());
        assert_eq!(center.unwrap().name(), "Escape");
    }

    #[test]
    fn test_builtin_bindings_can_be_disabled() {
        let mut config = Config::default();
        config.globals.builtin_bindings = false;
        let (engine, catalog) = offline_engine();

        let report = load_bindings(&engine, &catalog, &config, Path::new("config.yml"));

        // Only the bindings made in code
        assert_eq!(report.bindings, 2);
        assert!(report.warnings.is_empty());
        assert_eq!(engine.with(|e| e.bindings().len()), 2);
    }

    #[test]
    fn test_typing_a_letter_end_to_end() {
        let (engine, catalog) = offline_engine();
        load_bindings(&engine, &catalog, &Config::default(), Path::new("config.yml"));

        // Dots 1 and 2 together type "b"
        engine.handle_key_event(KeyBit::Dot1, true);
        engine.handle_key_event(KeyBit::Dot2, true);
        let dispatch = engine.handle_key_event(KeyBit::Dot2, false);
        engine.handle_key_event(KeyBit::Dot1, false);

        assert!(dispatch.succeeded(), "{dispatch:?}");
        assert!(engine.pressed().is_empty());
    }

    fn key_event(key: KeyCode, value: i32) -> InputEvent {
        InputEvent::new(EventType::KEY.0, key.0, value)
    }

    #[test]
    fn test_dropped_events_reset_the_chord() {
        let (engine, catalog) = offline_engine();
        load_bindings(&engine, &catalog, &Config::default(), Path::new("config.yml"));
        let keymap = KeyboardConfig::default().resolve_keymap();
        let virt = VirtualKeyboard::create("test", true).unwrap();

        handle_event(&engine, &keymap, &virt, key_event(KeyCode::KEY_F, PRESS)).unwrap();
        handle_event(&engine, &keymap, &virt, key_event(KeyCode::KEY_D, PRESS)).unwrap();
        assert_eq!(engine.active(), KeyBit::Dot1 | KeyBit::Dot2);

        let dropped = InputEvent::new(
            EventType::SYNCHRONIZATION.0,
            SynchronizationCode::SYN_DROPPED.0,
            0,
        );
        handle_event(&engine, &keymap, &virt, dropped).unwrap();

        assert!(engine.pressed().is_empty());
        assert!(engine.active().is_empty());
    }

    #[test]
    fn test_report_and_repeat_events_leave_state_alone() {
        let (engine, _) = offline_engine();
        let keymap = KeyboardConfig::default().resolve_keymap();
        let virt = VirtualKeyboard::create("test", true).unwrap();

        handle_event(&engine, &keymap, &virt, key_event(KeyCode::KEY_F, PRESS)).unwrap();
        let report = InputEvent::new(
            EventType::SYNCHRONIZATION.0,
            SynchronizationCode::SYN_REPORT.0,
            0,
        );
        handle_event(&engine, &keymap, &virt, report).unwrap();
        handle_event(&engine, &keymap, &virt, key_event(KeyCode::KEY_F, REPEAT)).unwrap();
        assert_eq!(engine.active(), Chord::from(KeyBit::Dot1));

        // Keys outside the keymap are passed through untouched
        handle_event(&engine, &keymap, &virt, key_event(KeyCode::KEY_Q, PRESS)).unwrap();
        handle_event(&engine, &keymap, &virt, key_event(KeyCode::KEY_Q, RELEASE)).unwrap();
        assert_eq!(engine.pressed(), Chord::from(KeyBit::Dot1));
    }
}
