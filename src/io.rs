use anyhow::{Result, anyhow};
use chordkeys::FailureCue;
use colored::Colorize;
use evdev::KeyCode;
use log::{debug, warn};
use parking_lot::Mutex;
use std::io::Write;
use uinput::device::Device as UInputDevice;

pub(crate) const RELEASE: i32 = 0;
pub(crate) const PRESS: i32 = 1;
pub(crate) const REPEAT: i32 = 2;
pub(crate) const EV_KEY: i32 = 1;

/// Output side of one physical keyboard.
///
/// With `no_emit` nothing is written and the events are only logged.
pub(crate) struct VirtualKeyboard {
    device: Option<Mutex<UInputDevice>>,
}

impl VirtualKeyboard {
    pub fn create(name: &str, no_emit: bool) -> Result<Self> {
        if no_emit {
            return Ok(Self { device: None });
        }

        let device = uinput::default()
            .map_err(|e| anyhow!("Failed to open /dev/uinput (sudo modprobe uinput): {e}"))?
            .name(format!("{} ChordKeys", name))?
            .event(uinput::event::Keyboard::All)?
            .create()?;
        Ok(Self {
            device: Some(Mutex::new(device)),
        })
    }

    /// Presses `keys` in order, then releases them in reverse.
    pub fn tap(&self, keys: &[KeyCode], source: &str) -> Result<()> {
        let mut device = self.device.as_ref().map(|device| device.lock());

        for key in keys {
            if let Some(device) = device.as_mut() {
                device.write(EV_KEY, key.0 as i32, PRESS)?;
            }
            log_key(key, PRESS, source);
        }
        for key in keys.iter().rev() {
            if let Some(device) = device.as_mut() {
                device.write(EV_KEY, key.0 as i32, RELEASE)?;
            }
            log_key(key, RELEASE, source);
        }

        if let Some(device) = device.as_mut() {
            device.synchronize()?;
        }

        Ok(())
    }

    pub fn passthrough(&self, key: KeyCode, state: i32) -> Result<()> {
        if let Some(device) = &self.device {
            let mut device = device.lock();
            device.write(EV_KEY, key.0 as i32, state)?;
            device.synchronize()?;
        }

        log_key(&key, state, "raw");
        Ok(())
    }
}

/// Rings the terminal bell.
pub(crate) struct Bell;

impl FailureCue for Bell {
    fn beep(&self) {
        let mut stderr = std::io::stderr();
        if let Err(e) = stderr.write_all(b"\x07").and_then(|_| stderr.flush()) {
            warn!("bell: {e}");
        }
    }
}

fn log_key(key: &KeyCode, state: i32, source: &str) {
    debug!(
        "{}[{}] {:?} [{}]",
        if is_modifier(key) { "    " } else { "" },
        if state == PRESS {
            "↓".green().bold()
        } else {
            "↑".red().bold()
        },
        key,
        source.purple(),
    );
}

fn is_modifier(key: &KeyCode) -> bool {
    matches!(
        *key,
        KeyCode::KEY_LEFTSHIFT
            | KeyCode::KEY_RIGHTSHIFT
            | KeyCode::KEY_LEFTCTRL
            | KeyCode::KEY_RIGHTCTRL
            | KeyCode::KEY_LEFTALT
            | KeyCode::KEY_RIGHTALT
            | KeyCode::KEY_LEFTMETA
            | KeyCode::KEY_RIGHTMETA
    )
}
