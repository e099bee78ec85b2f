use crate::action::{ActionFactory, SharedAction};
use crate::bindings::Bindings;
use crate::keymask::{Chord, KeyBit};
use crate::loader::{LoadReport, Loader};
use colored::{ColoredString, Colorize};
use log::{debug, warn};
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;
use std::sync::Arc;

/// Signal played when a chord could not be dispatched.
pub trait FailureCue: Send {
    fn beep(&self);
}

impl<F: Fn() + Send> FailureCue for F {
    fn beep(&self) {
        self()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EngineSettings {
    pub log_actions: bool,
    pub log_key_events: bool,
}

/// What a key release did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// No chord was pending
    Idle,
    Performed { action: String },
    Failed { action: String },
    Crashed { action: String },
    Unbound { chord: Chord },
}

impl Dispatch {
    pub fn succeeded(&self) -> bool {
        matches!(self, Dispatch::Performed { .. })
    }
}

/// Turns braille key transitions into one action per chord.
///
/// A chord grows while keys are pressed and fires on the first release that
/// follows, whichever key that is.
pub struct Engine {
    bindings: Bindings,
    cue: Box<dyn FailureCue>,
    settings: EngineSettings,
    /// Keys physically held
    pressed: Chord,
    /// Chord awaiting dispatch, empty once it has fired
    active: Chord,
}

impl Engine {
    pub fn new(bindings: Bindings, cue: impl FailureCue + 'static) -> Self {
        Self {
            bindings,
            cue: Box::new(cue),
            settings: EngineSettings::default(),
            pressed: Chord::EMPTY,
            active: Chord::EMPTY,
        }
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut Bindings {
        &mut self.bindings
    }

    pub fn pressed(&self) -> Chord {
        self.pressed
    }

    pub fn active(&self) -> Chord {
        self.active
    }

    pub fn handle_key_press(&mut self, key: KeyBit) {
        if self.pressed.insert(key) {
            self.active = self.pressed;
            self.log_key(key, true);
        }
    }

    pub fn handle_key_release(&mut self, key: KeyBit) -> Dispatch {
        let mut dispatch = Dispatch::Idle;

        if !self.active.is_empty() {
            let chord = self.active;
            dispatch = match self.bindings.get(chord).cloned() {
                Some(action) => self.perform_action(&action, chord),
                None => {
                    warn!("{}: {}", "unbound chord".yellow(), chord);
                    Dispatch::Unbound { chord }
                }
            };

            if !dispatch.succeeded() {
                self.cue.beep();
            }
            self.active.clear();
        }

        self.pressed.remove(key);
        self.log_key(key, false);
        dispatch
    }

    pub fn handle_key_event(&mut self, key: KeyBit, press: bool) -> Dispatch {
        if press {
            self.handle_key_press(key);
            Dispatch::Idle
        } else {
            self.handle_key_release(key)
        }
    }

    /// Presses and releases a single key.
    pub fn handle_key(&mut self, key: KeyBit) -> Dispatch {
        self.handle_key_press(key);
        self.handle_key_release(key)
    }

    /// Forgets every held key so nothing stale fires after a context switch.
    pub fn reset(&mut self) {
        if self.settings.log_key_events {
            debug!("resetting key state");
        }
        self.pressed.clear();
        self.active.clear();
    }

    /// Runs `action`. A panic inside it is reported as a crash and goes no further.
    fn perform_action(&self, action: &SharedAction, chord: Chord) -> Dispatch {
        let name = action.name().to_owned();
        if self.settings.log_actions {
            debug!("performing action: {} [{}]", name.bright_blue(), chord);
        }

        match catch_unwind(AssertUnwindSafe(|| action.perform(chord))) {
            Ok(true) => Dispatch::Performed { action: name },
            Ok(false) => {
                warn!("action failed: {name}");
                Dispatch::Failed { action: name }
            }
            Err(payload) => {
                warn!("action crashed: {name}: {}", panic_message(&*payload));
                Dispatch::Crashed { action: name }
            }
        }
    }

    fn log_key(&self, key: KeyBit, press: bool) {
        if self.settings.log_key_events {
            debug!(
                "{} {}: {} -> {}",
                state_arrow(press),
                "KEY".yellow(),
                key.name().bright_blue(),
                self.pressed
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

fn state_arrow(press: bool) -> ColoredString {
    if press {
        "↓".green().bold()
    } else {
        "↑".red().bold()
    }
}

/// Shared handle to one engine.
///
/// The input thread and anything that resets the engine from elsewhere (device
/// loss, dropped events) go through the same lock.
#[derive(Clone)]
pub struct EngineHandle {
    inner: Arc<Mutex<Engine>>,
}

impl EngineHandle {
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn handle_key_event(&self, key: KeyBit, press: bool) -> Dispatch {
        self.inner.lock().handle_key_event(key, press)
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    pub fn pressed(&self) -> Chord {
        self.inner.lock().pressed()
    }

    pub fn active(&self) -> Chord {
        self.inner.lock().active()
    }

    pub fn load_str(&self, factory: &dyn ActionFactory, text: &str) -> LoadReport {
        let mut engine = self.inner.lock();
        Loader::new(engine.bindings_mut(), factory).load_str(text)
    }

    pub fn load_file(&self, factory: &dyn ActionFactory, path: &Path) -> LoadReport {
        let mut engine = self.inner.lock();
        Loader::new(engine.bindings_mut(), factory).load_file(path)
    }

    /// Runs `f` with the engine locked.
    pub fn with<T>(&self, f: impl FnOnce(&mut Engine) -> T) -> T {
        f(&mut self.inner.lock())
    }
}
