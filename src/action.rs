use crate::error::BindingError;
use crate::keymask::Chord;
use log::warn;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A named unit of behaviour that can be bound to one or more chords.
pub trait Action: Send + Sync {
    fn name(&self) -> &str;

    /// Runs the action for the chord that selected it. Returning false means nothing
    /// happened and the user should be told.
    fn perform(&self, chord: Chord) -> bool;

    /// Customizes the action for one of its chords while configuration is loaded.
    fn parse_operand(&self, _chord: Chord, operand: &str) -> bool {
        warn!("{}: operand not supported: {}", self.name(), operand);
        false
    }
}

pub type SharedAction = Arc<dyn Action>;

/// Resolves configuration action names to instances.
pub trait ActionFactory {
    fn create_action(&self, name: &str) -> Option<SharedAction>;
}

type Constructor = Box<dyn Fn() -> SharedAction + Send + Sync>;

/// Name to constructor table for every action the host knows how to build.
#[derive(Default)]
pub struct ActionCatalog {
    constructors: BTreeMap<String, Constructor>,
}

impl ActionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn() -> SharedAction + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Box::new(constructor));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Builds a fresh instance of the named action.
    pub fn create_by_name(&self, name: &str) -> Result<SharedAction, BindingError> {
        self.constructors
            .get(name)
            .map(|constructor| constructor())
            .ok_or_else(|| BindingError::ActionNotFound(name.to_owned()))
    }
}

impl ActionFactory for ActionCatalog {
    fn create_action(&self, name: &str) -> Option<SharedAction> {
        self.create_by_name(name).ok()
    }
}
