use crate::action::SharedAction;
use crate::error::BindingError;
use crate::keymask::Chord;
use log::warn;
use std::collections::HashMap;

/// Chord to action table.
#[derive(Clone, Default)]
pub struct Bindings {
    table: HashMap<Chord, SharedAction>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `action` to `chord`, replacing any previous binding.
    pub fn add(&mut self, chord: Chord, action: SharedAction) -> Result<(), BindingError> {
        if chord.is_empty() {
            warn!("{}: {}", BindingError::InvalidChord, action.name());
            return Err(BindingError::InvalidChord);
        }

        self.table.insert(chord, action);
        Ok(())
    }

    pub fn get(&self, chord: Chord) -> Option<&SharedAction> {
        self.table.get(&chord)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Chord, &SharedAction)> {
        self.table.iter().map(|(chord, action)| (*chord, action))
    }

    /// Writes the table as configuration text, one `<chord> <action>` line per binding.
    /// Operands are not reproduced.
    pub fn render(&self) -> String {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by_key(|(chord, _)| *chord);

        entries
            .into_iter()
            .map(|(chord, action)| format!("{} {}\n", chord.to_spec(), action.name()))
            .collect()
    }
}
