//! Chord bindings for braille keyboards.
//!
//! Keys pressed together form a [`Chord`]. A text configuration binds chords to
//! named [`Action`]s, and the [`Engine`] performs the bound action once per
//! chord gesture.

pub mod action;
pub mod bindings;
pub mod engine;
pub mod error;
pub mod keymask;
pub mod loader;

#[cfg(test)]
pub(crate) mod test_support;

pub use action::{Action, ActionCatalog, ActionFactory, SharedAction};
pub use bindings::Bindings;
pub use engine::{Dispatch, Engine, EngineHandle, EngineSettings, FailureCue};
pub use error::BindingError;
pub use keymask::{Chord, DecodedChord, KeyBit, decode_chord};
pub use loader::{ConfigWarning, LoadReport, Loader};
