//! Reader for the key binding configuration format.
//!
//! One binding per line, fields separated by whitespace:
//!
//! ```text
//! # comment
//! <chord> <action> [<operand>]
//! ```
//!
//! `<chord>` is a run of key codes (see [`KeyBit::from_code`]). Bad lines are
//! reported and skipped; loading itself never fails.

use crate::action::{ActionFactory, SharedAction};
use crate::bindings::Bindings;
use crate::error::BindingError;
use crate::keymask::{KeyBit, decode_chord};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigWarning {
    #[error("line {line}: unknown key: {key}")]
    UnknownKey { line: usize, key: char },
    #[error("line {line}: key specified more than once: {key}")]
    DuplicateKey { line: usize, key: char },
    #[error("line {line}: no keys")]
    EmptyChord { line: usize },
    #[error("line {line}: missing action")]
    MissingAction { line: usize },
    #[error("line {line}: action not found: {name}")]
    ActionNotFound { line: usize, name: String },
    #[error("line {line}: {action}: invalid operand: {operand}")]
    InvalidOperand {
        line: usize,
        action: String,
        operand: String,
    },
    #[error("line {line}: too many operands")]
    TooManyOperands { line: usize },
    #[error("line {line}: read error: {message}")]
    Unreadable { line: usize, message: String },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Lines that produced a binding
    pub bindings: usize,
    pub warnings: Vec<ConfigWarning>,
}

/// Adds bindings from configuration sources to a binding table.
///
/// Every `load*` call has its own action namespace: lines within one source that
/// name the same action share a single instance, so operands accumulate on it.
pub struct Loader<'a> {
    bindings: &'a mut Bindings,
    factory: &'a dyn ActionFactory,
}

impl<'a> Loader<'a> {
    pub fn new(bindings: &'a mut Bindings, factory: &'a dyn ActionFactory) -> Self {
        Self { bindings, factory }
    }

    pub fn load_str(&mut self, text: &str) -> LoadReport {
        self.load(text.as_bytes())
    }

    /// A missing or unreadable file contributes no bindings.
    pub fn load_file(&mut self, path: &Path) -> LoadReport {
        match File::open(path) {
            Ok(file) => {
                let report = self.load(BufReader::new(file));
                info!(
                    "Loaded {} bindings from {} ({} warnings)",
                    report.bindings,
                    path.display(),
                    report.warnings.len()
                );
                report
            }
            Err(e) => {
                let warning = ConfigWarning::Unreadable {
                    line: 0,
                    message: format!("{}: {e}", path.display()),
                };
                warn!("{warning}");
                LoadReport {
                    bindings: 0,
                    warnings: vec![warning],
                }
            }
        }
    }

    /// Loads every line of `reader`. Bytes that are not UTF-8 are replaced,
    /// only an I/O error ends the source early.
    pub fn load<R: BufRead>(&mut self, mut reader: R) -> LoadReport {
        let mut actions: HashMap<String, SharedAction> = HashMap::new();
        let mut report = LoadReport::default();
        let mut buffer = Vec::new();
        let mut number = 0;

        loop {
            buffer.clear();
            number += 1;
            match reader.read_until(b'\n', &mut buffer) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    report.push(ConfigWarning::Unreadable {
                        line: number,
                        message: e.to_string(),
                    });
                    break;
                }
            }

            let line = String::from_utf8_lossy(&buffer);
            let line = line.trim_end_matches(['\n', '\r']);
            if self.load_line(number, line, &mut actions, &mut report) {
                report.bindings += 1;
            }
        }

        debug!(
            "{} bindings added, {} warnings",
            report.bindings,
            report.warnings.len()
        );
        report
    }

    fn load_line(
        &mut self,
        line: usize,
        text: &str,
        actions: &mut HashMap<String, SharedAction>,
        report: &mut LoadReport,
    ) -> bool {
        let mut operands = text.split_whitespace();

        let Some(keys) = operands.next() else {
            return false;
        };
        if keys.starts_with('#') {
            return false;
        }

        let decoded = match decode_chord(keys) {
            Ok(decoded) => decoded,
            Err(BindingError::UnknownKey(key)) => {
                report.push(ConfigWarning::UnknownKey { line, key });
                return false;
            }
            Err(_) => {
                report.push(ConfigWarning::EmptyChord { line });
                return false;
            }
        };
        for key in decoded.duplicates {
            report.push(ConfigWarning::DuplicateKey {
                line,
                key: KeyBit::code(key),
            });
        }
        let chord = decoded.chord;
        if chord.is_empty() {
            report.push(ConfigWarning::EmptyChord { line });
            return false;
        }

        let Some(name) = operands.next() else {
            report.push(ConfigWarning::MissingAction { line });
            return false;
        };

        let action = match actions.get(name) {
            Some(action) => action.clone(),
            None => match self.factory.create_action(name) {
                Some(action) => {
                    actions.insert(name.to_owned(), action.clone());
                    action
                }
                None => {
                    report.push(ConfigWarning::ActionNotFound {
                        line,
                        name: name.to_owned(),
                    });
                    return false;
                }
            },
        };

        if self.bindings.add(chord, action.clone()).is_err() {
            return false;
        }

        if let Some(operand) = operands.next() {
            if !action.parse_operand(chord, operand) {
                report.push(ConfigWarning::InvalidOperand {
                    line,
                    action: name.to_owned(),
                    operand: operand.to_owned(),
                });
            }

            if operands.next().is_some() {
                report.push(ConfigWarning::TooManyOperands { line });
            }
        }

        true
    }
}

impl LoadReport {
    fn push(&mut self, warning: ConfigWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Folds another source's report into this one.
    pub fn merge(&mut self, other: LoadReport) {
        self.bindings += other.bindings;
        self.warnings.extend(other.warnings);
    }
}
