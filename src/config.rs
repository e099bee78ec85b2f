use anyhow::Result;
use chordkeys::{EngineSettings, KeyBit};
use evdev::KeyCode;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::{env, fs};

pub(crate) fn config() -> Result<(Config, PathBuf)> {
    let config_path = match env::args().nth(1) {
        Some(arg_path) => PathBuf::from(arg_path),
        None => dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("chordkeys")
            .join("config.yml"),
    };

    let config = if !config_path.exists() {
        let config = Config::default();
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let serialized = serde_yaml::to_string(&config)?;
        fs::write(&config_path, serialized)?;
        info!("Default config written to {}", config_path.display());
        config
    } else {
        let config_content = fs::read_to_string(&config_path)?;
        serde_yaml::from_str(&config_content)?
    };

    debug!("Config: {:#?}", config);

    Ok((config, config_path))
}

pub(crate) type Keyboards = HashMap<String, KeyboardConfig>;
pub(crate) type Keymap = HashMap<KeyCode, char>;

fn default_true() -> bool {
    true
}

fn default_no_emit() -> bool {
    false
}

/// Perkins style layout on the home row.
fn default_keymap() -> Keymap {
    HashMap::from([
        (KeyCode::KEY_F, '1'),
        (KeyCode::KEY_D, '2'),
        (KeyCode::KEY_S, '3'),
        (KeyCode::KEY_J, '4'),
        (KeyCode::KEY_K, '5'),
        (KeyCode::KEY_L, '6'),
        (KeyCode::KEY_A, '7'),
        (KeyCode::KEY_SEMICOLON, '8'),
        (KeyCode::KEY_SPACE, 's'),
        (KeyCode::KEY_PAGEDOWN, 'f'),
        (KeyCode::KEY_PAGEUP, 'b'),
        (KeyCode::KEY_ENTER, 'c'),
        (KeyCode::KEY_UP, 'u'),
        (KeyCode::KEY_DOWN, 'd'),
        (KeyCode::KEY_LEFT, 'l'),
        (KeyCode::KEY_RIGHT, 'r'),
    ])
}

fn default_keyboards() -> Keyboards {
    HashMap::from([(
        "AT Translated Set 2 keyboard".to_owned(),
        KeyboardConfig {
            keymap: default_keymap(),
        },
    )])
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Config {
    #[serde(default)]
    pub globals: Globals,
    /// Extra binding files, loaded after the built-in ones
    #[serde(default)]
    pub bindings: Vec<PathBuf>,
    #[serde(default = "default_keyboards")]
    pub keyboards: Keyboards,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Globals {
    #[serde(default = "default_no_emit")]
    pub no_emit: bool,
    #[serde(default = "default_true")]
    pub log_actions: bool,
    #[serde(default)]
    pub log_key_events: bool,
    #[serde(default = "default_true")]
    pub builtin_bindings: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct KeyboardConfig {
    #[serde(default = "default_keymap")]
    pub keymap: Keymap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            globals: Globals::default(),
            bindings: Vec::new(),
            keyboards: default_keyboards(),
        }
    }
}

impl Default for Globals {
    fn default() -> Self {
        Self {
            no_emit: default_no_emit(),
            log_actions: true,
            log_key_events: false,
            builtin_bindings: true,
        }
    }
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            keymap: default_keymap(),
        }
    }
}

impl Globals {
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            log_actions: self.log_actions,
            log_key_events: self.log_key_events,
        }
    }
}

impl Config {
    /// Binding files, with relative paths taken from the config file's directory.
    pub fn binding_paths(&self, config_path: &Path) -> Vec<PathBuf> {
        let base = config_path.parent().unwrap_or(Path::new("."));
        self.bindings
            .iter()
            .map(|path| {
                if path.is_relative() {
                    base.join(path)
                } else {
                    path.clone()
                }
            })
            .collect()
    }
}

impl KeyboardConfig {
    /// Drops entries that do not name a braille key.
    pub fn resolve_keymap(&self) -> HashMap<KeyCode, KeyBit> {
        self.keymap
            .iter()
            .filter_map(|(key, code)| match KeyBit::from_code(*code) {
                Ok(bit) => Some((*key, bit)),
                Err(e) => {
                    warn!("keymap {:?}: {e}", key);
                    None
                }
            })
            .collect()
    }
}
