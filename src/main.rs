mod actions;
mod config;
mod io;
mod keyboard;

use crate::{
    config::config,
    keyboard::{open_keyboard_devices, process},
};
use anyhow::{Result, anyhow};
use log::error;
use std::thread;

fn main() -> Result<()> {
    env_logger::init();
    let (config, config_path) = config()?;
    let keyboards = open_keyboard_devices(&config)?;

    let mut handles = Vec::new();
    for keyboard in keyboards {
        let config = config.clone();
        let config_path = config_path.clone();

        let handle = thread::spawn(move || {
            if let Err(e) = process(keyboard, &config, &config_path) {
                error!("{e:#}");
            }
        });

        handles.push(handle);
    }

    for handle in handles {
        handle
            .join()
            .map_err(|_| anyhow!("Keyboard thread panicked"))?;
    }

    Ok(())
}
