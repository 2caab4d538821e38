//! Entry point for the **btops** daemon.
//!
//! Loads the configuration, subscribes to bspwm reports and reconciles
//! desktops after every event.  When the config file changes (and
//! `watch-config` is on) the whole listen loop restarts with the new config.

use btops::bspwm::{BspwmIpc, Subscriber};
use btops::config::Config;
use btops::daemon::{listen, ListenOutcome};
use btops::engine::Reconciler;
use btops::reload::{self, ReloadSignal};
use log::{error, info, warn};
use std::path::PathBuf;

/// Resolve the config directory (`$XDG_CONFIG_HOME/btops`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("btops")
}

/// `--config <path>` if given, otherwise `config.json` in the config dir.
fn config_path() -> PathBuf {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return PathBuf::from(path);
            }
        }
    }
    config_dir().join("config.json")
}

/// Load the config, falling back to compiled-in defaults.
fn load_config(path: &std::path::Path) -> Config {
    match Config::load(path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

fn main() {
    env_logger::init();

    let path = config_path();
    let ipc = BspwmIpc::new();
    info!("using bspwm socket {}", ipc.path().display());

    loop {
        let config = load_config(&path);
        let engine = Reconciler::new(&config);

        // The watcher must outlive the listen loop.
        let (_watcher, reload_signal) = if config.watch_config {
            match reload::watch(&path) {
                Ok((w, s)) => (Some(w), s),
                Err(e) => {
                    warn!("not watching {}: {}", path.display(), e);
                    (None, ReloadSignal::never())
                }
            }
        } else {
            (None, ReloadSignal::never())
        };

        let subscriber = match Subscriber::connect(&ipc) {
            Ok(s) => s,
            Err(e) => {
                error!("failed to subscribe to bspwm: {}", e);
                std::process::exit(1);
            }
        };

        match listen(&engine, &ipc, subscriber, &reload_signal) {
            ListenOutcome::Reload => info!("restarting with new configuration"),
            ListenOutcome::StreamEnded => info!("subscription closed, resubscribing"),
            ListenOutcome::StreamError(e) => warn!("subscription failed ({}), resubscribing", e),
        }
    }
}
