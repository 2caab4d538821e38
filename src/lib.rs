//! **btops** — keeps bspwm's desktops in shape.
//!
//! On every bspwm event the daemon re-reads the full window-manager state and
//! issues at most one corrective command: append a desktop, remove a surplus
//! empty one, or rename one according to the configured naming strategies.
//! The next event re-evaluates from scratch.
//!
//! # Architecture
//!
//! * [`traits::Transport`] abstracts the control socket so the engine is not
//!   coupled to bspwm's IPC.  The Unix-socket backend lives in [`bspwm`].
//! * [`snapshot`] models monitors, desktops and window trees.
//! * [`engine::Reconciler`] runs the append → remove → rename chain.
//! * [`naming`] holds the renaming strategies.
//! * [`daemon`] and [`reload`] drive the event loop and config reloads.

pub mod bspwm;
pub mod command;
pub mod config;
pub mod daemon;
pub mod engine;
pub mod naming;
pub mod reload;
pub mod snapshot;
pub mod traits;
