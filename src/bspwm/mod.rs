//! bspwm-specific implementations.
//!
//! This module provides the concrete [`Transport`](crate::traits::Transport)
//! backed by bspwm's control socket, and the report [`Subscriber`] that
//! wakes the daemon on every window-manager event.
//!
//! Nothing outside this module should reference bspwm's socket directly.

pub mod ipc;
pub mod subscriber;

pub use ipc::{BspwmError, BspwmIpc};
pub use subscriber::Subscriber;
