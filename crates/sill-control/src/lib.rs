//! Sill control plane
//!
//! A long-lived window-manager process exposes a Unix-socket control
//! channel: external clients send line-delimited JSON commands that query
//! and mutate window state, and receive line-delimited JSON events as that
//! state changes.
//!
//! The control plane owns no thread and no poll loop. The host owns a
//! `mio::Poll`; [`ControlServer::start`] binds the socket against the
//! host's `mio::Registry`, and the host feeds readiness events back in
//! through [`ControlServer::handle_event`]. Window state stays with the
//! host behind the [`WindowRegistry`] trait; state changes flow back out
//! to clients through [`ControlServer::notify_window`] and
//! [`ControlServer::notify_cursor`].

mod broadcast;
mod buffer;
mod config;
mod dispatch;
mod error;
mod handle;
mod registry;
mod server;
mod session;

pub use config::ControlConfig;
pub use error::SetupError;
pub use registry::{DecorationMode, Geometry, WindowId, WindowRegistry, WindowSnapshot};
pub use server::ControlServer;

// Wire types clients of this crate need to speak the protocol
pub use sill_ipc::{MaximizeAxis, WindowEventKind, WindowHandle};
