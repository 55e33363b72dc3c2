//! Window registry interface
//!
//! The control plane never owns window state. The host window manager
//! implements [`WindowRegistry`] and the control plane calls it
//! synchronously, within the same turn of the host's event loop.

use sill_ipc::MaximizeAxis;

/// Registry-native window identifier
pub type WindowId = u32;

/// Window geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// Server-side decoration mode of a window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecorationMode {
    /// Client draws its own decorations
    None,
    /// Server draws a border only
    Border,
    /// Server draws the full frame
    #[default]
    Full,
}

/// Read-only snapshot of one window, taken at notification time.
///
/// The control plane never caches these; every notification and every
/// window-list reply is built from fresh snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSnapshot {
    pub id: WindowId,
    pub title: String,
    pub app_id: String,
    pub geometry: Geometry,
    pub mapped: bool,
    pub minimized: bool,
    pub maximized: MaximizeAxis,
    pub fullscreen: bool,
    pub focused: bool,
}

/// Operations the control plane needs from the window manager.
///
/// Mutating calls are requests: the registry applies them on its own
/// schedule and reports the resulting state changes back through
/// `ControlServer::notify_window` when they land.
pub trait WindowRegistry {
    /// Request that the window be closed
    fn close(&mut self, id: WindowId);

    /// Toggle the window's minimized state
    fn toggle_minimize(&mut self, id: WindowId);

    /// Toggle the window's maximized state on both axes
    fn toggle_maximize(&mut self, id: WindowId);

    /// Set the window's geometry
    fn move_resize(&mut self, id: WindowId, geometry: Geometry);

    /// Give the window keyboard focus
    fn focus(&mut self, id: WindowId);

    /// Toggle the window's always-on-top flag
    fn toggle_always_on_top(&mut self, id: WindowId);

    /// Toggle the window's always-on-bottom flag
    fn toggle_always_on_bottom(&mut self, id: WindowId);

    /// Set the window's decoration mode
    fn set_decoration_mode(&mut self, id: WindowId, mode: DecorationMode);

    /// Snapshot every window the registry tracks, mapped or not
    fn windows(&self) -> Vec<WindowSnapshot>;
}
