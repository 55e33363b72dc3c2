//! Command dispatch
//!
//! Maps a decoded command onto the window registry. Commands naming a
//! window resolve their handle first; a handle that no longer resolves is
//! logged and dropped. The protocol is fire-and-forget and carries no
//! error replies.

use mio::Token;
use tracing::debug;

use sill_ipc::{Command, WindowHandle};

use crate::registry::{DecorationMode, Geometry, WindowId, WindowRegistry};
use crate::server::ControlServer;

impl ControlServer {
    pub(crate) fn apply_command(
        &mut self,
        token: Token,
        command: Command,
        windows: &mut dyn WindowRegistry,
    ) {
        match command {
            Command::Close { id } => {
                // No confirmation here: the registry reports the close
                // through notify_window once the window actually unmaps.
                if let Some(win) = self.resolve(id) {
                    windows.close(win);
                }
            }
            Command::Minimize { id } => {
                if let Some(win) = self.resolve(id) {
                    windows.toggle_minimize(win);
                }
            }
            Command::Maximize { id } => {
                if let Some(win) = self.resolve(id) {
                    windows.toggle_maximize(win);
                }
            }
            Command::Move { id, x, y, width, height } => {
                if let Some(win) = self.resolve(id) {
                    windows.move_resize(win, Geometry::new(x, y, width, height));
                }
            }
            Command::Focus { id } => {
                if let Some(win) = self.resolve(id) {
                    windows.focus(win);
                }
            }
            Command::AlwaysOnTop { id } => {
                if let Some(win) = self.resolve(id) {
                    windows.toggle_always_on_top(win);
                }
            }
            Command::AlwaysOnBottom { id } => {
                if let Some(win) = self.resolve(id) {
                    windows.toggle_always_on_bottom(win);
                }
            }
            Command::List => self.send_window_list(token, windows),
            Command::EnableDecorations => {
                for win in windows.windows() {
                    windows.set_decoration_mode(win.id, DecorationMode::None);
                }
                self.send_decorations_ack(token);
            }
        }
    }

    fn resolve(&self, handle: WindowHandle) -> Option<WindowId> {
        let win = self.handles.resolve(handle);
        if win.is_none() {
            debug!("control target not found: {}", handle);
        }
        win
    }
}
