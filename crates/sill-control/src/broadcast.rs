//! Event formatting and fan-out
//!
//! Window and cursor events go to every live session; window-list
//! snapshots and the decoration acknowledgement go to a single requester.
//! With no clients connected, notifications return before any formatting
//! work happens.

use mio::Token;
use tracing::warn;

use sill_ipc::{Event, WindowEntry, WindowEventKind, WindowState};

use crate::registry::{WindowRegistry, WindowSnapshot};
use crate::server::ControlServer;
use crate::session::IoOutcome;

impl ControlServer {
    /// Registry callback: a window was mapped, changed, or destroyed.
    ///
    /// Fans the event out to every live session. A `Closed` event also
    /// retires the window's handle, after formatting, so the event itself
    /// still carries it.
    pub fn notify_window(&mut self, kind: WindowEventKind, window: &WindowSnapshot) {
        if !self.sessions.is_empty() {
            let state = self.window_state(window);
            match Event::window(kind, state).to_line() {
                Ok(line) => self.broadcast_line(&line),
                Err(err) => warn!("failed to encode window event: {}", err),
            }
        }

        if kind == WindowEventKind::Closed {
            self.handles.invalidate(window.id);
        }
    }

    /// Pointer moved. Coordinates are rounded to the nearest whole unit.
    pub fn notify_cursor(&mut self, x: f64, y: f64) {
        if self.sessions.is_empty() {
            return;
        }
        let event = Event::Cursor {
            x: x.round() as i32,
            y: y.round() as i32,
        };
        match event.to_line() {
            Ok(line) => self.broadcast_line(&line),
            Err(err) => warn!("failed to encode cursor event: {}", err),
        }
    }

    /// Send one session a full snapshot of every mapped window.
    pub(crate) fn send_window_list(&mut self, token: Token, windows: &mut dyn WindowRegistry) {
        let entries: Vec<WindowEntry> = windows
            .windows()
            .into_iter()
            .filter(|w| w.mapped)
            .map(|w| WindowEntry {
                id: self.handles.issue(w.id),
                title: w.title,
                app_id: w.app_id,
                x: w.geometry.x,
                y: w.geometry.y,
                width: w.geometry.width,
                height: w.geometry.height,
                minimized: w.minimized,
                focused: w.focused,
            })
            .collect();

        match (Event::WindowList { windows: entries }).to_line() {
            Ok(line) => self.send_to(token, line.as_bytes()),
            Err(err) => warn!("failed to encode window list: {}", err),
        }
    }

    pub(crate) fn send_decorations_ack(&mut self, token: Token) {
        match Event::DecorationsDisabled.to_line() {
            Ok(line) => self.send_to(token, line.as_bytes()),
            Err(err) => warn!("failed to encode event: {}", err),
        }
    }

    fn window_state(&mut self, window: &WindowSnapshot) -> WindowState {
        WindowState {
            id: self.handles.issue(window.id),
            title: window.title.clone(),
            app_id: window.app_id.clone(),
            x: window.geometry.x,
            y: window.geometry.y,
            width: window.geometry.width,
            height: window.geometry.height,
            minimized: window.minimized,
            maximized: window.maximized,
            fullscreen: window.fullscreen,
            focused: window.focused,
        }
    }

    /// Fan one encoded line out to every live session. Sessions whose
    /// write fails are destroyed after the sweep, never mid-iteration.
    fn broadcast_line(&mut self, line: &str) {
        let mut dead = Vec::new();
        for (token, session) in self.sessions.iter_mut() {
            if session.send(&self.reactor, line.as_bytes()) == IoOutcome::Dead {
                dead.push(*token);
            }
        }
        for token in dead {
            self.destroy_session(token, "write failure");
        }
    }

    /// Write one encoded line to a single session.
    fn send_to(&mut self, token: Token, bytes: &[u8]) {
        let dead = match self.sessions.get_mut(&token) {
            Some(session) => session.send(&self.reactor, bytes) == IoOutcome::Dead,
            None => return,
        };
        if dead {
            self.destroy_session(token, "write failure");
        }
    }
}
