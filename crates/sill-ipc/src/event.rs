//! Outbound event encoding
//!
//! Every event is a single JSON object tagged by its `event` field and
//! terminated with a newline. Window events share one payload shape; the
//! `window_list` snapshot carries a reduced per-window record.

use serde::{Deserialize, Serialize};

use crate::WindowHandle;

/// Which axes a window is maximized along
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaximizeAxis {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

/// What happened to a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEventKind {
    Mapped,
    Unmapped,
    Closed,
    Moved,
    Focused,
    TitleChanged,
    Minimized,
    Maximized,
    Fullscreen,
}

/// Full per-window payload carried by window events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowState {
    pub id: WindowHandle,
    pub title: String,
    pub app_id: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub minimized: bool,
    pub maximized: MaximizeAxis,
    pub fullscreen: bool,
    pub focused: bool,
}

/// Reduced per-window record carried by the `window_list` snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowEntry {
    pub id: WindowHandle,
    pub title: String,
    pub app_id: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub minimized: bool,
    pub focused: bool,
}

/// Events sent from the window manager to control clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Mapped(WindowState),
    Unmapped(WindowState),
    Closed(WindowState),
    Moved(WindowState),
    Focused(WindowState),
    TitleChanged(WindowState),
    Minimized(WindowState),
    Maximized(WindowState),
    Fullscreen(WindowState),
    Cursor { x: i32, y: i32 },
    WindowList { windows: Vec<WindowEntry> },
    DecorationsDisabled,
}

impl Event {
    /// Wrap a window payload in the variant for `kind`.
    pub fn window(kind: WindowEventKind, state: WindowState) -> Self {
        match kind {
            WindowEventKind::Mapped => Self::Mapped(state),
            WindowEventKind::Unmapped => Self::Unmapped(state),
            WindowEventKind::Closed => Self::Closed(state),
            WindowEventKind::Moved => Self::Moved(state),
            WindowEventKind::Focused => Self::Focused(state),
            WindowEventKind::TitleChanged => Self::TitleChanged(state),
            WindowEventKind::Minimized => Self::Minimized(state),
            WindowEventKind::Maximized => Self::Maximized(state),
            WindowEventKind::Fullscreen => Self::Fullscreen(state),
        }
    }

    /// Encode as one newline-terminated wire line.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> WindowState {
        WindowState {
            id: WindowHandle(0x2a),
            title: "Files".into(),
            app_id: "org.gnome.Nautilus".into(),
            x: 100,
            y: 50,
            width: 800,
            height: 600,
            minimized: false,
            maximized: MaximizeAxis::None,
            fullscreen: false,
            focused: true,
        }
    }

    #[test]
    fn test_window_event_wire_shape() {
        let line = Event::window(WindowEventKind::Focused, sample_state())
            .to_line()
            .unwrap();
        assert_eq!(
            line,
            "{\"event\":\"focused\",\"id\":\"2a\",\"title\":\"Files\",\
             \"app_id\":\"org.gnome.Nautilus\",\"x\":100,\"y\":50,\
             \"width\":800,\"height\":600,\"minimized\":false,\
             \"maximized\":\"none\",\"fullscreen\":false,\"focused\":true}\n"
        );
    }

    #[test]
    fn test_cursor_event_wire_shape() {
        let line = Event::Cursor { x: 512, y: 300 }.to_line().unwrap();
        assert_eq!(line, "{\"event\":\"cursor\",\"x\":512,\"y\":300}\n");
    }

    #[test]
    fn test_ack_event_wire_shape() {
        let line = Event::DecorationsDisabled.to_line().unwrap();
        assert_eq!(line, "{\"event\":\"decorations_disabled\"}\n");
    }

    #[test]
    fn test_window_list_roundtrip() {
        let event = Event::WindowList {
            windows: vec![WindowEntry {
                id: WindowHandle(1),
                title: "term".into(),
                app_id: "foot".into(),
                x: 0,
                y: 0,
                width: 640,
                height: 480,
                minimized: true,
                focused: false,
            }],
        };

        let line = event.to_line().unwrap();
        assert!(line.ends_with('\n'));
        let decoded: Event = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_every_window_kind_has_a_tag() {
        let kinds = [
            (WindowEventKind::Mapped, "mapped"),
            (WindowEventKind::Unmapped, "unmapped"),
            (WindowEventKind::Closed, "closed"),
            (WindowEventKind::Moved, "moved"),
            (WindowEventKind::Focused, "focused"),
            (WindowEventKind::TitleChanged, "title_changed"),
            (WindowEventKind::Minimized, "minimized"),
            (WindowEventKind::Maximized, "maximized"),
            (WindowEventKind::Fullscreen, "fullscreen"),
        ];

        for (kind, tag) in kinds {
            let line = Event::window(kind, sample_state()).to_line().unwrap();
            assert!(line.starts_with(&format!("{{\"event\":\"{tag}\"")), "{line}");
        }
    }
}
