//! Inbound command decoding
//!
//! Clients send one flat JSON object per line:
//! `{"cmd":"move","id":"2a","x":100,"y":100,"width":800,"height":600}`.
//! Fields other than `cmd` are optional per command. Absent numeric fields
//! decode as zero, which is why `move` validates its dimensions explicitly
//! instead of relying on absence detection.

use serde::Deserialize;

use crate::WindowHandle;

/// Raw wire shape of a command line, before validation
#[derive(Debug, Deserialize)]
struct CommandFrame {
    cmd: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    x: i32,
    #[serde(default)]
    y: i32,
    #[serde(default)]
    width: i32,
    #[serde(default)]
    height: i32,
}

/// Why a command line was rejected
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed command: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("command '{0}' requires a target id")]
    MissingTarget(&'static str),

    #[error("invalid window id: {0}")]
    BadHandle(String),

    #[error("invalid move dimensions: {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
}

/// A validated control command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask the window manager to close the target window
    Close { id: WindowHandle },
    /// Toggle the target's minimized state
    Minimize { id: WindowHandle },
    /// Toggle the target's maximized state (both axes)
    Maximize { id: WindowHandle },
    /// Set the target's geometry
    Move {
        id: WindowHandle,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    /// Give the target window keyboard focus
    Focus { id: WindowHandle },
    /// Toggle the target's always-on-top flag
    AlwaysOnTop { id: WindowHandle },
    /// Toggle the target's always-on-bottom flag
    AlwaysOnBottom { id: WindowHandle },
    /// Request a full window-list snapshot
    List,
    /// Disable server-side decorations on every window
    EnableDecorations,
}

impl Command {
    /// Parse one newline-stripped wire line.
    ///
    /// Decoding is strict: a line that is not valid JSON of the expected
    /// flat shape is rejected rather than best-effort defaulted.
    pub fn parse(line: &str) -> Result<Self, DecodeError> {
        let frame: CommandFrame = serde_json::from_str(line)?;

        let target = |name: &'static str| -> Result<WindowHandle, DecodeError> {
            let id = frame
                .id
                .as_deref()
                .ok_or(DecodeError::MissingTarget(name))?;
            id.parse()
                .map_err(|_| DecodeError::BadHandle(id.to_string()))
        };

        match frame.cmd.as_str() {
            "close" => Ok(Self::Close { id: target("close")? }),
            "minimize" => Ok(Self::Minimize { id: target("minimize")? }),
            "maximize" => Ok(Self::Maximize { id: target("maximize")? }),
            "move" => {
                let id = target("move")?;
                if frame.width <= 0 || frame.height <= 0 {
                    return Err(DecodeError::InvalidDimensions {
                        width: frame.width,
                        height: frame.height,
                    });
                }
                Ok(Self::Move {
                    id,
                    x: frame.x,
                    y: frame.y,
                    width: frame.width as u32,
                    height: frame.height as u32,
                })
            }
            "focus" => Ok(Self::Focus { id: target("focus")? }),
            "always_on_top" => Ok(Self::AlwaysOnTop { id: target("always_on_top")? }),
            "always_on_bottom" => Ok(Self::AlwaysOnBottom { id: target("always_on_bottom")? }),
            "list" => Ok(Self::List),
            "enable_decorations" => Ok(Self::EnableDecorations),
            other => Err(DecodeError::UnknownCommand(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_targeted_command() {
        let cmd = Command::parse("{\"cmd\":\"focus\",\"id\":\"2a\"}").unwrap();
        assert_eq!(cmd, Command::Focus { id: WindowHandle(0x2a) });
    }

    #[test]
    fn test_parse_move() {
        let cmd =
            Command::parse("{\"cmd\":\"move\",\"id\":\"1\",\"x\":10,\"y\":-5,\"width\":800,\"height\":600}")
                .unwrap();
        assert_eq!(
            cmd,
            Command::Move {
                id: WindowHandle(1),
                x: 10,
                y: -5,
                width: 800,
                height: 600,
            }
        );
    }

    #[test]
    fn test_move_rejects_degenerate_size() {
        let err = Command::parse("{\"cmd\":\"move\",\"id\":\"1\",\"x\":10,\"y\":10}").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidDimensions { width: 0, height: 0 }
        ));

        let err =
            Command::parse("{\"cmd\":\"move\",\"id\":\"1\",\"width\":-1,\"height\":100}").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidDimensions { width: -1, .. }));
    }

    #[test]
    fn test_parse_untargeted_commands() {
        assert_eq!(Command::parse("{\"cmd\":\"list\"}").unwrap(), Command::List);
        assert_eq!(
            Command::parse("{\"cmd\":\"enable_decorations\"}").unwrap(),
            Command::EnableDecorations
        );
    }

    #[test]
    fn test_field_order_does_not_matter() {
        let cmd = Command::parse("{\"id\":\"ff\",\"cmd\":\"close\"}").unwrap();
        assert_eq!(cmd, Command::Close { id: WindowHandle(0xff) });
    }

    #[test]
    fn test_missing_target_is_rejected() {
        let err = Command::parse("{\"cmd\":\"close\"}").unwrap_err();
        assert!(matches!(err, DecodeError::MissingTarget("close")));
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        let err = Command::parse("{\"cmd\":\"explode\",\"id\":\"1\"}").unwrap_err();
        assert!(matches!(err, DecodeError::UnknownCommand(name) if name == "explode"));
    }

    #[test]
    fn test_command_names_are_case_sensitive() {
        let err = Command::parse("{\"cmd\":\"Close\",\"id\":\"1\"}").unwrap_err();
        assert!(matches!(err, DecodeError::UnknownCommand(_)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(
            Command::parse("not json at all"),
            Err(DecodeError::Malformed(_))
        ));
        assert!(matches!(
            Command::parse("{\"cmd\":\"close\",\"id\":\"nothex\"}"),
            Err(DecodeError::BadHandle(_))
        ));
    }
}
