//! Sill IPC Protocol
//!
//! Shared wire types for the control channel between the sill window
//! manager and external clients. The protocol is line-oriented UTF-8:
//! clients send one JSON command object per line, the window manager
//! answers with one JSON event object per line.

mod command;
mod event;

pub use command::{Command, DecodeError};
pub use event::{Event, MaximizeAxis, WindowEntry, WindowEventKind, WindowState};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Default socket path for the control channel
pub fn socket_path() -> std::path::PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .unwrap_or_else(|_| format!("/run/user/{}", unsafe { libc::getuid() }));
    std::path::PathBuf::from(runtime_dir).join("sill-control.sock")
}

/// Opaque stable identifier for a window on the wire.
///
/// Handles are issued by the control plane, monotonically increasing and
/// never reused. On the wire they are lowercase hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl FromStr for WindowHandle {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s, 16).map(Self)
    }
}

impl Serialize for WindowHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WindowHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_hex_encoding() {
        let handle = WindowHandle(0x2a);
        assert_eq!(handle.to_string(), "2a");
        assert_eq!("2a".parse::<WindowHandle>().unwrap(), handle);
        assert_eq!(serde_json::to_string(&handle).unwrap(), "\"2a\"");
    }

    #[test]
    fn test_handle_rejects_non_hex() {
        assert!("zz".parse::<WindowHandle>().is_err());
        assert!("".parse::<WindowHandle>().is_err());
    }
}
