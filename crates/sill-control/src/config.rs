//! Control-plane configuration
//!
//! Supplied by the host at construction time. There is no file loading,
//! CLI surface, or environment lookup here; the host owns all of that and
//! may embed this struct in its own config file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Construction parameters for the control server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Filesystem path of the listening socket
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,

    /// Initial receive-buffer capacity per client, in bytes
    #[serde(default = "default_recv_buffer_size")]
    pub recv_buffer_size: usize,

    /// Hard cap on a single inbound message; a client that sends a longer
    /// line without a newline is disconnected
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,

    /// Hard cap on unsent outbound bytes per client; a client that falls
    /// this far behind is disconnected
    #[serde(default = "default_send_queue_limit")]
    pub send_queue_limit: usize,

    /// First reactor token the control plane may allocate. The host must
    /// keep its own tokens below this value.
    #[serde(default = "default_token_base")]
    pub token_base: usize,
}

fn default_socket_path() -> PathBuf {
    sill_ipc::socket_path()
}

fn default_recv_buffer_size() -> usize {
    4096
}

fn default_max_message_len() -> usize {
    64 * 1024
}

fn default_send_queue_limit() -> usize {
    256 * 1024
}

fn default_token_base() -> usize {
    1 << 16
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            recv_buffer_size: default_recv_buffer_size(),
            max_message_len: default_max_message_len(),
            send_queue_limit: default_send_queue_limit(),
            token_base: default_token_base(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: ControlConfig =
            serde_json::from_str("{\"socket_path\":\"/tmp/test.sock\"}").unwrap();
        assert_eq!(config.socket_path, PathBuf::from("/tmp/test.sock"));
        assert_eq!(config.recv_buffer_size, 4096);
        assert_eq!(config.max_message_len, 64 * 1024);
        assert_eq!(config.send_queue_limit, 256 * 1024);
    }
}
