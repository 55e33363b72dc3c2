//! Control-plane error types

/// Why the control socket could not be brought up.
///
/// Each startup phase reports its own variant so the host can log
/// precisely which step failed. None of these abort the host; a window
/// manager without a control channel is still a window manager.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("failed to remove stale control socket: {0}")]
    RemoveStale(#[source] std::io::Error),

    #[error("failed to create control socket: {0}")]
    CreateSocket(#[source] nix::Error),

    #[error("failed to bind control socket: {0}")]
    Bind(#[source] nix::Error),

    #[error("failed to listen on control socket: {0}")]
    Listen(#[source] nix::Error),

    #[error("failed to register control socket with the reactor: {0}")]
    Register(#[source] std::io::Error),
}
