//! Control-plane server
//!
//! Owns the listening socket and every live client session. The control
//! plane has no thread and no poll loop of its own: `ControlServer::start`
//! binds the socket and registers it with the host's reactor, and the host
//! routes readiness events back in through [`ControlServer::handle_event`].
//! Window state stays with the host behind the [`WindowRegistry`] trait;
//! state changes flow back out to clients through the notify calls in
//! `broadcast`.

use std::collections::HashMap;
use std::io;
use std::os::fd::AsRawFd;
use std::path::Path;

use mio::event::Event;
use mio::net::{UnixListener, UnixStream};
use mio::{Interest, Registry, Token};
use nix::sys::socket::{bind, listen, socket, AddressFamily, Backlog, SockFlag, SockType, UnixAddr};
use tracing::{debug, info, warn};

use sill_ipc::Command;

use crate::config::ControlConfig;
use crate::error::SetupError;
use crate::handle::HandleTable;
use crate::registry::WindowRegistry;
use crate::session::{ClientSession, IoOutcome};

/// Listen backlog for the control socket
const LISTEN_BACKLOG: i32 = 3;

#[derive(Debug)]
pub struct ControlServer {
    pub(crate) config: ControlConfig,
    pub(crate) reactor: Registry,
    pub(crate) sessions: HashMap<Token, ClientSession>,
    pub(crate) handles: HandleTable,
    listener: UnixListener,
    listener_token: Token,
    next_token: usize,
}

impl ControlServer {
    /// Bring up the control socket and register it with the host's reactor.
    ///
    /// A stale socket left by a previous run is removed first so restarts
    /// are idempotent. Failure here disables the control plane but must
    /// not take the host down; the caller decides how loudly to complain.
    pub fn start(config: ControlConfig, reactor: &Registry) -> Result<Self, SetupError> {
        let reactor = reactor.try_clone().map_err(SetupError::Register)?;
        let mut listener = bind_listener(&config.socket_path)?;

        let listener_token = Token(config.token_base);
        reactor
            .register(&mut listener, listener_token, Interest::READABLE)
            .map_err(SetupError::Register)?;

        info!("control socket listening on {:?}", config.socket_path);

        Ok(Self {
            next_token: config.token_base + 1,
            sessions: HashMap::new(),
            handles: HandleTable::new(),
            config,
            reactor,
            listener,
            listener_token,
        })
    }

    /// True if `token` belongs to the control plane.
    pub fn owns_token(&self, token: Token) -> bool {
        token.0 >= self.config.token_base
    }

    /// Route one readiness event from the host's poll loop.
    ///
    /// Returns `false` when the event is not for the control plane, so the
    /// host can fall through to its own sources.
    pub fn handle_event(&mut self, event: &Event, windows: &mut dyn WindowRegistry) -> bool {
        let token = event.token();
        if !self.owns_token(token) {
            return false;
        }
        if token == self.listener_token {
            self.accept_pending(windows);
        } else {
            self.session_ready(token, event, windows);
        }
        true
    }

    /// Number of currently connected control clients
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Tear down the control plane: every session, the listener, and the
    /// socket path.
    pub fn shutdown(mut self) {
        let tokens: Vec<Token> = self.sessions.keys().copied().collect();
        for token in tokens {
            self.destroy_session(token, "server shutdown");
        }

        if let Err(err) = self.reactor.deregister(&mut self.listener) {
            debug!("failed to deregister control listener: {}", err);
        }
        match std::fs::remove_file(&self.config.socket_path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!("failed to remove control socket: {}", err),
        }
        debug!("control server stopped");
    }

    fn accept_pending(&mut self, windows: &mut dyn WindowRegistry) {
        // The reactor is edge-triggered: one readiness event may cover
        // several pending connections, so accept until drained. A single
        // failed accept must not take down the listener.
        loop {
            match self.listener.accept() {
                Ok((stream, _addr)) => self.accept_client(stream, windows),
                Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(err) => {
                    warn!("control accept failed: {}", err);
                    break;
                }
            }
        }
    }

    fn accept_client(&mut self, stream: UnixStream, windows: &mut dyn WindowRegistry) {
        let token = Token(self.next_token);
        self.next_token += 1;

        let mut session = ClientSession::new(
            token,
            stream,
            self.config.recv_buffer_size,
            self.config.max_message_len,
            self.config.send_queue_limit,
        );
        if let Err(err) = session.register(&self.reactor) {
            warn!("failed to register control client: {}", err);
            return;
        }

        debug!("control client connected");
        self.sessions.insert(token, session);

        // Late joiners start synchronized.
        self.send_window_list(token, windows);
    }

    fn session_ready(&mut self, token: Token, event: &Event, windows: &mut dyn WindowRegistry) {
        // Hang-up: destroy immediately, no draining of buffered bytes.
        if event.is_error() || (event.is_read_closed() && event.is_write_closed()) {
            self.destroy_session(token, "hangup");
            return;
        }

        if event.is_writable() {
            let dead = match self.sessions.get_mut(&token) {
                Some(session) => session.flush(&self.reactor) == IoOutcome::Dead,
                None => return,
            };
            if dead {
                self.destroy_session(token, "write failure");
                return;
            }
        }

        if event.is_readable() || event.is_read_closed() {
            self.session_readable(token, windows);
        }
    }

    fn session_readable(&mut self, token: Token, windows: &mut dyn WindowRegistry) {
        let (outcome, lines) = match self.sessions.get_mut(&token) {
            Some(session) => session.read_lines(),
            None => return,
        };

        // Messages from one connection are processed strictly in arrival
        // order. A reply write can kill the session mid-batch; the rest of
        // the batch dies with it.
        for line in &lines {
            self.handle_line(token, line, windows);
            if !self.sessions.contains_key(&token) {
                return;
            }
        }

        if outcome == IoOutcome::Dead {
            self.destroy_session(token, "peer closed");
        }
    }

    fn handle_line(&mut self, token: Token, line: &[u8], windows: &mut dyn WindowRegistry) {
        let Ok(text) = std::str::from_utf8(line) else {
            debug!("discarding control message: not valid UTF-8");
            return;
        };
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        match Command::parse(text) {
            Ok(command) => self.apply_command(token, command, windows),
            Err(err) => debug!("discarding control command: {}", err),
        }
    }

    /// The single cleanup funnel: read failure, hang-up, write failure,
    /// protocol overflow, and shutdown all end up here.
    pub(crate) fn destroy_session(&mut self, token: Token, reason: &str) {
        if let Some(mut session) = self.sessions.remove(&token) {
            session.deregister(&self.reactor);
            debug!("control client disconnected ({})", reason);
        }
    }
}

/// Create, bind, and listen on the control socket, non-blocking and
/// close-on-exec, reporting each phase's failure distinctly.
fn bind_listener(path: &Path) -> Result<UnixListener, SetupError> {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(SetupError::RemoveStale(err)),
    }

    let fd = socket(
        AddressFamily::Unix,
        SockType::Stream,
        SockFlag::SOCK_NONBLOCK | SockFlag::SOCK_CLOEXEC,
        None,
    )
    .map_err(SetupError::CreateSocket)?;

    let addr = UnixAddr::new(path).map_err(SetupError::Bind)?;
    bind(fd.as_raw_fd(), &addr).map_err(SetupError::Bind)?;

    let backlog = Backlog::new(LISTEN_BACKLOG).map_err(SetupError::Listen)?;
    listen(&fd, backlog).map_err(SetupError::Listen)?;

    Ok(UnixListener::from_std(std::os::unix::net::UnixListener::from(fd)))
}
