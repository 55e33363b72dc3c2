//! One accepted control connection
//!
//! A session owns its stream, its receive accumulator, and a bounded
//! outbound queue. Nothing here blocks: reads and writes run until
//! `WouldBlock` and resume on the next readiness event. Every failure
//! path reports [`IoOutcome::Dead`] and the server funnels all of them
//! through the same destroy step.

use std::collections::VecDeque;
use std::io::{self, Read, Write};

use mio::net::UnixStream;
use mio::{Interest, Registry, Token};
use tracing::{debug, warn};

use crate::buffer::RecvBuffer;

/// Whether the session survived an I/O step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IoOutcome {
    Alive,
    Dead,
}

#[derive(Debug)]
pub(crate) struct ClientSession {
    token: Token,
    stream: UnixStream,
    recv: RecvBuffer,
    outbox: VecDeque<u8>,
    send_limit: usize,
    wants_write: bool,
}

impl ClientSession {
    pub fn new(
        token: Token,
        stream: UnixStream,
        recv_capacity: usize,
        max_message_len: usize,
        send_limit: usize,
    ) -> Self {
        Self {
            token,
            stream,
            recv: RecvBuffer::new(recv_capacity, max_message_len),
            outbox: VecDeque::new(),
            send_limit,
            wants_write: false,
        }
    }

    pub fn register(&mut self, reactor: &Registry) -> io::Result<()> {
        reactor.register(&mut self.stream, self.token, Interest::READABLE)
    }

    pub fn deregister(&mut self, reactor: &Registry) {
        if let Err(err) = reactor.deregister(&mut self.stream) {
            debug!("failed to deregister control client: {}", err);
        }
    }

    /// Drain readable bytes and return the complete lines received, oldest
    /// first. `Dead` means the peer closed or failed; lines that arrived
    /// whole before the failure are still returned so commands sent just
    /// before a disconnect take effect.
    pub fn read_lines(&mut self) -> (IoOutcome, Vec<Vec<u8>>) {
        let mut outcome = IoOutcome::Alive;
        loop {
            if self.recv.ensure_space().is_err() {
                warn!("control client exceeded maximum message length, disconnecting");
                return (IoOutcome::Dead, Vec::new());
            }
            match self.stream.read(self.recv.spare()) {
                Ok(0) => {
                    outcome = IoOutcome::Dead;
                    break;
                }
                Ok(n) => self.recv.advance(n),
                Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    debug!("control read error: {}", err);
                    outcome = IoOutcome::Dead;
                    break;
                }
            }
        }
        (outcome, self.recv.take_lines())
    }

    /// Queue `bytes` for delivery, writing as much as the socket accepts
    /// right away. A short write keeps the unsent tail and waits for the
    /// next writable event; a client whose backlog exceeds the queue limit
    /// is disconnected rather than allowed to grow without bound.
    pub fn send(&mut self, reactor: &Registry, bytes: &[u8]) -> IoOutcome {
        if bytes.is_empty() {
            return IoOutcome::Alive;
        }
        let mut offset = 0;
        if self.outbox.is_empty() {
            loop {
                match self.stream.write(&bytes[offset..]) {
                    Ok(0) => return IoOutcome::Dead,
                    Ok(n) => {
                        offset += n;
                        if offset == bytes.len() {
                            return IoOutcome::Alive;
                        }
                    }
                    Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => break,
                    Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {}
                    Err(err) => {
                        debug!("control write error: {}", err);
                        return IoOutcome::Dead;
                    }
                }
            }
        }

        if self.outbox.len() + (bytes.len() - offset) > self.send_limit {
            warn!("control client send queue overflow, disconnecting");
            return IoOutcome::Dead;
        }
        self.outbox.extend(bytes[offset..].iter().copied());
        self.want_write(reactor)
    }

    /// Flush queued bytes on writable readiness.
    pub fn flush(&mut self, reactor: &Registry) -> IoOutcome {
        while !self.outbox.is_empty() {
            let (front, _) = self.outbox.as_slices();
            match self.stream.write(front) {
                Ok(0) => return IoOutcome::Dead,
                Ok(n) => {
                    self.outbox.drain(..n);
                }
                Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => return IoOutcome::Alive,
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    debug!("control write error: {}", err);
                    return IoOutcome::Dead;
                }
            }
        }

        if self.wants_write {
            if let Err(err) =
                self.stream_interest(reactor, Interest::READABLE)
            {
                debug!("failed to update control client interest: {}", err);
                return IoOutcome::Dead;
            }
            self.wants_write = false;
        }
        IoOutcome::Alive
    }

    fn want_write(&mut self, reactor: &Registry) -> IoOutcome {
        if self.wants_write {
            return IoOutcome::Alive;
        }
        match self.stream_interest(reactor, Interest::READABLE | Interest::WRITABLE) {
            Ok(()) => {
                self.wants_write = true;
                IoOutcome::Alive
            }
            Err(err) => {
                debug!("failed to update control client interest: {}", err);
                IoOutcome::Dead
            }
        }
    }

    fn stream_interest(&mut self, reactor: &Registry, interest: Interest) -> io::Result<()> {
        reactor.reregister(&mut self.stream, self.token, interest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mio::Poll;
    use std::time::{Duration, Instant};

    fn session_pair(send_limit: usize) -> (ClientSession, UnixStream, Registry, Poll) {
        let poll = Poll::new().unwrap();
        let reactor = poll.registry().try_clone().unwrap();
        let (local, peer) = UnixStream::pair().unwrap();
        let mut session = ClientSession::new(Token(1), local, 64, 1024, send_limit);
        session.register(&reactor).unwrap();
        (session, peer, reactor, poll)
    }

    fn read_some(peer: &mut UnixStream, buf: &mut [u8]) -> usize {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            match peer.read(buf) {
                Ok(n) => return n,
                Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => {
                    assert!(Instant::now() < deadline, "peer never became readable");
                    std::thread::sleep(Duration::from_millis(1));
                }
                Err(err) => panic!("peer read failed: {err}"),
            }
        }
    }

    #[test]
    fn test_send_delivers_to_peer() {
        let (mut session, mut peer, reactor, _poll) = session_pair(1024);
        assert_eq!(session.send(&reactor, b"{\"event\":\"cursor\"}\n"), IoOutcome::Alive);

        let mut buf = [0u8; 64];
        let n = read_some(&mut peer, &mut buf);
        assert_eq!(&buf[..n], b"{\"event\":\"cursor\"}\n");
    }

    #[test]
    fn test_slow_peer_overflows_bounded_queue() {
        let (mut session, _peer, reactor, _poll) = session_pair(4096);
        let payload = vec![b'x'; 8192];

        // The peer never reads, so the socket buffer fills, the queue takes
        // the spill, and the bounded queue eventually refuses.
        let mut died = false;
        for _ in 0..100_000 {
            if session.send(&reactor, &payload) == IoOutcome::Dead {
                died = true;
                break;
            }
        }
        assert!(died, "unbounded queueing: session never hit the send limit");
    }

    #[test]
    fn test_read_lines_sees_peer_data() {
        let (mut session, mut peer, _reactor, _poll) = session_pair(1024);
        peer.write_all(b"{\"cmd\":\"list\"}\npartial").unwrap();

        // Give the kernel a moment to move bytes across the socketpair.
        std::thread::sleep(Duration::from_millis(10));
        let (outcome, lines) = session.read_lines();
        assert_eq!(outcome, IoOutcome::Alive);
        assert_eq!(lines, vec![b"{\"cmd\":\"list\"}".to_vec()]);
    }

    #[test]
    fn test_read_lines_reports_closed_peer() {
        let (mut session, peer, _reactor, _poll) = session_pair(1024);
        drop(peer);
        std::thread::sleep(Duration::from_millis(10));
        let (outcome, lines) = session.read_lines();
        assert_eq!(outcome, IoOutcome::Dead);
        assert!(lines.is_empty());
    }

    #[test]
    fn test_commands_before_disconnect_still_arrive() {
        let (mut session, mut peer, _reactor, _poll) = session_pair(1024);
        peer.write_all(b"{\"cmd\":\"list\"}\n").unwrap();
        drop(peer);
        std::thread::sleep(Duration::from_millis(10));

        let (outcome, lines) = session.read_lines();
        assert_eq!(outcome, IoOutcome::Dead);
        assert_eq!(lines, vec![b"{\"cmd\":\"list\"}".to_vec()]);
    }
}
