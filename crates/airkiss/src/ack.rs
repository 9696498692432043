// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Acknowledgement emitter.
//!
//! Once the host has decoded the credentials and joined the configured
//! network, it echoes the sender's one-byte random token as a UDP
//! broadcast so the configurator can report success. The burst is
//! best-effort: a fixed number of datagrams with a fixed pause, send
//! errors logged and skipped, never retried beyond the count.
//!
//! The socket lives behind the [`TokenSink`] seam so hosts with their
//! own transport (or tests) can substitute the sender, and the
//! cancellable variant takes a channel so an event loop can abort the
//! burst without waiting out the full schedule.

use crate::config::AckConfig;
use crossbeam::channel::{Receiver, RecvTimeoutError};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::thread;

/// Destination seam for the token burst.
pub trait TokenSink {
    /// Send one datagram carrying the token.
    fn send_token(&mut self, token: u8) -> io::Result<()>;
}

/// Default sink: UDP broadcast to `255.255.255.255`.
pub struct UdpBroadcastSink {
    socket: UdpSocket,
    dest: SocketAddr,
}

impl UdpBroadcastSink {
    /// Create a broadcast-enabled UDP socket aimed at `port`.
    ///
    /// The socket is left unbound; the OS assigns a source port on the
    /// first send (the configurator does not care where the echo comes
    /// from).
    pub fn new(port: u16) -> io::Result<Self> {
        let socket2 = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket2.set_broadcast(true)?;
        let socket: UdpSocket = socket2.into();

        Ok(Self {
            socket,
            dest: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::BROADCAST, port)),
        })
    }

    /// The broadcast destination this sink sends to.
    #[must_use]
    pub fn dest(&self) -> SocketAddr {
        self.dest
    }
}

impl TokenSink for UdpBroadcastSink {
    fn send_token(&mut self, token: u8) -> io::Result<()> {
        self.socket.send_to(&[token], self.dest).map(|_| ())
    }
}

/// Broadcast `token` per `config`, blocking until the burst completes.
///
/// Returns the number of datagrams actually sent. Only socket creation
/// can fail; individual send errors are logged and skipped.
pub fn broadcast_token(token: u8, config: &AckConfig) -> io::Result<u32> {
    let mut sink = UdpBroadcastSink::new(config.port)?;
    log::info!(
        "[ack] broadcasting token {:#04x} to {} ({}x every {:?})",
        token,
        sink.dest(),
        config.repeat,
        config.interval
    );
    Ok(run_burst(&mut sink, token, config, None))
}

/// Like [`broadcast_token`], but abortable.
///
/// Any message on `cancel` ends the burst after the in-flight datagram;
/// the channel also doubles as the inter-datagram pause.
pub fn broadcast_token_cancellable(
    token: u8,
    config: &AckConfig,
    cancel: &Receiver<()>,
) -> io::Result<u32> {
    let mut sink = UdpBroadcastSink::new(config.port)?;
    Ok(run_burst(&mut sink, token, config, Some(cancel)))
}

/// Drive one burst through an arbitrary sink.
pub fn run_burst<S: TokenSink>(
    sink: &mut S,
    token: u8,
    config: &AckConfig,
    cancel: Option<&Receiver<()>>,
) -> u32 {
    let mut sent = 0u32;

    for i in 0..config.repeat {
        match sink.send_token(token) {
            Ok(()) => sent += 1,
            Err(err) => {
                log::warn!("[ack] send {}/{} failed: {}", i + 1, config.repeat, err);
            }
        }

        match cancel {
            Some(rx) => match rx.recv_timeout(config.interval) {
                Ok(()) => {
                    log::debug!("[ack] burst cancelled after {} datagrams", sent);
                    break;
                }
                // Channel gone: nobody can cancel anymore, keep the pace
                Err(RecvTimeoutError::Disconnected) => thread::sleep(config.interval),
                Err(RecvTimeoutError::Timeout) => {}
            },
            None => thread::sleep(config.interval),
        }
    }

    sent
}
