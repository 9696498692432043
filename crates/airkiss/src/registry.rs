// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Session registry and decoder front-end.
//!
//! Captured symbols arrive from any number of transmitters interleaved;
//! the registry demultiplexes them by `(BSSID, SA)` and keeps one
//! session per pair. Queries scan for the first completed session and
//! hand back owned copies, never references into decoder state.
//!
//! The decoder is deliberately not thread-safe: capture loops are
//! single-threaded and the state machine is pure computation. Hosts that
//! want a clonable handle wrap it in [`SharedDecoder`].

use crate::session::{Phase, Session, SessionKey};
use parking_lot::Mutex;
use std::sync::Arc;

/// A fully decoded credential tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Access point SSID (raw bytes; not guaranteed UTF-8).
    pub ssid: Vec<u8>,
    /// Access point password. Empty for open networks.
    pub password: Vec<u8>,
    /// The sender's random token, echoed back over UDP after joining.
    pub token: u8,
}

/// Length-symbol decoder: registry of per-transmitter sessions.
///
/// # Example
///
/// ```no_run
/// use airkiss::Decoder;
///
/// let mut decoder = Decoder::new();
/// // from the capture loop:
/// decoder.feed(&[0xAA; 6], &[0xBB; 6], 101);
/// if let Some(creds) = decoder.credentials() {
///     println!("ssid: {}", String::from_utf8_lossy(&creds.ssid));
/// }
/// ```
#[derive(Debug, Default)]
pub struct Decoder {
    sessions: Vec<Session>,
}

impl Decoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Vec::new(),
        }
    }

    /// Dispatch one captured frame length to its transmitter's session.
    ///
    /// Looks up the session for `(bssid, sa)`; reuses a vacant slot or
    /// appends a new one on first contact. Returns the session's phase
    /// after the symbol, which doubles as a per-transmitter progress
    /// indicator.
    pub fn feed(&mut self, bssid: &[u8; 6], sa: &[u8; 6], length: u16) -> Phase {
        let mut key: SessionKey = [0; 12];
        key[..6].copy_from_slice(bssid);
        key[6..].copy_from_slice(sa);

        let pos = self
            .sessions
            .iter()
            .position(|s| s.key() == Some(&key) || s.key().is_none());

        let idx = match pos {
            Some(i) => i,
            None => {
                log::debug!("[registry] new session key={:02x?}", &key[..]);
                self.sessions.push(Session::new());
                self.sessions.len() - 1
            }
        };
        let session = &mut self.sessions[idx];

        session.set_key(key);
        session.feed(length);
        session.phase()
    }

    /// Coarse progress: the furthest phase any session has reached.
    #[must_use]
    pub fn global_phase(&self) -> Phase {
        self.sessions
            .iter()
            .map(Session::phase)
            .max()
            .unwrap_or(Phase::Init)
    }

    /// Decoded password from the first session that has one.
    ///
    /// Also available mid-decode once every fragment overlapping the
    /// password has arrived, so hosts can start associating early.
    #[must_use]
    pub fn password(&self) -> Option<Vec<u8>> {
        self.sessions
            .iter()
            .find_map(|s| s.password_bytes())
            .map(<[u8]>::to_vec)
    }

    /// Decoded SSID from the first completed session.
    #[must_use]
    pub fn ssid(&self) -> Option<Vec<u8>> {
        self.sessions
            .iter()
            .find_map(|s| s.ssid_bytes())
            .map(<[u8]>::to_vec)
    }

    /// Random token from the first completed session.
    #[must_use]
    pub fn random_token(&self) -> Option<u8> {
        self.sessions.iter().find_map(Session::random_token)
    }

    /// The full credential tuple from the first completed session.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        self.sessions.iter().find_map(|s| {
            Some(Credentials {
                ssid: s.ssid_bytes()?.to_vec(),
                password: s.password_bytes()?.to_vec(),
                token: s.random_token()?,
            })
        })
    }

    /// Zero every session but keep the slots for reuse.
    pub fn reset(&mut self) {
        for session in &mut self.sessions {
            session.clear();
        }
        log::debug!("[registry] reset, {} slots retained", self.sessions.len());
    }

    /// Drop all sessions.
    pub fn clear(&mut self) {
        self.sessions.clear();
    }

    /// Number of session slots (occupied or vacant).
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

// ============================================================================
// Shared handle
// ============================================================================

/// Clonable, mutex-guarded handle over a [`Decoder`].
///
/// Convenience for hosts whose capture callback and credential poller
/// live on different threads. Every operation takes the lock for the
/// duration of one call; the decoder itself stays single-threaded.
#[derive(Debug, Clone, Default)]
pub struct SharedDecoder {
    inner: Arc<Mutex<Decoder>>,
}

impl SharedDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Decoder::new())),
        }
    }

    /// See [`Decoder::feed`].
    pub fn feed(&self, bssid: &[u8; 6], sa: &[u8; 6], length: u16) -> Phase {
        self.inner.lock().feed(bssid, sa, length)
    }

    /// See [`Decoder::global_phase`].
    #[must_use]
    pub fn global_phase(&self) -> Phase {
        self.inner.lock().global_phase()
    }

    /// See [`Decoder::credentials`].
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        self.inner.lock().credentials()
    }

    /// See [`Decoder::password`].
    #[must_use]
    pub fn password(&self) -> Option<Vec<u8>> {
        self.inner.lock().password()
    }

    /// See [`Decoder::reset`].
    pub fn reset(&self) {
        self.inner.lock().reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BSSID_A: [u8; 6] = [0x02, 0x11, 0x22, 0x33, 0x44, 0x55];
    const SA_A: [u8; 6] = [0x02, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE];
    const BSSID_B: [u8; 6] = [0x02, 0x99, 0x88, 0x77, 0x66, 0x55];
    const SA_B: [u8; 6] = [0x02, 0x01, 0x02, 0x03, 0x04, 0x05];

    #[test]
    fn test_feed_creates_one_session_per_pair() {
        let mut d = Decoder::new();
        d.feed(&BSSID_A, &SA_A, 100);
        d.feed(&BSSID_A, &SA_A, 101);
        assert_eq!(d.session_count(), 1);

        d.feed(&BSSID_B, &SA_B, 100);
        assert_eq!(d.session_count(), 2);

        // Same BSSID under a different sender is a distinct session
        d.feed(&BSSID_A, &SA_B, 100);
        assert_eq!(d.session_count(), 3);
    }

    #[test]
    fn test_all_zero_key_is_a_legal_pair() {
        let mut d = Decoder::new();
        let zero = [0u8; 6];
        d.feed(&zero, &zero, 100);
        assert_eq!(d.session_count(), 1);

        // A second transmitter must not be routed into the zero-key slot
        d.feed(&BSSID_A, &SA_A, 300);
        assert_eq!(d.session_count(), 2);

        // ...and the zero-key session keeps its own preamble progress
        d.feed(&zero, &zero, 101);
        d.feed(&zero, &zero, 102);
        d.feed(&zero, &zero, 103);
        assert_eq!(d.global_phase(), Phase::LeadingFin);
    }

    #[test]
    fn test_reset_retains_slots_and_reuses_them() {
        let mut d = Decoder::new();
        d.feed(&BSSID_A, &SA_A, 100);
        d.feed(&BSSID_B, &SA_B, 100);
        assert_eq!(d.session_count(), 2);

        d.reset();
        assert_eq!(d.session_count(), 2);
        assert_eq!(d.global_phase(), Phase::Init);

        // The next pair lands in a vacant slot instead of growing the list
        d.feed(&BSSID_B, &SA_B, 100);
        assert_eq!(d.session_count(), 2);
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut d = Decoder::new();
        d.feed(&BSSID_A, &SA_A, 100);
        d.clear();
        assert_eq!(d.session_count(), 0);
        assert_eq!(d.global_phase(), Phase::Init);
    }

    #[test]
    fn test_global_phase_is_max_over_sessions() {
        let mut d = Decoder::new();
        assert_eq!(d.global_phase(), Phase::Init);

        d.feed(&BSSID_A, &SA_A, 100);
        assert_eq!(d.global_phase(), Phase::Leading);

        for l in [101, 102, 103] {
            d.feed(&BSSID_A, &SA_A, l);
        }
        // A slower transmitter does not drag the indicator back down
        d.feed(&BSSID_B, &SA_B, 500);
        assert_eq!(d.global_phase(), Phase::LeadingFin);
    }

    #[test]
    fn test_queries_empty_before_done() {
        let mut d = Decoder::new();
        d.feed(&BSSID_A, &SA_A, 100);
        assert_eq!(d.password(), None);
        assert_eq!(d.ssid(), None);
        assert_eq!(d.random_token(), None);
        assert!(d.credentials().is_none());
    }

    #[test]
    fn test_shared_decoder_clones_observe_feeds() {
        let shared = SharedDecoder::new();
        let other = shared.clone();

        shared.feed(&BSSID_A, &SA_A, 100);
        for l in [101, 102, 103] {
            other.feed(&BSSID_A, &SA_A, l);
        }
        assert_eq!(shared.global_phase(), Phase::LeadingFin);
    }
}
