// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Configurator-side symbol stream builder.
//!
//! The sender cannot put bytes on the air directly: the device it is
//! provisioning only sees encrypted frames. What survives encryption is
//! the *length*, so every 9-bit symbol `d` is transmitted as a frame of
//! length `base + d`. This module produces that length sequence for a
//! credential tuple; it is the exact inverse of the session state
//! machine and drives the integration tests.
//!
//! # Stream Layout
//!
//! ```text
//! +-----------------+-------------+--------------+-------------------+
//! | preamble        | magic       | prefix       | fragments         |
//! | x,x+1,x+2,x+3   | 4 symbols   | 4 symbols    | per 4-byte slice: |
//! | (repeated)      | (repeated)  | (repeated)   | crc, index, data* |
//! +-----------------+-------------+--------------+-------------------+
//! ```
//!
//! The staged fields must repeat at least twice: the receiver's wait
//! states consume one symbol at each stage boundary.

use crate::config::{FRAG_PAYLOAD, PWD_MAX, SSID_MAX};
use crate::crc::crc8;

/// Error during symbol stream construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// SSID must be at least one byte.
    SsidEmpty,
    /// SSID exceeds the 64-byte wire limit.
    SsidTooLong(usize),
    /// Password exceeds the 32-byte wire limit.
    PasswordTooLong(usize),
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SsidEmpty => write!(f, "ssid must not be empty"),
            Self::SsidTooLong(n) => write!(f, "ssid too long: {} bytes (max {})", n, SSID_MAX),
            Self::PasswordTooLong(n) => {
                write!(f, "password too long: {} bytes (max {})", n, PWD_MAX)
            }
        }
    }
}

impl std::error::Error for EncodeError {}

/// The encoded stream, split by protocol stage.
///
/// Useful for senders that pace or interleave stages themselves; most
/// callers just flatten it via [`FrameEncoder::encode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedParts {
    /// Preamble lengths (`preamble_rounds` runs of four).
    pub preamble: Vec<u16>,
    /// Magic field lengths (payload length + SSID CRC nibbles).
    pub magic: Vec<u16>,
    /// Prefix field lengths (password length + its CRC nibbles).
    pub prefix: Vec<u16>,
    /// One length vector per fragment: crc header, index header, data.
    pub fragments: Vec<Vec<u16>>,
}

impl EncodedParts {
    /// Flatten into one transmit-order length sequence.
    #[must_use]
    pub fn into_lengths(self) -> Vec<u16> {
        let mut out = self.preamble;
        out.extend(self.magic);
        out.extend(self.prefix);
        for frag in self.fragments {
            out.extend(frag);
        }
        out
    }
}

/// Builder for credential symbol streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEncoder {
    /// Length offset added to every symbol. Senders pick something small
    /// enough to keep `base + 511` a plausible frame size.
    pub base: u16,
    /// Repetitions of the four-length preamble run.
    pub preamble_rounds: usize,
    /// Repetitions of each staged field (clamped to at least 2).
    pub stage_rounds: usize,
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self {
            base: 60,
            preamble_rounds: 2,
            stage_rounds: 2,
        }
    }
}

impl FrameEncoder {
    /// Create an encoder with the given base offset and default rounds.
    #[must_use]
    pub fn new(base: u16) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    /// Build the full transmit-order length sequence.
    pub fn encode(
        &self,
        ssid: &[u8],
        password: &[u8],
        random: u8,
    ) -> Result<Vec<u16>, EncodeError> {
        self.parts(ssid, password, random)
            .map(EncodedParts::into_lengths)
    }

    /// Build the stream split by stage.
    pub fn parts(
        &self,
        ssid: &[u8],
        password: &[u8],
        random: u8,
    ) -> Result<EncodedParts, EncodeError> {
        if ssid.is_empty() {
            return Err(EncodeError::SsidEmpty);
        }
        if ssid.len() > SSID_MAX {
            return Err(EncodeError::SsidTooLong(ssid.len()));
        }
        if password.len() > PWD_MAX {
            return Err(EncodeError::PasswordTooLong(password.len()));
        }

        let mut payload = Vec::with_capacity(password.len() + 1 + ssid.len());
        payload.extend_from_slice(password);
        payload.push(random);
        payload.extend_from_slice(ssid);
        let data_len = payload.len() as u8;

        let mut preamble = Vec::with_capacity(self.preamble_rounds * 4);
        for _ in 0..self.preamble_rounds.max(1) {
            for step in 1..=4u16 {
                preamble.push(self.base + step);
            }
        }

        let ssid_crc = crc8(ssid);
        let pwd_len = password.len() as u8;
        let pwd_len_crc = crc8(&[pwd_len]);

        let rounds = self.stage_rounds.max(2);
        let magic = repeat_group(
            &[
                nibble_symbol(0x00, data_len >> 4),
                nibble_symbol(0x01, data_len & 0x0F),
                nibble_symbol(0x02, ssid_crc >> 4),
                nibble_symbol(0x03, ssid_crc & 0x0F),
            ],
            rounds,
            self.base,
        );
        let prefix = repeat_group(
            &[
                nibble_symbol(0x04, pwd_len >> 4),
                nibble_symbol(0x05, pwd_len & 0x0F),
                nibble_symbol(0x06, pwd_len_crc >> 4),
                nibble_symbol(0x07, pwd_len_crc & 0x0F),
            ],
            rounds,
            self.base,
        );

        let fragments = payload
            .chunks(FRAG_PAYLOAD)
            .enumerate()
            .map(|(index, chunk)| self.fragment_lengths(index as u8, chunk))
            .collect();

        Ok(EncodedParts {
            preamble,
            magic,
            prefix,
            fragments,
        })
    }

    /// Lengths for one fragment: crc header, index header, data symbols.
    fn fragment_lengths(&self, index: u8, chunk: &[u8]) -> Vec<u16> {
        let mut crc_input = Vec::with_capacity(1 + chunk.len());
        crc_input.push(index);
        crc_input.extend_from_slice(chunk);
        let crc = crc8(&crc_input) & 0x7F;

        let mut out = Vec::with_capacity(2 + chunk.len());
        out.push(self.base + 0x80 + u16::from(crc));
        out.push(self.base + 0x80 + u16::from(index));
        out.extend(chunk.iter().map(|&b| self.base + 0x100 + u16::from(b)));
        out
    }
}

/// Staged-field symbol: 5-bit field index over a 4-bit nibble.
#[inline]
fn nibble_symbol(index: u16, nibble: u8) -> u16 {
    (index << 4) | u16::from(nibble & 0x0F)
}

fn repeat_group(symbols: &[u16], rounds: usize, base: u16) -> Vec<u16> {
    let mut out = Vec::with_capacity(symbols.len() * rounds);
    for _ in 0..rounds {
        out.extend(symbols.iter().map(|&s| base + s));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_oversized_inputs() {
        let enc = FrameEncoder::default();
        assert_eq!(enc.encode(b"", b"pw", 1), Err(EncodeError::SsidEmpty));
        assert_eq!(
            enc.encode(&[b'x'; 65], b"pw", 1),
            Err(EncodeError::SsidTooLong(65))
        );
        assert_eq!(
            enc.encode(b"net", &[b'p'; 33], 1),
            Err(EncodeError::PasswordTooLong(33))
        );
    }

    #[test]
    fn test_limit_inputs_accepted() {
        let enc = FrameEncoder::default();
        // 32 + 1 + 64 = 97 bytes, the largest legal payload
        let parts = enc
            .parts(&[b's'; 64], &[b'p'; 32], 0xFF)
            .expect("maximum geometry encodes");
        assert_eq!(parts.fragments.len(), 25);
        assert_eq!(parts.fragments.last().map(Vec::len), Some(2 + 1));
    }

    #[test]
    fn test_preamble_is_consecutive_run() {
        let enc = FrameEncoder::new(99);
        let parts = enc.parts(b"net", b"", 0).expect("encodes");
        assert_eq!(&parts.preamble[..4], &[100, 101, 102, 103]);
    }

    #[test]
    fn test_magic_symbols_carry_length_and_crc() {
        let enc = FrameEncoder::new(0);
        // payload = "pass" + token + "wifi" = 9 bytes
        let parts = enc.parts(b"wifi", b"pass", 0x5A).expect("encodes");
        let ssid_crc = crc8(b"wifi");

        assert_eq!(parts.magic[0], 0x00); // length high nibble: 0
        assert_eq!(parts.magic[1], 0x19); // length low nibble: 9
        assert_eq!(parts.magic[2], 0x20 | u16::from(ssid_crc >> 4));
        assert_eq!(parts.magic[3], 0x30 | u16::from(ssid_crc & 0x0F));
        // second repetition is identical
        assert_eq!(parts.magic[4..8], parts.magic[..4]);
    }

    #[test]
    fn test_fragment_symbol_tags() {
        let enc = FrameEncoder::new(0);
        let parts = enc.parts(b"wifi", b"pass", 0x5A).expect("encodes");

        for frag in &parts.fragments {
            // two headers: bit 7 set, bit 8 clear
            assert_eq!(frag[0] & 0x180, 0x080);
            assert_eq!(frag[1] & 0x180, 0x080);
            // data symbols: bit 8 set
            for &d in &frag[2..] {
                assert_eq!(d & 0x100, 0x100);
            }
        }
    }

    #[test]
    fn test_stage_rounds_clamped_to_two() {
        let enc = FrameEncoder {
            base: 10,
            preamble_rounds: 1,
            stage_rounds: 0,
        };
        let parts = enc.parts(b"net", b"", 0).expect("encodes");
        assert_eq!(parts.magic.len(), 8);
        assert_eq!(parts.prefix.len(), 8);
    }
}
