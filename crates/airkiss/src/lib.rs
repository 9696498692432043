// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # AirKiss - smart-config credential decoder
//!
//! A device with no network link yet can still *observe* 802.11 traffic.
//! AirKiss-style provisioning exploits that: a configurator already on
//! the target network sends UDP broadcasts whose payload *lengths* spell
//! out the SSID, password and a random acknowledgement token, one 9-bit
//! symbol per frame. This crate decodes that length stream and echoes
//! the token back once the host has joined.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use airkiss::{ack, AckConfig, Decoder, Phase};
//!
//! let mut decoder = Decoder::new();
//!
//! // capture loop: (bssid, sa, frame length) triples from the sniffer
//! # let captured: Vec<([u8; 6], [u8; 6], u16)> = vec![];
//! for (bssid, sa, length) in captured {
//!     if decoder.feed(&bssid, &sa, length) == Phase::Done {
//!         break;
//!     }
//! }
//!
//! if let Some(creds) = decoder.credentials() {
//!     // ... join the network with creds.ssid / creds.password ...
//!     ack::broadcast_token(creds.token, &AckConfig::default())?;
//! }
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                    Host / capture loop                       |
//! |        (monitor-mode sniffer, channel hopping, join)         |
//! +--------------------------------------------------------------+
//! |                      Decoder (registry)                      |
//! |        demux by (BSSID, SA) -> one Session per sender        |
//! +--------------------------------------------------------------+
//! |                     Session state machine                    |
//! |   preamble lock | magic | prefix | fragment assembly | done  |
//! +--------------------------------------------------------------+
//! |        crc (fragment integrity)  |  ack (token echo)         |
//! +--------------------------------------------------------------+
//! ```
//!
//! Frame capture and length extraction are the host's job; the decoder
//! consumes pre-extracted `(bssid, sa, length)` triples and never blocks.
//! The one blocking piece, the acknowledgement burst in [`ack`], runs
//! after provisioning is over.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Decoder`] | Session registry and query surface |
//! | [`Phase`] | Per-session decoding progress (`Init` .. `Done`) |
//! | [`Credentials`] | Decoded SSID, password and random token |
//! | [`FrameEncoder`] | Configurator-side symbol stream builder |
//! | [`AckConfig`] | Token broadcast tuning (port, count, pace) |

/// Acknowledgement emitter (UDP broadcast of the random token).
pub mod ack;
/// Protocol constants and runtime configuration.
pub mod config;
/// CRC-8 primitive (reflected 0x8C, init 0).
pub mod crc;
/// Configurator-side symbol stream builder.
pub mod encode;
/// Session registry and decoder front-end.
pub mod registry;
/// Per-transmitter decoding state machine.
pub mod session;

pub use ack::{broadcast_token, broadcast_token_cancellable, TokenSink, UdpBroadcastSink};
pub use config::AckConfig;
pub use encode::{EncodeError, EncodedParts, FrameEncoder};
pub use registry::{Credentials, Decoder, SharedDecoder};
pub use session::Phase;

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
