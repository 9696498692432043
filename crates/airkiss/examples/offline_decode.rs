// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decode a synthetic capture without touching the radio.
//!
//! Builds the symbol stream a configurator would transmit, shuffles the
//! fragments the way a lossy channel might reorder them, and runs the
//! decoder over the result.
//!
//! ```sh
//! cargo run --example offline_decode
//! ```

use airkiss::{Decoder, FrameEncoder, Phase};

fn main() {
    let bssid = [0x02, 0x5C, 0x11, 0x33, 0x70, 0x01];
    let sa = [0x02, 0xD4, 0x6A, 0x91, 0x00, 0x42];

    let parts = FrameEncoder::new(60)
        .parts(b"demo-ap", b"correct horse", 0x5A)
        .expect("valid credentials");

    let mut decoder = Decoder::new();
    let mut fed = 0usize;

    let mut feed = |decoder: &mut Decoder, lengths: &[u16]| {
        for &l in lengths {
            decoder.feed(&bssid, &sa, l);
            fed += 1;
        }
    };

    feed(&mut decoder, &parts.preamble);
    feed(&mut decoder, &parts.magic);
    feed(&mut decoder, &parts.prefix);
    // Deliver the fragments back-to-front; order does not matter
    for frag in parts.fragments.iter().rev() {
        feed(&mut decoder, frag);
    }

    println!("fed {} symbols, phase {:?}", fed, decoder.global_phase());

    if decoder.global_phase() == Phase::Done {
        let creds = decoder.credentials().expect("phase Done implies credentials");
        println!("ssid:     {}", String::from_utf8_lossy(&creds.ssid));
        println!("password: {}", String::from_utf8_lossy(&creds.password));
        println!("token:    {:#04x}", creds.token);
    }
}
