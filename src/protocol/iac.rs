// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Minimal telnet option filter.
//!
//! Splits the raw byte stream into data bytes and the refusals we owe the
//! peer. Every option request is declined; we never negotiate anything.

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

const NUL: u8 = 0x00;
const XON: u8 = 0x11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Data,
    Command,
    Option(u8),
    Subnegotiation,
    SubnegotiationIac,
}

/// Incremental decoder; sequences may be split across reads.
#[derive(Debug)]
pub(crate) struct IacDecoder {
    state: State,
}

impl IacDecoder {
    pub(crate) fn new() -> Self {
        Self { state: State::Data }
    }

    /// Feeds raw bytes, appending payload to `data` and refusals to `replies`.
    pub(crate) fn feed(&mut self, input: &[u8], data: &mut Vec<u8>, replies: &mut Vec<u8>) {
        for &byte in input {
            self.state = match (self.state, byte) {
                (State::Data, IAC) => State::Command,
                (State::Data, NUL | XON) => State::Data,
                (State::Data, _) => {
                    data.push(byte);
                    State::Data
                }
                (State::Command, IAC) => {
                    data.push(IAC);
                    State::Data
                }
                (State::Command, DO | DONT | WILL | WONT) => State::Option(byte),
                (State::Command, SB) => State::Subnegotiation,
                (State::Command, _) => State::Data,
                (State::Option(verb), option) => {
                    replies.extend_from_slice(&[IAC, refusal(verb), option]);
                    State::Data
                }
                (State::Subnegotiation, IAC) => State::SubnegotiationIac,
                (State::Subnegotiation, _) => State::Subnegotiation,
                (State::SubnegotiationIac, SE) => State::Data,
                (State::SubnegotiationIac, _) => State::Subnegotiation,
            };
        }
    }
}

fn refusal(verb: u8) -> u8 {
    if matches!(verb, DO | DONT) { WONT } else { DONT }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let mut decoder = IacDecoder::new();
        let mut data = Vec::new();
        let mut replies = Vec::new();
        decoder.feed(input, &mut data, &mut replies);
        (data, replies)
    }

    #[test]
    fn plain_data_passes_through() {
        let (data, replies) = decode(b"True\r");
        assert_eq!(data, b"True\r");
        assert!(replies.is_empty());
    }

    #[test]
    fn do_is_refused_with_wont() {
        let (data, replies) = decode(&[IAC, DO, 1, b'o', b'k']);
        assert_eq!(data, b"ok");
        assert_eq!(replies, [IAC, WONT, 1]);
    }

    #[test]
    fn will_is_refused_with_dont() {
        let (data, replies) = decode(&[IAC, WILL, 3, IAC, WONT, 5]);
        assert!(data.is_empty());
        assert_eq!(replies, [IAC, DONT, 3, IAC, DONT, 5]);
    }

    #[test]
    fn escaped_iac_is_data() {
        let (data, _) = decode(&[b'a', IAC, IAC, b'b']);
        assert_eq!(data, [b'a', IAC, b'b']);
    }

    #[test]
    fn subnegotiation_is_dropped() {
        let (data, replies) = decode(&[IAC, SB, 24, 1, 2, IAC, SE, b'x']);
        assert_eq!(data, b"x");
        assert!(replies.is_empty());
    }

    #[test]
    fn nul_and_xon_are_dropped() {
        let (data, _) = decode(&[b'O', NUL, b'N', XON]);
        assert_eq!(data, b"ON");
    }

    #[test]
    fn sequence_split_across_reads() {
        let mut decoder = IacDecoder::new();
        let mut data = Vec::new();
        let mut replies = Vec::new();

        decoder.feed(&[b'A', IAC], &mut data, &mut replies);
        decoder.feed(&[DO], &mut data, &mut replies);
        decoder.feed(&[31, b'B'], &mut data, &mut replies);

        assert_eq!(data, b"AB");
        assert_eq!(replies, [IAC, WONT, 31]);
    }
}
