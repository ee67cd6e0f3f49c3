#![forbid(unsafe_code)]

//! Key decoder state machine.
//!
//! Turns raw terminal input bytes into [`Key`] values. Only the
//! handful of keys the selection menu cares about are recognised:
//!
//! | Bytes | Key |
//! |-------|-----|
//! | `\n` or `\r` | [`Key::Enter`] |
//! | `ESC` as the whole read | [`Key::Escape`] |
//! | `0x03` | [`Key::CtrlC`] |
//! | `ESC [ A` / `B` / `C` / `D` | [`Key::Up`] / [`Key::Down`] / [`Key::Right`] / [`Key::Left`] |
//! | printable ASCII | [`Key::Char`] |
//!
//! Anything else decodes to [`Key::Unrecognized`].
//!
//! # Design
//!
//! A read may hold several keys when the user types faster than the menu
//! redraws, so [`KeyDecoder::decode`] returns every key in order. A burst
//! longer than the read buffer splits a sequence across reads, so decoder
//! state carries over: `ESC [ B ESC` followed by `[ B` is two downs. An ESC
//! left pending at the end of a longer read stays pending and is never
//! reported as [`Key::Escape`].
//!
//! A control byte inside an unfinished sequence ends that sequence as
//! [`Key::Unrecognized`] and is then decoded on its own, so Enter and Ctrl-C
//! always get through.

/// DoS protection: longest CSI parameter run we keep consuming.
const MAX_CSI_LEN: usize = 32;

/// A decoded key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
    CtrlC,
    /// A printable ASCII character.
    Char(char),
    /// Bytes that do not form a key this decoder knows.
    Unrecognized,
}

impl Key {
    /// Whether this key ends the session without a selection.
    #[must_use]
    pub const fn is_cancel(self) -> bool {
        matches!(self, Self::Escape | Self::CtrlC)
    }
}

/// Decoder states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DecoderState {
    /// Between keys.
    #[default]
    Ground,
    /// After ESC.
    Escape,
    /// After ESC [.
    Csi,
    /// Inside a CSI sequence that is not a plain arrow.
    CsiSkip { consumed: usize },
}

/// Decoder for the key bytes of one interactive session.
#[derive(Debug, Default)]
pub struct KeyDecoder {
    state: DecoderState,
}

impl KeyDecoder {
    /// Create a decoder in the ground state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode every key completed by `input`.
    ///
    /// A sequence still open at the end of `input` is kept for the next call.
    /// The one exception is a read made of a single ESC byte, which is the
    /// Escape key.
    pub fn decode(&mut self, input: &[u8]) -> Vec<Key> {
        let mut keys = Vec::new();
        for &byte in input {
            self.process_byte(byte, &mut keys);
        }
        if input == [0x1B] && self.state == DecoderState::Escape {
            self.state = DecoderState::Ground;
            keys.push(Key::Escape);
        }
        keys
    }

    /// Drop any pending sequence, reporting it as [`Key::Unrecognized`].
    pub fn flush(&mut self) -> Option<Key> {
        let pending = self.state != DecoderState::Ground;
        self.state = DecoderState::Ground;
        pending.then_some(Key::Unrecognized)
    }

    fn process_byte(&mut self, byte: u8, keys: &mut Vec<Key>) {
        let key = match self.state {
            DecoderState::Ground => self.process_ground(byte),
            DecoderState::Escape => self.process_escape(byte, keys),
            DecoderState::Csi | DecoderState::CsiSkip { .. } if byte < 0x20 => {
                self.interrupt(byte, keys)
            }
            DecoderState::Csi => self.process_csi(byte),
            DecoderState::CsiSkip { consumed } => self.process_csi_skip(byte, consumed),
        };
        keys.extend(key);
    }

    /// End the open sequence and decode `byte` from the ground state.
    fn interrupt(&mut self, byte: u8, keys: &mut Vec<Key>) -> Option<Key> {
        self.state = DecoderState::Ground;
        keys.push(Key::Unrecognized);
        self.process_ground(byte)
    }

    fn process_ground(&mut self, byte: u8) -> Option<Key> {
        match byte {
            0x1B => {
                self.state = DecoderState::Escape;
                None
            }
            b'\n' | b'\r' => Some(Key::Enter),
            0x03 => Some(Key::CtrlC),
            0x20..=0x7E => Some(Key::Char(byte as char)),
            _ => Some(Key::Unrecognized),
        }
    }

    fn process_escape(&mut self, byte: u8, keys: &mut Vec<Key>) -> Option<Key> {
        match byte {
            b'[' => {
                self.state = DecoderState::Csi;
                None
            }
            // ESC ESC: the first one stood alone.
            0x1B => Some(Key::Escape),
            _ => self.interrupt(byte, keys),
        }
    }

    fn process_csi(&mut self, byte: u8) -> Option<Key> {
        let key = match byte {
            b'A' => Key::Up,
            b'B' => Key::Down,
            b'C' => Key::Right,
            b'D' => Key::Left,
            // Parameter and intermediate bytes: keep swallowing until the final byte.
            0x20..=0x3F => {
                self.state = DecoderState::CsiSkip { consumed: 1 };
                return None;
            }
            _ => Key::Unrecognized,
        };
        self.state = DecoderState::Ground;
        Some(key)
    }

    fn process_csi_skip(&mut self, byte: u8, consumed: usize) -> Option<Key> {
        match byte {
            0x20..=0x3F if consumed < MAX_CSI_LEN => {
                self.state = DecoderState::CsiSkip {
                    consumed: consumed + 1,
                };
                None
            }
            _ => {
                self.state = DecoderState::Ground;
                Some(Key::Unrecognized)
            }
        }
    }
}

/// Classify a read that should hold exactly one key.
///
/// Returns [`Key::Unrecognized`] for empty input or input holding more than
/// one key.
#[must_use]
pub fn classify(input: &[u8]) -> Key {
    let mut decoder = KeyDecoder::new();
    let mut keys = decoder.decode(input);
    keys.extend(decoder.flush());
    match keys.as_slice() {
        [key] => *key,
        _ => Key::Unrecognized,
    }
}
