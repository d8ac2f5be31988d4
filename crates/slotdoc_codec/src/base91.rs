//! Base-91 printable-byte codec.
//!
//! Bytes are packed into a bit accumulator and drained in 13- or 14-bit
//! groups. Each group becomes two characters of [`ALPHABET`] (low digit
//! first). A group takes 13 bits when its 13-bit value exceeds 88, and 14
//! bits otherwise, which keeps every group below `91 * 91`.
//!
//! The decoder skips any character outside the alphabet. See the crate
//! docs for why that leniency is kept.

/// The 91 symbols, in digit order.
pub const ALPHABET: &[u8; 91] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!#$%&()*+,./:;<=>?@[]^_`{|}~\"";

const INVALID: u8 = 0xff;

/// Reverse lookup from ASCII byte to digit value.
const DECODE_TABLE: [u8; 256] = build_decode_table();

const fn build_decode_table() -> [u8; 256] {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
}

/// Returns the digit value of `c`, or `None` if it is not in the alphabet.
#[inline]
pub fn digit_of(c: char) -> Option<u32> {
    if !c.is_ascii() {
        return None;
    }
    match DECODE_TABLE[c as usize] {
        INVALID => None,
        d => Some(u32::from(d)),
    }
}

/// Returns true if `c` belongs to the alphabet.
#[inline]
pub fn is_alphabet_char(c: char) -> bool {
    digit_of(c).is_some()
}

/// Encode bytes to base-91 text.
///
/// Empty input encodes to the empty string.
pub fn encode(bytes: &[u8]) -> String {
    let mut encoder = Base91Encoder::with_capacity(bytes.len() * 16 / 13 + 2);
    encoder.update(bytes);
    encoder.finish()
}

/// Decode base-91 text to bytes.
///
/// Characters outside the alphabet are ignored. This never fails.
pub fn decode(text: &str) -> Vec<u8> {
    let mut decoder = Base91Decoder::with_capacity(text.len() * 13 / 16 + 1);
    decoder.update(text);
    decoder.finish()
}

/// An incremental base-91 encoder.
#[derive(Debug, Default)]
pub struct Base91Encoder {
    acc: u32,
    bits: u32,
    out: String,
}

impl Base91Encoder {
    /// Create a new encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new encoder with room for `capacity` output characters.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            acc: 0,
            bits: 0,
            out: String::with_capacity(capacity),
        }
    }

    /// Feed more input bytes.
    pub fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.acc |= u32::from(byte) << self.bits;
            self.bits += 8;
            if self.bits > 13 {
                let mut value = self.acc & 0x1fff;
                if value > 88 {
                    self.acc >>= 13;
                    self.bits -= 13;
                } else {
                    value = self.acc & 0x3fff;
                    self.acc >>= 14;
                    self.bits -= 14;
                }
                self.push_digit(value % 91);
                self.push_digit(value / 91);
            }
        }
    }

    /// Flush the buffered bits and return the encoded text.
    pub fn finish(mut self) -> String {
        if self.bits > 0 {
            self.push_digit(self.acc % 91);
            if self.bits > 7 || self.acc > 90 {
                self.push_digit(self.acc / 91);
            }
        }
        self.out
    }

    #[inline]
    fn push_digit(&mut self, digit: u32) {
        self.out.push(char::from(ALPHABET[digit as usize]));
    }
}

/// An incremental base-91 decoder.
#[derive(Debug, Default)]
pub struct Base91Decoder {
    acc: u32,
    bits: u32,
    pending: Option<u32>,
    out: Vec<u8>,
}

impl Base91Decoder {
    /// Create a new decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new decoder with room for `capacity` output bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            acc: 0,
            bits: 0,
            pending: None,
            out: Vec::with_capacity(capacity),
        }
    }

    /// Feed more input text. Foreign characters are skipped.
    pub fn update(&mut self, text: &str) {
        for digit in text.chars().filter_map(digit_of) {
            let Some(low) = self.pending.take() else {
                self.pending = Some(digit);
                continue;
            };

            let value = low + digit * 91;
            self.acc |= value << self.bits;
            self.bits += if value & 0x1fff > 88 { 13 } else { 14 };

            // At least 13 bits are buffered here, so one byte always drains.
            loop {
                self.out.push((self.acc & 0xff) as u8);
                self.acc >>= 8;
                self.bits -= 8;
                if self.bits <= 7 {
                    break;
                }
            }
        }
    }

    /// Flush a trailing odd digit and return the decoded bytes.
    pub fn finish(mut self) -> Vec<u8> {
        if let Some(low) = self.pending {
            self.out.push(((self.acc | (low << self.bits)) & 0xff) as u8);
        }
        self.out
    }
}
