//! Streaming COBS framing straight into a ring.
//!
//! # Overview
//! The encoder writes each input byte at the current cursor while remembering
//! where the open block's length byte belongs. That slot holds a `0` placeholder
//! until the block is closed, so a frame that is never finished stays visibly
//! unterminated to a reader scanning for delimiters.
//!
//! - A `0` input byte closes the open block and starts a new one.
//! - A block holding 254 data bytes is closed on the spot (length byte `0xFF`).
//! - `finish` closes the last block and appends the `0` delimiter.
//!
//! All positions wrap modulo the sink capacity. The encoder does not check free
//! space and never touches a channel's published write offset.

/// Worst-case framed size of an `input_len`-byte stream: one length byte per
/// started 254-byte block plus the trailing delimiter.
#[inline]
pub const fn max_encoded_len(input_len: usize) -> usize {
    input_len + input_len / 254 + 2
}

const MAX_BLOCK: u8 = 0xFF;

/// Byte-addressed circular storage the encoder writes into.
pub trait RingSink {
    /// Number of addressable slots; positions wrap at this value.
    fn capacity(&self) -> u32;

    /// Store `byte` at `index`, where `index < capacity()`.
    fn put(&mut self, index: u32, byte: u8);
}

impl RingSink for [u8] {
    #[inline]
    fn capacity(&self) -> u32 {
        self.len() as u32
    }

    #[inline]
    fn put(&mut self, index: u32, byte: u8) {
        self[index as usize] = byte;
    }
}

/// Outcome of a finished frame.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Encoded {
    /// Cursor just past the delimiter: the next write offset to publish.
    pub end: u32,
    /// Framed bytes written, delimiter included.
    pub written: usize,
}

/// Call-scoped framing session over a sink.
pub struct FrameEncoder<'s, S: RingSink + ?Sized> {
    sink: &'s mut S,
    code_pos: u32,
    code: u8,
    cursor: u32,
    written: usize,
}

impl<'s, S: RingSink + ?Sized> FrameEncoder<'s, S> {
    /// Open a frame at `at`, writing the first length placeholder there.
    pub fn begin(sink: &'s mut S, at: u32) -> Self {
        let mut enc = Self {
            sink,
            code_pos: at,
            code: 1,
            cursor: at,
            written: 0,
        };
        enc.open_block();
        enc
    }

    #[inline]
    fn step(&mut self) {
        let next = self.cursor + 1;
        self.cursor = if next >= self.sink.capacity() { 0 } else { next };
        self.written += 1;
    }

    #[inline]
    fn open_block(&mut self) {
        self.code_pos = self.cursor;
        self.sink.put(self.cursor, 0);
        self.step();
        self.code = 1;
    }

    #[inline]
    fn close_block(&mut self) {
        self.sink.put(self.code_pos, self.code);
    }

    /// Feed one payload byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        if byte == 0 {
            self.close_block();
            self.open_block();
            return;
        }

        self.sink.put(self.cursor, byte);
        self.step();
        self.code += 1;

        if self.code == MAX_BLOCK {
            self.close_block();
            self.open_block();
        }
    }

    pub fn write_all(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.write_byte(b);
        }
    }

    /// Bytes written so far, placeholders included.
    #[inline]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Close the open block and terminate the frame.
    pub fn finish(mut self) -> Encoded {
        self.close_block();
        self.sink.put(self.cursor, 0);
        self.step();
        Encoded {
            end: self.cursor,
            written: self.written,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameEncoder, max_encoded_len};
    use proptest::prelude::*;

    fn encode_linear(packet_id: u8, payload: &[u8]) -> Vec<u8> {
        let mut buf = vec![0xAAu8; max_encoded_len(payload.len() + 1)];
        let mut enc = FrameEncoder::begin(&mut buf[..], 0);
        enc.write_byte(packet_id);
        enc.write_all(payload);
        let out = enc.finish();
        buf.truncate(out.written);
        buf
    }

    fn decode(frame: &[u8]) -> Vec<u8> {
        let (last, body) = frame.split_last().expect("non-empty frame");
        assert_eq!(*last, 0, "frame must end with the delimiter");
        cobs::decode_vec(body).expect("valid cobs")
    }

    #[test]
    fn zero_in_payload_splits_blocks() {
        let frame = encode_linear(0x42, &[0x11, 0x00, 0x22]);
        assert_eq!(frame, [0x03, 0x42, 0x11, 0x02, 0x22, 0x00]);
        assert_eq!(decode(&frame), [0x42, 0x11, 0x00, 0x22]);
    }

    #[test]
    fn trailing_zero_gets_its_own_block() {
        let frame = encode_linear(0x01, &[0x00]);
        assert_eq!(frame, [0x02, 0x01, 0x01, 0x00]);
        assert_eq!(decode(&frame), [0x01, 0x00]);
    }

    #[test]
    fn full_block_is_closed_without_consuming_input() {
        let payload = [0x07u8; 253];
        let frame = encode_linear(0x07, &payload);
        // 254 data bytes fill one block, then an empty block and the delimiter.
        assert_eq!(frame.len(), 257);
        assert_eq!(frame.len(), max_encoded_len(254));
        assert_eq!(frame[0], 0xFF);
        assert_eq!(frame[255], 0x01);
        assert_eq!(frame[256], 0x00);
        assert!(frame[..256].iter().all(|&b| b != 0));
        assert_eq!(decode(&frame).len(), 254);
    }

    #[test]
    fn cursor_wraps_around_the_sink() {
        let mut ring = [0xEEu8; 8];
        let mut enc = FrameEncoder::begin(&mut ring[..], 5);
        enc.write_all(&[0x42, 0x11, 0x00, 0x22]);
        let out = enc.finish();

        assert_eq!(out.written, 6);
        assert_eq!(out.end, 3);
        let mut linear = Vec::new();
        linear.extend_from_slice(&ring[5..]);
        linear.extend_from_slice(&ring[..3]);
        assert_eq!(linear, [0x03, 0x42, 0x11, 0x02, 0x22, 0x00]);
        assert_eq!(ring[3..5], [0xEE, 0xEE]);
    }

    #[test]
    fn unfinished_frame_keeps_zero_placeholder() {
        let mut ring = [0xEEu8; 16];
        let mut enc = FrameEncoder::begin(&mut ring[..], 2);
        enc.write_all(&[0x01, 0x02]);
        assert_eq!(enc.written(), 3);
        drop(enc);
        assert_eq!(ring[2], 0x00);
        assert_eq!(ring[3..5], [0x01, 0x02]);
    }

    #[test]
    fn bound_covers_empty_and_long_inputs() {
        assert_eq!(max_encoded_len(0), 2);
        assert_eq!(max_encoded_len(1), 3);
        assert_eq!(max_encoded_len(508), 512);
    }

    proptest! {
        #[test]
        fn framed_output_decodes_to_input(
            packet_id in any::<u8>(),
            payload in proptest::collection::vec(any::<u8>(), 0..700),
        ) {
            let frame = encode_linear(packet_id, &payload);
            prop_assert!(frame.len() <= max_encoded_len(payload.len() + 1));
            prop_assert!(frame[..frame.len() - 1].iter().all(|&b| b != 0));

            let mut expected = vec![packet_id];
            expected.extend_from_slice(&payload);
            prop_assert_eq!(decode(&frame), expected);
        }
    }
}
