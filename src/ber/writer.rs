/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! Single-pass reverse BER writer.
//!
//! Children are emitted first; once their total length is known the
//! TAG+LENGTH octets are spliced in just ahead of them. The buffer grows by
//! prepending, so a message is built "inside out" and the final `finish()`
//! call hands back bytes already in correct forward wire order.

use super::length::BerLengthEncoder;

/// A growable buffer with append-at-head semantics.
///
/// `data` is allocated with room to spare; `front` is the index of the
/// first byte already written (everything in `data[front..]` is valid
/// output). Writing prepends by decrementing `front` and copying into the
/// freed slot, so encoding a message of `n` bytes is `O(n)` total instead
/// of the `O(n^2)` a naive "insert at index 0 of a Vec" would cost; the
/// buffer only reallocates (and re-centers) when it runs out of head room.
#[derive(Debug)]
pub struct ReverseBuffer {
    data: Vec<u8>,
    front: usize,
}

impl Default for ReverseBuffer {
    fn default() -> Self {
        Self::with_capacity(256)
    }
}

impl ReverseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        let data = vec![0u8; cap];
        ReverseBuffer { data, front: cap }
    }

    /// Current write position, counted from the end: how many bytes have
    /// been emitted so far. Children are always emitted before their
    /// enclosing TAG+LENGTH, so `start = buf.pos()` before recursing, then
    /// `len = buf.pos() - start` after, is the length prefix for that
    /// structure.
    #[inline]
    pub fn pos(&self) -> usize {
        self.data.len() - self.front
    }

    fn ensure_head_room(&mut self, additional: usize) {
        if self.front >= additional {
            return;
        }
        let written = self.data.len() - self.front;
        let mut grown = (self.data.len() + additional).max(self.data.len() * 2);
        grown = grown.max(additional + written);
        let new_front = grown - written;
        let mut new_data = vec![0u8; grown];
        new_data[new_front..].copy_from_slice(&self.data[self.front..]);
        self.data = new_data;
        self.front = new_front;
    }

    /// Prepend raw bytes (`bytes` is itself in forward order).
    pub fn push_front(&mut self, bytes: &[u8]) {
        self.ensure_head_room(bytes.len());
        self.front -= bytes.len();
        self.data[self.front..self.front + bytes.len()].copy_from_slice(bytes);
    }

    /// Prepend a single byte.
    #[inline]
    pub fn push_front_byte(&mut self, byte: u8) {
        self.ensure_head_room(1);
        self.front -= 1;
        self.data[self.front] = byte;
    }

    /// Prepend a computed BER length for a structure whose children,
    /// already written, occupy `len` bytes, then prepend its tag.
    pub fn prepend_tag_length(&mut self, tag: u8, len: usize) {
        let mut encoder = BerLengthEncoder::default();
        let length_bytes = encoder.encode(len);
        self.push_front(length_bytes);
        self.push_front_byte(tag);
    }

    /// Finish and hand back the accumulated bytes in forward wire order.
    pub fn finish(self) -> Vec<u8> {
        self.data[self.front..].to_vec()
    }

    /// Borrow the accumulated bytes without consuming the buffer.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.front..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_sequence_emits_forward_order() {
        let mut buf = ReverseBuffer::new();
        let start = buf.pos();
        // emit children first: an INTEGER 3
        buf.push_front(&[0x03]);
        buf.push_front_byte(0x01);
        buf.push_front_byte(0x02);
        let len = buf.pos() - start;
        buf.prepend_tag_length(0x30, len);
        assert_eq!(buf.finish(), vec![0x30, 0x03, 0x02, 0x01, 0x03]);
    }

    #[test]
    fn long_length_form() {
        let mut buf = ReverseBuffer::new();
        let start = buf.pos();
        for _ in 0..200 {
            buf.push_front_byte(0x41);
        }
        let len = buf.pos() - start;
        buf.prepend_tag_length(0x04, len);
        let out = buf.finish();
        assert_eq!(&out[..3], &[0x04, 0x81, 0xC8]);
        assert_eq!(out.len(), 203);
    }
}
