// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;

use crate::{
    error::{Error, Result},
    util::tracing_wrappers::*,
};
use byteorder::{BigEndian, ByteOrder};

/// Widest multi-byte read, bounded by the `u64` accumulator.
pub const MAX_BYTES_PER_CALL: usize = 8;

/// Reads bits and bytes from a sequence of bytes.
///
/// Bits are returned most-significant first within each byte. Byte reads are
/// always byte aligned: any residual bits of a partially consumed byte are
/// dropped before an advancing byte read.
#[derive(Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    position: usize,
    current_byte: u8,
    bits_remaining: u8,
}

impl Debug for BitReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BitReader{{ data: [{} bytes], position: {}, current_byte: {:0width$b} }}",
            self.data.len(),
            self.position,
            self.current_byte & ((1u16 << self.bits_remaining) - 1) as u8,
            width = self.bits_remaining as usize
        )
    }
}

impl<'a> BitReader<'a> {
    /// Constructs a BitReader for a given range of data.
    pub fn new(data: &'a [u8]) -> BitReader<'a> {
        BitReader {
            data,
            position: 0,
            current_byte: 0,
            bits_remaining: 0,
        }
    }

    /// Reads the next bit.
    /// ```
    /// # use jpeg_segments::bit_reader::BitReader;
    /// let mut br = BitReader::new(&[0b1010_0000]);
    /// assert_eq!(br.next_bit()?, 1);
    /// assert_eq!(br.next_bit()?, 0);
    /// assert_eq!(br.next_bit()?, 1);
    /// # Ok::<(), jpeg_segments::error::Error>(())
    /// ```
    pub fn next_bit(&mut self) -> Result<u8> {
        if self.bits_remaining == 0 {
            let Some(&byte) = self.data.get(self.position) else {
                return Err(Error::OutOfBounds);
            };
            self.position += 1;
            self.current_byte = byte;
            self.bits_remaining = 8;
        }
        self.bits_remaining -= 1;
        Ok((self.current_byte >> self.bits_remaining) & 1)
    }

    /// Reads `num` bytes at the cursor as one integer in byte order `B`, and
    /// advances past them.
    /// ```
    /// # use jpeg_segments::bit_reader::BitReader;
    /// use byteorder::{BigEndian, LittleEndian};
    /// let data = [0x01, 0x02];
    /// assert_eq!(BitReader::new(&data).read_bytes::<BigEndian>(2)?, 258);
    /// assert_eq!(BitReader::new(&data).read_bytes::<LittleEndian>(2)?, 513);
    /// # Ok::<(), jpeg_segments::error::Error>(())
    /// ```
    pub fn read_bytes<B: ByteOrder>(&mut self, num: usize) -> Result<u64> {
        let value = self.read_bytes_at::<B>(self.position, num)?;
        self.bits_remaining = 0;
        self.position += num;
        Ok(value)
    }

    /// Reads `num` bytes starting at the absolute `offset` as one integer in
    /// byte order `B`. The cursor does not move.
    pub fn read_bytes_at<B: ByteOrder>(&self, offset: usize, num: usize) -> Result<u64> {
        let bytes = self.bytes_at(offset, num)?;
        if num > MAX_BYTES_PER_CALL {
            return Err(Error::IntegerTooWide(num));
        }
        if num == 0 {
            return Ok(0);
        }
        Ok(B::read_uint(bytes, num))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes::<BigEndian>(1)? as u8)
    }

    pub fn read_u8_at(&self, offset: usize) -> Result<u8> {
        Ok(self.read_bytes_at::<BigEndian>(offset, 1)? as u8)
    }

    pub fn read_u16_be(&mut self) -> Result<u16> {
        Ok(self.read_bytes::<BigEndian>(2)? as u16)
    }

    pub fn read_u16_be_at(&self, offset: usize) -> Result<u16> {
        Ok(self.read_bytes_at::<BigEndian>(offset, 2)? as u16)
    }

    /// Returns the byte at the cursor without consuming it.
    pub fn peek_byte(&self) -> Result<u8> {
        self.read_u8_at(self.position)
    }

    /// Returns the big-endian short at the cursor without consuming it.
    pub fn peek_u16_be(&self) -> Result<u16> {
        self.read_u16_be_at(self.position)
    }

    /// Returns `num` raw bytes at the cursor and advances past them.
    pub fn read_slice(&mut self, num: usize) -> Result<&'a [u8]> {
        let bytes = self.bytes_at(self.position, num)?;
        self.bits_remaining = 0;
        self.position += num;
        Ok(bytes)
    }

    /// Skips `num` bytes.
    /// ```
    /// # use jpeg_segments::bit_reader::BitReader;
    /// let mut br = BitReader::new(&[0, 1, 2]);
    /// br.skip_bytes(2)?;
    /// assert_eq!(br.read_u8()?, 2);
    /// assert!(br.skip_bytes(1).is_err());
    /// # Ok::<(), jpeg_segments::error::Error>(())
    /// ```
    pub fn skip_bytes(&mut self, num: usize) -> Result<()> {
        self.read_slice(num).map(|_| ())
    }

    /// Index of the next unread byte.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of whole bytes after the cursor.
    pub fn bytes_remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Returns the total number of bits that have been consumed.
    pub fn total_bits_read(&self) -> usize {
        self.position * 8 - self.bits_remaining as usize
    }

    /// True when neither whole bytes nor residual bits are left.
    pub fn is_empty(&self) -> bool {
        self.bits_remaining == 0 && self.position == self.data.len()
    }

    /// The bytes this reader was constructed over.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Splits off a separate BitReader to handle the next `n` bytes.
    /// `self` is automatically advanced by `n` bytes.
    /// ```
    /// # use jpeg_segments::bit_reader::BitReader;
    /// let mut br = BitReader::new(&[1, 2, 3]);
    /// let mut head = br.split_at(2)?;
    /// assert_eq!(head.read_u16_be()?, 0x0102);
    /// assert!(head.is_empty());
    /// assert_eq!(br.read_u8()?, 3);
    /// # Ok::<(), jpeg_segments::error::Error>(())
    /// ```
    pub fn split_at(&mut self, n: usize) -> Result<BitReader<'a>> {
        let ret = BitReader::new(self.read_slice(n)?);
        debug!(?n, ret=?ret);
        Ok(ret)
    }

    /// Returns `num` raw bytes at the absolute `offset` without moving the
    /// cursor.
    pub fn bytes_at(&self, offset: usize, num: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(num)
            .and_then(|end| self.data.get(offset..end))
            .ok_or(Error::BufferOverflow {
                offset,
                len: num,
                available: self.data.len(),
            })
    }
}
