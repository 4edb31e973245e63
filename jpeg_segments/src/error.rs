// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use thiserror::Error;

use crate::bit_reader::MAX_BYTES_PER_CALL;
use crate::huffman::HUFFMAN_MAX_BITS;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Read out of bounds")]
    OutOfBounds,
    #[error("Read of {len} bytes at offset {offset} overflows a buffer of {available} bytes")]
    BufferOverflow {
        offset: usize,
        len: usize,
        available: usize,
    },
    #[error("Integer too wide: {n} bytes > {max}", n = .0, max = MAX_BYTES_PER_CALL)]
    IntegerTooWide(usize),
    #[error("Cannot arrange {len} values as a {rows}x{cols} matrix")]
    DimensionMismatch {
        len: usize,
        rows: usize,
        cols: usize,
    },
    #[error("No table registered under {0}")]
    NoSuchKey(String),
    #[error("Huffman node already carries symbol {0}")]
    SymbolAlreadySet(u8),
    #[error("Invalid bit value {0}, expected 0 or 1")]
    InvalidBit(u8),
    #[error("Asynchronous decoding is not supported")]
    AsyncUnsupported,
    #[error("Unknown marker code {0:04x}")]
    UnknownMarker(u16),
    #[error("Unexpected marker {found:04x}, expected {expected:04x}")]
    UnexpectedMarker {
        expected: u16,
        found: u16,
    },
    #[error("Invalid segment length {0}")]
    InvalidSegmentLength(usize),
    #[error("Invalid enum value {0} for {1}")]
    InvalidEnum(u32, String),
    #[error("Invalid table destination {0}, max is 3")]
    InvalidDestination(u8),
    #[error("Unsupported APP0 identifier {0:?}, expected \"JFIF\"")]
    UnsupportedApp0Identifier(String),
    #[error("Huffman histogram declares {expected} codes but {found} symbols are present")]
    HuffmanCountMismatch {
        expected: usize,
        found: usize,
    },
    #[error("Too many Huffman code lengths: {n}, max is {max}", n = .0, max = HUFFMAN_MAX_BITS)]
    TooManyCodeLengths(usize),
    #[error("Invalid Huffman code")]
    InvalidHuffman,
    #[error("{what} is {actual}, limit is {limit}")]
    LimitExceeded {
        what: &'static str,
        actual: usize,
        limit: usize,
    },
    // Generic arithmetic overflow. Prefer using other errors if possible.
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

pub type Result<T> = std::result::Result<T, Error>;
