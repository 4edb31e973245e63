// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::{TableSegment, read_table_id};
use crate::{
    bit_reader::BitReader,
    error::{Error, Result},
    markers::MarkerCode,
    zigzag::{self, BLOCK_DIM, BLOCK_SIZE, ZIGZAG_8X8},
};

#[repr(u8)]
#[derive(Debug, FromPrimitive, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuantPrecision {
    #[default]
    Bits8 = 0,
    Bits16 = 1,
}

impl TryFrom<u8> for QuantPrecision {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_u8(value).ok_or(Error::InvalidEnum(value as u32, "QuantPrecision".to_string()))
    }
}

impl QuantPrecision {
    /// Bytes per quantizer on the wire.
    pub fn element_size(self) -> usize {
        match self {
            QuantPrecision::Bits8 => 1,
            QuantPrecision::Bits16 => 2,
        }
    }
}

/// One table of a DQT segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizationTable {
    pub precision: QuantPrecision,
    pub destination: u8,
    /// Quantizers in zigzag order.
    pub values: [u16; BLOCK_SIZE],
}

impl QuantizationTable {
    /// Quantizers as an 8x8 block.
    pub fn to_matrix(&self) -> Result<Vec<Vec<u16>>> {
        zigzag::to_matrix(&self.values, BLOCK_DIM, BLOCK_DIM)
    }

    /// Quantizers in row-major order.
    pub fn natural_order(&self) -> [u16; BLOCK_SIZE] {
        let mut natural = [0; BLOCK_SIZE];
        for (i, &value) in self.values.iter().enumerate() {
            natural[ZIGZAG_8X8[i]] = value;
        }
        natural
    }
}

impl TableSegment for QuantizationTable {
    const KIND: MarkerCode = MarkerCode::DQT;
    type Key = u8;

    fn read(br: &mut BitReader) -> Result<Self> {
        let (precision, destination) = read_table_id(br)?;
        let precision = QuantPrecision::try_from(precision)?;
        let values = array_init::try_array_init(|_| match precision {
            QuantPrecision::Bits8 => br.read_u8().map(u16::from),
            QuantPrecision::Bits16 => br.read_u16_be(),
        })?;
        Ok(Self {
            precision,
            destination,
            values,
        })
    }

    fn identifier(&self) -> u8 {
        self.precision as u8
    }

    fn destination(&self) -> u8 {
        self.destination
    }

    fn key(&self) -> u8 {
        self.destination
    }

    fn encoded_len(&self) -> usize {
        1 + BLOCK_SIZE * self.precision.element_size()
    }

    fn render(&self) -> String {
        let precision = match self.precision {
            QuantPrecision::Bits8 => "8-bit",
            QuantPrecision::Bits16 => "16-bit",
        };
        format!("DQT precision={precision} destination={}", self.destination)
    }
}
