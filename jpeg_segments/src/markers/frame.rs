// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::{MarkerCode, MarkerHeader, MarkerKind, Segment, read_segment};
use crate::{
    error::{Error, Result},
    limits::SegmentLimits,
    tables::MAX_DESTINATION,
    util::tracing_wrappers::*,
};

/// Component specification inside a frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameComponent {
    /// Component ID
    pub id: u8,
    /// Horizontal sampling factor
    pub h_samp_factor: u8,
    /// Vertical sampling factor
    pub v_samp_factor: u8,
    /// Quantization table destination
    pub quant_idx: u8,
}

/// SOFn segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    header: MarkerHeader,
    /// Sample precision in bits.
    pub precision: u8,
    /// Number of lines; 0 means it is defined later by a DNL segment.
    pub height: u16,
    pub width: u16,
    pub components: Vec<FrameComponent>,
}

impl FrameHeader {
    /// The `n` of SOFn.
    pub fn process(&self) -> u8 {
        match self.header.code.kind() {
            MarkerKind::Sof(n) => n,
            _ => unreachable!("FrameHeader always holds a SOFn header"),
        }
    }

    pub fn is_progressive(&self) -> bool {
        matches!(self.process(), 2 | 6 | 10 | 14)
    }

    pub fn is_arithmetic(&self) -> bool {
        self.process() >= 8
    }

    pub fn is_baseline(&self) -> bool {
        self.process() == 0
    }
}

impl Segment for FrameHeader {
    fn decode_with_limits(bytes: &[u8], _: &SegmentLimits) -> Result<Self> {
        let (header, mut body) = read_segment(bytes, MarkerKind::is_sof, MarkerCode::SOF0)?;
        let precision = body.read_u8()?;
        let height = body.read_u16_be()?;
        let width = body.read_u16_be()?;
        let num_components = body.read_u8()? as usize;
        if header.body_len() != 6 + 3 * num_components {
            return Err(Error::InvalidSegmentLength(header.length - 2));
        }
        let components = (0..num_components)
            .map(|_| {
                let id = body.read_u8()?;
                let sampling = body.read_u8()?;
                let quant_idx = body.read_u8()?;
                if quant_idx > MAX_DESTINATION {
                    return Err(Error::InvalidDestination(quant_idx));
                }
                Ok(FrameComponent {
                    id,
                    h_samp_factor: sampling >> 4,
                    v_samp_factor: sampling & 0xf,
                    quant_idx,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(
            precision,
            width,
            height,
            ?components,
            "decoded frame header"
        );
        Ok(Self {
            header,
            precision,
            height,
            width,
            components,
        })
    }

    fn header(&self) -> &MarkerHeader {
        &self.header
    }
}
