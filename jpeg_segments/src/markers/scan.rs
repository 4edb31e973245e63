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

/// Component selector of a scan and the Huffman tables it uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanComponent {
    pub component_id: u8,
    pub dc_tbl_idx: u8,
    pub ac_tbl_idx: u8,
}

/// SOS segment header. The entropy-coded data that follows it is not part of
/// the segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHeader {
    header: MarkerHeader,
    pub components: Vec<ScanComponent>,
    /// Spectral selection start
    pub ss: u8,
    /// Spectral selection end
    pub se: u8,
    /// Successive approximation high bit
    pub ah: u8,
    /// Successive approximation low bit
    pub al: u8,
}

impl Segment for ScanHeader {
    fn decode_with_limits(bytes: &[u8], _: &SegmentLimits) -> Result<Self> {
        let (header, mut body) = read_segment(bytes, |k| k == MarkerKind::Sos, MarkerCode::SOS)?;
        let num_components = body.read_u8()? as usize;
        if !(1..=4).contains(&num_components) || header.body_len() != 4 + 2 * num_components {
            return Err(Error::InvalidSegmentLength(header.length - 2));
        }
        let mut components = Vec::with_capacity(num_components);
        for _ in 0..num_components {
            let component_id = body.read_u8()?;
            let tables = body.read_u8()?;
            let (dc_tbl_idx, ac_tbl_idx) = (tables >> 4, tables & 0xf);
            for idx in [dc_tbl_idx, ac_tbl_idx] {
                if idx > MAX_DESTINATION {
                    return Err(Error::InvalidDestination(idx));
                }
            }
            components.push(ScanComponent {
                component_id,
                dc_tbl_idx,
                ac_tbl_idx,
            });
        }
        let ss = body.read_u8()?;
        let se = body.read_u8()?;
        let approximation = body.read_u8()?;
        let scan = Self {
            header,
            components,
            ss,
            se,
            ah: approximation >> 4,
            al: approximation & 0xf,
        };
        debug!(?scan.components, ss, se, "decoded scan header");
        Ok(scan)
    }

    fn header(&self) -> &MarkerHeader {
        &self.header
    }
}
