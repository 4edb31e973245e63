// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Configurable bounds applied while decoding marker segments.

use crate::error::{Error, Result};

/// Configurable limits for segment decoding.
///
/// JPEG segment lengths are 16-bit, so no single segment can exhaust memory;
/// these limits exist for callers that want to reject oversized metadata
/// early.
///
/// # Example
///
/// ```
/// use jpeg_segments::limits::SegmentLimits;
///
/// // Unlimited, for trusted content
/// let limits = SegmentLimits::default();
///
/// // Tighter bounds for untrusted content
/// let limits = SegmentLimits::restrictive();
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentLimits {
    /// Maximum number of JFIF thumbnail pixels decoded from an APP0 segment.
    /// Default: `None` (unlimited).
    pub max_thumbnail_pixels: Option<usize>,

    /// Maximum number of sub-tables in one DHT or DQT segment.
    /// Default: `None` (unlimited).
    pub max_tables_per_segment: Option<usize>,

    /// Maximum COM / APPn payload size in bytes.
    /// Default: `None` (unlimited).
    pub max_payload_len: Option<usize>,
}

impl Default for SegmentLimits {
    /// Returns limits with all values set to `None` (unlimited).
    fn default() -> Self {
        Self {
            max_thumbnail_pixels: None,
            max_tables_per_segment: None,
            max_payload_len: None,
        }
    }
}

impl SegmentLimits {
    /// Returns limits with recommended safe defaults.
    pub fn default_safe() -> Self {
        Self {
            max_thumbnail_pixels: Some(255 * 255),
            max_tables_per_segment: Some(8),
            max_payload_len: None,
        }
    }

    /// Returns restrictive limits suitable for untrusted content.
    pub fn restrictive() -> Self {
        Self {
            max_thumbnail_pixels: Some(0),
            // One DC and one AC table for each of the four destinations.
            max_tables_per_segment: Some(8),
            max_payload_len: Some(1 << 12),
        }
    }

    /// Returns limits with all restrictions disabled.
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub(crate) fn check(what: &'static str, actual: usize, limit: Option<usize>) -> Result<()> {
        match limit {
            Some(limit) if actual > limit => Err(Error::LimitExceeded {
                what,
                actual,
                limit,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unlimited_by_default() {
        assert_eq!(SegmentLimits::default(), SegmentLimits::unlimited());
        assert!(SegmentLimits::check("tables", usize::MAX, None).is_ok());
    }

    #[test]
    fn check_reports_the_bound() {
        let limits = SegmentLimits::restrictive();
        assert!(SegmentLimits::check("payload", 4096, limits.max_payload_len).is_ok());
        assert_eq!(
            SegmentLimits::check("payload", 4097, limits.max_payload_len),
            Err(Error::LimitExceeded {
                what: "payload",
                actual: 4097,
                limit: 4096
            })
        );
    }
}
