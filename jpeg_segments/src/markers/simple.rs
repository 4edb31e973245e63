// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::borrow::Cow;

use super::{MarkerCode, MarkerHeader, MarkerKind, Segment, read_segment};
use crate::{
    error::{Error, Result},
    limits::SegmentLimits,
};

/// SOI. Carries no payload; its length is always 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOfImage {
    header: MarkerHeader,
}

impl Segment for StartOfImage {
    fn decode_with_limits(bytes: &[u8], _: &SegmentLimits) -> Result<Self> {
        let (header, _) = read_segment(bytes, |k| k == MarkerKind::Soi, MarkerCode::SOI)?;
        Ok(Self { header })
    }

    fn header(&self) -> &MarkerHeader {
        &self.header
    }
}

/// EOI. Carries no payload; its length is always 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfImage {
    header: MarkerHeader,
}

impl Segment for EndOfImage {
    fn decode_with_limits(bytes: &[u8], _: &SegmentLimits) -> Result<Self> {
        let (header, _) = read_segment(bytes, |k| k == MarkerKind::Eoi, MarkerCode::EOI)?;
        Ok(Self { header })
    }

    fn header(&self) -> &MarkerHeader {
        &self.header
    }
}

/// DRI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartInterval {
    header: MarkerHeader,
    /// MCUs between restart markers, 0 if restarts are disabled.
    pub interval: u16,
}

impl Segment for RestartInterval {
    fn decode_with_limits(bytes: &[u8], _: &SegmentLimits) -> Result<Self> {
        let (header, mut body) = read_segment(bytes, |k| k == MarkerKind::Dri, MarkerCode::DRI)?;
        if header.body_len() != 2 {
            return Err(Error::InvalidSegmentLength(header.length - 2));
        }
        let interval = body.read_u16_be()?;
        Ok(Self { header, interval })
    }

    fn header(&self) -> &MarkerHeader {
        &self.header
    }
}

/// COM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    header: MarkerHeader,
    pub text: Vec<u8>,
}

impl Comment {
    /// The comment as text. JPEG does not specify an encoding.
    pub fn text_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.text)
    }
}

impl Segment for Comment {
    fn decode_with_limits(bytes: &[u8], limits: &SegmentLimits) -> Result<Self> {
        let (header, body) = read_segment(bytes, |k| k == MarkerKind::Com, MarkerCode::COM)?;
        SegmentLimits::check("comment length", header.body_len(), limits.max_payload_len)?;
        Ok(Self {
            header,
            text: body.data().to_vec(),
        })
    }

    fn header(&self) -> &MarkerHeader {
        &self.header
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    #[test]
    fn soi_eoi_ignore_trailing_bytes() -> Result<()> {
        let soi = StartOfImage::decode(&[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10])?;
        assert_eq!(soi.length(), 2);
        let eoi = EndOfImage::decode(&[0xff, 0xd9])?;
        assert_eq!(eoi.length(), 2);
        let eoi = EndOfImage::decode(&[0xff, 0xd9, 1, 2, 3, 4, 5, 6, 7, 8])?;
        assert_eq!(eoi.length(), 2);
        assert_eq!(eoi.render(), "EOI (0xFFD9) length=2");
        Ok(())
    }

    #[test]
    fn wrong_code() {
        assert_eq!(
            StartOfImage::decode(&[0xff, 0xd9]),
            Err(Error::UnexpectedMarker {
                expected: 0xffd8,
                found: 0xffd9
            })
        );
        assert!(EndOfImage::decode(&[0xff]).is_err());
    }

    #[test]
    fn restart_interval() -> Result<()> {
        let dri = RestartInterval::decode(&[0xff, 0xdd, 0x00, 0x04, 0x00, 0x20])?;
        assert_eq!(dri.interval, 32);
        assert_eq!(
            RestartInterval::decode(&[0xff, 0xdd, 0x00, 0x03, 0x00]),
            Err(Error::InvalidSegmentLength(3))
        );
        Ok(())
    }

    #[test]
    fn comment() -> Result<()> {
        let bytes = [0xff, 0xfe, 0x00, 0x07, b'h', b'e', b'l', b'l', b'o'];
        let com = Comment::decode(&bytes)?;
        assert_eq!(com.text_lossy(), "hello");
        assert_eq!(com.length(), 9);
        let limits = SegmentLimits {
            max_payload_len: Some(4),
            ..Default::default()
        };
        assert!(matches!(
            Comment::decode_with_limits(&bytes, &limits),
            Err(Error::LimitExceeded { actual: 5, .. })
        ));
        Ok(())
    }
}
