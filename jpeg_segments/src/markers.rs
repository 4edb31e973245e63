// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Typed JPEG marker segments.
//!
//! Every decoder in this module takes the bytes of exactly one segment,
//! starting at its `0xFFxx` code word. Locating segment boundaries inside a
//! file is left to the caller.

mod app;
mod frame;
mod scan;
mod simple;

use std::fmt;
use std::future::Future;

pub use app::*;
pub use frame::*;
pub use scan::*;
pub use simple::*;

use crate::{
    bit_reader::BitReader,
    error::{Error, Result},
    limits::SegmentLimits,
    tables::{DefineHuffmanTables, DefineQuantizationTables},
    util::tracing_wrappers::*,
};

// Entries 4, 8 and 12 are DHT, JPG and DAC, which are not frame markers.
const SOF_NAMES: [&str; 16] = [
    "SOF0", "SOF1", "SOF2", "SOF3", "DHT", "SOF5", "SOF6", "SOF7", "JPG", "SOF9", "SOF10", "SOF11",
    "DAC", "SOF13", "SOF14", "SOF15",
];

const APP_NAMES: [&str; 16] = [
    "APP0", "APP1", "APP2", "APP3", "APP4", "APP5", "APP6", "APP7", "APP8", "APP9", "APP10",
    "APP11", "APP12", "APP13", "APP14", "APP15",
];

/// Kind of a marker code, for matching. `Sof` and `App` carry the `n` of
/// SOFn and APPn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Sof(u8),
    Dht,
    Soi,
    Eoi,
    Sos,
    Dqt,
    Dri,
    App(u8),
    Com,
}

impl MarkerKind {
    pub fn is_sof(self) -> bool {
        matches!(self, MarkerKind::Sof(_))
    }

    pub fn is_app(self) -> bool {
        matches!(self, MarkerKind::App(_))
    }
}

/// A marker code word understood by this crate (ITU T.81 table B.1).
///
/// Values can only be obtained through [`TryFrom<u16>`], the associated
/// constants or [`MarkerCode::sof`] / [`MarkerCode::app`], so every
/// `MarkerCode` names a real marker.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerCode {
    value: u16,
    kind: MarkerKind,
}

impl MarkerCode {
    pub const SOF0: Self = Self {
        value: 0xffc0,
        kind: MarkerKind::Sof(0),
    };
    pub const DHT: Self = Self {
        value: 0xffc4,
        kind: MarkerKind::Dht,
    };
    pub const SOI: Self = Self {
        value: 0xffd8,
        kind: MarkerKind::Soi,
    };
    pub const EOI: Self = Self {
        value: 0xffd9,
        kind: MarkerKind::Eoi,
    };
    pub const SOS: Self = Self {
        value: 0xffda,
        kind: MarkerKind::Sos,
    };
    pub const DQT: Self = Self {
        value: 0xffdb,
        kind: MarkerKind::Dqt,
    };
    pub const DRI: Self = Self {
        value: 0xffdd,
        kind: MarkerKind::Dri,
    };
    pub const APP0: Self = Self {
        value: 0xffe0,
        kind: MarkerKind::App(0),
    };
    pub const COM: Self = Self {
        value: 0xfffe,
        kind: MarkerKind::Com,
    };

    /// SOFn. Fails unless `n` is in 0..=15 and not 4, 8 or 12.
    pub fn sof(n: u8) -> Result<Self> {
        Self::indexed(0xc0, n, MarkerKind::Sof(n), "SOF process")
    }

    /// APPn. Fails unless `n` is in 0..=15.
    pub fn app(n: u8) -> Result<Self> {
        Self::indexed(0xe0, n, MarkerKind::App(n), "APP index")
    }

    fn indexed(base: u8, n: u8, kind: MarkerKind, what: &str) -> Result<Self> {
        let value = base.checked_add(n).map(|code| 0xff00 | code as u16);
        match value.map(Self::try_from) {
            Some(Ok(code)) if code.kind == kind => Ok(code),
            _ => Err(Error::InvalidEnum(n as u32, what.to_string())),
        }
    }

    /// The 16-bit code word, including the `0xFF` prefix.
    pub fn value(self) -> u16 {
        self.value
    }

    pub fn kind(self) -> MarkerKind {
        self.kind
    }

    pub fn name(self) -> &'static str {
        match self.kind {
            MarkerKind::Sof(n) => SOF_NAMES[n as usize],
            MarkerKind::Dht => "DHT",
            MarkerKind::Soi => "SOI",
            MarkerKind::Eoi => "EOI",
            MarkerKind::Sos => "SOS",
            MarkerKind::Dqt => "DQT",
            MarkerKind::Dri => "DRI",
            MarkerKind::App(n) => APP_NAMES[n as usize],
            MarkerKind::Com => "COM",
        }
    }

    /// Whether a length field follows the code word.
    pub fn has_length(self) -> bool {
        !matches!(self.kind, MarkerKind::Soi | MarkerKind::Eoi)
    }
}

impl TryFrom<u16> for MarkerCode {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        let [prefix, code] = value.to_be_bytes();
        if prefix != 0xff {
            return Err(Error::UnknownMarker(value));
        }
        let kind = match code {
            0xc4 => MarkerKind::Dht,
            0xc8 | 0xcc => return Err(Error::UnknownMarker(value)),
            0xc0..=0xcf => MarkerKind::Sof(code - 0xc0),
            0xd8 => MarkerKind::Soi,
            0xd9 => MarkerKind::Eoi,
            0xda => MarkerKind::Sos,
            0xdb => MarkerKind::Dqt,
            0xdd => MarkerKind::Dri,
            0xe0..=0xef => MarkerKind::App(code - 0xe0),
            0xfe => MarkerKind::Com,
            _ => return Err(Error::UnknownMarker(value)),
        };
        Ok(Self { value, kind })
    }
}

impl fmt::Debug for MarkerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:04X})", self.name(), self.value)
    }
}

impl fmt::Display for MarkerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Code word and total length of one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerHeader {
    pub code: MarkerCode,
    /// Segment length including the code word: the declared length plus 2,
    /// or 2 for markers without a length field.
    pub length: usize,
}

impl MarkerHeader {
    /// Size of the code word plus the length field.
    pub const SIZE: usize = 4;

    /// Reads the code word and, if present, the length field at the cursor.
    /// The declared length is checked against the bytes the reader holds.
    pub fn read(br: &mut BitReader) -> Result<MarkerHeader> {
        let code = MarkerCode::try_from(br.read_u16_be()?)?;
        if !code.has_length() {
            return Ok(MarkerHeader { code, length: 2 });
        }
        let declared = br.read_u16_be()? as usize;
        if declared < 2 || declared - 2 > br.bytes_remaining() {
            return Err(Error::InvalidSegmentLength(declared));
        }
        let length = declared + 2;
        trace!(%code, length, "read marker header");
        Ok(MarkerHeader { code, length })
    }

    /// Fails unless this header carries `code`.
    pub fn expect(&self, code: MarkerCode) -> Result<()> {
        if self.code != code {
            return Err(Error::UnexpectedMarker {
                expected: code.value(),
                found: self.code.value(),
            });
        }
        Ok(())
    }

    pub fn name(&self) -> &'static str {
        self.code.name()
    }

    /// Number of payload bytes after the length field.
    pub fn body_len(&self) -> usize {
        self.length.saturating_sub(Self::SIZE)
    }

    pub fn render(&self) -> String {
        format!(
            "{} (0x{:04X}) length={}",
            self.name(),
            self.code.value(),
            self.length
        )
    }
}

/// Reads the header of the segment in `bytes`, checks its code and returns a
/// reader bounded to the segment body.
pub(crate) fn read_segment(
    bytes: &[u8],
    accept: impl Fn(MarkerKind) -> bool,
    expected: MarkerCode,
) -> Result<(MarkerHeader, BitReader<'_>)> {
    let mut br = BitReader::new(bytes);
    let header = MarkerHeader::read(&mut br)?;
    if !accept(header.code.kind()) {
        header.expect(expected)?;
    }
    let body = br.split_at(header.body_len())?;
    Ok((header, body))
}

/// Capability shared by every decodable segment.
pub trait Segment: Sized {
    /// Decodes one segment, applying `limits`.
    fn decode_with_limits(bytes: &[u8], limits: &SegmentLimits) -> Result<Self>;

    fn header(&self) -> &MarkerHeader;

    /// Decodes one segment without limits.
    fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_with_limits(bytes, &SegmentLimits::default())
    }

    /// Asynchronous entry point. Segments are small and fully materialized,
    /// so only the synchronous path is implemented; this always resolves to
    /// [`Error::AsyncUnsupported`].
    fn decode_async(_bytes: &[u8]) -> impl Future<Output = Result<Self>> {
        std::future::ready(Err(Error::AsyncUnsupported))
    }

    fn length(&self) -> usize {
        self.header().length
    }

    fn render(&self) -> String {
        self.header().render()
    }
}

/// Any segment this crate decodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    Soi(StartOfImage),
    Eoi(EndOfImage),
    App0(Jfif),
    App(AppSegment),
    Dqt(DefineQuantizationTables),
    Dht(DefineHuffmanTables),
    Sof(FrameHeader),
    Sos(ScanHeader),
    Dri(RestartInterval),
    Com(Comment),
}

impl Marker {
    pub fn code(&self) -> MarkerCode {
        self.header().code
    }
}

impl Segment for Marker {
    /// Decodes the segment selected by the code word at the start of `bytes`.
    fn decode_with_limits(bytes: &[u8], limits: &SegmentLimits) -> Result<Self> {
        let code = MarkerCode::try_from(BitReader::new(bytes).peek_u16_be()?)?;
        debug!(%code, "decoding segment");
        Ok(match code.kind() {
            MarkerKind::Soi => Marker::Soi(StartOfImage::decode_with_limits(bytes, limits)?),
            MarkerKind::Eoi => Marker::Eoi(EndOfImage::decode_with_limits(bytes, limits)?),
            MarkerKind::App(0) if app::has_jfif_identifier(bytes) => {
                Marker::App0(Jfif::decode_with_limits(bytes, limits)?)
            }
            MarkerKind::App(_) => Marker::App(AppSegment::decode_with_limits(bytes, limits)?),
            MarkerKind::Dqt => {
                Marker::Dqt(DefineQuantizationTables::decode_with_limits(bytes, limits)?)
            }
            MarkerKind::Dht => Marker::Dht(DefineHuffmanTables::decode_with_limits(bytes, limits)?),
            MarkerKind::Sof(_) => Marker::Sof(FrameHeader::decode_with_limits(bytes, limits)?),
            MarkerKind::Sos => Marker::Sos(ScanHeader::decode_with_limits(bytes, limits)?),
            MarkerKind::Dri => Marker::Dri(RestartInterval::decode_with_limits(bytes, limits)?),
            MarkerKind::Com => Marker::Com(Comment::decode_with_limits(bytes, limits)?),
        })
    }

    fn header(&self) -> &MarkerHeader {
        match self {
            Marker::Soi(m) => m.header(),
            Marker::Eoi(m) => m.header(),
            Marker::App0(m) => m.header(),
            Marker::App(m) => m.header(),
            Marker::Dqt(m) => m.header(),
            Marker::Dht(m) => m.header(),
            Marker::Sof(m) => m.header(),
            Marker::Sos(m) => m.header(),
            Marker::Dri(m) => m.header(),
            Marker::Com(m) => m.header(),
        }
    }

    fn render(&self) -> String {
        match self {
            Marker::Dqt(m) => m.render(),
            Marker::Dht(m) => m.render(),
            _ => self.header().render(),
        }
    }
}

#[cfg(test)]
mod test {
    use std::pin::pin;
    use std::task::{Context, Poll, Waker};

    use test_log::test;

    use super::*;

    #[test]
    fn code_round_trip() -> Result<()> {
        for value in 0xffc0..=0xffffu16 {
            if let Ok(code) = MarkerCode::try_from(value) {
                assert_eq!(code.value(), value);
            }
        }
        assert_eq!(MarkerCode::try_from(0xffe1)?, MarkerCode::app(1)?);
        assert_eq!(MarkerCode::try_from(0xffc2)?.name(), "SOF2");
        for value in [0xffc8, 0xffd0, 0x00d8] {
            let err = Error::UnknownMarker(value);
            assert_eq!(MarkerCode::try_from(value), Err(err));
        }
        Ok(())
    }

    #[test]
    fn indexed_codes_are_validated() -> Result<()> {
        assert_eq!(MarkerCode::sof(0)?, MarkerCode::SOF0);
        assert_eq!(MarkerCode::sof(2)?.value(), 0xffc2);
        assert_eq!(MarkerCode::app(15)?.name(), "APP15");
        assert_eq!(MarkerCode::app(15)?.kind(), MarkerKind::App(15));
        // 4, 8 and 12 would alias DHT, JPG and DAC; 0x18 would alias SOI.
        for n in [4, 8, 12, 16, 0x18, 0xff] {
            let err = Error::InvalidEnum(n as u32, "SOF process".to_string());
            assert_eq!(MarkerCode::sof(n), Err(err));
        }
        for n in [16, 40, 0xff] {
            let err = Error::InvalidEnum(n as u32, "APP index".to_string());
            assert_eq!(MarkerCode::app(n), Err(err));
        }
        assert!(MarkerCode::sof(10)?.kind().is_sof());
        assert!(!MarkerCode::DHT.kind().is_sof());
        assert!(MarkerCode::APP0.kind().is_app());
        assert_eq!(format!("{:?}", MarkerCode::DHT), "DHT(0xFFC4)");
        Ok(())
    }

    #[test]
    fn header_lengths() -> Result<()> {
        let mut br = BitReader::new(&[0xff, 0xdd, 0x00, 0x04, 0x00, 0x10]);
        let header = MarkerHeader::read(&mut br)?;
        assert_eq!(header.code, MarkerCode::DRI);
        assert_eq!(header.length, 6);
        assert_eq!(header.body_len(), 2);
        assert_eq!(header.render(), "DRI (0xFFDD) length=6");

        let mut br = BitReader::new(&[0xff, 0xdd, 0x00, 0x05, 0x00, 0x10]);
        assert_eq!(
            MarkerHeader::read(&mut br),
            Err(Error::InvalidSegmentLength(5))
        );
        let mut br = BitReader::new(&[0xff, 0xfe, 0x00, 0x01]);
        assert_eq!(
            MarkerHeader::read(&mut br),
            Err(Error::InvalidSegmentLength(1))
        );
        Ok(())
    }

    #[test]
    fn dispatch_on_code() -> Result<()> {
        let bytes = [0xff, 0xdd, 0x00, 0x04, 0x01, 0x00];
        let marker = Marker::decode(&bytes)?;
        assert_eq!(marker.code(), MarkerCode::DRI);
        assert_eq!(marker, Marker::Dri(RestartInterval::decode(&bytes)?));
        assert_eq!(marker.length(), 6);

        let marker = Marker::decode(&[0xff, 0xd9])?;
        assert!(matches!(marker, Marker::Eoi(_)));
        assert_eq!(marker.render(), "EOI (0xFFD9) length=2");

        assert_eq!(
            Marker::decode(&[0xff]),
            Err(Error::BufferOverflow {
                offset: 0,
                len: 2,
                available: 1
            })
        );
        assert_eq!(
            Marker::decode(&[0xff, 0x01]),
            Err(Error::UnknownMarker(0xff01))
        );
        Ok(())
    }

    #[test]
    fn app0_without_jfif_header() -> Result<()> {
        let jfxx = [
            0xff, 0xe0, 0x00, 0x09, b'J', b'F', b'X', b'X', 0x00, 0x10, 0xaa,
        ];
        let Marker::App(app) = Marker::decode(&jfxx)? else {
            panic!("JFXX should decode as a raw APP0 segment");
        };
        assert_eq!(app.index(), 0);
        assert_eq!(app.kind(), AppMarkerType::Jfxx);
        assert_eq!(app.payload, b"JFXX\0\x10\xaa");
        assert_eq!(
            Jfif::decode(&jfxx),
            Err(Error::UnsupportedApp0Identifier("JFXX".to_string()))
        );

        let mut avi1 = vec![0xff, 0xe0, 0x00, 0x10, b'A', b'V', b'I', b'1'];
        avi1.extend([0; 10]);
        let marker = Marker::decode(&avi1)?;
        assert_eq!(marker.code(), MarkerCode::APP0);
        assert_eq!(marker.length(), avi1.len());
        let Marker::App(app) = marker else {
            panic!("AVI1 should decode as a raw APP0 segment");
        };
        assert_eq!(app.identifier(), Some(&b"AVI1"[..]));
        assert_eq!(app.kind(), AppMarkerType::Unknown);
        Ok(())
    }

    #[test]
    fn async_decoding_is_unsupported() {
        let mut future = pin!(Marker::decode_async(&[0xff, 0xd8]));
        let mut cx = Context::from_waker(Waker::noop());
        assert_eq!(
            future.as_mut().poll(&mut cx),
            Poll::Ready(Err(Error::AsyncUnsupported))
        );
    }
}
