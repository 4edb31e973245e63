// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use byteorder::BigEndian;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::{MarkerCode, MarkerHeader, MarkerKind, Segment, read_segment};
use crate::{
    bit_reader::BitReader,
    error::{Error, Result},
    limits::SegmentLimits,
    util::tracing_wrappers::*,
};

// Field offsets inside an APP0 segment, counted from the code word.
const IDENTIFIER_OFFSET: usize = 4;
const IDENTIFIER_LEN: usize = 5;
const VERSION_OFFSET: usize = 9;
const UNITS_OFFSET: usize = 11;
const X_DENSITY_OFFSET: usize = 12;
const Y_DENSITY_OFFSET: usize = 14;
const THUMBNAIL_WIDTH_OFFSET: usize = 16;
const THUMBNAIL_HEIGHT_OFFSET: usize = 17;
const THUMBNAIL_OFFSET: usize = 18;

const JFIF_IDENTIFIER: &str = "JFIF";

#[repr(u8)]
#[derive(Debug, FromPrimitive, Clone, Copy, PartialEq, Eq, Default)]
pub enum DensityUnits {
    /// Densities only give the pixel aspect ratio.
    #[default]
    AspectRatio = 0,
    DotsPerInch = 1,
    DotsPerCm = 2,
}

impl TryFrom<u8> for DensityUnits {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_u8(value).ok_or(Error::InvalidEnum(value as u32, "DensityUnits".to_string()))
    }
}

/// One thumbnail pixel, stored on the wire as a packed 24-bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn from_packed(packed: u32) -> Self {
        Self {
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        }
    }

    pub fn packed(&self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }
}

/// Identifier of an APP0 segment, without trailing NULs.
fn read_identifier(br: &BitReader) -> Result<String> {
    let raw = br.bytes_at(IDENTIFIER_OFFSET, IDENTIFIER_LEN)?;
    let identifier = String::from_utf8_lossy(raw)
        .trim_end_matches('\0')
        .to_string();
    Ok(identifier)
}

/// Whether the APP0 segment in `bytes` announces a JFIF header.
pub(crate) fn has_jfif_identifier(bytes: &[u8]) -> bool {
    let br = BitReader::new(bytes);
    matches!(read_identifier(&br), Ok(id) if id == JFIF_IDENTIFIER)
}

/// APP0 segment carrying a JFIF header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jfif {
    header: MarkerHeader,
    pub identifier: String,
    /// Major version in the high byte, minor version in the low byte.
    pub version: u16,
    pub units: DensityUnits,
    pub x_density: u16,
    pub y_density: u16,
    pub thumbnail_width: u8,
    pub thumbnail_height: u8,
    pub thumbnail: Vec<Rgb>,
}

impl Jfif {
    pub fn major_version(&self) -> u8 {
        (self.version >> 8) as u8
    }

    pub fn minor_version(&self) -> u8 {
        self.version as u8
    }
}

impl Segment for Jfif {
    fn decode_with_limits(bytes: &[u8], limits: &SegmentLimits) -> Result<Self> {
        let (header, _) = read_segment(bytes, |k| k == MarkerKind::App(0), MarkerCode::APP0)?;
        // All fields sit at fixed offsets, so read them without a cursor.
        let br = BitReader::new(&bytes[..header.length]);

        let identifier = read_identifier(&br)?;
        if identifier != JFIF_IDENTIFIER {
            return Err(Error::UnsupportedApp0Identifier(identifier));
        }
        if header.length < THUMBNAIL_OFFSET {
            return Err(Error::InvalidSegmentLength(header.length - 2));
        }

        let thumbnail_width = br.read_u8_at(THUMBNAIL_WIDTH_OFFSET)?;
        let thumbnail_height = br.read_u8_at(THUMBNAIL_HEIGHT_OFFSET)?;
        let num_pixels = (header.length - THUMBNAIL_OFFSET) / 3;
        SegmentLimits::check("thumbnail pixels", num_pixels, limits.max_thumbnail_pixels)?;
        if num_pixels != thumbnail_width as usize * thumbnail_height as usize {
            warn!(
                num_pixels,
                thumbnail_width, thumbnail_height, "thumbnail size does not match segment length"
            );
        }
        let thumbnail = (0..num_pixels)
            .map(|i| {
                let packed = br.read_bytes_at::<BigEndian>(THUMBNAIL_OFFSET + 3 * i, 3)?;
                Ok(Rgb::from_packed(packed as u32))
            })
            .collect::<Result<Vec<_>>>()?;

        let jfif = Self {
            header,
            identifier,
            version: br.read_u16_be_at(VERSION_OFFSET)?,
            units: DensityUnits::try_from(br.read_u8_at(UNITS_OFFSET)?)?,
            x_density: br.read_u16_be_at(X_DENSITY_OFFSET)?,
            y_density: br.read_u16_be_at(Y_DENSITY_OFFSET)?,
            thumbnail_width,
            thumbnail_height,
            thumbnail,
        };
        debug!(?jfif.version, ?jfif.units, "decoded JFIF header");
        Ok(jfif)
    }

    fn header(&self) -> &MarkerHeader {
        &self.header
    }
}

/// Well-known payloads of raw APPn segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMarkerType {
    #[default]
    Unknown,
    /// JFIF extension, usually a thumbnail (APP0)
    Jfxx,
    /// ICC color profile (APP2)
    Icc,
    /// EXIF metadata (APP1)
    Exif,
    /// XMP metadata (APP1)
    Xmp,
    /// Adobe color transform (APP14)
    Adobe,
}

/// APPn segment kept as raw payload. APP0 segments that do not carry a JFIF
/// header, such as JFXX extensions, are decoded as this too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSegment {
    header: MarkerHeader,
    pub payload: Vec<u8>,
}

impl AppSegment {
    /// The `n` of APPn.
    pub fn index(&self) -> u8 {
        match self.header.code.kind() {
            MarkerKind::App(n) => n,
            _ => unreachable!("AppSegment always holds an APPn header"),
        }
    }

    /// Leading NUL-terminated identifier of the payload, if any.
    pub fn identifier(&self) -> Option<&[u8]> {
        let end = self.payload.iter().position(|&b| b == 0)?;
        Some(&self.payload[..end])
    }

    pub fn kind(&self) -> AppMarkerType {
        match (self.index(), self.identifier()) {
            (0, Some(b"JFXX")) => AppMarkerType::Jfxx,
            (1, Some(b"Exif")) => AppMarkerType::Exif,
            (1, Some(b"http://ns.adobe.com/xap/1.0/")) => AppMarkerType::Xmp,
            (2, Some(b"ICC_PROFILE")) => AppMarkerType::Icc,
            (14, _) if self.payload.starts_with(b"Adobe") => AppMarkerType::Adobe,
            _ => AppMarkerType::Unknown,
        }
    }
}

impl Segment for AppSegment {
    fn decode_with_limits(bytes: &[u8], limits: &SegmentLimits) -> Result<Self> {
        let (header, body) = read_segment(bytes, MarkerKind::is_app, MarkerCode::APP0)?;
        SegmentLimits::check("APPn payload", header.body_len(), limits.max_payload_len)?;
        Ok(Self {
            header,
            payload: body.data().to_vec(),
        })
    }

    fn header(&self) -> &MarkerHeader {
        &self.header
    }
}
