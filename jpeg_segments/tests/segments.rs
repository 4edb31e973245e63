// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use jpeg_segments::bit_reader::BitReader;
use jpeg_segments::error::Result;
use jpeg_segments::markers::{DensityUnits, Marker, MarkerCode, Segment};
use jpeg_segments::tables::{HuffmanClass, HuffmanTables, QuantizationTables};
use test_log::test;

const DC_LUMA_COUNTS: [u8; 16] = [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];

/// Entropy-coded DC symbols 0, 3 and 6 (`00 100 1110`), padded with ones.
const SCAN_DATA: [u8; 2] = [0x27, 0x7f];

fn baseline_stream() -> Vec<u8> {
    let mut bytes = vec![0xff, 0xd8];
    bytes.extend([
        0xff, 0xe0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00, 0x01, 0x00,
        0x01, 0x00, 0x00,
    ]);
    bytes.extend([0xff, 0xdb, 0x00, 0x43, 0x00]);
    bytes.extend(1..=64u8);
    bytes.extend([0xff, 0xc4, 0x00, 0x1f, 0x00]);
    bytes.extend(DC_LUMA_COUNTS);
    bytes.extend(0..12u8);
    bytes.extend([
        0xff, 0xc0, 0x00, 0x0b, 0x08, 0x00, 0x08, 0x00, 0x08, 0x01, 0x01, 0x11, 0x00,
    ]);
    bytes.extend([0xff, 0xda, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3f, 0x00]);
    bytes.extend(SCAN_DATA);
    bytes.extend([0xff, 0xd9]);
    bytes
}

#[test]
fn walk_baseline_stream() -> Result<()> {
    let stream = baseline_stream();
    let mut huffman = HuffmanTables::new();
    let mut quantization = QuantizationTables::new();
    let mut codes = vec![];
    let mut symbols = vec![];
    let mut pos = 0;
    while pos < stream.len() {
        let marker = Marker::decode(&stream[pos..])?;
        codes.push(marker.code());
        match &marker {
            Marker::App0(jfif) => {
                assert_eq!((jfif.major_version(), jfif.minor_version()), (1, 1));
                assert_eq!(jfif.units, DensityUnits::AspectRatio);
                assert_eq!((jfif.x_density, jfif.y_density), (1, 1));
                assert!(jfif.thumbnail.is_empty());
            }
            Marker::Dqt(_) => {
                assert_eq!(quantization.add_segment(&stream[pos..])?, marker.length());
            }
            Marker::Dht(_) => {
                assert_eq!(huffman.add_segment(&stream[pos..])?, marker.length());
                assert_eq!(
                    marker.render(),
                    "DHT (0xFFC4) length=33\n  DHT class=DC destination=0 symbols=12"
                );
            }
            Marker::Sof(frame) => {
                assert!(frame.is_baseline());
                assert_eq!((frame.width, frame.height), (8, 8));
            }
            Marker::Sos(scan) => {
                let component = scan.components[0];
                let tree = huffman
                    .get((HuffmanClass::Dc, component.dc_tbl_idx))?
                    .build_tree()?;
                let start = pos + marker.length();
                let mut br = BitReader::new(&stream[start..start + SCAN_DATA.len()]);
                for _ in 0..3 {
                    symbols.extend(tree.read_symbol(&mut br)?);
                }
                pos += SCAN_DATA.len();
            }
            _ => {}
        }
        pos += marker.length();
    }
    assert_eq!(pos, stream.len());
    assert_eq!(
        codes,
        [
            MarkerCode::SOI,
            MarkerCode::APP0,
            MarkerCode::DQT,
            MarkerCode::DHT,
            MarkerCode::SOF0,
            MarkerCode::SOS,
            MarkerCode::EOI
        ]
    );
    assert_eq!(symbols, [0, 3, 6]);

    let table = quantization.get(0)?;
    assert_eq!(table.to_matrix()?[0], [1, 2, 6, 7, 15, 16, 28, 29]);
    assert_eq!(table.natural_order()[8], 3);
    assert_eq!(quantization.render(), "DQT precision=8-bit destination=0");
    Ok(())
}

#[test]
fn truncated_stream_fails_at_the_cut_segment() {
    let stream = baseline_stream();
    // Cut inside the DQT segment.
    let cut = &stream[20..60];
    assert!(Marker::decode(cut).is_err());
    assert!(QuantizationTables::new().add_segment(cut).is_err());
}
