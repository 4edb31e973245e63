// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.
#![no_main]

use jpeg_segments::limits::SegmentLimits;
use jpeg_segments::markers::{Marker, Segment};
use jpeg_segments::tables::{HuffmanTables, QuantizationTables};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let limits = SegmentLimits::default_safe();
    if let Ok(marker) = Marker::decode_with_limits(data, &limits) {
        assert!(marker.length() <= data.len());
        let _ = marker.render();
    }
    let mut huffman = HuffmanTables::with_limits(limits.clone());
    if let Ok(consumed) = huffman.add_segment(data) {
        assert!(consumed <= data.len());
    }
    let mut quantization = QuantizationTables::with_limits(limits);
    if let Ok(consumed) = quantization.add_segment(data) {
        assert!(consumed <= data.len());
    }
});
