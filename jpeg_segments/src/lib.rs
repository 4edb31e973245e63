// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Structural decoding primitives for baseline and progressive JPEG streams:
//! a bit/byte cursor, zigzag reordering, typed marker segments, per-slot
//! table aggregation and canonical Huffman trees.
//!
//! Callers locate segment boundaries themselves and hand each segment, code
//! word included, to [`markers::Marker`] or to a [`tables::TableAggregator`].

#![deny(unsafe_code)]
pub mod bit_reader;
pub mod error;
pub mod huffman;
pub mod limits;
pub mod markers;
pub mod tables;
pub mod util;
pub mod zigzag;
