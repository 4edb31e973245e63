// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! DHT and DQT segments, which pack several self-delimiting sub-tables back
//! to back, and the aggregator that keeps the latest table per slot.

mod huffman_table;
mod quantization;

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

pub use huffman_table::*;
pub use quantization::*;

use crate::{
    bit_reader::BitReader,
    error::{Error, Result},
    limits::SegmentLimits,
    markers::{MarkerCode, MarkerHeader, Segment},
    util::tracing_wrappers::*,
};

/// Highest table destination a JPEG stream may address.
pub const MAX_DESTINATION: u8 = 3;

/// One sub-table of a DHT or DQT segment.
pub trait TableSegment: Sized + Debug {
    /// Code of the segments this table kind lives in.
    const KIND: MarkerCode;

    /// Slot a table occupies; a later table with the same key replaces it.
    type Key: Copy + Eq + Hash + Ord + Debug;

    /// Decodes one sub-table at the cursor and advances past it.
    fn read(br: &mut BitReader) -> Result<Self>;

    /// High nibble of the first byte: table class or precision.
    fn identifier(&self) -> u8;

    /// Low nibble of the first byte.
    fn destination(&self) -> u8;

    fn key(&self) -> Self::Key;

    /// Bytes this table occupies on the wire.
    fn encoded_len(&self) -> usize;

    fn render(&self) -> String;
}

/// Splits the first nibble-packed byte of a sub-table.
pub(crate) fn read_table_id(br: &mut BitReader) -> Result<(u8, u8)> {
    let byte = br.read_u8()?;
    let destination = byte & 0xf;
    if destination > MAX_DESTINATION {
        return Err(Error::InvalidDestination(destination));
    }
    Ok((byte >> 4, destination))
}

/// Decodes the sub-tables of the segment in `bytes` in order, handing each
/// to `f` as soon as it is read. Returns the segment header; its `length` is
/// the number of bytes consumed.
pub fn read_tables<T: TableSegment>(
    bytes: &[u8],
    limits: &SegmentLimits,
    mut f: impl FnMut(T),
) -> Result<MarkerHeader> {
    let mut br = BitReader::new(bytes);
    let header = MarkerHeader::read(&mut br)?;
    header.expect(T::KIND)?;
    let mut body = br.split_at(header.body_len())?;
    let mut num_tables = 0;
    while !body.is_empty() {
        num_tables += 1;
        SegmentLimits::check(
            "tables per segment",
            num_tables,
            limits.max_tables_per_segment,
        )?;
        let start = body.position();
        let table = T::read(&mut body)?;
        debug_assert_eq!(body.position() - start, table.encoded_len());
        trace!(?table, "read sub-table");
        f(table);
    }
    Ok(header)
}

/// A whole DHT or DQT segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineTables<T: TableSegment> {
    header: MarkerHeader,
    pub tables: Vec<T>,
}

pub type DefineHuffmanTables = DefineTables<HuffmanTableSpec>;
pub type DefineQuantizationTables = DefineTables<QuantizationTable>;

impl<T: TableSegment> Segment for DefineTables<T> {
    fn decode_with_limits(bytes: &[u8], limits: &SegmentLimits) -> Result<Self> {
        let mut tables = vec![];
        let header = read_tables(bytes, limits, |table| tables.push(table))?;
        Ok(Self { header, tables })
    }

    fn header(&self) -> &MarkerHeader {
        &self.header
    }

    fn render(&self) -> String {
        let mut out = self.header.render();
        for table in &self.tables {
            out.push_str("\n  ");
            out.push_str(&table.render());
        }
        out
    }
}

/// Latest table of kind `T` per slot, across any number of segments.
#[derive(Debug, Clone)]
pub struct TableAggregator<T: TableSegment> {
    tables: HashMap<T::Key, T>,
    limits: SegmentLimits,
}

impl<T: TableSegment> Default for TableAggregator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TableSegment> TableAggregator<T> {
    pub fn new() -> Self {
        Self::with_limits(SegmentLimits::default())
    }

    pub fn with_limits(limits: SegmentLimits) -> Self {
        Self {
            tables: HashMap::new(),
            limits,
        }
    }

    /// Registers every sub-table of the segment in `bytes`, replacing tables
    /// already held for the same slot. Returns the number of bytes consumed.
    ///
    /// On error, tables read before the failing one stay registered.
    pub fn add_segment(&mut self, bytes: &[u8]) -> Result<usize> {
        let tables = &mut self.tables;
        let header = read_tables(bytes, &self.limits, |table: T| {
            let key = table.key();
            if tables.insert(key, table).is_some() {
                debug!(?key, "table redefined");
            }
        })?;
        Ok(header.length)
    }

    /// Inserts a single table, returning the one it replaces.
    pub fn insert(&mut self, table: T) -> Option<T> {
        self.tables.insert(table.key(), table)
    }

    pub fn get(&self, key: T::Key) -> Result<&T> {
        self.tables
            .get(&key)
            .ok_or_else(|| Error::NoSuchKey(format!("{key:?}")))
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Tables sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let mut tables: Vec<_> = self.tables.iter().collect();
        tables.sort_by_key(|(key, _)| **key);
        tables.into_iter().map(|(_, table)| table)
    }

    /// One summary line per table, sorted by key.
    pub fn render(&self) -> String {
        self.iter().map(T::render).collect::<Vec<_>>().join("\n")
    }
}

pub type HuffmanTables = TableAggregator<HuffmanTableSpec>;
pub type QuantizationTables = TableAggregator<QuantizationTable>;
