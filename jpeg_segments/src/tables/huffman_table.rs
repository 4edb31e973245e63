// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::{TableSegment, read_table_id};
use crate::{
    bit_reader::BitReader,
    error::{Error, Result},
    huffman::{HUFFMAN_MAX_BITS, HuffmanTree},
    markers::MarkerCode,
};

#[repr(u8)]
#[derive(Debug, FromPrimitive, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum HuffmanClass {
    #[default]
    Dc = 0,
    Ac = 1,
}

impl TryFrom<u8> for HuffmanClass {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_u8(value).ok_or(Error::InvalidEnum(value as u32, "HuffmanClass".to_string()))
    }
}

/// One table of a DHT segment, as transmitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTableSpec {
    pub class: HuffmanClass,
    pub destination: u8,
    /// Number of codes of each length 1..=16.
    pub counts: [u8; HUFFMAN_MAX_BITS],
    /// Symbols in code order.
    pub values: Vec<u8>,
}

impl HuffmanTableSpec {
    pub fn build_tree(&self) -> Result<HuffmanTree> {
        HuffmanTree::build(&self.counts, &self.values)
    }
}

impl TableSegment for HuffmanTableSpec {
    const KIND: MarkerCode = MarkerCode::DHT;
    // DC and AC tables have separate destinations.
    type Key = (HuffmanClass, u8);

    fn read(br: &mut BitReader) -> Result<Self> {
        let (class, destination) = read_table_id(br)?;
        let class = HuffmanClass::try_from(class)?;
        let counts: [u8; HUFFMAN_MAX_BITS] = array_init::try_array_init(|_| br.read_u8())?;
        let num_values: usize = counts.iter().map(|&count| count as usize).sum();
        let values = br.read_slice(num_values)?.to_vec();
        Ok(Self {
            class,
            destination,
            counts,
            values,
        })
    }

    fn identifier(&self) -> u8 {
        self.class as u8
    }

    fn destination(&self) -> u8 {
        self.destination
    }

    fn key(&self) -> Self::Key {
        (self.class, self.destination)
    }

    fn encoded_len(&self) -> usize {
        1 + HUFFMAN_MAX_BITS + self.values.len()
    }

    fn render(&self) -> String {
        let class = match self.class {
            HuffmanClass::Dc => "DC",
            HuffmanClass::Ac => "AC",
        };
        format!(
            "DHT class={class} destination={} symbols={}",
            self.destination,
            self.values.len()
        )
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;
    use crate::markers::Segment;
    use crate::tables::{DefineHuffmanTables, HuffmanTables};

    fn table(id: u8, counts: &[u8], values: &[u8]) -> Vec<u8> {
        let mut bytes = vec![id];
        let mut padded = counts.to_vec();
        padded.resize(HUFFMAN_MAX_BITS, 0);
        bytes.extend(padded);
        bytes.extend_from_slice(values);
        bytes
    }

    fn dht(tables: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = tables.concat();
        let len = body.len() + 2;
        let mut bytes = vec![0xff, 0xc4, (len >> 8) as u8, len as u8];
        bytes.extend(body);
        bytes
    }

    #[test]
    fn reads_one_table() -> Result<()> {
        let bytes = table(0x11, &[0, 2, 1], &[0x01, 0x02, 0x11]);
        let mut br = BitReader::new(&bytes);
        let spec = HuffmanTableSpec::read(&mut br)?;
        assert!(br.is_empty());
        assert_eq!(spec.class, HuffmanClass::Ac);
        assert_eq!(spec.destination, 1);
        assert_eq!(spec.identifier(), 1);
        assert_eq!(spec.destination(), 1);
        assert_eq!(spec.key(), (HuffmanClass::Ac, 1));
        assert_eq!(spec.encoded_len(), bytes.len());
        assert_eq!(spec.render(), "DHT class=AC destination=1 symbols=3");
        let tree = spec.build_tree()?;
        assert_eq!(tree.decode(0b00, 2), Some(0x01));
        assert_eq!(tree.decode(0b01, 2), Some(0x02));
        assert_eq!(tree.decode(0b100, 3), Some(0x11));
        Ok(())
    }

    #[test]
    fn rejects_bad_ids() {
        let bytes = table(0x20, &[1], &[0]);
        assert_eq!(
            HuffmanTableSpec::read(&mut BitReader::new(&bytes)),
            Err(Error::InvalidEnum(2, "HuffmanClass".to_string()))
        );
        let bytes = table(0x04, &[1], &[0]);
        assert_eq!(
            HuffmanTableSpec::read(&mut BitReader::new(&bytes)),
            Err(Error::InvalidDestination(4))
        );
    }

    #[test]
    fn missing_symbols() {
        let mut bytes = table(0x00, &[0, 3], &[1, 2, 3]);
        bytes.pop();
        assert!(matches!(
            HuffmanTableSpec::read(&mut BitReader::new(&bytes)),
            Err(Error::BufferOverflow { .. })
        ));
    }

    #[test]
    fn dc_and_ac_share_destinations() -> Result<()> {
        let bytes = dht(&[
            table(0x00, &[0, 1], &[5]),
            table(0x10, &[0, 1], &[6]),
            table(0x01, &[1], &[7]),
        ]);
        let mut tables = HuffmanTables::new();
        assert_eq!(tables.add_segment(&bytes)?, bytes.len());
        assert_eq!(tables.len(), 3);
        assert_eq!(tables.get((HuffmanClass::Dc, 0))?.values, [5]);
        assert_eq!(tables.get((HuffmanClass::Ac, 0))?.values, [6]);
        assert_eq!(
            tables.get((HuffmanClass::Ac, 1)).unwrap_err(),
            Error::NoSuchKey("(Ac, 1)".to_string())
        );

        tables.add_segment(&dht(&[table(0x10, &[0, 0, 1], &[9])]))?;
        assert_eq!(tables.len(), 3);
        let tree = tables.get((HuffmanClass::Ac, 0))?.build_tree()?;
        assert_eq!(tree.decode(0, 3), Some(9));
        assert_eq!(
            tables.render(),
            "DHT class=DC destination=0 symbols=1\n\
             DHT class=DC destination=1 symbols=1\n\
             DHT class=AC destination=0 symbols=1"
        );
        Ok(())
    }

    #[test]
    fn segment_keeps_every_table() -> Result<()> {
        let bytes = dht(&[table(0x00, &[0, 1], &[5]), table(0x00, &[1], &[6])]);
        let segment = DefineHuffmanTables::decode(&bytes)?;
        assert_eq!(segment.length(), bytes.len());
        assert_eq!(segment.tables.len(), 2);
        assert_eq!(segment.tables[1].values, [6]);
        Ok(())
    }
}
