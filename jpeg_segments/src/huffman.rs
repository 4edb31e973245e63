// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Canonical Huffman codes as transmitted in DHT segments.
//!
//! The wire format carries only the number of codes of each length and the
//! symbols sorted by code; the code values themselves follow from position.

use std::fmt::Debug;

use crate::{
    bit_reader::BitReader,
    error::{Error, Result},
    util::tracing_wrappers::*,
};

pub const HUFFMAN_MAX_BITS: usize = 16;

/// Index of a node inside the arena of one [`HuffmanTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

fn check_bit(bit: u8) -> Result<usize> {
    match bit {
        0 | 1 => Ok(bit as usize),
        _ => Err(Error::InvalidBit(bit)),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HuffmanNode {
    children: [Option<NodeId>; 2],
    symbol: Option<u8>,
}

impl HuffmanNode {
    /// Returns the 0- or 1-child, if present.
    pub fn child(&self, bit: u8) -> Result<Option<NodeId>> {
        Ok(self.children[check_bit(bit)?])
    }

    pub fn symbol(&self) -> Option<u8> {
        self.symbol
    }

    pub fn is_leaf(&self) -> bool {
        self.symbol.is_some()
    }

    /// Assigns the symbol of this node. A symbol can be set only once.
    pub fn set_symbol(&mut self, symbol: u8) -> Result<()> {
        if let Some(existing) = self.symbol {
            return Err(Error::SymbolAlreadySet(existing));
        }
        self.symbol = Some(symbol);
        Ok(())
    }
}

/// Decoding tree for one canonical Huffman code. Nodes live in a flat arena;
/// the root is always the first entry.
#[derive(Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    bits: [u8; HUFFMAN_MAX_BITS],
    symbols: Vec<u8>,
    // First code of each length, None if the length has no codes.
    first_codes: [Option<u16>; HUFFMAN_MAX_BITS],
    nodes: Vec<HuffmanNode>,
}

impl Debug for HuffmanTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "HuffmanTree{{ bits: {:?}, symbols: [{} symbols], nodes: {} }}",
            self.bits,
            self.symbols.len(),
            self.nodes.len()
        )
    }
}

impl Default for HuffmanTree {
    fn default() -> Self {
        Self::new()
    }
}

impl HuffmanTree {
    /// Creates a tree with a lone root and no codes.
    pub fn new() -> Self {
        Self {
            bits: [0; HUFFMAN_MAX_BITS],
            symbols: Vec::new(),
            first_codes: [None; HUFFMAN_MAX_BITS],
            nodes: vec![HuffmanNode::default()],
        }
    }

    /// Builds the tree for the histogram `bits` (`bits[i]` codes of length
    /// `i + 1`) and `symbols` in code order.
    /// ```
    /// # use jpeg_segments::huffman::HuffmanTree;
    /// let tree = HuffmanTree::build(&[0, 1], &[5])?;
    /// assert_eq!(tree.decode(0b00, 2), Some(5));
    /// assert_eq!(tree.decode(0b01, 2), None);
    /// # Ok::<(), jpeg_segments::error::Error>(())
    /// ```
    pub fn build(bits: &[u8], symbols: &[u8]) -> Result<Self> {
        if bits.len() > HUFFMAN_MAX_BITS {
            return Err(Error::TooManyCodeLengths(bits.len()));
        }
        let bits: [u8; HUFFMAN_MAX_BITS] =
            array_init::array_init(|i| bits.get(i).copied().unwrap_or(0));
        let expected: usize = bits.iter().map(|&count| count as usize).sum();
        if expected != symbols.len() {
            return Err(Error::HuffmanCountMismatch {
                expected,
                found: symbols.len(),
            });
        }

        let mut first_codes = [None; HUFFMAN_MAX_BITS];
        let mut code = 0u32;
        for (i, &count) in bits.iter().enumerate() {
            if count > 0 {
                first_codes[i] = Some(code as u16);
                code += count as u32;
                if code > 1 << (i + 1) {
                    return Err(Error::InvalidHuffman);
                }
            }
            code <<= 1;
        }

        let mut tree = Self {
            bits,
            symbols: symbols.to_vec(),
            first_codes,
            nodes: vec![HuffmanNode::default()],
        };
        let codes: Vec<_> = tree.codes().collect();
        for (length, code, symbol) in codes {
            tree.insert(code, length, symbol)?;
        }
        debug!(?tree, "built Huffman tree");
        Ok(tree)
    }

    fn insert(&mut self, code: u16, length: u8, symbol: u8) -> Result<()> {
        let mut node = self.root();
        for shift in (0..length).rev() {
            node = self.set_child(node, ((code >> shift) & 1) as u8)?;
        }
        trace!(code, length, symbol, "inserted code");
        self.nodes[node.index()].set_symbol(symbol)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> Option<&HuffmanNode> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut HuffmanNode> {
        self.nodes.get_mut(id.index())
    }

    /// Returns the `bit` child of `parent`, creating it if absent.
    pub fn set_child(&mut self, parent: NodeId, bit: u8) -> Result<NodeId> {
        let slot = check_bit(bit)?;
        let next = u32::try_from(self.nodes.len())
            .map(NodeId)
            .map_err(|_| Error::ArithmeticOverflow)?;
        let node = self
            .nodes
            .get_mut(parent.index())
            .ok_or(Error::InvalidHuffman)?;
        if node.is_leaf() {
            // A code passing through a leaf makes the code not prefix-free.
            return Err(Error::InvalidHuffman);
        }
        if let Some(child) = node.children[slot] {
            return Ok(child);
        }
        node.children[slot] = Some(next);
        self.nodes.push(HuffmanNode::default());
        Ok(next)
    }

    /// Returns the `bit` child of `parent` without creating it.
    pub fn child(&self, parent: NodeId, bit: u8) -> Result<Option<NodeId>> {
        match self.node(parent) {
            Some(node) => node.child(bit),
            None => Ok(None),
        }
    }

    /// Number of codes of each length, starting from length 1.
    pub fn bits(&self) -> &[u8; HUFFMAN_MAX_BITS] {
        &self.bits
    }

    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Canonical code of the `index`-th code of the given bit `length`.
    pub fn code(&self, length: usize, index: usize) -> Option<u16> {
        let first = (*self.first_codes.get(length.checked_sub(1)?)?)?;
        (index < self.bits[length - 1] as usize).then(|| first + index as u16)
    }

    /// Iterates over `(length, code, symbol)` in canonical order.
    pub fn codes(&self) -> impl Iterator<Item = (u8, u16, u8)> + '_ {
        let mut offset = 0;
        (0..HUFFMAN_MAX_BITS).flat_map(move |i| {
            let start = offset;
            let count = self.bits[i] as usize;
            offset += count;
            let length = (i + 1) as u8;
            let first = self.first_codes[i].unwrap_or(0);
            let symbols = &self.symbols[start..offset];
            (0..count).map(move |j| (length, first + j as u16, symbols[j]))
        })
    }

    /// Decodes the `length` low bits of `code`, most significant first.
    /// Returns None if the path leaves the tree or ends on an inner node.
    pub fn decode(&self, code: u16, length: u8) -> Option<u8> {
        if length as usize > HUFFMAN_MAX_BITS {
            return None;
        }
        let mut node = &self.nodes[0];
        for shift in (0..length).rev() {
            let bit = (code >> shift) & 1;
            node = &self.nodes[node.children[bit as usize]?.index()];
        }
        node.symbol
    }

    /// Reads bits from `br` until a leaf is reached. Returns `Ok(None)` on a
    /// bit sequence that is not a code of this tree.
    pub fn read_symbol(&self, br: &mut BitReader) -> Result<Option<u8>> {
        let mut node = &self.nodes[0];
        loop {
            if let Some(symbol) = node.symbol {
                return Ok(Some(symbol));
            }
            let bit = br.next_bit()?;
            match node.children[bit as usize] {
                Some(child) => node = &self.nodes[child.index()],
                None => return Ok(None),
            }
        }
    }
}
