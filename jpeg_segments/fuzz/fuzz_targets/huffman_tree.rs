// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.
#![no_main]

use jpeg_segments::bit_reader::BitReader;
use jpeg_segments::huffman::{HUFFMAN_MAX_BITS, HuffmanTree};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < HUFFMAN_MAX_BITS {
        return;
    }
    let (bits, rest) = data.split_at(HUFFMAN_MAX_BITS);
    let num_symbols: usize = bits.iter().map(|&b| b as usize).sum();
    if rest.len() < num_symbols {
        return;
    }
    let (symbols, stream) = rest.split_at(num_symbols);
    let Ok(tree) = HuffmanTree::build(bits, symbols) else {
        return;
    };
    for (length, code, symbol) in tree.codes() {
        assert_eq!(tree.decode(code, length), Some(symbol));
    }
    let mut br = BitReader::new(stream);
    while let Ok(Some(symbol)) = tree.read_symbol(&mut br) {
        assert!(symbols.contains(&symbol));
    }
});
