// Code tree.
//
// Two lifecycles share one node type:
//   - encode: leaves are merged bottom-up through the priority queue, then
//     `code_lengths` reads each leaf's depth
//   - decode: an empty root is extended top-down by `add_symbol`, then
//     `decode_one` walks it bit by bit (0 = left, 1 = right)
//
// A tree whose root is itself a leaf encodes its only symbol in zero bits.

use std::io::Read;

use thiserror::Error;

use super::symbol::{FrequencyTable, Symbol};
use crate::bitio::{BitIoError, BitReader};
use crate::heap::{EmptyQueue, LeftistHeap};

#[derive(Debug, Error)]
pub enum TreeError {
    /// The code path ends on, or passes through, a node that already holds
    /// a different symbol or already has children.
    #[error("code for {symbol} collides with an existing assignment")]
    DuplicateAssignment { symbol: Symbol },

    /// Traversal reached a missing child or an unassigned leaf.
    #[error("bit sequence does not lead to any symbol")]
    InvalidSymbol,

    /// Frequency table had no symbols to build from.
    #[error("cannot build a code tree from an empty frequency table: {0}")]
    Empty(#[from] EmptyQueue),

    #[error(transparent)]
    BitIo(#[from] BitIoError),
}

#[derive(Debug, Default)]
struct Node {
    symbol: Option<Symbol>,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

#[derive(Debug)]
pub struct CodeTree {
    root: Box<Node>,
}

/// A partial tree in the priority queue, keyed by `(weight, lowest symbol)`.
///
/// Subtrees hold disjoint symbol sets, so the key is a total order and the
/// resulting lengths never depend on insertion order.
struct Weighted {
    weight: u64,
    lowest: Symbol,
    tree: CodeTree,
}

impl CodeTree {
    /// Empty tree for top-down reconstruction: an internal root with no
    /// children and no symbol.
    pub fn new() -> Self {
        Self {
            root: Box::default(),
        }
    }

    /// Single-leaf tree.
    pub fn leaf(symbol: Symbol) -> Self {
        Self {
            root: Box::new(Node {
                symbol: Some(symbol),
                ..Node::default()
            }),
        }
    }

    /// Join two subtrees under a fresh internal root.
    pub fn merge(left: CodeTree, right: CodeTree) -> Self {
        Self {
            root: Box::new(Node {
                symbol: None,
                left: Some(left.root),
                right: Some(right.root),
            }),
        }
    }

    /// Build the Huffman tree for `freq`: repeatedly combine the two
    /// lightest partial trees until one remains.
    pub fn from_frequencies(freq: &FrequencyTable) -> Result<Self, TreeError> {
        let by_weight = |a: &Weighted, b: &Weighted| (a.weight, a.lowest) < (b.weight, b.lowest);
        let mut queue = LeftistHeap::with_comparator(by_weight);
        for (symbol, weight) in freq.iter() {
            queue.insert(Weighted {
                weight,
                lowest: symbol,
                tree: CodeTree::leaf(symbol),
            });
        }

        while queue.size() > 1 {
            let a = queue.extract_min()?;
            let b = queue.extract_min()?;
            queue.insert(Weighted {
                weight: a.weight + b.weight,
                lowest: a.lowest.min(b.lowest),
                tree: CodeTree::merge(a.tree, b.tree),
            });
        }

        Ok(queue.extract_min()?.tree)
    }

    /// `(symbol, depth)` for every leaf, in depth-first left-to-right order.
    pub fn code_lengths(&self) -> Vec<(Symbol, u32)> {
        let mut lengths = Vec::new();
        let mut stack: Vec<(&Node, u32)> = vec![(&self.root, 0)];
        while let Some((node, depth)) = stack.pop() {
            if node.is_leaf() {
                if let Some(symbol) = node.symbol {
                    lengths.push((symbol, depth));
                }
                continue;
            }
            if let Some(right) = node.right.as_deref() {
                stack.push((right, depth + 1));
            }
            if let Some(left) = node.left.as_deref() {
                stack.push((left, depth + 1));
            }
        }
        lengths
    }

    /// Place `symbol` at the end of the path spelled by `code`
    /// (`code[0]` is the first branch taken from the root).
    pub fn add_symbol(&mut self, symbol: Symbol, code: &[bool]) -> Result<(), TreeError> {
        let mut node = &mut *self.root;
        for &bit in code {
            if node.symbol.is_some() {
                return Err(TreeError::DuplicateAssignment { symbol });
            }
            let child = if bit { &mut node.right } else { &mut node.left };
            node = &mut **child.get_or_insert_with(Box::default);
        }
        if node.symbol.is_some() || !node.is_leaf() {
            return Err(TreeError::DuplicateAssignment { symbol });
        }
        node.symbol = Some(symbol);
        Ok(())
    }

    /// Decode one symbol, consuming exactly its code's bits.
    pub fn decode_one<R: Read>(&self, reader: &mut BitReader<R>) -> Result<Symbol, TreeError> {
        let mut node = &*self.root;
        loop {
            if let Some(symbol) = node.symbol {
                return Ok(symbol);
            }
            let next = if reader.next_bit()? {
                node.right.as_deref()
            } else {
                node.left.as_deref()
            };
            node = next.ok_or(TreeError::InvalidSymbol)?;
        }
    }
}

impl Default for CodeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitio::BitWriter;

    fn sym(b: u8) -> Symbol {
        Symbol::from_byte(b)
    }

    fn bits(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '1').collect()
    }

    fn pack(s: &str) -> Vec<u8> {
        let mut w = BitWriter::new(Vec::new());
        w.write_bits(&bits(s)).unwrap();
        w.finish().unwrap()
    }

    #[test]
    fn merged_tree_reports_depths() {
        let ab = CodeTree::merge(CodeTree::leaf(sym(b'a')), CodeTree::leaf(sym(b'b')));
        let tree = CodeTree::merge(ab, CodeTree::leaf(sym(b'c')));
        assert_eq!(
            tree.code_lengths(),
            [(sym(b'a'), 2), (sym(b'b'), 2), (sym(b'c'), 1)]
        );
    }

    #[test]
    fn single_leaf_has_depth_zero() {
        let tree = CodeTree::leaf(Symbol::ARCHIVE_END);
        assert_eq!(tree.code_lengths(), [(Symbol::ARCHIVE_END, 0)]);
    }

    #[test]
    fn huffman_lengths_follow_weights() {
        let mut freq = FrequencyTable::new();
        for (b, n) in [(b'a', 45), (b'b', 13), (b'c', 12), (b'd', 16), (b'e', 9), (b'f', 5)] {
            for _ in 0..n {
                freq.add(sym(b));
            }
        }
        let mut lengths = CodeTree::from_frequencies(&freq).unwrap().code_lengths();
        lengths.sort();
        assert_eq!(
            lengths,
            [
                (sym(b'a'), 1),
                (sym(b'b'), 3),
                (sym(b'c'), 3),
                (sym(b'd'), 3),
                (sym(b'e'), 4),
                (sym(b'f'), 4),
            ]
        );
    }

    #[test]
    fn equal_weights_are_deterministic() {
        let mut freq = FrequencyTable::new();
        for b in [b'z', b'y', b'x'] {
            freq.add(sym(b));
        }
        let first = CodeTree::from_frequencies(&freq).unwrap().code_lengths();
        let second = CodeTree::from_frequencies(&freq).unwrap().code_lengths();
        assert_eq!(first, second);
        // x and y are the two lightest by (weight, symbol) and pair first.
        let mut sorted = first;
        sorted.sort();
        assert_eq!(sorted, [(sym(b'x'), 2), (sym(b'y'), 2), (sym(b'z'), 1)]);
    }

    #[test]
    fn empty_frequencies_fail() {
        let err = CodeTree::from_frequencies(&FrequencyTable::new()).unwrap_err();
        assert!(matches!(err, TreeError::Empty(_)));
    }

    #[test]
    fn rebuilt_tree_decodes_codes() {
        let mut tree = CodeTree::new();
        tree.add_symbol(sym(b'a'), &bits("0")).unwrap();
        tree.add_symbol(sym(b'b'), &bits("10")).unwrap();
        tree.add_symbol(Symbol::ARCHIVE_END, &bits("11")).unwrap();

        let data = pack("0100011");
        let mut r = BitReader::new(&data[..]);
        let decoded: Vec<Symbol> = (0..5).map(|_| tree.decode_one(&mut r).unwrap()).collect();
        assert_eq!(
            decoded,
            [sym(b'a'), sym(b'b'), sym(b'a'), sym(b'a'), Symbol::ARCHIVE_END]
        );
    }

    #[test]
    fn duplicate_assignment_is_rejected() {
        let mut tree = CodeTree::new();
        tree.add_symbol(sym(1), &bits("01")).unwrap();
        assert!(matches!(
            tree.add_symbol(sym(2), &bits("01")),
            Err(TreeError::DuplicateAssignment { .. })
        ));
        // Prefix of an existing code, and extension of an existing leaf.
        assert!(tree.add_symbol(sym(3), &bits("0")).is_err());
        assert!(tree.add_symbol(sym(4), &bits("011")).is_err());
    }

    #[test]
    fn missing_branch_is_invalid_symbol() {
        let mut tree = CodeTree::new();
        tree.add_symbol(sym(b'a'), &bits("0")).unwrap();
        let data = pack("1");
        let mut r = BitReader::new(&data[..]);
        assert!(matches!(tree.decode_one(&mut r), Err(TreeError::InvalidSymbol)));
    }

    #[test]
    fn degenerate_tree_reads_no_bits() {
        let mut tree = CodeTree::new();
        tree.add_symbol(sym(b'q'), &[]).unwrap();
        let mut r = BitReader::new(&[][..]);
        for _ in 0..3 {
            assert_eq!(tree.decode_one(&mut r).unwrap(), sym(b'q'));
        }
        assert_eq!(r.bytes_read(), 0);
    }

    #[test]
    fn running_out_of_bits_is_reported() {
        let mut tree = CodeTree::new();
        tree.add_symbol(sym(b'a'), &bits("000000000")).unwrap();
        let data = pack("0000");
        let mut r = BitReader::new(&data[..]);
        assert!(matches!(
            tree.decode_one(&mut r),
            Err(TreeError::BitIo(BitIoError::EndOfStream))
        ));
    }
}
