// Canonical Huffman code assignment.
//
// Symbols are sorted by (code length, symbol value). The first gets code 0;
// each following symbol gets the previous code + 1, shifted left by the
// length increase. Only the ordered symbol list and the number of symbols
// per length are transmitted; the decoder replays the same assignment.

use thiserror::Error;

use super::symbol::{ALPHABET_SIZE, Symbol};

/// Longest code the tables can represent.
///
/// A Huffman tree over 64-bit counts is at most ~92 levels deep, so the
/// encoder never reaches this; the decoder rejects anything longer.
pub const MAX_CODE_LEN: u32 = 128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedHistogram {
    #[error("{claimed} symbols claimed for length {len}, only {remaining} unassigned")]
    TooManySymbols {
        len: u32,
        claimed: usize,
        remaining: usize,
    },

    #[error("length {len} cannot hold the codes assigned to it")]
    CodeSpaceOverflow { len: u32 },

    #[error("code length {len} exceeds the maximum of {MAX_CODE_LEN}")]
    CodeTooLong { len: u32 },

    #[error("histogram accounts for {histogram} symbols, {declared} declared")]
    CountMismatch { declared: usize, histogram: usize },

    #[error("symbol {0} listed more than once")]
    RepeatedSymbol(Symbol),
}

// ---------------------------------------------------------------------------
// Code
// ---------------------------------------------------------------------------

/// A code word: the low `len` bits of `value`, read most-significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Code {
    pub value: u128,
    pub len: u32,
}

impl Code {
    /// Bits in transmission order.
    pub fn bits(&self) -> Vec<bool> {
        (0..self.len)
            .rev()
            .map(|i| (self.value >> i) & 1 == 1)
            .collect()
    }

    /// True if `self` is a proper or improper prefix of `other`.
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len && (other.value >> (other.len - self.len)) == self.value
    }
}

// ---------------------------------------------------------------------------
// CanonicalTable
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CanonicalTable {
    /// Symbols in canonical order, ascending by (length, value).
    ordered: Vec<Symbol>,
    codes: Vec<Option<Code>>,
}

impl CanonicalTable {
    /// Assign canonical codes from `(symbol, length)` pairs.
    pub fn from_lengths(mut lengths: Vec<(Symbol, u32)>) -> Result<Self, MalformedHistogram> {
        lengths.sort_by_key(|&(symbol, len)| (len, symbol));

        let mut table = Self::empty();
        let mut code = 0u128;
        for (i, &(symbol, len)) in lengths.iter().enumerate() {
            if len > MAX_CODE_LEN {
                return Err(MalformedHistogram::CodeTooLong { len });
            }
            table.assign(symbol, Code { value: code, len })?;
            if let Some(&(_, next_len)) = lengths.get(i + 1) {
                code = code
                    .checked_add(1)
                    .and_then(|c| c.checked_shl(next_len - len))
                    .filter(|c| next_len >= MAX_CODE_LEN || c >> next_len == 0)
                    .ok_or(MalformedHistogram::CodeSpaceOverflow { len: next_len })?;
            }
        }
        Ok(table)
    }

    /// Rebuild codes from the canonical symbol order and the count of
    /// symbols per length (`histogram[0]` counts length-1 codes).
    ///
    /// A single symbol with an empty histogram gets the zero-length code.
    pub fn from_histogram(
        ordered: &[Symbol],
        histogram: &[usize],
    ) -> Result<Self, MalformedHistogram> {
        let mut table = Self::empty();
        if ordered.len() == 1 && histogram.iter().all(|&c| c == 0) {
            table.assign(ordered[0], Code { value: 0, len: 0 })?;
            return Ok(table);
        }

        let total: usize = histogram.iter().sum();
        if total != ordered.len() {
            return Err(MalformedHistogram::CountMismatch {
                declared: ordered.len(),
                histogram: total,
            });
        }

        let mut symbols = ordered.iter().copied();
        let mut next = 0u128;
        let mut remaining = ordered.len();
        for (i, &count) in histogram.iter().enumerate() {
            let len = i as u32 + 1;
            if len > MAX_CODE_LEN {
                return Err(MalformedHistogram::CodeTooLong { len });
            }
            if count > remaining {
                return Err(MalformedHistogram::TooManySymbols {
                    len,
                    claimed: count,
                    remaining,
                });
            }
            let end = next
                .checked_add(count as u128)
                .filter(|&end| len >= MAX_CODE_LEN || end <= 1u128 << len)
                .ok_or(MalformedHistogram::CodeSpaceOverflow { len })?;
            for value in next..end {
                if let Some(symbol) = symbols.next() {
                    table.assign(symbol, Code { value, len })?;
                }
            }
            remaining -= count;
            if remaining == 0 {
                break;
            }
            next = end
                .checked_mul(2)
                .ok_or(MalformedHistogram::CodeSpaceOverflow { len: len + 1 })?;
        }
        Ok(table)
    }

    fn empty() -> Self {
        Self {
            ordered: Vec::new(),
            codes: vec![None; ALPHABET_SIZE],
        }
    }

    fn assign(&mut self, symbol: Symbol, code: Code) -> Result<(), MalformedHistogram> {
        let slot = &mut self.codes[symbol.index()];
        if slot.is_some() {
            return Err(MalformedHistogram::RepeatedSymbol(symbol));
        }
        *slot = Some(code);
        self.ordered.push(symbol);
        Ok(())
    }

    pub fn code(&self, symbol: Symbol) -> Option<Code> {
        self.codes[symbol.index()]
    }

    /// Symbols in canonical order.
    pub fn ordered_symbols(&self) -> &[Symbol] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn max_len(&self) -> u32 {
        self.iter().map(|(_, c)| c.len).max().unwrap_or(0)
    }

    /// Symbols per code length, for lengths `1..=max_len()`.
    pub fn histogram(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.max_len() as usize];
        for (_, code) in self.iter() {
            if code.len > 0 {
                counts[code.len as usize - 1] += 1;
            }
        }
        counts
    }

    /// `(symbol, code)` in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, Code)> + '_ {
        self.ordered
            .iter()
            .filter_map(|&s| self.codes[s.index()].map(|c| (s, c)))
    }
}
