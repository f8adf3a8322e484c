// Archive alphabet: the 256 byte values plus three control sentinels.
//
// Every symbol fits in `SYMBOL_BITS` (9) bits on the wire.

use std::fmt;

/// Width of a symbol, symbol count or histogram bucket on the wire.
pub const SYMBOL_BITS: u32 = 9;

/// Number of distinct symbols: 256 bytes + 3 sentinels.
pub const ALPHABET_SIZE: usize = 259;

/// One element of the archive alphabet, `0..=258`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u16);

impl Symbol {
    /// Terminates an encoded file name.
    pub const FILENAME_END: Symbol = Symbol(256);
    /// Separates one file record from the next.
    pub const ONE_MORE_FILE: Symbol = Symbol(257);
    /// Terminates the archive.
    pub const ARCHIVE_END: Symbol = Symbol(258);

    /// Returns `None` if `value` is outside the alphabet.
    pub const fn new(value: u16) -> Option<Symbol> {
        if (value as usize) < ALPHABET_SIZE {
            Some(Symbol(value))
        } else {
            None
        }
    }

    pub const fn from_byte(byte: u8) -> Symbol {
        Symbol(byte as u16)
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The literal byte, or `None` for a sentinel.
    pub const fn as_byte(self) -> Option<u8> {
        if self.0 < 256 { Some(self.0 as u8) } else { None }
    }

    pub const fn is_sentinel(self) -> bool {
        self.0 >= 256
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Symbol::FILENAME_END => f.write_str("FILENAME_END"),
            Symbol::ONE_MORE_FILE => f.write_str("ONE_MORE_FILE"),
            Symbol::ARCHIVE_END => f.write_str("ARCHIVE_END"),
            Symbol(v) => write!(f, "{v:#04x}"),
        }
    }
}

// ---------------------------------------------------------------------------
// FrequencyTable
// ---------------------------------------------------------------------------

/// Occurrence counts over the whole alphabet, scoped to one file record.
#[derive(Clone)]
pub struct FrequencyTable {
    counts: [u64; ALPHABET_SIZE],
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self {
            counts: [0; ALPHABET_SIZE],
        }
    }

    /// Table for one file record: name bytes, content bytes, and one
    /// reserved occurrence of each sentinel.
    pub fn for_record(name: &[u8], data: &[u8]) -> Self {
        let mut table = Self::new();
        table.add_bytes(name);
        table.add_bytes(data);
        table.add(Symbol::FILENAME_END);
        table.add(Symbol::ONE_MORE_FILE);
        table.add(Symbol::ARCHIVE_END);
        table
    }

    pub fn add(&mut self, symbol: Symbol) {
        self.counts[symbol.index()] += 1;
    }

    pub fn add_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.counts[b as usize] += 1;
        }
    }

    pub fn count(&self, symbol: Symbol) -> u64 {
        self.counts[symbol.index()]
    }

    /// Number of symbols with a non-zero count.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Present symbols and their counts, in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(|(i, &c)| (Symbol(i as u16), c))
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FrequencyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
