// Archive decoder.
//
// Records are decoded strictly in order. For each one the decoder reads the
// symbol list and length histogram, replays the canonical assignment,
// rebuilds a code tree, and then decodes symbols until FILENAME_END (name),
// followed by ONE_MORE_FILE or ARCHIVE_END (content). The tree and table
// are dropped before the next record's header is read.
//
// Decoded entries are handed to an `EntrySink`, so the same loop serves
// extraction to disk, in-memory decoding, and listing.

use std::io::Read;

use crate::bitio::BitReader;
use crate::huffman::canonical::MAX_CODE_LEN;
use crate::huffman::symbol::{ALPHABET_SIZE, SYMBOL_BITS};
use crate::huffman::{CanonicalTable, CodeTree, MalformedHistogram, Symbol};

use super::{ArchiveError, Corruption};

/// Decoded bytes are handed to the sink in chunks of this size.
const CHUNK_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Receives decoded entries: `begin`, any number of `write`s, then `end`.
pub trait EntrySink {
    fn begin(&mut self, name: &str) -> Result<(), ArchiveError>;
    fn write(&mut self, data: &[u8]) -> Result<(), ArchiveError>;
    fn end(&mut self) -> Result<(), ArchiveError>;
}

/// A fully decoded entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Vec<u8>,
}

/// Name and size of an entry, without its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: String,
    pub size: u64,
}

/// Collects entries in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub entries: Vec<ArchiveEntry>,
}

impl EntrySink for MemorySink {
    fn begin(&mut self, name: &str) -> Result<(), ArchiveError> {
        self.entries.push(ArchiveEntry {
            name: name.to_string(),
            data: Vec::new(),
        });
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), ArchiveError> {
        if let Some(entry) = self.entries.last_mut() {
            entry.data.extend_from_slice(data);
        }
        Ok(())
    }

    fn end(&mut self) -> Result<(), ArchiveError> {
        Ok(())
    }
}

/// Records names and sizes only.
#[derive(Debug, Default)]
struct ListingSink {
    entries: Vec<EntryInfo>,
}

impl EntrySink for ListingSink {
    fn begin(&mut self, name: &str) -> Result<(), ArchiveError> {
        self.entries.push(EntryInfo {
            name: name.to_string(),
            size: 0,
        });
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), ArchiveError> {
        if let Some(entry) = self.entries.last_mut() {
            entry.size += data.len() as u64;
        }
        Ok(())
    }

    fn end(&mut self) -> Result<(), ArchiveError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ArchiveDecoder
// ---------------------------------------------------------------------------

/// Totals for a completed decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeSummary {
    pub records: u64,
    pub bytes: u64,
}

pub struct ArchiveDecoder<R: Read> {
    input: BitReader<R>,
}

impl<R: Read> ArchiveDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            input: BitReader::new(reader),
        }
    }

    /// Decode every record into `sink`, stopping at ARCHIVE_END.
    pub fn decode_with<S: EntrySink>(&mut self, sink: &mut S) -> Result<DecodeSummary, ArchiveError> {
        let mut summary = DecodeSummary::default();
        loop {
            let tree = self.read_record_tree()?;
            let name = self.read_name(&tree)?;
            sink.begin(&name)?;
            let (size, more) = self.read_content(&tree, sink)?;
            sink.end()?;

            log::debug!("decoded {name:?}: {size} bytes");
            summary.records += 1;
            summary.bytes += size;
            if !more {
                break;
            }
        }
        log::info!(
            "archive decoded: {} records, {} bytes from {} archive bytes",
            summary.records,
            summary.bytes,
            self.input.bytes_read()
        );
        Ok(summary)
    }

    /// Names and sizes of every entry, without keeping content.
    pub fn list(&mut self) -> Result<Vec<EntryInfo>, ArchiveError> {
        let mut sink = ListingSink::default();
        self.decode_with(&mut sink)?;
        Ok(sink.entries)
    }

    /// Archive bytes consumed so far.
    pub fn bytes_read(&self) -> u64 {
        self.input.bytes_read()
    }

    fn read_record_tree(&mut self) -> Result<CodeTree, ArchiveError> {
        let table = self.read_table()?;
        // A lone byte symbol decodes from zero bits and never terminates.
        if let [only] = table.ordered_symbols()
            && !only.is_sentinel()
        {
            return Err(Corruption::Unterminated { symbol: *only }.into());
        }
        let mut tree = CodeTree::new();
        for (symbol, code) in table.iter() {
            tree.add_symbol(symbol, &code.bits())?;
        }
        Ok(tree)
    }

    fn read_table(&mut self) -> Result<CanonicalTable, ArchiveError> {
        let count = self.input.read_value(SYMBOL_BITS)?;
        if count == 0 || count > ALPHABET_SIZE as u64 {
            return Err(Corruption::BadSymbolCount(count).into());
        }
        let count = count as usize;

        let mut symbols = Vec::with_capacity(count);
        for _ in 0..count {
            let value = self.input.read_value(SYMBOL_BITS)?;
            let symbol = u16::try_from(value)
                .ok()
                .and_then(Symbol::new)
                .ok_or(Corruption::SymbolOutOfRange(value))?;
            symbols.push(symbol);
        }

        // A lone symbol has a zero-length code and no histogram.
        let mut histogram = Vec::new();
        let mut remaining = if count == 1 { 0 } else { count };
        let mut len = 1u32;
        while remaining > 0 {
            if len > MAX_CODE_LEN {
                return Err(MalformedHistogram::CodeTooLong { len }.into());
            }
            let claimed = self.input.read_value(SYMBOL_BITS)? as usize;
            if claimed > remaining {
                return Err(MalformedHistogram::TooManySymbols {
                    len,
                    claimed,
                    remaining,
                }
                .into());
            }
            histogram.push(claimed);
            remaining -= claimed;
            len += 1;
        }

        Ok(CanonicalTable::from_histogram(&symbols, &histogram)?)
    }

    fn read_name(&mut self, tree: &CodeTree) -> Result<String, ArchiveError> {
        let mut name = Vec::new();
        loop {
            let symbol = tree.decode_one(&mut self.input)?;
            match symbol.as_byte() {
                Some(b) => name.push(b),
                None if symbol == Symbol::FILENAME_END => break,
                None => {
                    return Err(Corruption::UnexpectedSentinel {
                        symbol,
                        context: "a file name",
                    }
                    .into());
                }
            }
        }
        String::from_utf8(name).map_err(|_| Corruption::NonUtf8Name.into())
    }

    /// Returns the content length and whether another record follows.
    fn read_content<S: EntrySink>(
        &mut self,
        tree: &CodeTree,
        sink: &mut S,
    ) -> Result<(u64, bool), ArchiveError> {
        let mut chunk = Vec::with_capacity(CHUNK_SIZE);
        let mut size = 0u64;
        let more = loop {
            let symbol = tree.decode_one(&mut self.input)?;
            match symbol.as_byte() {
                Some(b) => {
                    chunk.push(b);
                    if chunk.len() == CHUNK_SIZE {
                        sink.write(&chunk)?;
                        size += chunk.len() as u64;
                        chunk.clear();
                    }
                }
                None if symbol == Symbol::ONE_MORE_FILE => break true,
                None if symbol == Symbol::ARCHIVE_END => break false,
                None => {
                    return Err(Corruption::UnexpectedSentinel {
                        symbol,
                        context: "file content",
                    }
                    .into());
                }
            }
        };
        if !chunk.is_empty() {
            sink.write(&chunk)?;
            size += chunk.len() as u64;
        }
        Ok((size, more))
    }
}

// ---------------------------------------------------------------------------
// Convenience function
// ---------------------------------------------------------------------------

/// Decode an in-memory archive into its entries, in archive order.
pub fn decode_memory(archive: &[u8]) -> Result<Vec<ArchiveEntry>, ArchiveError> {
    let mut sink = MemorySink::default();
    ArchiveDecoder::new(archive).decode_with(&mut sink)?;
    Ok(sink.entries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
