// Archive encoder.
//
// One `ArchiveEncoder` writes one archive. Each file record carries its own
// canonical code table, so the encoder moves between two states:
//
//   Idle   : nothing written yet
//   InFile : a record is open; its table is kept so the *next* call can
//            terminate it with ONE_MORE_FILE, or `finish` with ARCHIVE_END
//
// Record layout (all counts and symbols are 9-bit, LSB first):
//   symbol count | symbols in canonical order | symbols per code length
//   | name codes | FILENAME_END | content codes

use std::io::Write;
use std::path::Path;

use crate::bitio::BitWriter;
use crate::huffman::symbol::SYMBOL_BITS;
use crate::huffman::{CanonicalTable, CodeTree, FrequencyTable, Symbol};

use super::{ArchiveError, stored_name, validate_name};

/// Summary of one encoded file record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStats {
    /// Stored file name.
    pub name: String,
    /// Content length in bytes.
    pub size: u64,
    /// Distinct symbols in the record's alphabet.
    pub symbols: usize,
    /// Longest code in the record's table.
    pub max_code_len: u32,
    /// Bits written for this record, terminator excluded.
    pub bits: u64,
}

enum EncoderState {
    Idle,
    InFile { table: CanonicalTable },
}

/// Streaming archive writer.
///
/// # Example
/// ```no_run
/// use huffarc::archive::ArchiveEncoder;
/// let mut out = Vec::new();
/// let mut enc = ArchiveEncoder::new(&mut out);
/// enc.add_entry("hello.txt", b"hello world").unwrap();
/// enc.finish().unwrap();
/// ```
pub struct ArchiveEncoder<W: Write> {
    out: BitWriter<W>,
    state: EncoderState,
    records: u64,
}

impl<W: Write> ArchiveEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            out: BitWriter::new(writer),
            state: EncoderState::Idle,
            records: 0,
        }
    }

    /// Read `path` and append it under its final path component.
    pub fn add_file(&mut self, path: &Path) -> Result<RecordStats, ArchiveError> {
        let name = stored_name(path)?;
        let data = read_input(path)?;
        self.add_entry(name, &data)
    }

    /// Append one file record.
    pub fn add_entry(&mut self, name: &str, data: &[u8]) -> Result<RecordStats, ArchiveError> {
        validate_name(name)?;

        if let EncoderState::InFile { table } =
            std::mem::replace(&mut self.state, EncoderState::Idle)
        {
            self.emit(&table, Symbol::ONE_MORE_FILE)?;
        }

        let start = self.out.bits_written();
        let table = build_table(&FrequencyTable::for_record(name.as_bytes(), data))?;
        self.write_header(&table)?;

        for &b in name.as_bytes() {
            self.emit(&table, Symbol::from_byte(b))?;
        }
        self.emit(&table, Symbol::FILENAME_END)?;
        for &b in data {
            self.emit(&table, Symbol::from_byte(b))?;
        }

        let stats = RecordStats {
            name: name.to_string(),
            size: data.len() as u64,
            symbols: table.len(),
            max_code_len: table.max_len(),
            bits: self.out.bits_written() - start,
        };
        log::debug!(
            "encoded {:?}: {} bytes, {} symbols, max code length {}, {} bits",
            stats.name,
            stats.size,
            stats.symbols,
            stats.max_code_len,
            stats.bits
        );

        self.state = EncoderState::InFile { table };
        self.records += 1;
        Ok(stats)
    }

    /// Number of records written so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Terminate the archive with ARCHIVE_END, pad the final byte, and
    /// return the underlying writer.
    ///
    /// Fails with [`ArchiveError::Protocol`] if no file was added: without
    /// a code table there is no way to encode the terminator.
    pub fn finish(mut self) -> Result<W, ArchiveError> {
        let table = match std::mem::replace(&mut self.state, EncoderState::Idle) {
            EncoderState::InFile { table } => table,
            EncoderState::Idle => {
                return Err(ArchiveError::Protocol("archive finished before any file was added"));
            }
        };
        self.emit(&table, Symbol::ARCHIVE_END)?;
        log::info!(
            "archive complete: {} records, {} bits",
            self.records,
            self.out.bits_written()
        );
        Ok(self.out.finish()?)
    }

    fn write_header(&mut self, table: &CanonicalTable) -> Result<(), ArchiveError> {
        self.out.write_value(table.len() as u64, SYMBOL_BITS)?;
        for symbol in table.ordered_symbols() {
            self.out.write_value(u64::from(symbol.value()), SYMBOL_BITS)?;
        }
        for count in table.histogram() {
            self.out.write_value(count as u64, SYMBOL_BITS)?;
        }
        Ok(())
    }

    fn emit(&mut self, table: &CanonicalTable, symbol: Symbol) -> Result<(), ArchiveError> {
        let code = table
            .code(symbol)
            .ok_or(ArchiveError::Protocol("symbol missing from the record's code table"))?;
        self.out.write_code(code.value, code.len)?;
        Ok(())
    }
}

/// Read a whole input file; a missing file is reported as `FileNotFound`.
pub fn read_input(path: &Path) -> Result<Vec<u8>, ArchiveError> {
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ArchiveError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ArchiveError::Io(e),
    })
}

/// Huffman tree -> code lengths -> canonical table. The tree is dropped as
/// soon as the lengths are read.
pub(crate) fn build_table(freq: &FrequencyTable) -> Result<CanonicalTable, ArchiveError> {
    let lengths = CodeTree::from_frequencies(freq)?.code_lengths();
    Ok(CanonicalTable::from_lengths(lengths)?)
}

// ---------------------------------------------------------------------------
// Convenience function
// ---------------------------------------------------------------------------

/// Encode in-memory `(name, content)` pairs into `writer`, in order.
pub fn encode_entries<W, I, N, D>(writer: W, entries: I) -> Result<W, ArchiveError>
where
    W: Write,
    I: IntoIterator<Item = (N, D)>,
    N: AsRef<str>,
    D: AsRef<[u8]>,
{
    let mut encoder = ArchiveEncoder::new(writer);
    for (name, data) in entries {
        encoder.add_entry(name.as_ref(), data.as_ref())?;
    }
    encoder.finish()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitio::BitReader;

    #[test]
    fn finishing_empty_archive_is_protocol_error() {
        let enc = ArchiveEncoder::new(Vec::new());
        assert!(matches!(enc.finish(), Err(ArchiveError::Protocol(_))));
    }

    #[test]
    fn single_byte_record_header() {
        let out = encode_entries(Vec::new(), [("f", [0x41u8])]).unwrap();
        let mut r = BitReader::new(&out[..]);

        // 'A', 'f', FILENAME_END, ONE_MORE_FILE, ARCHIVE_END
        assert_eq!(r.read_value(SYMBOL_BITS).unwrap(), 5);
        let symbols: Vec<u64> = (0..5).map(|_| r.read_value(SYMBOL_BITS).unwrap()).collect();
        // All weights are 1: the two byte symbols pair first and sink to
        // length 3, the sentinels sit at length 2.
        assert_eq!(symbols, [256, 257, 258, 0x41, b'f' as u64]);
        let histogram: Vec<u64> = (0..3).map(|_| r.read_value(SYMBOL_BITS).unwrap()).collect();
        assert_eq!(histogram, [0, 3, 2]);
    }

    #[test]
    fn record_stats_are_reported() {
        let mut enc = ArchiveEncoder::new(Vec::new());
        let stats = enc.add_entry("notes.txt", b"aaaaaaaabbbc").unwrap();
        assert_eq!(stats.name, "notes.txt");
        assert_eq!(stats.size, 12);
        // n o t e s . x a b c + 3 sentinels
        assert_eq!(stats.symbols, 13);
        assert!(stats.bits > 0);
        assert_eq!(enc.records(), 1);
        enc.finish().unwrap();
    }

    #[test]
    fn unsafe_names_are_rejected() {
        let mut enc = ArchiveEncoder::new(Vec::new());
        for name in ["", ".", "..", "a/b", "a\\b"] {
            assert!(matches!(
                enc.add_entry(name, b"x"),
                Err(ArchiveError::UnsafeFileName { .. })
            ));
        }
        assert_eq!(enc.records(), 0);
    }

    #[test]
    fn missing_file_is_reported() {
        let mut enc = ArchiveEncoder::new(Vec::new());
        let err = enc
            .add_file(Path::new("definitely/not/here.bin"))
            .unwrap_err();
        assert!(matches!(err, ArchiveError::FileNotFound { .. }));
    }
}
