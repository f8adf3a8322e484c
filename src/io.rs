// File-level helpers for creating and extracting archives.
//
// Provides `create_archive()` and `extract_archive()` convenience functions
// that wrap the encoder/decoder with buffered I/O. Optionally computes a
// SHA-256 checksum of every entry's content (feature-gated behind `file-io`).

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::archive::encoder::read_input;
use crate::archive::{
    ArchiveDecoder, ArchiveEncoder, ArchiveError, EntrySink, stored_name, validate_name,
};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for `extract_archive()`.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Directory the entries are written into.
    pub output_dir: PathBuf,
    /// Replace existing files. When false, an existing output fails the
    /// extraction with `ArchiveError::OutputExists`.
    pub overwrite: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            overwrite: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// One archived or extracted entry.
#[derive(Debug, Clone)]
pub struct EntryStats {
    /// Stored name.
    pub name: String,
    /// Content size in bytes.
    pub size: u64,
    /// SHA-256 of the content (if `file-io` feature is enabled).
    pub sha256: Option<[u8; 32]>,
}

/// Statistics returned by `create_archive()`.
#[derive(Debug, Clone)]
pub struct CreateStats {
    /// Sum of all input file sizes.
    pub input_size: u64,
    /// Size of the written archive.
    pub archive_size: u64,
    /// Entries in archive order.
    pub entries: Vec<EntryStats>,
}

/// Statistics returned by `extract_archive()`.
#[derive(Debug, Clone)]
pub struct ExtractStats {
    /// Size of the archive file.
    pub archive_size: u64,
    /// Sum of all extracted file sizes.
    pub output_size: u64,
    /// Entries in archive order.
    pub entries: Vec<EntryStats>,
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// create_archive
// ---------------------------------------------------------------------------

/// Compress `inputs`, in order, into a new archive at `archive_path`.
///
/// Each input is read fully into memory: once to count symbols, once to
/// emit codes. A failure leaves a partially written archive behind.
pub fn create_archive<P: AsRef<Path>>(
    archive_path: &Path,
    inputs: &[P],
) -> Result<CreateStats, ArchiveError> {
    let archive_file = File::create(archive_path)?;
    let writer = BufWriter::with_capacity(BUF_SIZE, archive_file);
    let mut encoder = ArchiveEncoder::new(writer);

    let mut entries = Vec::with_capacity(inputs.len());
    let mut input_size = 0u64;
    for input in inputs {
        let path = input.as_ref();
        let name = stored_name(path)?;
        let data = read_input(path)?;
        let record = encoder.add_entry(name, &data)?;
        log::info!("encoded file {}", path.display());

        input_size += record.size;
        entries.push(EntryStats {
            name: record.name,
            size: record.size,
            sha256: checksum(&data),
        });
    }

    let writer = encoder.finish()?;
    let archive_size = writer
        .into_inner()
        .map_err(|e| e.into_error())?
        .metadata()?
        .len();

    Ok(CreateStats {
        input_size,
        archive_size,
        entries,
    })
}

#[cfg(feature = "file-io")]
fn checksum(data: &[u8]) -> Option<[u8; 32]> {
    Some(sha2::Sha256::digest(data).into())
}

#[cfg(not(feature = "file-io"))]
fn checksum(_data: &[u8]) -> Option<[u8; 32]> {
    None
}

// ---------------------------------------------------------------------------
// extract_archive
// ---------------------------------------------------------------------------

/// Decode the archive at `archive_path`, writing every entry into
/// `opts.output_dir` under its stored name.
///
/// Entries already written stay on disk if a later record fails.
pub fn extract_archive(
    archive_path: &Path,
    opts: &ExtractOptions,
) -> Result<ExtractStats, ArchiveError> {
    let archive_file = File::open(archive_path)?;
    let archive_size = archive_file.metadata()?.len();
    let reader = BufReader::with_capacity(BUF_SIZE, archive_file);

    let mut sink = DirectorySink::new(opts);
    let summary = ArchiveDecoder::new(reader).decode_with(&mut sink)?;

    Ok(ExtractStats {
        archive_size,
        output_size: summary.bytes,
        entries: sink.finished,
    })
}

// ---------------------------------------------------------------------------
// DirectorySink
// ---------------------------------------------------------------------------

struct OpenEntry {
    name: String,
    writer: BufWriter<File>,
    size: u64,
    #[cfg(feature = "file-io")]
    hasher: sha2::Sha256,
}

/// Writes each decoded entry to its own file in one directory.
pub struct DirectorySink {
    root: PathBuf,
    overwrite: bool,
    current: Option<OpenEntry>,
    finished: Vec<EntryStats>,
}

impl DirectorySink {
    pub fn new(opts: &ExtractOptions) -> Self {
        Self {
            root: opts.output_dir.clone(),
            overwrite: opts.overwrite,
            current: None,
            finished: Vec::new(),
        }
    }
}

impl EntrySink for DirectorySink {
    fn begin(&mut self, name: &str) -> Result<(), ArchiveError> {
        validate_name(name)?;
        let path = self.root.join(name);
        if !self.overwrite && path.exists() {
            return Err(ArchiveError::OutputExists { path });
        }
        let file = File::create(&path)?;
        self.current = Some(OpenEntry {
            name: name.to_string(),
            writer: BufWriter::with_capacity(BUF_SIZE, file),
            size: 0,
            #[cfg(feature = "file-io")]
            hasher: sha2::Sha256::new(),
        });
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), ArchiveError> {
        let entry = self
            .current
            .as_mut()
            .ok_or(ArchiveError::Protocol("entry data before entry name"))?;
        entry.writer.write_all(data)?;
        entry.size += data.len() as u64;
        #[cfg(feature = "file-io")]
        entry.hasher.update(data);
        Ok(())
    }

    fn end(&mut self) -> Result<(), ArchiveError> {
        let mut entry = self
            .current
            .take()
            .ok_or(ArchiveError::Protocol("entry closed before it was opened"))?;
        entry.writer.flush()?;

        #[cfg(feature = "file-io")]
        let sha256 = Some(entry.hasher.finalize().into());
        #[cfg(not(feature = "file-io"))]
        let sha256: Option<[u8; 32]> = None;

        log::info!("decoded file {}", entry.name);
        self.finished.push(EntryStats {
            name: entry.name,
            size: entry.size,
            sha256,
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
