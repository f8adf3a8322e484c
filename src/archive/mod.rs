// Archive container: a flat bitstream of self-describing file records.
//
// - `encoder`  ArchiveEncoder, per-file tables, ONE_MORE_FILE / ARCHIVE_END framing
// - `decoder`  ArchiveDecoder, rebuilds each record's tree and streams entries to a sink
// - `error`    ArchiveError and the corruption taxonomy

pub mod decoder;
pub mod encoder;
pub mod error;

pub use decoder::{
    ArchiveDecoder, ArchiveEntry, DecodeSummary, EntryInfo, EntrySink, MemorySink, decode_memory,
};
pub use encoder::{ArchiveEncoder, RecordStats, encode_entries};
pub use error::{ArchiveError, Corruption};

use std::path::Path;

/// Reject names that are empty, `.`/`..`, or contain a path separator or
/// NUL, so a stored name always denotes a single entry in one directory.
pub fn validate_name(name: &str) -> Result<(), ArchiveError> {
    let unsafe_name = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if unsafe_name {
        return Err(ArchiveError::UnsafeFileName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// The name an input path is stored under: its final component, which must
/// be valid UTF-8.
pub fn stored_name(path: &Path) -> Result<&str, ArchiveError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ArchiveError::InvalidFileName {
            path: path.to_path_buf(),
        })
}
