//! Huffarc: a multi-file archiver built on canonical Huffman coding.
//!
//! The crate provides:
//! - Bit-granular I/O over byte streams (`bitio`)
//! - A meldable leftist-heap priority queue (`heap`)
//! - Code trees and canonical code tables (`huffman`)
//! - The archive container encoder/decoder (`archive`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use huffarc::archive::{decoder, encoder};
//!
//! let archive = encoder::encode_entries(Vec::new(), [("hello.txt", b"hello, world")]).unwrap();
//! let entries = decoder::decode_memory(&archive).unwrap();
//! assert_eq!(entries[0].name, "hello.txt");
//! assert_eq!(entries[0].data, b"hello, world");
//! ```

pub mod archive;
pub mod bitio;
pub mod heap;
pub mod huffman;
pub mod io;

#[cfg(feature = "cli")]
pub mod cli;
