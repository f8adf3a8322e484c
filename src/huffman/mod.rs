// Huffman coding primitives.
//
// - `symbol`     9-bit alphabet (bytes + three sentinels) and frequency counts
// - `tree`       code tree: built bottom-up for lengths, rebuilt top-down for decoding
// - `canonical`  canonical code assignment and reconstruction from a length histogram

pub mod canonical;
pub mod symbol;
pub mod tree;

pub use canonical::{CanonicalTable, Code, MalformedHistogram};
pub use symbol::{FrequencyTable, Symbol};
pub use tree::{CodeTree, TreeError};
