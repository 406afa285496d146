//! Input decoding and CSV loading.

pub mod encoding;
mod loader;
mod source;

pub use encoding::{EncodingGuess, FALLBACK_ENCODING, detect_encoding};
pub use loader::{CsvLoader, LoaderConfig};
pub use source::{DataTable, SourceMetadata};
