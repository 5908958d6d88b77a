//! Error taxonomy for ELF/DWARF parsing and index construction.

use std::path::PathBuf;

/// Errors produced while loading files or building a [`crate::DwarfIndex`].
///
/// Every fallible operation in this crate returns `Result<T, Error>`. Query
/// operations (`find`) are not fallible in this sense: an absent key is
/// reported as `None`, not an `Error`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Opening, `fstat`-ing, or memory-mapping a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The path that could not be opened or mapped.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The ELF container itself is malformed (bad magic, truncated header,
    /// section bounds outside the file, bad relocation symbol/offset).
    #[error("malformed ELF: {detail}")]
    ElfFormat {
        /// Human-readable description of what was wrong.
        detail: String,
    },

    /// The DWARF content is malformed (unknown version, unknown form,
    /// unknown abbrev code, a required debug section is missing).
    #[error("malformed DWARF: {detail}")]
    DwarfFormat {
        /// Human-readable description of what was wrong.
        detail: String,
    },

    /// The input is valid but describes something this crate intentionally
    /// does not support (32-bit ELF, non-host endianness, a relocation type
    /// other than `R_X86_64_{NONE,32,64}`, `DW_FORM_indirect`, a
    /// non-sequential abbreviation table).
    #[error("not implemented: {detail}")]
    NotImplemented {
        /// Human-readable description of the unsupported feature.
        detail: String,
    },

    /// A reader ran past the end of a section or compilation unit while more
    /// bytes were expected.
    #[error("unexpected end of input: {detail}")]
    Eof {
        /// Human-readable description of where the read overran.
        detail: String,
    },

    /// A LEB128-encoded value does not fit in 64 bits.
    #[error("integer overflow decoding LEB128: {detail}")]
    Overflow {
        /// Human-readable description of the overflowing value.
        detail: String,
    },

    /// The hash index is at capacity, or an allocation failed.
    #[error("hash index is full")]
    OutOfMemory,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
