//! A fast, read-only index over DWARF debugging information extracted from
//! ELF64 object files.
//!
//! Given a list of ELF64 object file paths, [`DwarfIndex::new`] memory-maps
//! each file, applies its debug-section relocations in place, walks every
//! compilation unit's top-level DIEs, and builds a global hash index keyed
//! by `(name, tag)`. [`DwarfIndex::find`] then resolves a name/tag pair to a
//! [`Locator`] a caller's own DIE-materialization layer can use to decode
//! the full entry.
//!
//! This crate does not decode DIE attribute payloads beyond `DW_AT_name`,
//! does not write DWARF, and only understands x86-64 relocations against
//! ELF64, host-endian objects.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic, missing_docs)]

mod bytes;
mod dwarf;
mod elf;
mod error;
mod hash;
mod index;
mod loader;
mod options;

pub use error::{Error, Result};
pub use index::{DwarfIndex, Locator, SectionKind};
pub use options::{IndexOptions, OnFileError};

// Re-exported so callers building a materializer can match on the same tag
// values this crate indexes against.
pub use dwarf::{
    DW_TAG_BASE_TYPE, DW_TAG_CLASS_TYPE, DW_TAG_ENUMERATION_TYPE, DW_TAG_STRUCTURE_TYPE,
    DW_TAG_TYPEDEF, DW_TAG_UNION_TYPE, DW_TAG_VARIABLE,
};
