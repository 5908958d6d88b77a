//! Tunable construction options, mirroring the teacher crate's `Config`
//! builder pattern.

use typed_builder::TypedBuilder;

use crate::hash::DEFAULT_CAPACITY;

/// How `DwarfIndex::new` should react when one input file fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnFileError {
    /// Abort construction at the first error; no partial index is returned.
    #[default]
    FailFast,
    /// Record the error, skip that file, and continue with the rest.
    SkipAndCollect,
}

/// Construction-time configuration for [`crate::DwarfIndex::new`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct IndexOptions {
    /// Hash table capacity; must be a power of two.
    #[builder(default = DEFAULT_CAPACITY)]
    pub hash_capacity: usize,

    /// What to do when a file fails to load or parse.
    #[builder(default)]
    pub on_file_error: OnFileError,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}
