//! Maps an ELF file into memory privately-writable so relocations can patch
//! the in-memory view without touching the file on disk.

use std::fs::File as StdFile;
use std::path::Path;

use memmap2::{MmapMut, MmapOptions};

use crate::error::Error;

/// Open `path` read-only, `fstat` it, and map it `PRIVATE`/`READ|WRITE` (COW).
pub(crate) fn open_file(path: &Path) -> Result<MmapMut, Error> {
    let file = StdFile::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let metadata = file.metadata().map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if metadata.len() == 0 {
        return Err(Error::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "file is empty"),
        });
    }

    // SAFETY: the mapping is private (COW) and this crate is its only user
    // for the lifetime of the `DwarfIndex`; concurrent external mutation of
    // the backing file is the same hazard any mmap-based reader accepts.
    unsafe { MmapOptions::new().map_copy(&file) }.map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
