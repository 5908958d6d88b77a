//! The top-level index: owns every loaded file and the global hash table,
//! and answers `find` queries once construction completes.

use std::path::{Path, PathBuf};

use memmap2::MmapMut;
use tracing::{debug, instrument, trace, warn};

use crate::dwarf::{self, AbbrevDecl, CompilationUnit};
use crate::elf::{self, Sections};
use crate::error::Error;
use crate::hash::HashIndex;
use crate::loader;
use crate::options::{IndexOptions, OnFileError};

/// One loaded ELF file: its mapping and everything parsed out of it.
struct File {
    mmap: MmapMut,
    sections: Sections,
    cus: Vec<CompilationUnit>,
    decls: Vec<Vec<AbbrevDecl>>,
}

impl File {
    fn bytes(&self) -> &[u8] {
        &self.mmap
    }
}

/// The byte ranges a caller can use to materialize a CU or DIE on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// `.debug_abbrev`.
    DebugAbbrev,
    /// `.debug_info`.
    DebugInfo,
    /// `.debug_str`.
    DebugStr,
}

/// An opaque handle to an indexed DIE: enough for a caller's own
/// CU/DIE-materialization layer to locate it, nothing more.
#[derive(Debug, Clone, Copy)]
pub struct Locator {
    /// Index into the files this `DwarfIndex` was built from.
    pub file_index: usize,
    /// Offset of the owning CU's header, relative to `.debug_info`'s start.
    pub cu_offset: usize,
    /// Offset of the DIE, relative to its CU's header.
    pub die_offset: usize,
}

/// A fast, read-only index over DWARF debugging information extracted from
/// a set of ELF64 object files.
///
/// Built once via [`DwarfIndex::new`] and immutable afterwards; `find` is
/// safe to call concurrently from multiple threads.
pub struct DwarfIndex {
    files: Vec<File>,
    hash: HashIndex,
    address_size: u8,
}

impl DwarfIndex {
    /// Build an index over `paths`.
    ///
    /// Under [`OnFileError::FailFast`] (the default) the first failing file
    /// aborts construction and the error list in the returned tuple is
    /// always empty. Under [`OnFileError::SkipAndCollect`] failing files are
    /// skipped and their errors are returned alongside the index built from
    /// the rest.
    pub fn new<P: AsRef<Path>>(
        paths: &[P],
        options: IndexOptions,
    ) -> Result<(Self, Vec<(PathBuf, Error)>), Error> {
        let mut index = DwarfIndex {
            files: Vec::new(),
            hash: HashIndex::with_capacity(options.hash_capacity),
            address_size: 0,
        };
        let mut errors = Vec::new();

        for path in paths {
            let path = path.as_ref();
            match index.load_and_index_file(path) {
                Ok(()) => {}
                Err(err) => match options.on_file_error {
                    OnFileError::FailFast => return Err(err),
                    OnFileError::SkipAndCollect => {
                        warn!(path = %path.display(), error = %err, "skipping file");
                        errors.push((path.to_path_buf(), err));
                    }
                },
            }
        }

        Ok((index, errors))
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    fn load_and_index_file(&mut self, path: &Path) -> Result<(), Error> {
        let mut mmap = loader::open_file(path)?;

        let header = elf::ElfHeader::parse(&mmap)?;
        let sections = elf::read_sections(&mmap, &header)?;

        self.apply_relocations(&mut mmap, &sections)?;

        let debug_info_end = sections.debug_info.offset + sections.debug_info.size;
        let mut cus = Vec::new();
        let mut decls = Vec::new();
        let mut offset = sections.debug_info.offset;
        while offset < debug_info_end {
            let cu = dwarf::read_cu_header(&mmap, offset)?;
            let abbrev_offset = sections.debug_abbrev.offset + cu.debug_abbrev_offset as usize;
            let cu_decls = dwarf::parse_abbrev_table(&mmap, abbrev_offset, cu.is_64_bit, cu.address_size)?;
            debug!(cu_offset = offset, version = cu.version, "read compilation unit");
            offset = cu.end_offset();
            self.address_size = cu.address_size;
            cus.push(cu);
            decls.push(cu_decls);
        }

        let file_index = self.files.len();
        self.files.push(File {
            mmap,
            sections,
            cus,
            decls,
        });

        for cu_index in 0..self.files[file_index].cus.len() {
            let file_bytes: Vec<&[u8]> = self.files.iter().map(File::bytes).collect();
            let file = &self.files[file_index];
            let cu = file.cus[cu_index];
            let decls = &file.decls[cu_index];
            trace!(cu_index, "indexing compilation unit");
            dwarf::index_cu(
                file.bytes(),
                file.sections.debug_str.offset,
                &cu,
                decls,
                file_index,
                cu_index,
                &mut self.hash,
                &file_bytes,
            )?;
        }

        Ok(())
    }

    fn apply_relocations(&self, mmap: &mut MmapMut, sections: &Sections) -> Result<(), Error> {
        let symtab_bytes = mmap[sections.symtab.offset..sections.symtab.offset + sections.symtab.size].to_vec();

        let targets = [
            (&sections.debug_abbrev, sections.rela_debug_abbrev),
            (&sections.debug_info, sections.rela_debug_info),
            (&sections.debug_str, sections.rela_debug_str),
        ];

        for (target, rela) in targets {
            let Some(rela) = rela else {
                continue;
            };
            let rela_bytes = mmap[rela.offset..rela.offset + rela.size].to_vec();
            elf::apply_relocations(
                &mut mmap[target.offset..target.offset + target.size],
                &rela_bytes,
                &symtab_bytes,
            )?;
        }
        Ok(())
    }

    /// Look up `(name, tag)`, returning a locator if an entry was inserted
    /// with that key during construction.
    pub fn find(&self, name: &str, tag: u64) -> Option<Locator> {
        let file_bytes: Vec<&[u8]> = self.files.iter().map(File::bytes).collect();
        let entry = self.hash.find(&file_bytes, name.as_bytes(), tag)?;

        let file = &self.files[entry.file_index];
        let cu = &file.cus[entry.cu_index];
        Some(Locator {
            file_index: entry.file_index,
            cu_offset: cu.header_offset - file.sections.debug_info.offset,
            die_offset: entry.die_offset - cu.header_offset,
        })
    }

    /// Pointer width reported by the last CU processed across all files
    /// (`0` if no CU was ever processed).
    pub fn address_size(&self) -> u8 {
        self.address_size
    }

    /// Borrow a section's raw bytes for a given file, so an external
    /// collaborator can materialize CUs/DIEs on demand.
    pub fn section_bytes(&self, file_index: usize, section: SectionKind) -> Option<&[u8]> {
        let file = self.files.get(file_index)?;
        let s = match section {
            SectionKind::DebugAbbrev => &file.sections.debug_abbrev,
            SectionKind::DebugInfo => &file.sections.debug_info,
            SectionKind::DebugStr => &file.sections.debug_str,
        };
        Some(&file.mmap[s.offset..s.offset + s.size])
    }
}
