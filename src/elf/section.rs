use crate::bytes::{cstr_at, slice_at, u32_at, u64_at};
use crate::error::Error;

use super::header::ElfHeader;
use super::{DEBUG_ABBREV, DEBUG_INFO, DEBUG_STR, SHDR_SIZE, SHN_XINDEX, SHT_PROGBITS, SHT_RELA, SHT_SYMTAB};

/// A byte range inside a file's mapping, plus the section header index it
/// came from (kept around so the relocator's `sh_info`/`sh_link` checks can
/// cross-reference sections by index).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Section {
    pub(crate) index: usize,
    pub(crate) offset: usize,
    pub(crate) size: usize,
}

/// The sections the indexing pipeline cares about, resolved from one file's
/// section header table.
#[derive(Debug, Clone)]
pub(crate) struct Sections {
    pub(crate) symtab: Section,
    pub(crate) debug_abbrev: Section,
    pub(crate) debug_info: Section,
    pub(crate) debug_str: Section,
    pub(crate) rela_debug_abbrev: Option<Section>,
    pub(crate) rela_debug_info: Option<Section>,
    pub(crate) rela_debug_str: Option<Section>,
}

struct RawShdr {
    sh_name: u32,
    sh_type: u32,
    sh_offset: u64,
    sh_size: u64,
    sh_link: u32,
    sh_info: u32,
}

fn read_shdr(buf: &[u8], off: usize) -> Result<RawShdr, Error> {
    Ok(RawShdr {
        sh_name: u32_at(buf, off)?,
        sh_type: u32_at(buf, off + 4)?,
        sh_offset: u64_at(buf, off + 24)?,
        sh_size: u64_at(buf, off + 32)?,
        sh_link: u32_at(buf, off + 40)?,
        sh_info: u32_at(buf, off + 44)?,
    })
}

fn section_bounds(buf: &[u8], sh_offset: u64, sh_size: u64) -> Result<(usize, usize), Error> {
    let offset = usize::try_from(sh_offset).map_err(|_| Error::ElfFormat {
        detail: format!("sh_offset {sh_offset:#x} does not fit in usize"),
    })?;
    let size = usize::try_from(sh_size).map_err(|_| Error::ElfFormat {
        detail: format!("sh_size {sh_size:#x} does not fit in usize"),
    })?;
    slice_at(buf, offset, size)?;
    Ok((offset, size))
}

/// Validate the ELF header's section-table fields, read every section
/// header, and resolve the five sections the pipeline needs.
pub(crate) fn read_sections(buf: &[u8], header: &ElfHeader) -> Result<Sections, Error> {
    if header.e_shentsize as usize != SHDR_SIZE {
        return Err(Error::ElfFormat {
            detail: format!("unexpected e_shentsize {}", header.e_shentsize),
        });
    }

    let shoff = usize::try_from(header.e_shoff).map_err(|_| Error::ElfFormat {
        detail: format!("e_shoff {:#x} does not fit in usize", header.e_shoff),
    })?;
    let table_size = header.e_shnum as usize * SHDR_SIZE;
    slice_at(buf, shoff, table_size)?;

    let shdrs: Vec<RawShdr> = (0..header.e_shnum as usize)
        .map(|i| read_shdr(buf, shoff + i * SHDR_SIZE))
        .collect::<Result<_, _>>()?;

    let shstrndx = if header.e_shstrndx == SHN_XINDEX {
        shdrs
            .first()
            .ok_or_else(|| Error::ElfFormat {
                detail: "SHN_XINDEX but no section 0 to read sh_link from".into(),
            })?
            .sh_link as usize
    } else {
        header.e_shstrndx as usize
    };
    let strtab = shdrs.get(shstrndx).ok_or_else(|| Error::ElfFormat {
        detail: format!("section header string table index {shstrndx} out of range"),
    })?;
    let (strtab_off, strtab_size) = section_bounds(buf, strtab.sh_offset, strtab.sh_size)?;
    let strtab_bytes = &buf[strtab_off..strtab_off + strtab_size];

    let name_of = |sh_name: u32| -> Result<&[u8], Error> { cstr_at(strtab_bytes, sh_name as usize) };

    let mut symtab = None;
    let mut debug_abbrev = None;
    let mut debug_info = None;
    let mut debug_str = None;

    for (i, shdr) in shdrs.iter().enumerate() {
        if shdr.sh_type == SHT_SYMTAB && symtab.is_none() {
            let (offset, size) = section_bounds(buf, shdr.sh_offset, shdr.sh_size)?;
            symtab = Some(Section { index: i, offset, size });
            continue;
        }
        if shdr.sh_type != SHT_PROGBITS {
            continue;
        }
        let name = name_of(shdr.sh_name)?;
        let (offset, size) = section_bounds(buf, shdr.sh_offset, shdr.sh_size)?;
        let section = Section { index: i, offset, size };
        match name {
            n if n == DEBUG_ABBREV.as_bytes() && debug_abbrev.is_none() => debug_abbrev = Some(section),
            n if n == DEBUG_INFO.as_bytes() && debug_info.is_none() => debug_info = Some(section),
            n if n == DEBUG_STR.as_bytes() && debug_str.is_none() => debug_str = Some(section),
            _ => {}
        }
    }

    let symtab = symtab.ok_or_else(|| Error::DwarfFormat {
        detail: "no SHT_SYMTAB section present".into(),
    })?;
    let debug_abbrev = debug_abbrev.ok_or_else(|| Error::DwarfFormat {
        detail: format!("missing {DEBUG_ABBREV} section"),
    })?;
    let debug_info = debug_info.ok_or_else(|| Error::DwarfFormat {
        detail: format!("missing {DEBUG_INFO} section"),
    })?;
    let debug_str = debug_str.ok_or_else(|| Error::DwarfFormat {
        detail: format!("missing {DEBUG_STR} section"),
    })?;

    let mut rela_debug_abbrev = None;
    let mut rela_debug_info = None;
    let mut rela_debug_str = None;

    for shdr in shdrs.iter().filter(|s| s.sh_type == SHT_RELA) {
        let target = shdr.sh_info as usize;
        let slot = if target == debug_abbrev.index {
            Some(&mut rela_debug_abbrev)
        } else if target == debug_info.index {
            Some(&mut rela_debug_info)
        } else if target == debug_str.index {
            Some(&mut rela_debug_str)
        } else {
            None
        };
        let Some(slot) = slot else { continue };
        if shdr.sh_link as usize != symtab.index {
            return Err(Error::ElfFormat {
                detail: format!(
                    "SHT_RELA targeting section {target} links symtab {} but expected {}",
                    shdr.sh_link, symtab.index
                ),
            });
        }
        let (offset, size) = section_bounds(buf, shdr.sh_offset, shdr.sh_size)?;
        *slot = Some(Section {
            index: shdr.sh_info as usize,
            offset,
            size,
        });
    }

    Ok(Sections {
        symtab,
        debug_abbrev,
        debug_info,
        debug_str,
        rela_debug_abbrev,
        rela_debug_info,
        rela_debug_str,
    })
}
