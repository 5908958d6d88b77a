//! ELF64 structures: header, section headers, symbols and relocations.
//!
//! Only what the indexing pipeline needs is modeled here — there is no
//! writer, no program header support, and no 32-bit class. Nothing in this
//! module is part of the crate's public API; it exists to support
//! [`crate::DwarfIndex`].

mod header;
mod reloc;
mod section;

pub(crate) use header::ElfHeader;
pub(crate) use reloc::apply_relocations;
pub(crate) use section::{read_sections, Sections};

/// `e_ident[EI_CLASS]` value for 64-bit objects. 32-bit (`1`) is rejected.
pub(crate) const ELFCLASS64: u8 = 2;

/// `e_ident[EI_DATA]` value for little-endian objects.
pub(crate) const ELFDATA2LSB: u8 = 1;
/// `e_ident[EI_DATA]` value for big-endian objects.
pub(crate) const ELFDATA2MSB: u8 = 2;

/// `e_ident[EI_VERSION]` / `EI_VERSION` required value.
pub(crate) const EV_CURRENT: u8 = 1;

/// Section types this crate cares about.
pub(crate) const SHT_PROGBITS: u32 = 1;
pub(crate) const SHT_SYMTAB: u32 = 2;
pub(crate) const SHT_RELA: u32 = 4;

/// Sentinel `sh_name`/section-index values from the special-section range.
pub(crate) const SHN_XINDEX: u16 = 0xffff;

/// Size in bytes of an on-disk `Elf64_Shdr`.
pub(crate) const SHDR_SIZE: usize = 64;
/// Size in bytes of an on-disk `Elf64_Sym`.
pub(crate) const SYM_SIZE: usize = 24;
/// Size in bytes of an on-disk `Elf64_Rela`.
pub(crate) const RELA_SIZE: usize = 24;

pub(crate) const DEBUG_ABBREV: &str = ".debug_abbrev";
pub(crate) const DEBUG_INFO: &str = ".debug_info";
pub(crate) const DEBUG_STR: &str = ".debug_str";

/// x86-64 relocation types this crate knows how to apply.
///
/// `R_X86_64_PC32` (2) is a real, common relocation type but is
/// PC-relative rather than absolute and is intentionally not represented
/// here; `RelocType::from_r_type` returns `None` for it like any other
/// unsupported type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, num_derive::FromPrimitive)]
pub(crate) enum RelocType {
    None = 0,
    Abs64 = 1,
    Abs32 = 10,
}

impl RelocType {
    pub(crate) fn from_r_type(r_type: u32) -> Option<Self> {
        num_traits::FromPrimitive::from_u32(r_type)
    }
}
