use crate::bytes::{slice_at, u64_at};
use crate::error::Error;

use super::{RelocType, RELA_SIZE, SYM_SIZE};

/// Apply every relocation in `rela` (a packed `Elf64_Rela` array) to `target`,
/// resolving symbol values from `symtab` (a packed `Elf64_Sym` array).
///
/// `target` is the private mapping's view of the section the relocations
/// describe; writes land directly in the mmap's COW page.
pub(crate) fn apply_relocations(target: &mut [u8], rela: &[u8], symtab: &[u8]) -> Result<(), Error> {
    if rela.len() % RELA_SIZE != 0 {
        return Err(Error::ElfFormat {
            detail: format!("rela section size {} is not a multiple of {RELA_SIZE}", rela.len()),
        });
    }
    let num_syms = symtab.len() / SYM_SIZE;

    for chunk in rela.chunks_exact(RELA_SIZE) {
        let r_offset = u64_at(chunk, 0)?;
        let r_info = u64_at(chunk, 8)?;
        let r_addend = u64_at(chunk, 16)? as i64;

        let r_sym = (r_info >> 32) as u32;
        let r_type = (r_info & 0xffff_ffff) as u32;

        let reloc = RelocType::from_r_type(r_type).ok_or_else(|| Error::NotImplemented {
            detail: format!("unsupported relocation type {r_type}"),
        })?;
        if matches!(reloc, RelocType::None) {
            continue;
        }

        let sym_index = r_sym as usize;
        if sym_index >= num_syms {
            return Err(Error::ElfFormat {
                detail: format!("relocation symbol index {sym_index} out of range ({num_syms} symbols)"),
            });
        }
        let sym = slice_at(symtab, sym_index * SYM_SIZE, SYM_SIZE)?;
        let st_value = u64_at(sym, 8)?;
        let value = st_value.wrapping_add(r_addend as u64);

        let offset = usize::try_from(r_offset).map_err(|_| Error::ElfFormat {
            detail: format!("r_offset {r_offset:#x} does not fit in usize"),
        })?;

        match reloc {
            RelocType::None => unreachable!(),
            RelocType::Abs32 => {
                let dst = target.get_mut(offset..offset + 4).ok_or_else(|| Error::ElfFormat {
                    detail: format!("relocation offset {offset:#x} out of range of target section"),
                })?;
                dst.copy_from_slice(&(value as u32).to_le_bytes());
            }
            RelocType::Abs64 => {
                let dst = target.get_mut(offset..offset + 8).ok_or_else(|| Error::ElfFormat {
                    detail: format!("relocation offset {offset:#x} out of range of target section"),
                })?;
                dst.copy_from_slice(&value.to_le_bytes());
            }
        }
    }

    Ok(())
}
