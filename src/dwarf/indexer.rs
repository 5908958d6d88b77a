use crate::bytes::{cstr_range_at, u16_at, u32_at, u64_at, u8_at};
use crate::error::Error;
use crate::hash::HashIndex;

use super::cmd::{
    AbbrevDecl, CMD_BLOCK1, CMD_BLOCK2, CMD_BLOCK4, CMD_EXPRLOC, CMD_LEB128, CMD_NAME_STRING,
    CMD_NAME_STRP, CMD_SIBLING_REF1, CMD_SIBLING_REF2, CMD_SIBLING_REF4, CMD_SIBLING_REF8,
    CMD_SIBLING_REF_UDATA, CMD_STRING, SPECIAL_CMD_BASE,
};
use super::cu::CompilationUnit;
use super::leb128::{read_uleb128, skip_leb128};

fn check_bound(ptr: usize, cu_end: usize) -> Result<(), Error> {
    if ptr > cu_end {
        return Err(Error::Eof {
            detail: format!("DIE read at {ptr:#x} ran past CU end {cu_end:#x}"),
        });
    }
    Ok(())
}

/// Walk one CU's top-level DIEs, inserting `(name, tag)` pairs into `hash`.
///
/// `file_buf` is the whole file's mapping; `cu.header_offset` and
/// `debug_str_base` are absolute offsets within it. `file_index`/`cu_index`
/// identify the owning file/CU for the entries this CU contributes.
#[allow(clippy::too_many_arguments)]
pub(crate) fn index_cu(
    file_buf: &[u8],
    debug_str_base: usize,
    cu: &CompilationUnit,
    decls: &[AbbrevDecl],
    file_index: usize,
    cu_index: usize,
    hash: &mut HashIndex,
    all_file_bytes: &[&[u8]],
) -> Result<(), Error> {
    let cu_end = cu.end_offset();
    let mut ptr = cu.header_offset + cu.body_offset();
    let mut depth: i32 = 1;

    loop {
        check_bound(ptr, cu_end)?;
        let die_start = ptr;
        let code = read_uleb128(file_buf, &mut ptr)?;

        if code == 0 {
            depth -= 1;
            if depth <= 0 {
                break;
            }
            continue;
        }

        if code > decls.len() as u64 {
            return Err(Error::DwarfFormat {
                detail: format!("abbrev code {code} out of range (CU has {} decls)", decls.len()),
            });
        }
        let decl = &decls[(code - 1) as usize];

        let mut name: Option<(usize, usize)> = None;
        let mut sibling: Option<usize> = None;

        let mut cmd_idx = 0usize;
        loop {
            let c = decl.cmds[cmd_idx];
            cmd_idx += 1;
            if c == 0 {
                break;
            }
            if c < SPECIAL_CMD_BASE {
                ptr += c as usize;
                check_bound(ptr, cu_end)?;
                continue;
            }
            match c {
                CMD_BLOCK1 => {
                    let len = u8_at(file_buf, ptr)? as usize;
                    ptr += 1 + len;
                }
                CMD_BLOCK2 => {
                    let len = u16_at(file_buf, ptr)? as usize;
                    ptr += 2 + len;
                }
                CMD_BLOCK4 => {
                    let len = u32_at(file_buf, ptr)? as usize;
                    ptr += 4 + len;
                }
                CMD_EXPRLOC => {
                    let len = read_uleb128(file_buf, &mut ptr)? as usize;
                    ptr += len;
                }
                CMD_LEB128 => {
                    skip_leb128(file_buf, &mut ptr)?;
                }
                CMD_STRING => {
                    let range = cstr_range_at(file_buf, ptr)?;
                    ptr = range.end + 1;
                }
                CMD_SIBLING_REF1 => {
                    let off = u8_at(file_buf, ptr)? as usize;
                    ptr += 1;
                    sibling = Some(cu.header_offset + off);
                }
                CMD_SIBLING_REF2 => {
                    let off = u16_at(file_buf, ptr)? as usize;
                    ptr += 2;
                    sibling = Some(cu.header_offset + off);
                }
                CMD_SIBLING_REF4 => {
                    let off = u32_at(file_buf, ptr)? as usize;
                    ptr += 4;
                    sibling = Some(cu.header_offset + off);
                }
                CMD_SIBLING_REF8 => {
                    let off = u64_at(file_buf, ptr)? as usize;
                    ptr += 8;
                    sibling = Some(cu.header_offset + off);
                }
                CMD_SIBLING_REF_UDATA => {
                    let off = read_uleb128(file_buf, &mut ptr)? as usize;
                    sibling = Some(cu.header_offset + off);
                }
                CMD_NAME_STRP => {
                    let strp = if cu.is_64_bit {
                        let v = u64_at(file_buf, ptr)? as usize;
                        ptr += 8;
                        v
                    } else {
                        let v = u32_at(file_buf, ptr)? as usize;
                        ptr += 4;
                        v
                    };
                    let abs = debug_str_base + strp;
                    let range = cstr_range_at(file_buf, abs)?;
                    name = Some((range.start, range.len()));
                }
                CMD_NAME_STRING => {
                    let range = cstr_range_at(file_buf, ptr)?;
                    name = Some((range.start, range.len()));
                    ptr = range.end + 1;
                }
                other => {
                    return Err(Error::DwarfFormat {
                        detail: format!("unknown compiled command {other}"),
                    })
                }
            }
            check_bound(ptr, cu_end)?;
        }

        if depth == 1 {
            if let Some((name_offset, name_len)) = name {
                if decl.tag != 0 {
                    let name_bytes = &file_buf[name_offset..name_offset + name_len];
                    hash.insert(all_file_bytes, name_bytes, file_index, name_offset, decl.tag, cu_index, die_start)?;
                }
            }
        }

        if decl.has_children {
            if let Some(sib) = sibling {
                ptr = sib;
            } else {
                depth += 1;
            }
        } else if depth == 0 {
            break;
        }
    }

    Ok(())
}
