//! The abbreviation-to-bytecode compiler and the command constants its
//! interpreter (in `indexer.rs`) dispatches on.
//!
//! Commands partition into two ranges: `0..SPECIAL_CMD_BASE` is a short skip
//! of that many bytes, fused from adjacent fixed-size attributes; the rest
//! are one-off "special" operations (blocks, LEB128s, strings, sibling refs,
//! name attributes).

use crate::error::Error;

use super::{
    is_indexable_tag, DW_AT_DECLARATION, DW_AT_NAME, DW_AT_SIBLING, DW_FORM_ADDR,
    DW_FORM_BLOCK1, DW_FORM_BLOCK2, DW_FORM_BLOCK4, DW_FORM_DATA1, DW_FORM_DATA2, DW_FORM_DATA4,
    DW_FORM_DATA8, DW_FORM_EXPRLOC, DW_FORM_FLAG, DW_FORM_FLAG_PRESENT, DW_FORM_INDIRECT,
    DW_FORM_REF1, DW_FORM_REF2, DW_FORM_REF4, DW_FORM_REF8, DW_FORM_REF_ADDR, DW_FORM_REF_SIG8,
    DW_FORM_REF_UDATA, DW_FORM_SDATA, DW_FORM_SEC_OFFSET, DW_FORM_STRING, DW_FORM_STRP,
    DW_FORM_UDATA, DW_TAG_VARIABLE,
};

/// First value reserved for special (non-skip) commands.
pub(crate) const SPECIAL_CMD_BASE: u8 = 243;

pub(crate) const CMD_BLOCK1: u8 = 243;
pub(crate) const CMD_BLOCK2: u8 = 244;
pub(crate) const CMD_BLOCK4: u8 = 245;
pub(crate) const CMD_EXPRLOC: u8 = 246;
pub(crate) const CMD_LEB128: u8 = 247;
pub(crate) const CMD_STRING: u8 = 248;
pub(crate) const CMD_SIBLING_REF1: u8 = 249;
pub(crate) const CMD_SIBLING_REF2: u8 = 250;
pub(crate) const CMD_SIBLING_REF4: u8 = 251;
pub(crate) const CMD_SIBLING_REF8: u8 = 252;
pub(crate) const CMD_SIBLING_REF_UDATA: u8 = 253;
pub(crate) const CMD_NAME_STRP: u8 = 254;
pub(crate) const CMD_NAME_STRING: u8 = 255;

/// Cap a fused short-skip command can reach before it must be split.
const MAX_SHORT_SKIP: u32 = (SPECIAL_CMD_BASE - 1) as u32;

/// One compiled abbreviation declaration: a command stream, the effective
/// tag (`0` means "walk but don't index"), and whether the DIE has children.
#[derive(Debug, Clone)]
pub(crate) struct AbbrevDecl {
    pub(crate) cmds: Vec<u8>,
    pub(crate) tag: u64,
    pub(crate) has_children: bool,
}

struct Compiler {
    cmds: Vec<u8>,
    pending_skip: u32,
}

impl Compiler {
    fn new() -> Self {
        Self {
            cmds: Vec::new(),
            pending_skip: 0,
        }
    }

    fn skip(&mut self, n: u32) {
        self.pending_skip += n;
    }

    fn flush(&mut self) {
        while self.pending_skip >= SPECIAL_CMD_BASE as u32 {
            self.cmds.push(MAX_SHORT_SKIP as u8);
            self.pending_skip -= MAX_SHORT_SKIP;
        }
        if self.pending_skip > 0 {
            self.cmds.push(self.pending_skip as u8);
            self.pending_skip = 0;
        }
    }

    fn emit(&mut self, cmd: u8) {
        self.flush();
        self.cmds.push(cmd);
    }
}

/// Compile one abbreviation's `(tag, has_children, attrs)` into an
/// [`AbbrevDecl`]. `is_64_bit`/`address_size` come from the owning CU header
/// and affect the width of `addr`/`strp`/`ref_addr`/`sec_offset` forms.
pub(crate) fn compile_decl(
    tag: u64,
    has_children: bool,
    attrs: &[(u64, u64)],
    is_64_bit: bool,
    address_size: u8,
) -> Result<AbbrevDecl, Error> {
    let has_declaration = attrs.iter().any(|&(attr, _)| attr == DW_AT_DECLARATION);
    let effective_tag = if is_indexable_tag(tag) {
        if has_declaration && tag != DW_TAG_VARIABLE {
            0
        } else {
            tag
        }
    } else {
        0
    };

    let offset_size: u32 = if is_64_bit { 8 } else { 4 };
    let mut compiler = Compiler::new();

    for &(attr, form) in attrs {
        if attr == DW_AT_SIBLING {
            let cmd = match form {
                DW_FORM_REF1 => Some(CMD_SIBLING_REF1),
                DW_FORM_REF2 => Some(CMD_SIBLING_REF2),
                DW_FORM_REF4 => Some(CMD_SIBLING_REF4),
                DW_FORM_REF8 => Some(CMD_SIBLING_REF8),
                DW_FORM_REF_UDATA => Some(CMD_SIBLING_REF_UDATA),
                _ => None,
            };
            if let Some(cmd) = cmd {
                compiler.emit(cmd);
                continue;
            }
        }
        if attr == DW_AT_NAME && effective_tag != 0 {
            match form {
                DW_FORM_STRP => {
                    compiler.emit(CMD_NAME_STRP);
                    continue;
                }
                DW_FORM_STRING => {
                    compiler.emit(CMD_NAME_STRING);
                    continue;
                }
                _ => {}
            }
        }

        match form {
            DW_FORM_ADDR => compiler.skip(address_size as u32),
            DW_FORM_DATA1 | DW_FORM_REF1 | DW_FORM_FLAG => compiler.skip(1),
            DW_FORM_DATA2 | DW_FORM_REF2 => compiler.skip(2),
            DW_FORM_DATA4 | DW_FORM_REF4 => compiler.skip(4),
            DW_FORM_DATA8 | DW_FORM_REF8 | DW_FORM_REF_SIG8 => compiler.skip(8),
            DW_FORM_REF_ADDR | DW_FORM_SEC_OFFSET | DW_FORM_STRP => compiler.skip(offset_size),
            DW_FORM_BLOCK1 => compiler.emit(CMD_BLOCK1),
            DW_FORM_BLOCK2 => compiler.emit(CMD_BLOCK2),
            DW_FORM_BLOCK4 => compiler.emit(CMD_BLOCK4),
            DW_FORM_EXPRLOC => compiler.emit(CMD_EXPRLOC),
            DW_FORM_SDATA | DW_FORM_UDATA | DW_FORM_REF_UDATA => compiler.emit(CMD_LEB128),
            DW_FORM_STRING => compiler.emit(CMD_STRING),
            DW_FORM_FLAG_PRESENT => {}
            DW_FORM_INDIRECT => {
                return Err(Error::NotImplemented {
                    detail: "DW_FORM_indirect is not supported".into(),
                })
            }
            other => {
                return Err(Error::DwarfFormat {
                    detail: format!("unknown DW_FORM value {other:#x}"),
                })
            }
        }
    }

    compiler.flush();
    compiler.cmds.push(0);
    compiler.cmds.push(effective_tag as u8);
    compiler.cmds.push(has_children as u8);

    Ok(AbbrevDecl {
        cmds: compiler.cmds,
        tag: effective_tag,
        has_children,
    })
}
