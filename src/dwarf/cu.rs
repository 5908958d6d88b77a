use crate::bytes::{u16_at, u32_at, u64_at, u8_at};
use crate::error::Error;

use super::DWARF64_SENTINEL;

/// One compilation unit's header, plus its position and extent inside
/// `.debug_info`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CompilationUnit {
    /// Byte offset of the CU header (the `unit_length` field) in `.debug_info`.
    pub(crate) header_offset: usize,
    /// `unit_length`, excluding the length field itself.
    pub(crate) unit_length: u64,
    pub(crate) version: u16,
    pub(crate) debug_abbrev_offset: u64,
    pub(crate) address_size: u8,
    pub(crate) is_64_bit: bool,
}

impl CompilationUnit {
    /// Offset of the first byte of the CU body (the root DIE's abbrev code),
    /// relative to `header_offset`.
    pub(crate) fn body_offset(&self) -> usize {
        if self.is_64_bit {
            23
        } else {
            11
        }
    }

    /// Absolute offset, in `.debug_info`, one past the end of this CU.
    pub(crate) fn end_offset(&self) -> usize {
        let length_field_size = if self.is_64_bit { 12 } else { 4 };
        self.header_offset + length_field_size + self.unit_length as usize
    }
}

/// Read one CU header starting at `debug_info[offset]`.
pub(crate) fn read_cu_header(debug_info: &[u8], offset: usize) -> Result<CompilationUnit, Error> {
    let mut cursor = offset;

    let first = u32_at(debug_info, cursor)?;
    cursor += 4;
    let (unit_length, is_64_bit) = if first == DWARF64_SENTINEL {
        let len = u64_at(debug_info, cursor)?;
        cursor += 8;
        (len, true)
    } else {
        (first as u64, false)
    };

    let version = u16_at(debug_info, cursor)?;
    cursor += 2;
    if !(2..=4).contains(&version) {
        return Err(Error::DwarfFormat {
            detail: format!("unsupported DWARF version {version}"),
        });
    }

    let debug_abbrev_offset = if is_64_bit {
        let v = u64_at(debug_info, cursor)?;
        cursor += 8;
        v
    } else {
        let v = u32_at(debug_info, cursor)? as u64;
        cursor += 4;
        v
    };

    let address_size = u8_at(debug_info, cursor)?;

    Ok(CompilationUnit {
        header_offset: offset,
        unit_length,
        version,
        debug_abbrev_offset,
        address_size,
        is_64_bit,
    })
}
