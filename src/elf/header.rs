use crate::bytes::{u16_at, u64_at, u8_at};
use crate::error::Error;

use super::{ELFCLASS64, ELFDATA2LSB, ELFDATA2MSB, EV_CURRENT};

const EI_MAG0: usize = 0;
const EI_CLASS: usize = 4;
const EI_DATA: usize = 5;
const EI_VERSION: usize = 6;
const EHDR_SIZE: usize = 64;

/// The fields of `Elf64_Ehdr` this crate needs to locate the section table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ElfHeader {
    pub(crate) e_shoff: u64,
    pub(crate) e_shentsize: u16,
    pub(crate) e_shnum: u16,
    pub(crate) e_shstrndx: u16,
}

impl ElfHeader {
    /// Parse and validate the identification bytes and the fields needed to
    /// reach the section header table.
    ///
    /// Rejects anything that is not a 64-bit, host-endian, current-version
    /// ELF object — this crate has no use for 32-bit objects or foreign
    /// endianness (see `Error::NotImplemented`).
    pub(crate) fn parse(buf: &[u8]) -> Result<Self, Error> {
        if buf.len() < EHDR_SIZE {
            return Err(Error::Eof {
                detail: format!("ELF header truncated: {} bytes, need {EHDR_SIZE}", buf.len()),
            });
        }
        if &buf[EI_MAG0..EI_MAG0 + 4] != b"\x7fELF" {
            return Err(Error::ElfFormat {
                detail: "bad ELF magic".into(),
            });
        }

        let class = u8_at(buf, EI_CLASS)?;
        if class != ELFCLASS64 {
            return Err(Error::NotImplemented {
                detail: format!("ELF class {class} is not ELFCLASS64"),
            });
        }

        let data = u8_at(buf, EI_DATA)?;
        let host_data = if cfg!(target_endian = "little") {
            ELFDATA2LSB
        } else {
            ELFDATA2MSB
        };
        if data != host_data {
            return Err(Error::NotImplemented {
                detail: format!("ELF data encoding {data} does not match host endianness"),
            });
        }

        let version = u8_at(buf, EI_VERSION)?;
        if version != EV_CURRENT {
            return Err(Error::ElfFormat {
                detail: format!("unsupported EI_VERSION {version}"),
            });
        }

        let e_shoff = u64_at(buf, 0x28)?;
        let e_shentsize = u16_at(buf, 0x3a)?;
        let e_shnum = u16_at(buf, 0x3c)?;
        let e_shstrndx = u16_at(buf, 0x3e)?;

        if e_shnum == 0 {
            return Err(Error::ElfFormat {
                detail: "e_shnum is zero, no section header table".into(),
            });
        }
        Ok(Self {
            e_shoff,
            e_shentsize,
            e_shnum,
            e_shstrndx,
        })
    }
}
