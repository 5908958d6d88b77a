//! Hand-assembles minimal ELF64 objects carrying `.debug_abbrev`,
//! `.debug_info` and `.debug_str` sections so the integration tests can
//! exercise `DwarfIndex::new` against real files on disk without a real
//! compiler or `objcopy` in the loop.

use std::io::Write;

use tempfile::NamedTempFile;

const SHDR_SIZE: usize = 64;

/// ULEB128-encode `v`, matching the compiled abbreviation tables' encoding.
pub fn uleb(v: u64) -> Vec<u8> {
    let mut out = Vec::new();
    let mut v = v;
    loop {
        let mut byte = (v & 0x7f) as u8;
        v >>= 7;
        if v != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if v == 0 {
            break;
        }
    }
    out
}

fn write_shdr(buf: &mut [u8], at: usize, name: u32, ty: u32, offset: u64, size: u64, link: u32, info: u32) {
    buf[at..at + 4].copy_from_slice(&name.to_le_bytes());
    buf[at + 4..at + 8].copy_from_slice(&ty.to_le_bytes());
    buf[at + 24..at + 32].copy_from_slice(&offset.to_le_bytes());
    buf[at + 32..at + 40].copy_from_slice(&size.to_le_bytes());
    buf[at + 40..at + 44].copy_from_slice(&link.to_le_bytes());
    buf[at + 44..at + 48].copy_from_slice(&info.to_le_bytes());
}

/// Build a minimal 64-bit little-endian ELF object with a `.symtab` (empty),
/// `.debug_abbrev`, `.debug_info` and `.debug_str`, and hand it back as a
/// [`NamedTempFile`] so the caller can pass its path straight to
/// `DwarfIndex::new`.
pub fn build_object(debug_abbrev: &[u8], debug_info: &[u8], debug_str: &[u8]) -> NamedTempFile {
    build_object_with_relocations(debug_abbrev, debug_info, debug_str, &[], None)
}

/// A single `Elf64_Sym` entry with `st_value` set and every other field zero.
pub fn sym_entry(st_value: u64) -> [u8; 24] {
    let mut buf = [0u8; 24];
    buf[8..16].copy_from_slice(&st_value.to_le_bytes());
    buf
}

/// A single `Elf64_Rela` entry: `r_offset` is relative to the target
/// section, `r_sym` indexes `symtab`, `r_type` is the x86-64 relocation
/// type, `r_addend` is signed.
pub fn rela_entry(r_offset: u64, r_sym: u32, r_type: u32, r_addend: i64) -> [u8; 24] {
    let mut buf = [0u8; 24];
    buf[0..8].copy_from_slice(&r_offset.to_le_bytes());
    let info = ((r_sym as u64) << 32) | r_type as u64;
    buf[8..16].copy_from_slice(&info.to_le_bytes());
    buf[16..24].copy_from_slice(&(r_addend as u64).to_le_bytes());
    buf
}

/// Like [`build_object`], but with a real `.symtab` and, if given, a
/// `.rela.debug_info` section applied against `.debug_info` before indexing.
pub fn build_object_with_relocations(
    debug_abbrev: &[u8],
    debug_info: &[u8],
    debug_str: &[u8],
    symtab: &[u8],
    rela_debug_info: Option<&[u8]>,
) -> NamedTempFile {
    let n_sections = if rela_debug_info.is_some() { 7 } else { 6 };

    let mut shstrtab = vec![0u8]; // index 0: empty string
    let debug_abbrev_name = shstrtab.len() as u32;
    shstrtab.extend_from_slice(b".debug_abbrev\0");
    let debug_info_name = shstrtab.len() as u32;
    shstrtab.extend_from_slice(b".debug_info\0");
    let debug_str_name = shstrtab.len() as u32;
    shstrtab.extend_from_slice(b".debug_str\0");

    let data_start = 64 + n_sections * SHDR_SIZE;
    let abbrev_off = data_start;
    let info_off = abbrev_off + debug_abbrev.len();
    let str_off = info_off + debug_info.len();
    let symtab_off = str_off + debug_str.len();
    let rela_off = symtab_off + symtab.len();
    let shstrtab_off = rela_off + rela_debug_info.map_or(0, <[u8]>::len);
    let total = shstrtab_off + shstrtab.len();

    let mut buf = vec![0u8; total];

    // ELF64 header.
    buf[0..4].copy_from_slice(b"\x7fELF");
    buf[4] = 2; // ELFCLASS64
    buf[5] = 1; // ELFDATA2LSB
    buf[6] = 1; // EV_CURRENT
    buf[0x28..0x30].copy_from_slice(&64u64.to_le_bytes()); // e_shoff
    buf[0x3a..0x3c].copy_from_slice(&(SHDR_SIZE as u16).to_le_bytes()); // e_shentsize
    buf[0x3c..0x3e].copy_from_slice(&(n_sections as u16).to_le_bytes()); // e_shnum
    buf[0x3e..0x40].copy_from_slice(&1u16.to_le_bytes()); // e_shstrndx

    // Section header table: [0] null, [1] .shstrtab, [2] .debug_abbrev,
    // [3] .debug_info, [4] .debug_str, [5] .symtab, [6] .rela.debug_info.
    let sh_base = 64;
    write_shdr(&mut buf, sh_base + SHDR_SIZE, 0, 3, shstrtab_off as u64, shstrtab.len() as u64, 0, 0);
    write_shdr(&mut buf, sh_base + 2 * SHDR_SIZE, debug_abbrev_name, 1, abbrev_off as u64, debug_abbrev.len() as u64, 0, 0);
    write_shdr(&mut buf, sh_base + 3 * SHDR_SIZE, debug_info_name, 1, info_off as u64, debug_info.len() as u64, 0, 0);
    write_shdr(&mut buf, sh_base + 4 * SHDR_SIZE, debug_str_name, 1, str_off as u64, debug_str.len() as u64, 0, 0);
    write_shdr(&mut buf, sh_base + 5 * SHDR_SIZE, 0, 2, symtab_off as u64, symtab.len() as u64, 0, 0);
    if let Some(rela) = rela_debug_info {
        // SHT_RELA = 4, sh_link -> symtab (index 5), sh_info -> .debug_info (index 3).
        write_shdr(&mut buf, sh_base + 6 * SHDR_SIZE, 0, 4, rela_off as u64, rela.len() as u64, 5, 3);
    }

    buf[abbrev_off..abbrev_off + debug_abbrev.len()].copy_from_slice(debug_abbrev);
    buf[info_off..info_off + debug_info.len()].copy_from_slice(debug_info);
    buf[str_off..str_off + debug_str.len()].copy_from_slice(debug_str);
    buf[symtab_off..symtab_off + symtab.len()].copy_from_slice(symtab);
    if let Some(rela) = rela_debug_info {
        buf[rela_off..rela_off + rela.len()].copy_from_slice(rela);
    }
    buf[shstrtab_off..shstrtab_off + shstrtab.len()].copy_from_slice(&shstrtab);

    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(&buf).expect("write object bytes");
    file.flush().expect("flush object bytes");
    file
}

/// One `DW_TAG_variable`/`DW_TAG_structure_type`-shaped abbreviation: code 1,
/// no children, a single `DW_AT_name` attribute in the given form, optionally
/// followed by `DW_AT_declaration`/`DW_FORM_flag_present`.
pub fn simple_named_abbrev_table(tag: u64, name_form: u64, declaration: bool) -> Vec<u8> {
    const DW_AT_NAME: u64 = 0x03;
    const DW_AT_DECLARATION: u64 = 0x3c;
    const DW_FORM_FLAG_PRESENT: u64 = 0x19;

    let mut buf = Vec::new();
    buf.extend(uleb(1)); // code
    buf.extend(uleb(tag));
    buf.push(0); // no children
    buf.extend(uleb(DW_AT_NAME));
    buf.extend(uleb(name_form));
    if declaration {
        buf.extend(uleb(DW_AT_DECLARATION));
        buf.extend(uleb(DW_FORM_FLAG_PRESENT));
    }
    buf.extend(uleb(0));
    buf.extend(uleb(0)); // attribute list terminator
    buf.extend(uleb(0)); // table terminator
    buf
}

/// A 32-bit DWARF CU header (`version`/`address_size` fixed at 4/8) wrapping
/// `body`.
pub fn cu32(body: &[u8]) -> Vec<u8> {
    let mut info = Vec::new();
    info.extend_from_slice(&(7 + body.len() as u32).to_le_bytes()); // unit_length
    info.extend_from_slice(&4u16.to_le_bytes()); // version
    info.extend_from_slice(&0u32.to_le_bytes()); // debug_abbrev_offset
    info.push(8); // address_size
    info.extend_from_slice(body);
    info
}
