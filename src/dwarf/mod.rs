//! DWARF v2/v3/v4 parsing: compilation unit headers, abbreviation tables
//! compiled to a skip/extract command stream, and the CU indexer.

mod abbrev;
mod cmd;
mod cu;
mod indexer;
pub(crate) mod leb128;

pub(crate) use abbrev::parse_abbrev_table;
pub(crate) use cmd::AbbrevDecl;
pub(crate) use cu::{read_cu_header, CompilationUnit};
pub(crate) use indexer::index_cu;

// The indexable-tag whitelist. Re-exported from the crate root so callers
// building a materializer can match against them.

/// `DW_TAG_class_type`.
pub const DW_TAG_CLASS_TYPE: u64 = 0x02;
/// `DW_TAG_base_type`.
pub const DW_TAG_BASE_TYPE: u64 = 0x24;
/// `DW_TAG_enumeration_type`.
pub const DW_TAG_ENUMERATION_TYPE: u64 = 0x04;
/// `DW_TAG_structure_type`.
pub const DW_TAG_STRUCTURE_TYPE: u64 = 0x13;
/// `DW_TAG_typedef`.
pub const DW_TAG_TYPEDEF: u64 = 0x16;
/// `DW_TAG_union_type`.
pub const DW_TAG_UNION_TYPE: u64 = 0x17;
/// `DW_TAG_variable`.
pub const DW_TAG_VARIABLE: u64 = 0x34;

/// Tags that produce an index entry when named. All others are stored with
/// tag `0` ("uninteresting") by the abbreviation compiler.
pub(crate) fn is_indexable_tag(tag: u64) -> bool {
    matches!(
        tag,
        DW_TAG_BASE_TYPE
            | DW_TAG_CLASS_TYPE
            | DW_TAG_ENUMERATION_TYPE
            | DW_TAG_STRUCTURE_TYPE
            | DW_TAG_TYPEDEF
            | DW_TAG_UNION_TYPE
            | DW_TAG_VARIABLE
    )
}

// DW_AT_* constants relevant to abbreviation compilation.
pub(crate) const DW_AT_SIBLING: u64 = 0x01;
pub(crate) const DW_AT_NAME: u64 = 0x03;
pub(crate) const DW_AT_DECLARATION: u64 = 0x3c;

// DW_FORM_* constants.
pub(crate) const DW_FORM_ADDR: u64 = 0x01;
pub(crate) const DW_FORM_BLOCK2: u64 = 0x03;
pub(crate) const DW_FORM_BLOCK4: u64 = 0x04;
pub(crate) const DW_FORM_DATA2: u64 = 0x05;
pub(crate) const DW_FORM_DATA4: u64 = 0x06;
pub(crate) const DW_FORM_DATA8: u64 = 0x07;
pub(crate) const DW_FORM_STRING: u64 = 0x08;
// DW_FORM_block (0x09) is a real DWARF form but is not in the compiler's
// mapping table; it falls through to the unknown-form error like any other
// unhandled form value.
pub(crate) const DW_FORM_BLOCK1: u64 = 0x0a;
pub(crate) const DW_FORM_DATA1: u64 = 0x0b;
pub(crate) const DW_FORM_FLAG: u64 = 0x0c;
pub(crate) const DW_FORM_SDATA: u64 = 0x0d;
pub(crate) const DW_FORM_STRP: u64 = 0x0e;
pub(crate) const DW_FORM_UDATA: u64 = 0x0f;
pub(crate) const DW_FORM_REF_ADDR: u64 = 0x10;
pub(crate) const DW_FORM_REF1: u64 = 0x11;
pub(crate) const DW_FORM_REF2: u64 = 0x12;
pub(crate) const DW_FORM_REF4: u64 = 0x13;
pub(crate) const DW_FORM_REF8: u64 = 0x14;
pub(crate) const DW_FORM_REF_UDATA: u64 = 0x15;
pub(crate) const DW_FORM_INDIRECT: u64 = 0x16;
pub(crate) const DW_FORM_SEC_OFFSET: u64 = 0x17;
pub(crate) const DW_FORM_EXPRLOC: u64 = 0x18;
pub(crate) const DW_FORM_FLAG_PRESENT: u64 = 0x19;
pub(crate) const DW_FORM_REF_SIG8: u64 = 0x20;

/// `unit_length` sentinel that switches a CU to the DWARF-64 length/offset
/// encoding.
pub(crate) const DWARF64_SENTINEL: u32 = 0xffff_ffff;
