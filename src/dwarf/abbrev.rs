use crate::error::Error;

use super::cmd::{compile_decl, AbbrevDecl};
use super::leb128::read_uleb128;

/// Parse and compile the abbreviation table for one CU, starting at
/// `debug_abbrev[offset]`. Returns decls indexed by `code - 1`.
///
/// Abbreviation codes must be assigned sequentially starting at 1; anything
/// else is rejected rather than handled via a lookup table, matching how
/// every abbreviation table produced by mainstream toolchains is laid out.
pub(crate) fn parse_abbrev_table(
    debug_abbrev: &[u8],
    offset: usize,
    is_64_bit: bool,
    address_size: u8,
) -> Result<Vec<AbbrevDecl>, Error> {
    let mut cursor = offset;
    let mut decls = Vec::new();

    loop {
        let code = read_uleb128(debug_abbrev, &mut cursor)?;
        if code == 0 {
            return Ok(decls);
        }
        if code != decls.len() as u64 + 1 {
            return Err(Error::NotImplemented {
                detail: format!("abbreviation table is not sequential: got code {code}, expected {}", decls.len() + 1),
            });
        }

        let tag = read_uleb128(debug_abbrev, &mut cursor)?;
        let children = *debug_abbrev.get(cursor).ok_or_else(|| Error::Eof {
            detail: format!("abbrev children flag truncated at {cursor:#x}"),
        })?;
        cursor += 1;

        let mut attrs = Vec::new();
        loop {
            let attr = read_uleb128(debug_abbrev, &mut cursor)?;
            let form = read_uleb128(debug_abbrev, &mut cursor)?;
            if attr == 0 && form == 0 {
                break;
            }
            attrs.push((attr, form));
        }

        decls.push(compile_decl(tag, children != 0, &attrs, is_64_bit, address_size)?);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dwarf::{DW_FORM_FLAG_PRESENT, DW_TAG_VARIABLE};

    fn uleb(v: u64) -> Vec<u8> {
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

    #[test]
    fn parses_single_decl_table() {
        let mut buf = Vec::new();
        buf.extend(uleb(1)); // code
        buf.extend(uleb(DW_TAG_VARIABLE)); // tag
        buf.push(0); // no children
        buf.extend(uleb(0x3f)); // bogus attr
        buf.extend(uleb(DW_FORM_FLAG_PRESENT));
        buf.extend(uleb(0));
        buf.extend(uleb(0));
        buf.extend(uleb(0)); // table terminator

        let decls = parse_abbrev_table(&buf, 0, false, 8).unwrap();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].tag, DW_TAG_VARIABLE);
        assert!(!decls[0].has_children);
    }

    #[test]
    fn rejects_nonsequential_codes() {
        let mut buf = Vec::new();
        buf.extend(uleb(2)); // should be 1
        buf.extend(uleb(DW_TAG_VARIABLE));
        buf.push(0);
        buf.extend(uleb(0));
        buf.extend(uleb(0));

        assert!(matches!(
            parse_abbrev_table(&buf, 0, false, 8),
            Err(Error::NotImplemented { .. })
        ));
    }
}
