//! String handling utilities
//!
//! ISO9660 uses various string encodings: ASCII, d-characters, a-characters.
//! Joliet identifiers are UCS-2 big-endian.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::FormatError;
use crate::types::{MAX_PATH_LENGTH, VERSION_SUFFIX_RESERVE};

/// Character set a fixed-width field is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// A-Z, 0-9, _
    DChars,
    /// d-characters plus space and limited punctuation
    AChars,
    /// No check
    Any,
}

/// d-characters: A-Z, 0-9, _
pub fn is_d_char(c: u8) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == b'_'
}

/// a-characters: A-Z, 0-9, _, space, !, ", %, &, ', (, ), *, +, ,, -, ., /, :, ;, <, =, >, ?
pub fn is_a_char(c: u8) -> bool {
    matches!(c, b' '..=b'"' | b'%'..=b'?') || is_d_char(c)
}

/// Trim trailing spaces from byte slice
pub fn trim_trailing_spaces(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == b' ' {
        end -= 1;
    }
    &bytes[..end]
}

/// Convert ISO9660 d-characters to string
pub fn dchars_to_str(bytes: &[u8]) -> Result<&str, core::str::Utf8Error> {
    core::str::from_utf8(trim_trailing_spaces(bytes))
}

/// Convert ISO9660 a-characters to string
pub fn achars_to_str(bytes: &[u8]) -> Result<&str, core::str::Utf8Error> {
    core::str::from_utf8(trim_trailing_spaces(bytes))
}

/// Decode a UCS-2 big-endian identifier (Joliet), dropping trailing
/// spaces and NULs. Unpaired surrogates become U+FFFD.
pub fn decode_ucs2_be(bytes: &[u8]) -> String {
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    let mut out: String = char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    let trimmed = out.trim_end_matches(&[' ', '\0'][..]).len();
    out.truncate(trimmed);
    out
}

/// Encode a string as UCS-2 big-endian (characters outside the BMP are
/// written as surrogate pairs)
pub fn encode_ucs2_be(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(|u| u.to_be_bytes()).collect()
}

/// Copy `src` into a `len`-byte field, space padded
///
/// Overlong input is [`FormatError::FieldOverflow`]; characters outside
/// `charset` are [`FormatError::InvalidName`].
pub fn pad_and_validate(src: &str, len: usize, charset: Charset) -> Result<Vec<u8>, FormatError> {
    let bytes = src.as_bytes();
    if bytes.len() > len {
        return Err(FormatError::FieldOverflow { len: bytes.len(), max: len });
    }
    let valid = match charset {
        Charset::DChars => bytes.iter().all(|&c| is_d_char(c)),
        Charset::AChars => bytes.iter().all(|&c| is_a_char(c)),
        Charset::Any => true,
    };
    if !valid {
        return Err(FormatError::InvalidName);
    }
    let mut out = Vec::with_capacity(len);
    out.extend_from_slice(bytes);
    out.resize(len, b' ');
    Ok(out)
}

/// Strip version suffix from filename (e.g., "FILE.TXT;1" -> "FILE.TXT")
/// Also removes trailing dot if present (e.g., "FILE.;1" -> "FILE")
pub fn strip_version(name: &str) -> &str {
    let base = match name.rfind(';') {
        Some(pos) if name[pos + 1..].bytes().all(|b| b.is_ascii_digit()) => &name[..pos],
        _ => name,
    };
    match base.strip_suffix('.') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => base,
    }
}

/// Translate an on-disk identifier into a display name
///
/// Drops the `;N` version and a dangling `.`, turns any other `;` into
/// `.`, and lowercases unless Joliet names are in use.
pub fn translate_name(name: &str, joliet_level: u8) -> String {
    translate_name_preserving(name, joliet_level > 0)
}

/// [`translate_name`] with an explicit case decision (Joliet and Rock
/// Ridge names keep their case)
pub fn translate_name_preserving(name: &str, preserve_case: bool) -> String {
    let stripped = strip_version(name);
    stripped
        .chars()
        .map(|c| match c {
            ';' => '.',
            c if !preserve_case => c.to_ascii_lowercase(),
            c => c,
        })
        .collect()
}

/// Check a directory path against ISO9660 Level 1 rules
///
/// No leading `/` or `.`, no empty component, at most 8 d-characters per
/// component, at most 255 bytes overall.
pub fn dirname_valid(path: &str) -> bool {
    let bytes = path.as_bytes();
    match bytes.first() {
        None | Some(b'/') | Some(b'.') => return false,
        _ => {}
    }
    if bytes.len() > MAX_PATH_LENGTH {
        return false;
    }
    let mut len = 0;
    for &c in bytes {
        if is_d_char(c) {
            len += 1;
            if len > 8 {
                return false;
            }
        } else if c == b'/' {
            if len == 0 {
                return false;
            }
            len = 0;
        } else {
            return false;
        }
    }
    len != 0
}

/// Check a file path against ISO9660 Level 1 rules
///
/// The directory part must satisfy [`dirname_valid`]; the file part must be
/// an 8.3 name with exactly one dot. Six bytes are reserved for `;NNNNN`.
pub fn pathname_valid(path: &str) -> bool {
    let file = match path.rfind('/') {
        Some(pos) => {
            if !dirname_valid(&path[..pos]) {
                return false;
            }
            &path[pos + 1..]
        }
        None => path,
    };
    if path.len() > MAX_PATH_LENGTH - VERSION_SUFFIX_RESERVE {
        return false;
    }

    let mut len = 0;
    let mut dots = 0;
    for c in file.bytes() {
        if is_d_char(c) {
            len += 1;
            let limit = if dots == 0 { 8 } else { 3 };
            if len > limit {
                return false;
            }
        } else if c == b'.' {
            dots += 1;
            if dots > 1 || len == 0 {
                return false;
            }
            len = 0;
        } else {
            return false;
        }
    }
    dots == 1
}

/// Join a directory and file name and append a `;version` suffix
pub fn isofy_pathname(dirname: &str, filename: &str, version: u16) -> String {
    let dir = dirname.trim_end_matches('/');
    if dir.is_empty() {
        format!("{filename};{version}")
    } else {
        format!("{dir}/{filename};{version}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_classes() {
        assert!(is_d_char(b'A') && is_d_char(b'9') && is_d_char(b'_'));
        assert!(!is_d_char(b'a') && !is_d_char(b'.'));
        assert!(is_a_char(b' ') && is_a_char(b'?') && is_a_char(b'"'));
        assert!(!is_a_char(b'#') && !is_a_char(b'$') && !is_a_char(b'@') && !is_a_char(b'a'));
    }

    #[test]
    fn test_translate_name() {
        assert_eq!(translate_name("FOO.TXT;1", 0), "foo.txt");
        assert_eq!(translate_name("FOO;1", 0), "foo");
        assert_eq!(translate_name("FOO.;1", 0), "foo");
        assert_eq!(translate_name("Résumé.TXT;1", 1), "Résumé.TXT");
        assert_eq!(translate_name("SUB", 0), "sub");
        assert_eq!(translate_name("A;B", 0), "a.b");
    }

    #[test]
    fn test_pathname_valid() {
        assert!(pathname_valid("MYDIR/FILE.EXT"));
        assert!(pathname_valid("FILE.E"));
        assert!(!pathname_valid("mydir/file.ext.ext"));
        assert!(!pathname_valid("MYDIR/FILE.EXT.EXT"));
        assert!(!pathname_valid("/abs"));
        assert!(!pathname_valid("MYDIR/NOEXT"));
        assert!(!pathname_valid("MYDIR/TOOLONGNAME.TXT"));
        assert!(!pathname_valid("MYDIR/.TXT"));
    }

    #[test]
    fn test_dirname_valid() {
        assert!(dirname_valid("A/B_2/C"));
        assert!(!dirname_valid(""));
        assert!(!dirname_valid(".A"));
        assert!(!dirname_valid("A//B"));
        assert!(!dirname_valid("A/"));
        assert!(!dirname_valid("NINECHARS"));
    }

    #[test]
    fn test_pad_and_validate() {
        assert_eq!(pad_and_validate("CD_1", 6, Charset::DChars).unwrap(), b"CD_1  ");
        assert_eq!(
            pad_and_validate("TOO LONG", 4, Charset::AChars),
            Err(FormatError::FieldOverflow { len: 8, max: 4 })
        );
        assert_eq!(pad_and_validate("A B", 4, Charset::DChars), Err(FormatError::InvalidName));
        assert!(pad_and_validate("A B", 4, Charset::AChars).is_ok());
    }

    #[test]
    fn test_ucs2() {
        let raw = encode_ucs2_be("Résumé  ");
        assert_eq!(decode_ucs2_be(&raw), "Résumé");
    }

    #[test]
    fn test_isofy() {
        assert_eq!(isofy_pathname("DIR/", "A.TXT", 1), "DIR/A.TXT;1");
        assert_eq!(isofy_pathname("", "A.TXT", 2), "A.TXT;2");
    }
}
