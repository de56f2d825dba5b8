/*!
This modules contains the helpers shared by the parsing and compilation stages
to treat a pattern as single-byte (Latin-1) text.
*/

use regex_syntax::hir::Class;

/// An inclusive range of bytes, as stored in compiled classes.
pub type ByteRange = (u8, u8);

/// Reinterprets the UTF-8 encoding of `pattern` as Latin-1 text: every byte
/// becomes one character in U+0000..=U+00FF.
///
/// A byte-oriented engine never sees `é` as one character but as the two
/// bytes `0xC3 0xA9`, so the parser must see two characters too.
pub fn latin1_decode(pattern: &str) -> String {
    if pattern.is_ascii() {
        return pattern.to_owned();
    }
    pattern.bytes().map(char::from).collect()
}

/// Maps a byte offset in the decoded pattern back to a byte offset in the
/// original pattern. Since every decoded character stands for exactly one
/// original byte, this is a character count.
pub fn original_offset(decoded: &str, offset: usize) -> usize {
    match decoded.get(..offset) {
        Some(prefix) => prefix.chars().count(),
        None => offset,
    }
}

/// Converts a scalar value to a byte, if it fits in the single-byte range.
pub fn latin1_byte(c: char) -> Option<u8> {
    u8::try_from(u32::from(c)).ok()
}

/// Clips a class to the single-byte range. Ranges lying completely above
/// U+00FF are dropped, so the result may be empty, in which case the class
/// can never match.
pub fn clip_class(class: &Class) -> Box<[ByteRange]> {
    match class {
        Class::Unicode(class) => class
            .iter()
            .filter_map(|r| {
                let start = latin1_byte(r.start())?;
                let end = latin1_byte(r.end()).unwrap_or(u8::MAX);
                Some((start, end))
            })
            .collect(),
        // Byte classes only exist with Unicode mode off, which the dialect rejects
        Class::Bytes(class) => class.iter().map(|r| (r.start(), r.end())).collect(),
    }
}
