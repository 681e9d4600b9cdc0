//! Text length accounting in the document service's addressing unit
//!
//! The remote document service addresses text positions in UTF-16 code units:
//! a character outside the Basic Multilingual Plane (most emoji) occupies two
//! positions, and a character followed by a variation selector occupies one
//! more. Every length the compiler adds to its cursor comes from [`measure`].
//!
//! The service silently strips some characters from inserted text (C0 control
//! characters other than tab, line feed and vertical tab, and the BMP private
//! use area). Text containing them would be shorter on the remote side than
//! the compiler counted, shifting every later offset, so [`measure`] rejects it.

use thiserror::Error;

/// Text that cannot be counted the same way the document service counts it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "character U+{codepoint:04X} at char index {char_index} in {context} is stripped by the document service"
)]
pub struct EncodingMismatchError {
    /// Where the text came from (fragment description)
    pub context: String,
    /// Offending code point
    pub codepoint: u32,
    /// Index of the offending character within the text, in chars
    pub char_index: usize,
}

/// Check whether the document service drops `c` when it is inserted
pub fn is_stripped_by_service(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{C}'..='\u{1F}' | '\u{E000}'..='\u{F8FF}')
}

/// Measure `text` in document positions
///
/// # Parameters
/// * `text` - Text about to be inserted
/// * `context` - Human-readable origin of the text, used in the error
///
/// # Returns
/// * `Ok(usize)` - Number of UTF-16 code units the service will count
/// * `Err(EncodingMismatchError)` - The text contains a character the service strips
pub fn measure(text: &str, context: &str) -> Result<usize, EncodingMismatchError> {
    if let Some((char_index, c)) = text
        .chars()
        .enumerate()
        .find(|(_, c)| is_stripped_by_service(*c))
    {
        return Err(EncodingMismatchError {
            context: context.to_string(),
            codepoint: u32::from(c),
            char_index,
        });
    }

    Ok(text.encode_utf16().count())
}
