//! Local replay of an operation list
//!
//! An idealised model of the position-addressed document: UTF-16 positions,
//! the document starting at position 1, and every offset and range checked.
//! Styling is simplified. Inserted text always starts with the default style,
//! whereas the real service lets it inherit from neighbouring text, so runs
//! here show only what the `ApplyStyle` operations set explicitly. Used for
//! `compile --preview` and to verify compiled drafts without a network round
//! trip.

use crate::operations::{EditOperation, Style, DOCUMENT_START};
use itertools::Itertools;
use thiserror::Error;

/// Errors found while replaying operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("operation {index}: insert at {offset} outside document [{start}, {end}]", start = DOCUMENT_START)]
    InsertOutOfBounds {
        index: usize,
        offset: usize,
        end: usize,
    },

    #[error("operation {index}: style range [{start_offset}, {end_offset}) outside document ending at {end}")]
    RangeOutOfBounds {
        index: usize,
        start_offset: usize,
        end_offset: usize,
        end: usize,
    },

    #[error("operation {index}: empty style range at {start_offset}")]
    EmptyRange { index: usize, start_offset: usize },

    #[error("operation {index}: position {offset} splits a surrogate pair")]
    SplitsCharacter { index: usize, offset: usize },
}

/// A contiguous run of identically styled text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub start_offset: usize,
    pub end_offset: usize,
    pub style: Style,
}

/// Document state after replay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Plain text content
    pub text: String,
    /// Style of every position, index 0 is position 1
    styles: Vec<Style>,
}

impl RenderedDocument {
    /// Length in document positions
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Style at a document position
    pub fn style_at(&self, offset: usize) -> Style {
        offset
            .checked_sub(DOCUMENT_START)
            .and_then(|index| self.styles.get(index))
            .copied()
            .unwrap_or_default()
    }

    /// Coalesce positions into runs of identical style
    pub fn runs(&self) -> Vec<StyledRun> {
        let chunks = self
            .styles
            .iter()
            .enumerate()
            .chunk_by(|(_, style)| **style);

        let mut runs = Vec::new();
        for (style, group) in &chunks {
            let indices: Vec<usize> = group.map(|(index, _)| index).collect();
            if let (Some(first), Some(last)) = (indices.first(), indices.last()) {
                runs.push(StyledRun {
                    start_offset: first + DOCUMENT_START,
                    end_offset: last + DOCUMENT_START + 1,
                    style,
                });
            }
        }
        runs
    }
}

fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// Apply operations to an empty document
///
/// # Parameters
/// * `operations` - Operations in application order
///
/// # Returns
/// * `Ok(RenderedDocument)` - Resulting text and per-position styles
/// * `Err(ReplayError)` - An operation addressed a position the service would reject or misplace
pub fn replay(operations: &[EditOperation]) -> Result<RenderedDocument, ReplayError> {
    let mut units: Vec<u16> = Vec::new();
    let mut styles: Vec<Style> = Vec::new();

    for (index, operation) in operations.iter().enumerate() {
        let end = DOCUMENT_START + units.len();
        match operation {
            EditOperation::InsertText { offset, text } => {
                if *offset < DOCUMENT_START || *offset > end {
                    return Err(ReplayError::InsertOutOfBounds {
                        index,
                        offset: *offset,
                        end,
                    });
                }
                let at = offset - DOCUMENT_START;
                if units.get(at).copied().is_some_and(is_low_surrogate) {
                    return Err(ReplayError::SplitsCharacter {
                        index,
                        offset: *offset,
                    });
                }
                let inserted: Vec<u16> = text.encode_utf16().collect();
                let count = inserted.len();
                units.splice(at..at, inserted);
                styles.splice(at..at, std::iter::repeat(Style::default()).take(count));
            }
            EditOperation::ApplyStyle {
                start_offset,
                end_offset,
                style,
            } => {
                if start_offset >= end_offset {
                    return Err(ReplayError::EmptyRange {
                        index,
                        start_offset: *start_offset,
                    });
                }
                if *start_offset < DOCUMENT_START || *end_offset > end {
                    return Err(ReplayError::RangeOutOfBounds {
                        index,
                        start_offset: *start_offset,
                        end_offset: *end_offset,
                        end,
                    });
                }
                for boundary in [*start_offset, *end_offset] {
                    if units
                        .get(boundary - DOCUMENT_START)
                        .copied()
                        .is_some_and(is_low_surrogate)
                    {
                        return Err(ReplayError::SplitsCharacter {
                            index,
                            offset: boundary,
                        });
                    }
                }
                styles[start_offset - DOCUMENT_START..end_offset - DOCUMENT_START].fill(*style);
            }
        }
    }

    Ok(RenderedDocument {
        text: String::from_utf16_lossy(&units),
        styles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(offset: usize, text: &str) -> EditOperation {
        EditOperation::InsertText {
            offset,
            text: text.to_string(),
        }
    }

    fn style(start_offset: usize, end_offset: usize, bold: bool, size: u32) -> EditOperation {
        EditOperation::ApplyStyle {
            start_offset,
            end_offset,
            style: Style::new(bold, size),
        }
    }

    #[test]
    fn test_insert_inside_styled_text_is_unstyled() {
        let doc = replay(&[insert(1, "AB"), style(1, 3, true, 24), insert(2, "x")]).unwrap();

        assert_eq!(doc.text, "AxB");
        assert_eq!(doc.style_at(1), Style::new(true, 24));
        assert_eq!(doc.style_at(2), Style::default());
        assert_eq!(doc.style_at(3), Style::new(true, 24));
    }

    #[test]
    fn test_sequential_inserts() {
        let doc = replay(&[insert(1, "Acme\n"), style(1, 6, true, 24), insert(6, "sub\n")]).unwrap();

        assert_eq!(doc.text, "Acme\nsub\n");
        assert_eq!(doc.len(), 9);
        assert_eq!(doc.style_at(1), Style::new(true, 24));
        assert_eq!(doc.style_at(6), Style::default());
        assert_eq!(
            doc.runs(),
            vec![
                StyledRun {
                    start_offset: 1,
                    end_offset: 6,
                    style: Style::new(true, 24)
                },
                StyledRun {
                    start_offset: 6,
                    end_offset: 10,
                    style: Style::default()
                },
            ]
        );
    }

    #[test]
    fn test_insert_in_middle_shifts_later_text() {
        let doc = replay(&[insert(1, "ac"), style(2, 3, true, 11), insert(2, "b")]).unwrap();
        assert_eq!(doc.text, "abc");
        assert_eq!(doc.style_at(3), Style::new(true, 11));
        assert_eq!(doc.style_at(2), Style::default());
    }

    #[test]
    fn test_insert_past_end_rejected() {
        let err = replay(&[insert(1, "ab"), insert(5, "c")]).unwrap_err();
        assert_eq!(
            err,
            ReplayError::InsertOutOfBounds {
                index: 1,
                offset: 5,
                end: 3
            }
        );
        assert!(matches!(
            replay(&[insert(0, "a")]),
            Err(ReplayError::InsertOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_style_range_checks() {
        assert!(matches!(
            replay(&[insert(1, "ab"), style(1, 4, true, 11)]),
            Err(ReplayError::RangeOutOfBounds { index: 1, .. })
        ));
        assert!(matches!(
            replay(&[insert(1, "ab"), style(2, 2, true, 11)]),
            Err(ReplayError::EmptyRange { index: 1, start_offset: 2 })
        ));
    }

    #[test]
    fn test_surrogate_pairs() {
        // "📝" occupies positions 1 and 2
        let doc = replay(&[insert(1, "📝x"), style(1, 3, true, 16)]).unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.style_at(3), Style::default());

        assert!(matches!(
            replay(&[insert(1, "📝"), insert(2, "x")]),
            Err(ReplayError::SplitsCharacter { index: 1, offset: 2 })
        ));
        assert!(matches!(
            replay(&[insert(1, "📝"), style(1, 2, true, 11)]),
            Err(ReplayError::SplitsCharacter { index: 1, offset: 2 })
        ));
    }

    #[test]
    fn test_empty_insert_is_noop() {
        let doc = replay(&[insert(1, ""), insert(1, "a")]).unwrap();
        assert_eq!(doc.text, "a");
        assert!(!doc.is_empty());
    }
}
