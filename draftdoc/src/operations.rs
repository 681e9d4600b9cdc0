//! Position-addressed edit operations
//!
//! These are the compiled artifact handed to the document service. Offsets are
//! absolute document positions at the moment the operation executes, counted
//! in UTF-16 code units, with the empty document starting at position 1.

use serde::{Deserialize, Serialize};

/// Position of the first character in an empty document
pub const DOCUMENT_START: usize = 1;

/// Font size the document service uses for unstyled text
pub const DEFAULT_FONT_SIZE_PT: u32 = 11;

/// Character styling applied to a contiguous range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style {
    /// Bold formatting
    pub bold: bool,

    /// Font size in points
    pub font_size_pt: u32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            bold: false,
            font_size_pt: DEFAULT_FONT_SIZE_PT,
        }
    }
}

impl Style {
    /// Create a style with explicit weight and size
    pub fn new(bold: bool, font_size_pt: u32) -> Self {
        Self { bold, font_size_pt }
    }

    /// Check whether this style differs from the service default
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// One instruction in the batch sent to the document service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOperation {
    /// Insert `text` so that it begins at `offset`
    InsertText {
        /// Insertion position in the pre-insertion document
        offset: usize,
        /// Text to insert
        text: String,
    },

    /// Restyle the half-open range `[start_offset, end_offset)`
    ApplyStyle {
        /// First styled position
        start_offset: usize,
        /// One past the last styled position
        end_offset: usize,
        /// Style to apply
        style: Style,
    },
}

impl EditOperation {
    /// Check if this is an insertion
    pub fn is_insert(&self) -> bool {
        matches!(self, Self::InsertText { .. })
    }
}

/// Output of one compile call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledDraft {
    /// Document title used when the remote document is created
    pub title: String,

    /// Operations in application order
    pub operations: Vec<EditOperation>,

    /// Total inserted length in document positions
    ///
    /// The document's end position after the batch is
    /// `DOCUMENT_START + final_length`.
    pub final_length: usize,
}

impl CompiledDraft {
    /// Position immediately after the last inserted character
    pub fn end_offset(&self) -> usize {
        DOCUMENT_START + self.final_length
    }

    /// Number of insert operations
    pub fn insert_count(&self) -> usize {
        self.operations.iter().filter(|op| op.is_insert()).count()
    }

    /// Number of style operations
    pub fn style_count(&self) -> usize {
        self.operations.len() - self.insert_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style() {
        assert!(Style::default().is_default());
        assert!(!Style::new(true, 11).is_default());
        assert!(!Style::new(false, 10).is_default());
    }

    #[test]
    fn test_operation_json_shape() {
        let op = EditOperation::ApplyStyle {
            start_offset: 1,
            end_offset: 6,
            style: Style::new(true, 24),
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "apply_style");
        assert_eq!(json["start_offset"], 1);
        assert_eq!(json["style"]["font_size_pt"], 24);

        let insert = EditOperation::InsertText {
            offset: 1,
            text: "Acme\n".to_string(),
        };
        let json = serde_json::to_string(&insert).unwrap();
        let parsed: EditOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, insert);
    }

    #[test]
    fn test_draft_counts() {
        let draft = CompiledDraft {
            title: "t".to_string(),
            operations: vec![
                EditOperation::InsertText {
                    offset: 1,
                    text: "ab".to_string(),
                },
                EditOperation::ApplyStyle {
                    start_offset: 1,
                    end_offset: 3,
                    style: Style::new(true, 11),
                },
                EditOperation::InsertText {
                    offset: 3,
                    text: "c".to_string(),
                },
            ],
            final_length: 3,
        };
        assert_eq!(draft.insert_count(), 2);
        assert_eq!(draft.style_count(), 1);
        assert_eq!(draft.end_offset(), 4);
    }
}
