//! Google Docs `batchUpdate` request bodies

use crate::operations::{EditOperation, Style};
use serde::Serialize;

/// Body of `documents.batchUpdate`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchUpdateRequest {
    pub requests: Vec<Request>,
}

/// One entry of the `requests` array
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    InsertText(InsertTextRequest),
    UpdateTextStyle(UpdateTextStyleRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertTextRequest {
    pub location: Location,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTextStyleRequest {
    pub range: Range,
    pub text_style: TextStyle,
    /// Field mask naming the style properties being set
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub start_index: usize,
    pub end_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub bold: bool,
    pub font_size: Dimension,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dimension {
    pub magnitude: u32,
    pub unit: &'static str,
}

fn style_request(start_index: usize, end_index: usize, style: &Style) -> UpdateTextStyleRequest {
    UpdateTextStyleRequest {
        range: Range {
            start_index,
            end_index,
        },
        text_style: TextStyle {
            bold: style.bold,
            font_size: Dimension {
                magnitude: style.font_size_pt,
                unit: "PT",
            },
        },
        fields: if style.bold { "bold,fontSize" } else { "fontSize" }.to_string(),
    }
}

/// Translate compiled operations into a batch body
///
/// Zero-length inserts do not move any position, and the service rejects
/// empty insert text, so they are left out of the batch.
pub fn to_batch_requests(operations: &[EditOperation]) -> BatchUpdateRequest {
    let requests = operations
        .iter()
        .filter_map(|operation| match operation {
            EditOperation::InsertText { text, .. } if text.is_empty() => None,
            EditOperation::InsertText { offset, text } => {
                Some(Request::InsertText(InsertTextRequest {
                    location: Location { index: *offset },
                    text: text.clone(),
                }))
            }
            EditOperation::ApplyStyle {
                start_offset,
                end_offset,
                style,
            } => Some(Request::UpdateTextStyle(style_request(
                *start_offset,
                *end_offset,
                style,
            ))),
        })
        .collect();

    BatchUpdateRequest { requests }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_and_bold_style() {
        let batch = to_batch_requests(&[
            EditOperation::InsertText {
                offset: 1,
                text: "Acme\n".to_string(),
            },
            EditOperation::ApplyStyle {
                start_offset: 1,
                end_offset: 6,
                style: Style::new(true, 24),
            },
        ]);

        assert_eq!(
            serde_json::to_value(&batch).unwrap(),
            json!({
                "requests": [
                    {"insertText": {"location": {"index": 1}, "text": "Acme\n"}},
                    {"updateTextStyle": {
                        "range": {"startIndex": 1, "endIndex": 6},
                        "textStyle": {"bold": true, "fontSize": {"magnitude": 24, "unit": "PT"}},
                        "fields": "bold,fontSize"
                    }}
                ]
            })
        );
    }

    #[test]
    fn test_non_bold_style_only_sets_size() {
        let batch = to_batch_requests(&[EditOperation::ApplyStyle {
            start_offset: 3,
            end_offset: 9,
            style: Style::new(false, 10),
        }]);
        let value = serde_json::to_value(&batch).unwrap();
        assert_eq!(value["requests"][0]["updateTextStyle"]["fields"], "fontSize");
    }

    #[test]
    fn test_empty_inserts_dropped() {
        let batch = to_batch_requests(&[
            EditOperation::InsertText {
                offset: 5,
                text: String::new(),
            },
            EditOperation::InsertText {
                offset: 5,
                text: "---\n\n".to_string(),
            },
        ]);
        assert_eq!(batch.requests.len(), 1);
    }
}
