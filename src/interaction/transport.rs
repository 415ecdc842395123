//! Drag payload transport encoding.
//!
//! During a drag the platform exposes only the payload's *type labels*, not
//! its data, and labels cannot contain uppercase chars. So the whole payload
//! is serialized to JSON and encoded as a comma-joined string of char codes,
//! which is itself used as the type label. Decoding scans every offered
//! label and tolerates anything that is not ours.

use serde::{Deserialize, Serialize};

use crate::ast::selection::SelectionLine;

/// The data carried by a structural drag: the pick option in effect and the
/// indent-relative payload lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPayload {
    pub option: Option<String>,
    pub lines: Vec<SelectionLine>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    is_ast_drag_drop: bool,
    data: EnvelopeData,
}

#[derive(Serialize, Deserialize)]
struct EnvelopeData {
    option: Option<String>,
    lines: Vec<(usize, String)>,
}

/// Encode a payload into a type label.
pub fn encode(payload: &DragPayload) -> String {
    let envelope = Envelope {
        is_ast_drag_drop: true,
        data: EnvelopeData {
            option: payload.option.clone(),
            lines: payload
                .lines
                .iter()
                .map(|line| (line.indent_level_delta, line.string.clone()))
                .collect(),
        },
    };

    // a struct of plain fields always serializes
    let json = serde_json::to_string(&envelope).unwrap_or_default();

    json.chars()
        .map(|ch| (ch as u32).to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Decode one type label. `None` for anything that is not a well-formed
/// payload of ours.
pub fn decode(label: &str) -> Option<DragPayload> {
    let mut json = String::new();

    for code in label.split(',') {
        let code = code.trim().parse::<u32>().ok()?;

        json.push(char::from_u32(code)?);
    }

    let envelope: Envelope = serde_json::from_str(&json).ok()?;

    if !envelope.is_ast_drag_drop {
        return None;
    }

    Some(DragPayload {
        option: envelope.data.option,
        lines: envelope
            .data
            .lines
            .into_iter()
            .map(|(indent_level_delta, string)| SelectionLine {
                indent_level_delta,
                string,
            })
            .collect(),
    })
}

/// Scan the platform's offered type labels for our payload.
pub fn decode_types<'a>(labels: impl IntoIterator<Item = &'a str>) -> Option<DragPayload> {
    labels.into_iter().find_map(decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> DragPayload {
        DragPayload {
            option: Some("copy".to_string()),
            lines: vec![
                SelectionLine {
                    indent_level_delta: 0,
                    string: "if (x) {".to_string(),
                },
                SelectionLine {
                    indent_level_delta: 1,
                    string: "y();".to_string(),
                },
                SelectionLine {
                    indent_level_delta: 0,
                    string: "}".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_round_trip() {
        let encoded = encode(&payload());

        // only digits and commas survive as a type label
        assert!(encoded.chars().all(|ch| ch.is_ascii_digit() || ch == ','));

        assert_eq!(decode(&encoded), Some(payload()));
    }

    #[test]
    fn test_decode_rejects_foreign_labels() {
        assert_eq!(decode("text/plain"), None);
        assert_eq!(decode(""), None);
        assert_eq!(decode("1,2,3"), None);

        // valid JSON without our marker
        let json = "{\"foo\":1}";
        let encoded: Vec<String> = json.chars().map(|ch| (ch as u32).to_string()).collect();

        assert_eq!(decode(&encoded.join(",")), None);
    }

    #[test]
    fn test_decode_types_scans_all_labels() {
        let encoded = encode(&payload());
        let labels = ["text/plain", encoded.as_str(), "files"];

        assert_eq!(decode_types(labels), Some(payload()));
    }
}
