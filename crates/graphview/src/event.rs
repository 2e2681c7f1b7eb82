use std::str::FromStr;

use serde::Deserialize;
use serde_json::{Value, json};

use crate::node::{NewNode, NodeFields};

/// One message from the analysis stream.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    NodeAdded(NewNode),
    NodeUpdated { id: String, fields: NodeFields },
    SessionCompleted,
    SessionFailed { message: String },
}

#[derive(Debug, thiserror::Error)]
#[error("malformed stream message: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum Kind {
    Node,
    NodeUpdate,
    Complete,
    Error,
}

/// `{"type": ..., "data": {...}}`
#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: Kind,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
struct Update {
    id: String,
    #[serde(flatten)]
    fields: NodeFields,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Failure {
    message: String,
}

impl Event {
    pub fn from_json(text: &str) -> Result<Self, DecodeError> {
        Self::from_value(serde_json::from_str(text)?)
    }

    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let envelope: Envelope = serde_json::from_value(value)?;
        let event = match envelope.kind {
            Kind::Node => Event::NodeAdded(serde_json::from_value::<NewNode>(envelope.data)?.normalized()),
            Kind::NodeUpdate => {
                let update: Update = serde_json::from_value(envelope.data)?;
                Event::NodeUpdated {
                    id: update.id,
                    fields: update.fields,
                }
            }
            Kind::Complete => Event::SessionCompleted,
            Kind::Error => {
                let failure = if envelope.data.is_null() {
                    Failure::default()
                } else {
                    serde_json::from_value(envelope.data)?
                };
                Event::SessionFailed {
                    message: failure.message,
                }
            }
        };
        Ok(event)
    }

    /// Wire form of this event, as the analysis process would send it
    pub fn to_value(&self) -> Value {
        match self {
            Event::NodeAdded(node) => json!({
                "type": "node",
                "data": {
                    "id": node.id,
                    "statement": node.statement,
                    "level": node.level,
                    "parent_id": node.parent_id,
                    "is_elementary": node.is_elementary,
                }
            }),
            Event::NodeUpdated { id, fields } => {
                let mut data = serde_json::Map::new();
                data.insert("id".into(), json!(id));
                if let Some(is_elementary) = fields.is_elementary {
                    data.insert("is_elementary".into(), json!(is_elementary));
                }
                if let Some(explanation) = &fields.explanation {
                    data.insert("explanation".into(), json!(explanation));
                }
                if let Some(proof_text) = &fields.proof_text {
                    data.insert("proof_text".into(), json!(proof_text));
                }
                json!({ "type": "node_update", "data": data })
            }
            Event::SessionCompleted => json!({
                "type": "complete",
                "data": { "message": "Proof analysis complete" }
            }),
            Event::SessionFailed { message } => json!({
                "type": "error",
                "data": { "message": message }
            }),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Event::NodeAdded(_) => "node",
            Event::NodeUpdated { .. } => "node_update",
            Event::SessionCompleted => "complete",
            Event::SessionFailed { .. } => "error",
        }
    }
}

impl FromStr for Event {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_root_node() {
        let event = Event::from_json(
            r#"{"type":"node","data":{"id":"r","statement":"Parallel lines never meet","level":0,"parent_id":null,"is_elementary":false}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            Event::NodeAdded(NewNode::root("r", "Parallel lines never meet"))
        );
    }

    #[test]
    fn test_decode_child_with_empty_parent_drops_parent() {
        let event: Event =
            r#"{"type":"node","data":{"id":"c","statement":"s","level":1,"parent_id":""}}"#
                .parse()
                .unwrap();
        let Event::NodeAdded(node) = event else {
            panic!("expected node");
        };
        assert_eq!(node.parent_id, None);
        assert!(!node.is_elementary);
    }

    #[test]
    fn test_decode_update_fields() {
        let event = Event::from_json(
            r#"{"type":"node_update","data":{"id":"c","is_elementary":true,"explanation":"e","proof_text":"p"}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            Event::NodeUpdated {
                id: "c".into(),
                fields: NodeFields {
                    is_elementary: Some(true),
                    explanation: Some("e".into()),
                    proof_text: Some("p".into()),
                },
            }
        );
    }

    #[test]
    fn test_decode_partial_update() {
        let event =
            Event::from_json(r#"{"type":"node_update","data":{"id":"c","explanation":"only"}}"#)
                .unwrap();
        let Event::NodeUpdated { fields, .. } = event else {
            panic!("expected update");
        };
        assert_eq!(fields.is_elementary, None);
        assert_eq!(fields.explanation.as_deref(), Some("only"));
    }

    #[test]
    fn test_decode_terminal_messages() {
        assert_eq!(
            Event::from_json(r#"{"type":"complete","data":{"message":"Proof analysis complete"}}"#)
                .unwrap(),
            Event::SessionCompleted
        );
        assert_eq!(
            Event::from_json(r#"{"type":"complete"}"#).unwrap(),
            Event::SessionCompleted
        );
        assert_eq!(
            Event::from_json(r#"{"type":"error","data":{"message":"rate limited"}}"#).unwrap(),
            Event::SessionFailed {
                message: "rate limited".into()
            }
        );
    }

    #[test]
    fn test_decode_rejects_unknown_and_malformed() {
        assert!(Event::from_json(r#"{"type":"ping","data":{}}"#).is_err());
        assert!(Event::from_json(r#"{"type":"node","data":{"id":"x"}}"#).is_err());
        assert!(Event::from_json("not json").is_err());
    }

    #[test]
    fn test_wire_form_decodes_back() {
        let events = [
            Event::NodeAdded(NewNode::child("c", "Angles on a line", 1, "r")),
            Event::NodeUpdated {
                id: "c".into(),
                fields: NodeFields {
                    is_elementary: Some(true),
                    ..Default::default()
                },
            },
            Event::SessionFailed {
                message: "boom".into(),
            },
        ];
        for event in events {
            assert_eq!(Event::from_value(event.to_value()).unwrap(), event);
        }
    }
}
