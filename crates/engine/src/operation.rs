//! Named operations exposed to tool-invocation layers.

use std::str::FromStr;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    WaveAnalyze,
    SphinxGate,
    BumpValidate,
    ContextHash,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::WaveAnalyze,
        Operation::SphinxGate,
        Operation::BumpValidate,
        Operation::ContextHash,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::WaveAnalyze => "wave_analyze",
            Self::SphinxGate => "sphinx_gate",
            Self::BumpValidate => "bump_validate",
            Self::ContextHash => "context_hash",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::WaveAnalyze => {
                "Score text or code for coherence (0-100) and list sub-metrics below the threshold"
            }
            Self::SphinxGate => {
                "Run the five SPHINX gates (origin, intent, coherence, identity, passage)"
            }
            Self::BumpValidate => "Verify the declared SHA-256 contextHash of a handoff payload",
            Self::ContextHash => "Compute the contextHash a sender should declare for a handoff",
        }
    }

    /// JSON Schema of the operation's arguments.
    pub fn input_schema(&self) -> Value {
        match self {
            Self::WaveAnalyze => json!({
                "type": "object",
                "properties": {
                    "content": {"type": "string"},
                    "threshold": {"type": "number", "minimum": 0, "maximum": 100}
                },
                "required": ["content"]
            }),
            Self::SphinxGate => json!({
                "type": "object",
                "properties": {
                    "content": {"type": "string"},
                    "context": {"type": "string"},
                    "vulnerabilityDescription": {"type": "string"},
                    "subjectRef": {"type": "string"},
                    "targetBinary": {"type": "string"},
                    "mitigations": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["content"],
                "anyOf": [
                    {"required": ["context"]},
                    {"required": ["vulnerabilityDescription"]}
                ]
            }),
            Self::BumpValidate => json!({
                "type": "object",
                "properties": {
                    "sessionId": {"type": "string"},
                    "contextHash": {"type": "string", "pattern": "^[0-9a-fA-F]{64}$"},
                    "handoff": {},
                    "integrityProof": {"type": "string"}
                },
                "required": ["sessionId", "contextHash", "handoff", "integrityProof"]
            }),
            Self::ContextHash => json!({
                "type": "object",
                "properties": {"handoff": {}},
                "required": ["handoff"]
            }),
        }
    }

    pub fn info(&self) -> OperationInfo {
        OperationInfo {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| EngineError::UnknownOperation(s.to_string()))
    }
}

/// Advertised description of an operation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationInfo {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.name().parse::<Operation>().unwrap(), op);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!(matches!(
            "wave_validate".parse::<Operation>(),
            Err(EngineError::UnknownOperation(name)) if name == "wave_validate"
        ));
    }

    #[test]
    fn info_serializes_schema() {
        let info = serde_json::to_value(Operation::BumpValidate.info()).unwrap();
        assert_eq!(info["name"], "bump_validate");
        assert_eq!(info["inputSchema"]["required"][0], "sessionId");
    }

    #[test]
    fn gate_schema_requires_a_context_field() {
        let schema = Operation::SphinxGate.input_schema();
        let alternatives: Vec<&str> = schema["anyOf"]
            .as_array()
            .unwrap()
            .iter()
            .map(|alt| alt["required"][0].as_str().unwrap())
            .collect();
        assert_eq!(alternatives, vec!["context", "vulnerabilityDescription"]);
    }

    #[test]
    fn required_fields_are_declared_properties() {
        for op in Operation::ALL {
            let schema = op.input_schema();
            let mut required: Vec<&Value> = schema["required"].as_array().unwrap().iter().collect();
            if let Some(alternatives) = schema["anyOf"].as_array() {
                required.extend(alternatives.iter().flat_map(|alt| alt["required"].as_array().unwrap()));
            }
            for name in required {
                let name = name.as_str().unwrap();
                assert!(schema["properties"].get(name).is_some(), "{}: {}", op, name);
            }
        }
    }
}
