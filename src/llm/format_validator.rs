use jsonschema::Validator;
use serde_json::Value;

use crate::errors::PlanParseError;

/// Shape every generated plan must have before its steps are inspected.
pub const PLAN_SCHEMA: &str = r#"{
  "type": "array",
  "items": {
    "type": "object",
    "properties": {
      "worker": { "type": "string" },
      "agent": { "type": "string" },
      "action": { "type": "string" },
      "reasoning": { "type": "string" }
    }
  }
}"#;

/// Creates a JSON Schema validator from a schema string
///
/// # Arguments
/// * `schema_content` - The JSON Schema as a string
pub fn build_validator(schema_content: &str) -> Result<Validator, PlanParseError> {
    let schema: Value = serde_json::from_str(schema_content)?;
    jsonschema::validator_for(&schema).map_err(|e| PlanParseError::Shape(e.to_string()))
}

/// Parses a response and checks it against a compiled schema
///
/// # Returns
/// * `Result<Value, PlanParseError>` - The parsed document when it conforms
pub fn parse_and_validate(schema: &Validator, response: &str) -> Result<Value, PlanParseError> {
    let val: Value = serde_json::from_str(response)?;
    if schema.is_valid(&val) {
        Ok(val)
    } else {
        Err(PlanParseError::Shape(
            "expected an array of step objects".to_string(),
        ))
    }
}
