//! Parsers for generator output.
//!
//! Two formats come back from the text generator: a JSON list of step
//! records for flat plans, and free-text numbered/bulleted lists for the
//! hierarchical outline and task stages.

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use goal_agent_core::{
    types::{CapabilitySnapshot, Plan, Step},
    Error, Result,
};

use crate::normalize::normalize;

// =============================================================================
// Flat Plan Parsing
// =============================================================================

/// Parse and validate a raw flat-plan response against a capability snapshot.
///
/// Returns `Error::PlanParse` when the text is empty or not JSON, and
/// `Error::PlanValidation` when the structure or any record is unacceptable.
/// A single bad record rejects the whole plan.
pub fn parse_plan(raw: &str, capabilities: &CapabilitySnapshot) -> Result<Plan> {
    if raw.trim().is_empty() {
        return Err(Error::plan_parse("the response was empty"));
    }

    let normalized = normalize(raw);
    let value: Value = serde_json::from_str(&normalized)
        .map_err(|e| Error::plan_parse(format!("the response is not valid JSON ({})", e)))?;

    let records = match value {
        Value::Array(records) => records,
        other => {
            return Err(Error::plan_validation(format!(
                "expected a JSON list of step objects, got {}",
                json_kind(&other)
            )))
        }
    };

    let steps = records
        .iter()
        .enumerate()
        .map(|(idx, record)| validate_step(idx + 1, record, capabilities))
        .collect::<Result<Vec<_>>>()?;

    Ok(Plan::new(steps))
}

fn validate_step(position: usize, record: &Value, capabilities: &CapabilitySnapshot) -> Result<Step> {
    let object = record.as_object().ok_or_else(|| {
        Error::plan_validation(format!(
            "step {} must be an object, got {}",
            position,
            json_kind(record)
        ))
    })?;

    let tool_name = object
        .get("tool_name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            Error::plan_validation(format!(
                "step {} is missing a non-empty string 'tool_name'",
                position
            ))
        })?;

    if !capabilities.contains(tool_name) {
        return Err(Error::plan_validation(format!(
            "step {} uses unknown tool '{}'; available tools are: {}",
            position,
            tool_name,
            capabilities.names().join(", ")
        )));
    }

    let args = match object.get("args") {
        Some(Value::Array(items)) => items.iter().map(coerce_to_string).collect(),
        Some(other) => {
            tracing::debug!(position, kind = json_kind(other), "Discarding non-list args");
            Vec::new()
        }
        None => Vec::new(),
    };

    let kwargs = match object.get("kwargs") {
        Some(Value::Object(map)) => coerce_map(map),
        Some(other) => {
            tracing::debug!(position, kind = json_kind(other), "Discarding non-mapping kwargs");
            BTreeMap::new()
        }
        None => BTreeMap::new(),
    };

    Ok(Step {
        tool_name: tool_name.to_string(),
        args,
        kwargs,
        description: optional_text(object, "description"),
        reasoning: optional_text(object, "reasoning"),
    })
}

fn coerce_map(map: &Map<String, Value>) -> BTreeMap<String, String> {
    map.iter()
        .map(|(key, value)| (key.clone(), coerce_to_string(value)))
        .collect()
}

/// Strings pass through; everything else takes its JSON spelling.
fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn optional_text(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// Free-text List Parsing
// =============================================================================

struct ListMarkers {
    bullet: Regex,
    ordinal: Regex,
}

fn markers() -> &'static ListMarkers {
    static MARKERS: OnceLock<ListMarkers> = OnceLock::new();
    MARKERS.get_or_init(|| ListMarkers {
        bullet: Regex::new(r"^\s*[-*]\s*").unwrap(),
        ordinal: Regex::new(r"^\s*\d+\.\s*").unwrap(),
    })
}

/// Split generator text into items, one per non-blank line, with leading
/// `-`/`*` bullets and `N.` ordinals removed.
pub fn parse_list(text: &str) -> Vec<String> {
    let m = markers();
    text.lines()
        .filter_map(|line| {
            let without_bullet = m.bullet.replace(line, "");
            let item = m.ordinal.replace(&without_bullet, "");
            let item = item.trim();
            (!item.is_empty()).then(|| item.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use goal_agent_core::types::ToolDefinition;
    use serde_json::json;

    fn caps(names: &[&str]) -> CapabilitySnapshot {
        CapabilitySnapshot::new(
            names
                .iter()
                .map(|n| ToolDefinition {
                    name: n.to_string(),
                    description: String::new(),
                    parameters: json!({}),
                })
                .collect(),
        )
    }

    #[test]
    fn test_parse_valid_plan_coerces_values() {
        let raw = r#"[{"tool_name": "calculator", "args": [1, 2.5, true], "kwargs": {"precision": 2, "label": "sum"}, "description": "add"}]"#;
        let plan = parse_plan(raw, &caps(&["calculator"])).unwrap();

        assert_eq!(plan.len(), 1);
        let step = &plan.steps()[0];
        assert_eq!(step.args, vec!["1", "2.5", "true"]);
        assert_eq!(step.kwargs.get("precision").map(String::as_str), Some("2"));
        assert_eq!(step.kwargs.get("label").map(String::as_str), Some("sum"));
        assert_eq!(step.description.as_deref(), Some("add"));
    }

    #[test]
    fn test_empty_list_is_a_valid_empty_plan() {
        let plan = parse_plan("[]", &caps(&["echo"])).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_empty_response_is_parse_failure() {
        match parse_plan("   ", &caps(&["echo"])) {
            Err(Error::PlanParse(_)) => {}
            other => panic!("Expected PlanParse, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json_is_parse_failure() {
        match parse_plan("I think you should echo hello", &caps(&["echo"])) {
            Err(Error::PlanParse(msg)) => assert!(msg.contains("not valid JSON")),
            other => panic!("Expected PlanParse, got {:?}", other),
        }
    }

    #[test]
    fn test_object_instead_of_list_is_rejected() {
        match parse_plan(r#"{"tool_name": "echo"}"#, &caps(&["echo"])) {
            Err(Error::PlanValidation(msg)) => assert!(msg.contains("an object")),
            other => panic!("Expected PlanValidation, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tool_rejects_whole_plan() {
        let raw = r#"[{"tool_name": "echo"}, {"tool_name": "rm_rf"}]"#;
        match parse_plan(raw, &caps(&["echo"])) {
            Err(Error::PlanValidation(msg)) => {
                assert!(msg.contains("step 2"));
                assert!(msg.contains("rm_rf"));
                assert!(msg.contains("echo"));
            }
            other => panic!("Expected PlanValidation, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_or_non_string_tool_name() {
        let c = caps(&["echo"]);
        assert!(parse_plan(r#"[{"args": []}]"#, &c).is_err());
        assert!(parse_plan(r#"[{"tool_name": 7}]"#, &c).is_err());
        assert!(parse_plan(r#"[{"tool_name": "  "}]"#, &c).is_err());
        assert!(parse_plan(r#"["echo"]"#, &c).is_err());
    }

    #[test]
    fn test_malformed_args_and_kwargs_default_to_empty() {
        let raw = r#"[{"tool_name": "echo", "args": "hello", "kwargs": ["x"]}]"#;
        let plan = parse_plan(raw, &caps(&["echo"])).unwrap();
        assert!(plan.steps()[0].args.is_empty());
        assert!(plan.steps()[0].kwargs.is_empty());
    }

    #[test]
    fn test_repaired_response_parses() {
        let raw = "```json\n[\n  {\"tool_name\": \"echo\", \"args\": [\"hi\"], \"kwargs\": {\"loud\": True},}, // greet\n]\n```";
        let plan = parse_plan(raw, &caps(&["echo"])).unwrap();
        assert_eq!(plan.steps()[0].kwargs.get("loud").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_literal_spelled_argument_is_rewritten() {
        let raw = r#"[{"tool_name": "echo", "args": ["None"]}]"#;
        let plan = parse_plan(raw, &caps(&["echo"])).unwrap();
        assert_eq!(plan.steps()[0].args, vec!["null"]);
    }

    #[test]
    fn test_parse_list_strips_markers() {
        let text = "1. Research\n\n  2.  Design the schema\n- Build\n* Test\n   \nDeploy";
        assert_eq!(
            parse_list(text),
            vec!["Research", "Design the schema", "Build", "Test", "Deploy"]
        );
    }

    #[test]
    fn test_parse_list_bullet_then_ordinal() {
        assert_eq!(parse_list("- 1. Outline"), vec!["Outline"]);
        assert!(parse_list("\n \n").is_empty());
    }
}
