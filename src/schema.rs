use serde_json::{Value, json};

use crate::types::ClassificationResult;

pub const SCHEMA_NAME: &str = "classification_result";

const FIELDS: [&str; 4] = ["zip", "brand", "category", "time_pref"];

/// Strict output schema sent to the provider: four required nullable strings,
/// nothing else.
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "zip": {
                "type": ["string", "null"],
                "description": "Postal code mentioned in the text, or null"
            },
            "brand": {
                "type": ["string", "null"],
                "description": "Company or brand name mentioned in the text, or null"
            },
            "category": {
                "type": ["string", "null"],
                "description": "Domain label such as food, electronics, clothing, retail or services, or null"
            },
            "time_pref": {
                "type": ["string", "null"],
                "description": "Time preference phrase as written in the text, or null"
            }
        },
        "required": FIELDS,
        "additionalProperties": false
    })
}

/// Checks a structured provider response against [`response_schema`] and
/// converts it. Every key must be present; `null` is the absent marker.
pub fn parse_result(value: Value) -> Result<ClassificationResult, String> {
    let mut object = match value {
        Value::Object(object) => object,
        other => return Err(format!("expected a JSON object, got {}", kind(&other))),
    };

    if let Some(extra) = object.keys().find(|key| !FIELDS.contains(&key.as_str())) {
        return Err(format!("unexpected field \"{extra}\""));
    }

    let mut take = |field: &str| -> Result<Option<String>, String> {
        match object.remove(field) {
            None => Err(format!("missing field \"{field}\"")),
            Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(format!(
                "field \"{field}\" must be a string or null, got {}",
                kind(&other)
            )),
        }
    };

    Ok(ClassificationResult {
        zip: take("zip")?,
        brand: take("brand")?,
        category: take("category")?,
        time_pref: take("time_pref")?,
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_strict() {
        let schema = response_schema();
        assert_eq!(schema["additionalProperties"], json!(false));
        assert_eq!(
            schema["required"],
            json!(["zip", "brand", "category", "time_pref"])
        );
        let properties = schema["properties"].as_object().unwrap();
        assert_eq!(properties.len(), 4);
        for field in FIELDS {
            assert_eq!(properties[field]["type"], json!(["string", "null"]));
        }
    }

    #[test]
    fn parses_mixed_strings_and_nulls() {
        let result = parse_result(json!({
            "zip": "90210",
            "brand": null,
            "category": "food",
            "time_pref": null
        }))
        .unwrap();

        assert_eq!(result.zip.as_deref(), Some("90210"));
        assert_eq!(result.brand, None);
        assert_eq!(result.category.as_deref(), Some("food"));
        assert_eq!(result.time_pref, None);
    }

    #[test]
    fn empty_string_is_not_absent() {
        let result = parse_result(json!({
            "zip": "",
            "brand": null,
            "category": null,
            "time_pref": null
        }))
        .unwrap();
        assert_eq!(result.zip.as_deref(), Some(""));
    }

    #[test]
    fn rejects_missing_field() {
        let err = parse_result(json!({
            "zip": null,
            "brand": null,
            "category": null
        }))
        .unwrap_err();
        assert_eq!(err, "missing field \"time_pref\"");
    }

    #[test]
    fn rejects_extra_field() {
        let err = parse_result(json!({
            "zip": null,
            "brand": null,
            "category": null,
            "time_pref": null,
            "confidence": 0.9
        }))
        .unwrap_err();
        assert_eq!(err, "unexpected field \"confidence\"");
    }

    #[test]
    fn rejects_wrong_value_type() {
        let err = parse_result(json!({
            "zip": 90210,
            "brand": null,
            "category": null,
            "time_pref": null
        }))
        .unwrap_err();
        assert!(err.contains("\"zip\""));
        assert!(err.contains("number"));
    }

    #[test]
    fn rejects_non_object() {
        let err = parse_result(json!(["90210"])).unwrap_err();
        assert_eq!(err, "expected a JSON object, got array");
    }
}
