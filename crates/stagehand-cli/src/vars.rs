//! `--var key=value` template variable overrides.

use serde_json::{Map, Value};

use crate::error::{CliError, CliResult};

/// Merge each `a.b.c=value` override into `vars`.
///
/// Dotted keys create nested tables; a scalar in the way is replaced.
/// Values are always strings.
pub fn apply_overrides(vars: &mut Value, overrides: &[String]) -> CliResult<()> {
    for raw in overrides {
        let (key, value) = raw.split_once('=').ok_or_else(|| invalid(raw, "missing '='"))?;
        let path: Vec<&str> = key
            .split('.')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .collect();
        let Some((leaf, parents)) = path.split_last() else {
            return Err(invalid(raw, "empty key"));
        };

        let mut current = &mut *vars;
        for segment in parents {
            current = object(current)
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        object(current).insert(leaf.to_string(), Value::String(value.to_owned()));
    }
    Ok(())
}

/// The value as a table, replacing it when it is not one.
fn object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just made an object"),
    }
}

fn invalid(raw: &str, reason: &str) -> CliError {
    CliError::InvalidInput {
        message: format!("--var '{raw}': {reason}"),
        source: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_keys_merge_into_existing_tree() {
        let mut vars = json!({"project": {"name": "old", "license": "MIT"}});

        apply_overrides(
            &mut vars,
            &["project.name=demo".into(), "author=me".into()],
        )
        .unwrap();

        assert_eq!(
            vars,
            json!({"project": {"name": "demo", "license": "MIT"}, "author": "me"})
        );
    }

    #[test]
    fn value_may_contain_equals() {
        let mut vars = json!({});
        apply_overrides(&mut vars, &["query=a=b".into()]).unwrap();
        assert_eq!(vars["query"], "a=b");
    }

    #[test]
    fn scalar_in_path_is_replaced() {
        let mut vars = json!({"a": "scalar"});
        apply_overrides(&mut vars, &["a.b=1".into()]).unwrap();
        assert_eq!(vars, json!({"a": {"b": "1"}}));
    }

    #[test]
    fn malformed_overrides_are_input_errors() {
        let mut vars = json!({});
        assert_eq!(
            apply_overrides(&mut vars, &["novalue".into()])
                .unwrap_err()
                .exit_code(),
            2
        );
        assert!(apply_overrides(&mut vars, &[" . =x".into()]).is_err());
    }
}
