//! Explicit nested-value access for raw API payloads
//!
//! Payloads arrive as deeply nested JSON with many optional branches. All
//! field access goes through a path of keys and indices so that "which fields
//! are optional" is visible at the call site: [`walk`] returns an explicit
//! absence, [`require`] turns absence into a shape error naming the path.

use serde_json::Value;

use crate::error::{FitbitError, Result};
use crate::model::row::Cell;

/// One step of a lookup path
#[derive(Debug, Clone, Copy)]
pub enum Step<'a> {
    Key(&'a str),
    Idx(usize),
}

impl std::fmt::Display for Step<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Key(k) => write!(f, ".{}", k),
            Step::Idx(i) => write!(f, "[{}]", i),
        }
    }
}

fn path_string(path: &[Step<'_>]) -> String {
    path.iter().map(|s| s.to_string()).collect()
}

/// Follow a path of keys/indices, returning absence instead of failing
pub fn walk<'a>(value: &'a Value, path: &[Step<'_>]) -> Option<&'a Value> {
    let mut current = value;
    for step in path {
        current = match step {
            Step::Key(k) => current.get(k)?,
            Step::Idx(i) => current.get(i)?,
        };
        if current.is_null() {
            return None;
        }
    }
    Some(current)
}

/// Follow a path that the caller treats as structurally required
pub fn require<'a>(value: &'a Value, path: &[Step<'_>]) -> Result<&'a Value> {
    walk(value, path).ok_or_else(|| FitbitError::shape(format!("missing {}", path_string(path))))
}

/// Required array lookup
pub fn require_array<'a>(value: &'a Value, path: &[Step<'_>]) -> Result<&'a Vec<Value>> {
    require(value, path)?
        .as_array()
        .ok_or_else(|| FitbitError::shape(format!("{} is not an array", path_string(path))))
}

/// Optional array lookup; absence yields an empty slice
pub fn optional_array<'a>(value: &'a Value, path: &[Step<'_>]) -> &'a [Value] {
    walk(value, path)
        .and_then(|v| v.as_array())
        .map(|v| v.as_slice())
        .unwrap_or(&[])
}

/// Optional string lookup
pub fn optional_str<'a>(value: &'a Value, path: &[Step<'_>]) -> Option<&'a str> {
    walk(value, path).and_then(|v| v.as_str())
}

/// Optional scalar as a table cell; absence becomes `Cell::Null`
pub fn optional_cell(value: &Value, path: &[Step<'_>]) -> Cell {
    walk(value, path).map(Cell::from_json).unwrap_or(Cell::Null)
}

/// Required scalar as a table cell; absence is a shape error
pub fn required_cell(value: &Value, path: &[Step<'_>]) -> Result<Cell> {
    Ok(Cell::from_json(require(value, path)?))
}

#[cfg(test)]
mod tests {
    use super::Step::{Idx, Key};
    use super::*;
    use serde_json::json;

    #[test]
    fn test_walk_nested() {
        let v = json!({"summary": {"distances": [{"activity": "total", "distance": 5.2}]}});
        let found = walk(&v, &[Key("summary"), Key("distances"), Idx(0), Key("distance")]);
        assert_eq!(found.and_then(|v| v.as_f64()), Some(5.2));
    }

    #[test]
    fn test_walk_absent_branch() {
        let v = json!({"summary": {}});
        assert!(walk(&v, &[Key("summary"), Key("distances"), Idx(0)]).is_none());
        assert!(walk(&v, &[Key("goals"), Key("steps")]).is_none());
    }

    #[test]
    fn test_explicit_null_is_absent() {
        let v = json!({"summary": {"restingHeartRate": null}});
        assert!(walk(&v, &[Key("summary"), Key("restingHeartRate")]).is_none());
        assert_eq!(
            optional_cell(&v, &[Key("summary"), Key("restingHeartRate")]),
            Cell::Null
        );
    }

    #[test]
    fn test_require_names_the_path() {
        let v = json!({});
        let err = require(&v, &[Key("summary"), Key("steps")]).unwrap_err();
        assert!(err.to_string().contains(".summary.steps"));
    }

    #[test]
    fn test_optional_cell_types() {
        let v = json!({"a": 3, "b": 2.5, "c": "x", "d": true});
        assert_eq!(optional_cell(&v, &[Key("a")]), Cell::Int(3));
        assert_eq!(optional_cell(&v, &[Key("b")]), Cell::Float(2.5));
        assert_eq!(optional_cell(&v, &[Key("c")]), Cell::Text("x".to_string()));
        assert_eq!(optional_cell(&v, &[Key("d")]), Cell::Bool(true));
        assert_eq!(optional_cell(&v, &[Key("missing")]), Cell::Null);
    }
}
