use serde_json::{Map, Number, Value as Json};
use crate::error::{Error, Result};
use super::{TypeSet, Value, ValueType};

/// `${name}` strings become `ContextVar` references.
fn parse_var_ref(s: &str) -> Option<&str> {
    let name = s.strip_prefix("${")?.strip_suffix('}')?;
    if name.is_empty() { None } else { Some(name) }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Value::None,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => match parse_var_ref(&s) {
                Some(name) => Value::context_var(name),
                None => Value::from(s),
            },
            Json::Array(items) => Value::Seq(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::Table(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

impl Value {
    /// Fails with `TypeMismatch` for values JSON cannot carry: objects and
    /// non-finite floats.
    pub fn to_json(&self) -> Result<Json> {
        let json = match self {
            Value::None => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::Number((*i).into()),
            Value::Float(f) => match Number::from_f64(*f) {
                Some(n) => Json::Number(n),
                None => return Err(Error::mismatch(TypeSet::ANY.without(ValueType::Float), ValueType::Float)),
            },
            Value::String(s) => Json::String(s.to_string()),
            Value::Bytes(b) => Json::Array(b.iter().map(|byte| Json::Number((*byte).into())).collect()),
            Value::Seq(items) => Json::Array(items.iter().map(Value::to_json).collect::<Result<_>>()?),
            Value::Table(map) => {
                let mut out = Map::new();
                for (k, v) in map {
                    out.insert(k.clone(), v.to_json()?);
                }
                Json::Object(out)
            }
            Value::ContextVar(name) => Json::String(format!("${{{}}}", name)),
            Value::Object(_) => {
                return Err(Error::mismatch(TypeSet::ANY.without(ValueType::Object), ValueType::Object));
            }
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        let value = Value::from(json!({ "n": 1, "f": 1.5, "list": [true, null], "ref": "${x}" }));
        let table = value.as_table().unwrap();
        assert_eq!(table["n"], Value::Int(1));
        assert_eq!(table["f"], Value::Float(1.5));
        assert_eq!(table["list"], Value::Seq(vec![Value::Bool(true), Value::None]));
        assert_eq!(table["ref"], Value::context_var("x"));
    }

    #[test]
    fn test_plain_dollar_strings_stay_strings() {
        assert_eq!(Value::from(json!("${}")), Value::from("${}"));
        assert_eq!(Value::from(json!("$x")), Value::from("$x"));
    }

    #[test]
    fn test_to_json() {
        let value = Value::Seq(vec![Value::Int(1), Value::Bytes(vec![7]), Value::context_var("y")]);
        assert_eq!(value.to_json().unwrap(), json!([1, [7], "${y}"]));
    }

    #[test]
    fn test_non_finite_floats_are_rejected() {
        assert_eq!(Value::Float(-0.5).to_json().unwrap(), json!(-0.5));
        assert!(Value::Float(f64::NAN).to_json().is_err());
        assert!(Value::Float(f64::INFINITY).to_json().is_err());
    }
}
