use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use crate::error::{Error, Result};
use super::{Value, ValueType, TypeSet};

/// Something `ContextVar` names can be looked up in.
pub trait Resolve {
    fn lookup(&self, name: &str) -> Option<&Value>;
}

impl Resolve for HashMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl Value {
    /// Explicit, fallible tag conversion.
    pub fn convert_to(&self, target: ValueType) -> Result<Value> {
        if self.value_type() == target {
            return Ok(self.clone());
        }
        let fail = || Error::mismatch(target, self.value_type());
        let converted = match (self, target) {
            (Value::Int(i), ValueType::Float) => Value::Float(*i as f64),
            (Value::Float(f), ValueType::Int) => {
                if !f.is_finite() || *f < i64::MIN as f64 || *f >= i64::MAX as f64 {
                    return Err(fail());
                }
                Value::Int(f.trunc() as i64)
            }
            (Value::Bool(b), ValueType::Int) => Value::Int(*b as i64),
            (Value::Int(i), ValueType::Bool) => Value::Bool(*i != 0),
            (Value::Bool(b), ValueType::String) => Value::from(b.to_string()),
            (Value::Int(i), ValueType::String) => Value::from(i.to_string()),
            (Value::Float(f), ValueType::String) => Value::from(f.to_string()),
            (Value::String(s), ValueType::Int) => {
                Value::Int(s.trim().parse().map_err(|_| fail())?)
            }
            (Value::String(s), ValueType::Float) => {
                Value::Float(s.trim().parse().map_err(|_| fail())?)
            }
            (Value::String(s), ValueType::Bool) => match s.trim() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return Err(fail()),
            },
            (Value::String(s), ValueType::Bytes) => Value::Bytes(s.as_bytes().to_vec()),
            (Value::Bytes(b), ValueType::String) => {
                let text = std::str::from_utf8(b).map_err(|_| fail())?;
                Value::String(Arc::from(text))
            }
            _ => return Err(fail()),
        };
        Ok(converted)
    }

    /// Ordering between two values of the same tag. `Int` and `Float` compare
    /// numerically with each other.
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        let ordering = match (self, other) {
            (Value::None, Value::None) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).total_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.total_cmp(&(*b as f64)),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            (Value::Seq(a), Value::Seq(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.compare(y)? {
                        Ordering::Equal => continue,
                        decided => return Ok(decided),
                    }
                }
                a.len().cmp(&b.len())
            }
            _ => {
                let expected = match self.value_type() {
                    ValueType::Int | ValueType::Float => TypeSet::NUMBER,
                    t => TypeSet::from(t),
                };
                return Err(Error::mismatch(expected, other.value_type()));
            }
        };
        Ok(ordering)
    }

    /// Equality with `ContextVar` references followed through `scope`.
    ///
    /// Fails with `CyclicValue` when a reference re-enters itself and with
    /// `UnknownVariable` when it cannot be resolved.
    pub fn eq_in(&self, other: &Value, scope: &dyn Resolve) -> Result<bool> {
        let mut left = Vec::new();
        let mut right = Vec::new();
        eq_rec(self, other, scope, &mut left, &mut right)
    }

    /// Copy of this value with every `ContextVar` replaced by its target.
    pub fn resolve_deep(&self, scope: &dyn Resolve) -> Result<Value> {
        let mut path = Vec::new();
        resolve_rec(self, scope, &mut path)
    }
}

fn follow<'a>(name: &'a str, scope: &'a dyn Resolve, path: &[&str]) -> Result<&'a Value> {
    if path.contains(&name) {
        return Err(Error::CyclicValue(name.to_string()));
    }
    scope
        .lookup(name)
        .ok_or_else(|| Error::UnknownVariable(name.to_string()))
}

fn eq_rec<'a>(
    a: &'a Value,
    b: &'a Value,
    scope: &'a dyn Resolve,
    left: &mut Vec<&'a str>,
    right: &mut Vec<&'a str>,
) -> Result<bool> {
    if let Value::ContextVar(name) = a {
        let target = follow(name, scope, left)?;
        left.push(name);
        let result = eq_rec(target, b, scope, left, right);
        left.pop();
        return result;
    }
    if let Value::ContextVar(name) = b {
        let target = follow(name, scope, right)?;
        right.push(name);
        let result = eq_rec(a, target, scope, left, right);
        right.pop();
        return result;
    }
    match (a, b) {
        (Value::Seq(xs), Value::Seq(ys)) => {
            if xs.len() != ys.len() {
                return Ok(false);
            }
            for (x, y) in xs.iter().zip(ys.iter()) {
                if !eq_rec(x, y, scope, left, right)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        (Value::Table(xs), Value::Table(ys)) => {
            if xs.len() != ys.len() {
                return Ok(false);
            }
            for (key, x) in xs {
                match ys.get(key) {
                    Some(y) => {
                        if !eq_rec(x, y, scope, left, right)? {
                            return Ok(false);
                        }
                    }
                    None => return Ok(false),
                }
            }
            Ok(true)
        }
        _ => Ok(a == b),
    }
}

fn resolve_rec<'a>(value: &'a Value, scope: &'a dyn Resolve, path: &mut Vec<&'a str>) -> Result<Value> {
    match value {
        Value::ContextVar(name) => {
            let target = follow(name, scope, path)?;
            path.push(name);
            let resolved = resolve_rec(target, scope, path);
            path.pop();
            resolved
        }
        Value::Seq(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(resolve_rec(item, scope, path)?);
            }
            Ok(Value::Seq(out))
        }
        Value::Table(map) => {
            let mut out = HashMap::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.clone(), resolve_rec(item, scope, path)?);
            }
            Ok(Value::Table(out))
        }
        other => Ok(other.clone()),
    }
}
