//! Runtime values exchanged between blocks.

mod json;
mod ops;
mod types;

pub use ops::Resolve;
pub use types::{TypeSet, ValueType};

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identifies the concrete type behind an opaque [`Value::Object`] handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectTag {
    pub vendor: u32,
    pub type_id: u32,
}

impl ObjectTag {
    pub const fn new(vendor: u32, type_id: u32) -> Self {
        Self { vendor, type_id }
    }
}

/// Opaque, shared handle carried by [`Value::Object`].
#[derive(Clone)]
pub struct ObjectRef {
    pub tag: ObjectTag,
    handle: Arc<dyn Any + Send + Sync>,
}

impl ObjectRef {
    pub fn new<T: Any + Send + Sync>(tag: ObjectTag, object: T) -> Self {
        Self {
            tag,
            handle: Arc::new(object),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.handle.downcast_ref::<T>()
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.handle, &other.handle)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

/// Tagged union flowing block-to-block and block-to-variable.
///
/// `Clone` gives independent ownership of `Seq`, `Table` and `Bytes`
/// payloads; `String` and `Object` payloads are reference counted and shared.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Arc<str>),
    Bytes(Vec<u8>),
    Seq(Vec<Value>),
    Table(HashMap<String, Value>),
    Object(ObjectRef),
    /// Name reference into a chain-local or node-global scope.
    ContextVar(Arc<str>),
}

impl Value {
    pub fn context_var(name: &str) -> Self {
        Value::ContextVar(Arc::from(name))
    }

    pub fn object<T: Any + Send + Sync>(tag: ObjectTag, object: T) -> Self {
        Value::Object(ObjectRef::new(tag, object))
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::None => ValueType::None,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::Bytes(_) => ValueType::Bytes,
            Value::Seq(_) => ValueType::Seq,
            Value::Table(_) => ValueType::Table,
            Value::Object(_) => ValueType::Object,
            Value::ContextVar(_) => ValueType::ContextVar,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(s) => Some(s.as_slice()),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_context_var(&self) -> Option<&str> {
        match self {
            Value::ContextVar(name) => Some(&**name),
            _ => None,
        }
    }
}

fn float_eq(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// Structural equality. `ContextVar` compares by name, use
/// [`Value::eq_in`] to compare through the referenced values.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => float_eq(*a, *b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.tag == b.tag && a.ptr_eq(b),
            (Value::ContextVar(a), Value::ContextVar(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Table(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                f.write_str("{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, map[key])?;
                }
                f.write_str("}")
            }
            Value::Object(o) => write!(f, "<object {:08x}:{:08x}>", o.tag.vendor, o.tag.type_id),
            Value::ContextVar(name) => write!(f, "${{{}}}", name),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Seq(items)
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(map: HashMap<String, Value>) -> Self {
        Value::Table(map)
    }
}
