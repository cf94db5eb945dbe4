use std::fmt;
use std::ops::BitOr;
use serde::{Deserialize, Serialize};

/// Payload-free tag of a [`Value`](super::Value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    None,
    Bool,
    Int,
    Float,
    String,
    Bytes,
    Seq,
    Table,
    Object,
    ContextVar,
}

impl ValueType {
    pub const ALL: [ValueType; 10] = [
        ValueType::None,
        ValueType::Bool,
        ValueType::Int,
        ValueType::Float,
        ValueType::String,
        ValueType::Bytes,
        ValueType::Seq,
        ValueType::Table,
        ValueType::Object,
        ValueType::ContextVar,
    ];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueType::None => "None",
            ValueType::Bool => "Bool",
            ValueType::Int => "Int",
            ValueType::Float => "Float",
            ValueType::String => "String",
            ValueType::Bytes => "Bytes",
            ValueType::Seq => "Seq",
            ValueType::Table => "Table",
            ValueType::Object => "Object",
            ValueType::ContextVar => "ContextVar",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of value tags, used for block input/output declarations and
/// accepted parameter types.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeSet(u16);

impl TypeSet {
    pub const EMPTY: TypeSet = TypeSet(0);
    pub const ANY: TypeSet = TypeSet((1u16 << ValueType::ALL.len()) - 1);
    pub const NONE: TypeSet = TypeSet(1u16 << ValueType::None as u16);
    pub const NUMBER: TypeSet = TypeSet((1u16 << ValueType::Int as u16) | (1u16 << ValueType::Float as u16));

    pub fn of(types: &[ValueType]) -> Self {
        types.iter().fold(TypeSet::EMPTY, |acc, t| acc | *t)
    }

    pub fn contains(self, t: ValueType) -> bool {
        self.0 & t.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_any(self) -> bool {
        self == TypeSet::ANY
    }

    pub fn is_subset_of(self, other: TypeSet) -> bool {
        self.0 & !other.0 == 0
    }

    /// Whether values described by `produced` can always be fed into a slot
    /// declaring `self`. An `Any` producer is dynamically typed and only
    /// checked at activation time.
    pub fn accepts(self, produced: TypeSet) -> bool {
        if self.is_any() || produced.is_any() {
            return true;
        }
        !produced.is_empty() && produced.is_subset_of(self)
    }

    pub fn union(self, other: TypeSet) -> Self {
        TypeSet(self.0 | other.0)
    }

    pub fn without(self, t: ValueType) -> Self {
        TypeSet(self.0 & !t.bit())
    }

    pub fn iter(self) -> impl Iterator<Item = ValueType> {
        ValueType::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl From<ValueType> for TypeSet {
    fn from(t: ValueType) -> Self {
        TypeSet(t.bit())
    }
}

impl BitOr for ValueType {
    type Output = TypeSet;

    fn bitor(self, rhs: ValueType) -> TypeSet {
        TypeSet(self.bit() | rhs.bit())
    }
}

impl BitOr<ValueType> for TypeSet {
    type Output = TypeSet;

    fn bitor(self, rhs: ValueType) -> TypeSet {
        TypeSet(self.0 | rhs.bit())
    }
}

impl BitOr for TypeSet {
    type Output = TypeSet;

    fn bitor(self, rhs: TypeSet) -> TypeSet {
        self.union(rhs)
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            return f.write_str("Any");
        }
        if self.is_empty() {
            return f.write_str("Nothing");
        }
        let names: Vec<&str> = self.iter().map(ValueType::name).collect();
        f.write_str(&names.join("|"))
    }
}

impl fmt::Debug for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeSet({})", self)
    }
}
