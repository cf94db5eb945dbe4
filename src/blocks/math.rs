use crate::error::Result;
use crate::runtime::block::{ActivateResult, Block, BlockDescriptor, ParamInfo};
use crate::runtime::context::Context;
use crate::value::{TypeSet, Value, ValueType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl MathOp {
    pub const ALL: [MathOp; 4] = [MathOp::Add, MathOp::Subtract, MathOp::Multiply, MathOp::Divide];

    pub fn block_name(self) -> &'static str {
        match self {
            MathOp::Add => "Math.Add",
            MathOp::Subtract => "Math.Subtract",
            MathOp::Multiply => "Math.Multiply",
            MathOp::Divide => "Math.Divide",
        }
    }

    fn identity(self) -> i64 {
        match self {
            MathOp::Add | MathOp::Subtract => 0,
            MathOp::Multiply | MathOp::Divide => 1,
        }
    }

    fn ints(self, a: i64, b: i64) -> ActivateResult {
        let result = match self {
            MathOp::Add => a.checked_add(b),
            MathOp::Subtract => a.checked_sub(b),
            MathOp::Multiply => a.checked_mul(b),
            MathOp::Divide if b == 0 => return ActivateResult::error("DivideByZero", format!("{a} / 0")),
            MathOp::Divide => a.checked_div(b),
        };
        match result {
            Some(v) => ActivateResult::Produced(Value::Int(v)),
            None => ActivateResult::error("Overflow", format!("{} overflows on {a} and {b}", self.block_name())),
        }
    }

    fn floats(self, a: f64, b: f64) -> ActivateResult {
        let result = match self {
            MathOp::Add => a + b,
            MathOp::Subtract => a - b,
            MathOp::Multiply => a * b,
            MathOp::Divide if b == 0.0 => return ActivateResult::error("DivideByZero", format!("{a} / 0")),
            MathOp::Divide => a / b,
        };
        ActivateResult::Produced(Value::Float(result))
    }
}

/// Binary arithmetic between the input and the `Operand` parameter.
///
/// Int with Int stays Int (overflow is an error); any Float operand makes the
/// result Float. The operand may be a `${var}` reference, resolved on every
/// activation.
#[derive(Debug)]
pub struct Arith {
    op: MathOp,
    operand: Value,
}

impl Arith {
    pub fn new(op: MathOp) -> Self {
        Self {
            op,
            operand: Value::Int(op.identity()),
        }
    }

    pub fn descriptor(op: MathOp) -> BlockDescriptor {
        BlockDescriptor::new(op.block_name(), TypeSet::NUMBER, TypeSet::NUMBER)
            .help("Applies the operation to the input and the operand.")
            .param(ParamInfo::new(
                "Operand",
                "Right-hand side of the operation.",
                TypeSet::NUMBER | ValueType::ContextVar,
                Value::Int(op.identity()),
            ))
    }
}

impl Block for Arith {
    fn set_param(&mut self, _index: usize, value: &Value) -> Result<()> {
        self.operand = value.clone();
        Ok(())
    }

    fn compose(&self, input: TypeSet) -> Option<TypeSet> {
        let int = TypeSet::from(ValueType::Int);
        match self.operand.value_type() {
            ValueType::Int if input == int => Some(int),
            ValueType::Float => Some(ValueType::Float.into()),
            _ => None,
        }
    }

    fn activate(&mut self, ctx: &mut Context, input: &Value) -> ActivateResult {
        let operand = match ctx.resolve(&self.operand) {
            Ok(v) => v,
            Err(e) => return ActivateResult::Error(e.into()),
        };
        match (input, &operand) {
            (Value::Int(a), Value::Int(b)) => self.op.ints(*a, *b),
            (Value::Int(a), Value::Float(b)) => self.op.floats(*a as f64, *b),
            (Value::Float(a), Value::Int(b)) => self.op.floats(*a, *b as f64),
            (Value::Float(a), Value::Float(b)) => self.op.floats(*a, *b),
            (Value::Int(_) | Value::Float(_), other) => ActivateResult::error(
                "TypeMismatch",
                format!("{} operand must be a number, found {}", self.op.block_name(), other.value_type()),
            ),
            (other, _) => ActivateResult::error(
                "TypeMismatch",
                format!("{} input must be a number, found {}", self.op.block_name(), other.value_type()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::scope::Scope;

    fn run(op: MathOp, input: Value, operand: Value) -> ActivateResult {
        let mut local = Scope::new();
        let mut global = Scope::new();
        let mut signals = Vec::new();
        global.set("step", Value::Int(3));
        let mut ctx = Context::new("test", 1, &mut local, &mut global, &mut signals);
        let mut block = Arith::new(op);
        block.set_param(0, &operand).unwrap();
        block.activate(&mut ctx, &input)
    }

    #[test]
    fn test_int_and_float() {
        assert_eq!(run(MathOp::Add, Value::Int(42), Value::Int(8)), ActivateResult::Produced(Value::Int(50)));
        assert_eq!(run(MathOp::Divide, Value::Int(7), Value::Int(2)), ActivateResult::Produced(Value::Int(3)));
        assert_eq!(
            run(MathOp::Multiply, Value::Int(2), Value::Float(1.5)),
            ActivateResult::Produced(Value::Float(3.0))
        );
        assert_eq!(
            run(MathOp::Subtract, Value::Int(10), Value::context_var("step")),
            ActivateResult::Produced(Value::Int(7))
        );
    }

    #[test]
    fn test_arith_errors() {
        assert!(matches!(
            run(MathOp::Divide, Value::Int(1), Value::Int(0)),
            ActivateResult::Error(e) if e.kind == "DivideByZero"
        ));
        assert!(matches!(
            run(MathOp::Add, Value::Int(i64::MAX), Value::Int(1)),
            ActivateResult::Error(e) if e.kind == "Overflow"
        ));
        assert!(matches!(
            run(MathOp::Add, Value::Int(1), Value::context_var("missing")),
            ActivateResult::Error(e) if e.kind == "UnknownVariable"
        ));
    }
}
