use std::collections::HashMap;
use evalexpr::{build_operator_tree, ContextWithMutableVariables, DefaultNumericTypes, HashMapContext, Node as ExprTree};
use crate::error::{Error, Result};
use crate::runtime::block::{ActivateResult, Block, BlockDescriptor, ParamInfo};
use crate::runtime::context::Context;
use crate::value::{TypeSet, Value, ValueType};

type ExprValue = evalexpr::Value<DefaultNumericTypes>;

/// Evaluates an arithmetic/boolean expression over the input (`input`) and
/// the visible variables. `${name}` is accepted as a variable reference.
#[derive(Debug, Default)]
pub struct Expr {
    source: String,
    tree: Option<ExprTree<DefaultNumericTypes>>,
}

impl Expr {
    pub fn descriptor() -> BlockDescriptor {
        BlockDescriptor::new("Expr", TypeSet::ANY, TypeSet::ANY)
            .help("Evaluates an expression; the input is bound to `input`.")
            .param(ParamInfo::new("Expression", "Expression text, e.g. `input * 2 + ${offset}`.", ValueType::String, Value::None).required())
    }
}

impl Block for Expr {
    fn set_param(&mut self, index: usize, value: &Value) -> Result<()> {
        let source = strip_var_refs(value.as_str().unwrap_or_default());
        let tree = build_operator_tree::<DefaultNumericTypes>(&source).map_err(|e| Error::InvalidParam {
            block: "Expr".to_string(),
            index,
            message: e.to_string(),
        })?;
        self.source = source;
        self.tree = Some(tree);
        Ok(())
    }

    fn activate(&mut self, ctx: &mut Context, input: &Value) -> ActivateResult {
        let Some(tree) = &self.tree else {
            return ActivateResult::error("InvalidExpression", "no expression bound");
        };

        // Later entries win: locals over globals, `input` over both.
        let mut visible: HashMap<&str, ExprValue> = HashMap::new();
        let scopes = ctx
            .global()
            .iter()
            .chain(ctx.local().iter())
            .chain(std::iter::once(("input", input)));
        for (name, value) in scopes {
            match to_expr(value) {
                Some(ev) => visible.insert(name, ev),
                None => visible.remove(name),
            };
        }

        let mut eval_ctx = HashMapContext::<DefaultNumericTypes>::new();
        for (name, ev) in visible {
            if let Err(e) = eval_ctx.set_value(name.to_string(), ev) {
                return ActivateResult::error("Expression", format!("'{}': {}", self.source, e));
            }
        }

        match tree.eval_with_context(&eval_ctx) {
            Ok(result) => ActivateResult::Produced(from_expr(result)),
            Err(e) => ActivateResult::error("Expression", format!("'{}': {}", self.source, e)),
        }
    }
}

/// Rewrites `${name}` references to bare `name`, leaving every other brace alone.
fn strip_var_refs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else { break };
        out.push_str(&rest[..start]);
        out.push_str(&after[..end]);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

fn to_expr(value: &Value) -> Option<ExprValue> {
    match value {
        Value::None => Some(ExprValue::Empty),
        Value::Bool(b) => Some(ExprValue::Boolean(*b)),
        Value::Int(i) => Some(ExprValue::Int(*i)),
        Value::Float(f) => Some(ExprValue::Float(*f)),
        Value::String(s) => Some(ExprValue::String(s.to_string())),
        Value::Seq(items) => items.iter().map(to_expr).collect::<Option<Vec<_>>>().map(ExprValue::Tuple),
        _ => None,
    }
}

fn from_expr(value: ExprValue) -> Value {
    match value {
        ExprValue::Boolean(b) => Value::Bool(b),
        ExprValue::Int(i) => Value::Int(i),
        ExprValue::Float(f) => Value::Float(f),
        ExprValue::String(s) => Value::from(s),
        ExprValue::Tuple(items) => Value::Seq(items.into_iter().map(from_expr).collect()),
        _ => Value::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::scope::Scope;

    #[test]
    fn test_expression_sees_input_and_vars() {
        let mut local = Scope::new();
        let mut global = Scope::new();
        let mut signals = Vec::new();
        global.set("offset", Value::Int(1));
        global.set("scale", Value::Int(100));
        local.set("scale", Value::Int(3));
        let mut ctx = Context::new("test", 1, &mut local, &mut global, &mut signals);

        let mut expr = Expr::default();
        expr.set_param(0, &Value::from("input * scale + ${offset}")).unwrap();
        assert_eq!(expr.activate(&mut ctx, &Value::Int(4)), ActivateResult::Produced(Value::Int(13)));

        expr.set_param(0, &Value::from("input > 10")).unwrap();
        assert_eq!(expr.activate(&mut ctx, &Value::Int(4)), ActivateResult::Produced(Value::Bool(false)));
    }

    #[test]
    fn test_locals_and_input_shadow_globals_of_another_type() {
        let mut local = Scope::new();
        let mut global = Scope::new();
        let mut signals = Vec::new();
        global.set("scale", Value::Int(100));
        global.set("input", Value::from("oops"));
        local.set("scale", Value::Float(1.5));
        let mut ctx = Context::new("test", 1, &mut local, &mut global, &mut signals);

        let mut expr = Expr::default();
        expr.set_param(0, &Value::from("scale")).unwrap();
        assert_eq!(expr.activate(&mut ctx, &Value::Int(0)), ActivateResult::Produced(Value::Float(1.5)));

        expr.set_param(0, &Value::from("input * 2")).unwrap();
        assert_eq!(expr.activate(&mut ctx, &Value::Int(21)), ActivateResult::Produced(Value::Int(42)));
    }

    #[test]
    fn test_braces_inside_literals_survive() {
        assert_eq!(strip_var_refs("${a} + ${b}"), "a + b");
        assert_eq!(strip_var_refs("\"a}b\""), "\"a}b\"");
        assert_eq!(strip_var_refs("${open"), "${open");

        let mut local = Scope::new();
        let mut global = Scope::new();
        let mut signals = Vec::new();
        let mut ctx = Context::new("test", 1, &mut local, &mut global, &mut signals);

        let mut expr = Expr::default();
        expr.set_param(0, &Value::from("\"a}b\"")).unwrap();
        assert_eq!(expr.activate(&mut ctx, &Value::None), ActivateResult::Produced(Value::from("a}b")));
    }

    #[test]
    fn test_bad_expression_is_rejected() {
        let mut expr = Expr::default();
        assert!(matches!(
            expr.set_param(0, &Value::from("(input + 1")),
            Err(Error::InvalidParam { .. })
        ));
    }
}
