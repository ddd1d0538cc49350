// Tue Jan 20 2026 - Alex

use crate::bridge::api::HostObject;
use crate::bridge::engine::QuickJsBridge;
use crate::bridge::types::{HostType, HostValue};
use std::sync::Arc;

/// Bind the stock host objects (`math`, `text`).
pub fn register_builtins(bridge: &mut QuickJsBridge) {
    bridge.bind("math", Arc::new(create_math_object()));
    bridge.bind("text", Arc::new(create_text_object()));
}

/// Names of the stock objects with a short summary
pub struct BuiltinObjects;

impl BuiltinObjects {
    pub fn list() -> Vec<(&'static str, &'static str)> {
        vec![
            ("math.add", "Sum of two numbers"),
            ("math.sub", "Difference of two numbers"),
            ("math.mul", "Product of two numbers"),
            ("math.div", "Quotient of two numbers, fails on zero divisor"),
            ("math.abs", "Absolute value"),
            ("math.pow", "Power function"),
            ("math.sqrt", "Square root"),
            ("math.max", "Largest of an array of numbers"),
            ("math.min", "Smallest of an array of numbers"),
            ("text.upper", "Convert to uppercase"),
            ("text.lower", "Convert to lowercase"),
            ("text.trim", "Trim whitespace"),
            ("text.len", "Length in characters"),
            ("text.split", "Split on a separator"),
            ("text.repeat", "Repeat a string n times"),
        ]
    }
}

/// Integer result when both inputs are integers and the result fits, float otherwise.
fn arith(
    args: &[HostValue],
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> anyhow::Result<HostValue> {
    if let (Some(a), Some(b)) = (args[0].as_int(), args[1].as_int()) {
        if let Some(n) = int_op(a, b) {
            return Ok(HostValue::Integer(n));
        }
    }
    let a = args[0].as_float().ok_or_else(|| anyhow::anyhow!("expected a number"))?;
    let b = args[1].as_float().ok_or_else(|| anyhow::anyhow!("expected a number"))?;
    Ok(HostValue::Float(float_op(a, b)))
}

fn numbers(value: &HostValue) -> anyhow::Result<Vec<f64>> {
    value
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("expected an array"))?
        .iter()
        .map(|v| v.as_float().ok_or_else(|| anyhow::anyhow!("expected only numbers, got {}", v.host_type())))
        .collect()
}

fn string_arg(args: &[HostValue], idx: usize) -> anyhow::Result<&str> {
    args.get(idx)
        .and_then(HostValue::as_str)
        .ok_or_else(|| anyhow::anyhow!("argument {} must be a string", idx))
}

pub fn create_math_object() -> HostObject {
    let two = [HostType::Number, HostType::Number];

    HostObject::builder("Math")
        .method("add", &two, |args| arith(args, i64::checked_add, |a, b| a + b))
        .method("sub", &two, |args| arith(args, i64::checked_sub, |a, b| a - b))
        .method("mul", &two, |args| arith(args, i64::checked_mul, |a, b| a * b))
        .method("div", &two, |args| {
            let divisor = args[1].as_float().unwrap_or(0.0);
            if divisor == 0.0 {
                anyhow::bail!("division by zero");
            }
            Ok(HostValue::Float(args[0].as_float().unwrap_or(0.0) / divisor))
        })
        .method("abs", &[HostType::Number], |args| match &args[0] {
            HostValue::Integer(n) => n
                .checked_abs()
                .map(HostValue::Integer)
                .ok_or_else(|| anyhow::anyhow!("integer overflow")),
            other => Ok(HostValue::Float(other.as_float().unwrap_or(0.0).abs())),
        })
        .method("pow", &two, |args| {
            let base = args[0].as_float().unwrap_or(0.0);
            let exp = args[1].as_float().unwrap_or(0.0);
            Ok(HostValue::Float(base.powf(exp)))
        })
        .method("sqrt", &[HostType::Number], |args| {
            let n = args[0].as_float().unwrap_or(0.0);
            if n < 0.0 {
                anyhow::bail!("square root of negative number");
            }
            Ok(HostValue::Float(n.sqrt()))
        })
        .method("max", &[HostType::Array], |args| {
            let items = numbers(&args[0])?;
            Ok(items.into_iter().reduce(f64::max).map(HostValue::Float).unwrap_or_default())
        })
        .method("min", &[HostType::Array], |args| {
            let items = numbers(&args[0])?;
            Ok(items.into_iter().reduce(f64::min).map(HostValue::Float).unwrap_or_default())
        })
        .build()
}

pub fn create_text_object() -> HostObject {
    HostObject::builder("Text")
        .method("upper", &[HostType::String], |args| {
            Ok(HostValue::string(string_arg(args, 0)?.to_uppercase()))
        })
        .method("lower", &[HostType::String], |args| {
            Ok(HostValue::string(string_arg(args, 0)?.to_lowercase()))
        })
        .method("trim", &[HostType::String], |args| {
            Ok(HostValue::string(string_arg(args, 0)?.trim()))
        })
        .method("len", &[HostType::String], |args| {
            Ok(HostValue::from(string_arg(args, 0)?.chars().count()))
        })
        .method("split", &[HostType::String, HostType::String], |args| {
            let text = string_arg(args, 0)?;
            let sep = string_arg(args, 1)?;
            Ok(HostValue::from(text.split(sep).collect::<Vec<_>>()))
        })
        .method("repeat", &[HostType::String, HostType::Integer], |args| {
            let text = string_arg(args, 0)?;
            let count = args[1].as_int().unwrap_or(0);
            if count < 0 {
                anyhow::bail!("repeat count must not be negative");
            }
            Ok(HostValue::string(text.repeat(count as usize)))
        })
        .build()
}
