//! Alias resolution and value coercion shared by every normalizer.
//!
//! A logical field is described by an ordered list of paths. The first path
//! that leads to a present, non-null value wins; the winner is then coerced to
//! the field's type, falling back to the field's default when it does not fit.

use serde_json::{Map, Value};

/// Placeholder for display text that has no value
pub const DASH: &str = "—";

/// Value at `path` below `root`, treating `null` as absent.
#[must_use]
pub fn at<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.as_object()?.get(*key)?;
    }
    (!cur.is_null()).then_some(cur)
}

/// First present value among `paths`.
#[must_use]
pub fn first_at<'a>(root: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    paths.iter().find_map(|p| at(root, p))
}

/// First present value among top-level `keys`.
#[must_use]
pub fn first<'a>(root: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| at(root, &[*k]))
}

/// First present `object.field` where `object` is taken from `sides` in order.
#[must_use]
pub fn side_field<'a>(root: &'a Value, sides: &[&str], field: &str) -> Option<&'a Value> {
    sides.iter().find_map(|side| at(root, &[*side, field]))
}

/// Finite JSON number.
#[must_use]
pub fn finite(v: Option<&Value>) -> Option<f64> {
    v.and_then(Value::as_f64).filter(|n| n.is_finite())
}

/// Finite JSON number or numeric string.
#[must_use]
pub fn numeric(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// Finite number, else `0`.
#[must_use]
pub fn num(v: Option<&Value>) -> f64 {
    finite(v).unwrap_or(0.0)
}

/// String value, else `fallback`.
#[must_use]
pub fn text(v: Option<&Value>, fallback: &str) -> String {
    v.and_then(Value::as_str).unwrap_or(fallback).to_string()
}

/// String value, else the dash placeholder.
#[must_use]
pub fn text_or_dash(v: Option<&Value>) -> String {
    text(v, DASH)
}

/// Any scalar rendered as text; strings are taken verbatim.
#[must_use]
pub fn coerce_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Array contents, else empty.
#[must_use]
pub fn array(v: Option<&Value>) -> Vec<Value> {
    v.and_then(Value::as_array).cloned().unwrap_or_default()
}

/// Object entries of an array, skipping anything that is not an object.
pub fn objects(v: Option<&Value>) -> impl Iterator<Item = &Value> {
    v.and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|item| item.is_object())
}

/// Object contents, else empty.
#[must_use]
pub fn object(v: Option<&Value>) -> Map<String, Value> {
    v.and_then(Value::as_object).cloned().unwrap_or_default()
}

/// Non-negative integer identifier from a number or numeric string.
#[must_use]
pub fn identifier(v: Option<&Value>) -> Option<u64> {
    match v? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
