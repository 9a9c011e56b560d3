//! Built-in template functions.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use rand::Rng;
use serde_json::Value;

use super::template::{TemplateError, to_text};

const ALPHA: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const ALPHA_NUM: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d";

/// Longest string the `random.*` functions produce.
pub(super) const MAX_RANDOM_LEN: usize = 1 << 16;

/// Names accepted in function position.
pub(super) const FUNCTIONS: &[&str] = &[
    "random.Alpha",
    "random.AlphaNum",
    "random.ASCII",
    "uuid",
    "now",
    "upper",
    "lower",
    "trim",
    "title",
];

pub(super) fn is_function(name: &str) -> bool {
    FUNCTIONS.contains(&name)
}

pub(super) fn call(name: &str, args: Vec<Value>) -> Result<Value, TemplateError> {
    match name {
        "random.Alpha" => random(name, &args, |rng, n| pick(rng, ALPHA, n)),
        "random.AlphaNum" => random(name, &args, |rng, n| pick(rng, ALPHA_NUM, n)),
        "random.ASCII" => random(name, &args, |rng, n| {
            (0..n).map(|_| char::from(rng.random_range(b' '..=b'~'))).collect()
        }),
        "uuid" => {
            arity(name, &args, 0)?;
            Ok(Value::String(uuid::Uuid::new_v4().to_string()))
        }
        "now" => now(&args),
        "upper" => unary(name, args, |s| s.to_uppercase()),
        "lower" => unary(name, args, |s| s.to_lowercase()),
        "trim" => unary(name, args, |s| s.trim().to_owned()),
        "title" => unary(name, args, title_case),
        other => Err(TemplateError::Execution(format!(
            "function \"{other}\" not defined"
        ))),
    }
}

fn arity(name: &str, args: &[Value], expected: usize) -> Result<(), TemplateError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(TemplateError::Execution(format!(
            "wrong number of args for {name}: want {expected} got {}",
            args.len()
        )))
    }
}

fn random<F>(name: &str, args: &[Value], generate: F) -> Result<Value, TemplateError>
where
    F: FnOnce(&mut rand::rngs::ThreadRng, usize) -> String,
{
    arity(name, args, 1)?;
    let n = match &args[0] {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse::<u64>().ok(),
        _ => None,
    }
    .and_then(|n| usize::try_from(n).ok())
    .ok_or_else(|| {
        TemplateError::Execution(format!(
            "{name}: expected a non-negative length, got {}",
            args[0]
        ))
    })?;
    if n > MAX_RANDOM_LEN {
        return Err(TemplateError::Execution(format!(
            "{name}: length {n} exceeds the maximum of {MAX_RANDOM_LEN}"
        )));
    }

    let mut rng = rand::rng();
    Ok(Value::String(generate(&mut rng, n)))
}

fn pick(rng: &mut rand::rngs::ThreadRng, charset: &[u8], n: usize) -> String {
    (0..n)
        .map(|_| char::from(charset[rng.random_range(0..charset.len())]))
        .collect()
}

fn now(args: &[Value]) -> Result<Value, TemplateError> {
    let format = match args {
        [] => DEFAULT_TIME_FORMAT.to_owned(),
        [single] => to_text(single),
        _ => {
            return Err(TemplateError::Execution(format!(
                "wrong number of args for now: want at most 1 got {}",
                args.len()
            )));
        }
    };

    let items: Vec<Item<'_>> = StrftimeItems::new(&format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(TemplateError::Execution(format!(
            "now: invalid time format \"{format}\""
        )));
    }

    let mut out = String::new();
    write!(out, "{}", chrono::Local::now().format_with_items(items.into_iter()))
        .map_err(|_| TemplateError::Execution(format!("now: cannot format \"{format}\"")))?;
    Ok(Value::String(out))
}

fn unary<F>(name: &str, args: Vec<Value>, apply: F) -> Result<Value, TemplateError>
where
    F: FnOnce(&str) -> String,
{
    arity(name, &args, 1)?;
    Ok(Value::String(apply(&to_text(&args[0]))))
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace();
    }
    out
}
