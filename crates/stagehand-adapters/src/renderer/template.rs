//! Text templates over a JSON variable tree.
//!
//! Supported syntax:
//!
//! - `{{ .a.b }}` nested variable lookup, `{{ . }}` the whole tree
//! - `{{- ... -}}` trims whitespace before / after the action
//! - `{{ .name | upper }}` pipelines; the piped value is the last argument
//! - `{{ random.Alpha 8 }}`, `{{ uuid }}`, `{{ now "%Y" }}` built-in functions
//! - `{{/* comment */}}`

use serde_json::Value;
use stagehand_core::{
    application::ports::TemplateRenderer,
    domain::{DomainError, MissingKey, TemplateOptions},
    error::StagehandResult,
};
use thiserror::Error;
use tracing::trace;

use super::functions;

const NO_VALUE: &str = "<no value>";

#[derive(Debug, Error)]
pub(super) enum TemplateError {
    #[error("{0}")]
    Syntax(String),
    #[error("{0}")]
    MissingKey(String),
    #[error("{0}")]
    Execution(String),
}

impl TemplateError {
    fn into_domain(self, template: &str) -> DomainError {
        let template = template.to_owned();
        match self {
            Self::Syntax(reason) => DomainError::TemplateSyntax { template, reason },
            Self::MissingKey(key) => DomainError::MissingTemplateKey { template, key },
            Self::Execution(reason) => DomainError::TemplateExecution { template, reason },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Term {
    Field(Vec<String>),
    Str(String),
    Int(i64),
    Function(String),
}

type Pipeline = Vec<Vec<Term>>;

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Action(Pipeline),
}

/// Template engine bound to one variable tree and one set of options.
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    vars: Value,
    options: TemplateOptions,
}

impl TemplateEngine {
    pub fn new(vars: Value, options: TemplateOptions) -> Self {
        Self { vars, options }
    }

    /// Render `text`; `name` only appears in error messages.
    pub fn render_str(&self, name: &str, text: &str) -> Result<String, DomainError> {
        let nodes = parse(text).map_err(|e| e.into_domain(name))?;
        let mut out = String::with_capacity(text.len());
        for node in &nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Action(pipeline) => {
                    let value = self.eval_pipeline(pipeline).map_err(|e| e.into_domain(name))?;
                    out.push_str(&to_text(&value));
                }
            }
        }
        trace!(template = name, "template rendered");
        Ok(out)
    }

    fn eval_pipeline(&self, pipeline: &Pipeline) -> Result<Value, TemplateError> {
        let mut piped: Option<Value> = None;
        for command in pipeline {
            piped = Some(self.eval_command(command, piped.take())?);
        }
        Ok(piped.unwrap_or(Value::Null))
    }

    fn eval_command(&self, terms: &[Term], piped: Option<Value>) -> Result<Value, TemplateError> {
        match terms {
            [Term::Function(name), args @ ..] => {
                let mut values = Vec::with_capacity(args.len() + 1);
                for arg in args {
                    values.push(self.eval_term(arg)?);
                }
                values.extend(piped);
                functions::call(name, values)
            }
            [operand] if piped.is_none() => self.eval_term(operand),
            _ => Err(TemplateError::Execution(
                "can't give argument to non-function".into(),
            )),
        }
    }

    fn eval_term(&self, term: &Term) -> Result<Value, TemplateError> {
        match term {
            Term::Field(path) => self.lookup(path),
            Term::Str(s) => Ok(Value::String(s.clone())),
            Term::Int(n) => Ok(Value::from(*n)),
            Term::Function(name) => functions::call(name, Vec::new()),
        }
    }

    fn lookup(&self, path: &[String]) -> Result<Value, TemplateError> {
        let mut current = &self.vars;
        for key in path {
            match current {
                Value::Object(map) => match map.get(key) {
                    Some(next) => current = next,
                    None => return self.missing(path),
                },
                Value::Null => return self.missing(path),
                other => {
                    return Err(TemplateError::Execution(format!(
                        "can't evaluate field {key} in type {}",
                        kind(other)
                    )));
                }
            }
        }
        Ok(current.clone())
    }

    fn missing(&self, path: &[String]) -> Result<Value, TemplateError> {
        match self.options.missing_key {
            MissingKey::Default | MissingKey::Zero => Ok(Value::Null),
            MissingKey::Invalid => Ok(Value::String(NO_VALUE.into())),
            MissingKey::Error => Err(TemplateError::MissingKey(path.join("."))),
        }
    }
}

impl TemplateRenderer for TemplateEngine {
    fn render(&self, name: &str, text: &str) -> StagehandResult<String> {
        Ok(self.render_str(name, text)?)
    }
}

/// Text form of a value as written into the output.
pub(super) fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}

fn parse(text: &str) -> Result<Vec<Node>, TemplateError> {
    let mut nodes = Vec::new();
    let mut rest = text;
    let mut trim_next = false;

    while let Some(start) = rest.find("{{") {
        let mut literal = &rest[..start];
        if trim_next {
            literal = literal.trim_start();
        }

        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| TemplateError::Syntax("unclosed action".into()))?;
        let mut body = &after[..end];

        let trim_left = has_left_trim(body);
        if trim_left {
            literal = literal.trim_end();
            body = &body[1..];
        }
        trim_next = has_right_trim(body);
        if trim_next {
            body = &body[..body.len() - 1];
        }

        if !literal.is_empty() {
            nodes.push(Node::Text(literal.to_owned()));
        }

        let body = body.trim();
        if !(body.starts_with("/*") && body.ends_with("*/")) {
            nodes.push(Node::Action(parse_pipeline(body)?));
        }

        rest = &after[end + 2..];
    }

    let literal = if trim_next { rest.trim_start() } else { rest };
    if !literal.is_empty() {
        nodes.push(Node::Text(literal.to_owned()));
    }
    Ok(nodes)
}

fn has_left_trim(body: &str) -> bool {
    let mut chars = body.chars();
    chars.next() == Some('-') && chars.next().is_some_and(char::is_whitespace)
}

fn has_right_trim(body: &str) -> bool {
    let mut chars = body.chars().rev();
    chars.next() == Some('-') && chars.next().is_some_and(char::is_whitespace)
}

fn parse_pipeline(body: &str) -> Result<Pipeline, TemplateError> {
    if body.is_empty() {
        return Err(TemplateError::Syntax("missing value for command".into()));
    }

    let mut pipeline = Vec::new();
    let mut command = Vec::new();
    for token in tokenize(body)? {
        match token {
            Token::Pipe => {
                if command.is_empty() {
                    return Err(TemplateError::Syntax("missing command in pipeline".into()));
                }
                pipeline.push(std::mem::take(&mut command));
            }
            Token::Word(word) => command.push(classify(&word)?),
            Token::Quoted(s) => command.push(Term::Str(s)),
        }
    }
    if command.is_empty() {
        return Err(TemplateError::Syntax("missing command in pipeline".into()));
    }
    pipeline.push(command);
    Ok(pipeline)
}

enum Token {
    Pipe,
    Word(String),
    Quoted(String),
}

fn tokenize(body: &str) -> Result<Vec<Token>, TemplateError> {
    let mut tokens = Vec::new();
    let mut chars = body.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '|' {
            chars.next();
            tokens.push(Token::Pipe);
        } else if c == '"' {
            chars.next();
            let mut s = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some('n') => s.push('\n'),
                        Some('t') => s.push('\t'),
                        Some(other) => s.push(other),
                        None => return Err(TemplateError::Syntax("unterminated quoted string".into())),
                    },
                    Some(other) => s.push(other),
                    None => return Err(TemplateError::Syntax("unterminated quoted string".into())),
                }
            }
            tokens.push(Token::Quoted(s));
        } else {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == '|' || c == '"' {
                    break;
                }
                word.push(c);
                chars.next();
            }
            tokens.push(Token::Word(word));
        }
    }
    Ok(tokens)
}

fn classify(word: &str) -> Result<Term, TemplateError> {
    if word == "." {
        return Ok(Term::Field(Vec::new()));
    }
    if let Some(path) = word.strip_prefix('.') {
        let keys: Vec<String> = path.split('.').map(str::to_owned).collect();
        if keys.iter().any(String::is_empty) {
            return Err(TemplateError::Syntax(format!("bad field reference {word}")));
        }
        return Ok(Term::Field(keys));
    }
    if word.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
        return word
            .parse::<i64>()
            .map(Term::Int)
            .map_err(|_| TemplateError::Syntax(format!("bad number syntax: {word}")));
    }
    if functions::is_function(word) {
        return Ok(Term::Function(word.to_owned()));
    }
    Err(TemplateError::Syntax(format!("function \"{word}\" not defined")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine(policy: MissingKey) -> TemplateEngine {
        TemplateEngine::new(
            json!({
                "project": { "name": "demo app", "owner": "ops" },
                "var": "DATA",
                "count": 3
            }),
            TemplateOptions {
                missing_key: policy,
            },
        )
    }

    #[test]
    fn renders_nested_variables() {
        let out = engine(MissingKey::Default)
            .render_str("t", "{{ .project.name }} by {{.project.owner}} ({{ .count }})")
            .unwrap();
        assert_eq!(out, "demo app by ops (3)");
    }

    #[test]
    fn text_without_actions_is_untouched() {
        let text = "plain { text } with braces";
        assert_eq!(engine(MissingKey::Error).render_str("t", text).unwrap(), text);
    }

    #[test]
    fn pipelines_pass_value_as_last_argument() {
        let out = engine(MissingKey::Default)
            .render_str("t", "{{ .project.name | title }}-{{ .var | lower | upper }}")
            .unwrap();
        assert_eq!(out, "Demo App-DATA");
    }

    #[test]
    fn trim_markers_remove_adjacent_whitespace() {
        let out = engine(MissingKey::Default)
            .render_str("t", "a   {{- .var -}}  \n b{{/* note */}}")
            .unwrap();
        assert_eq!(out, "aDATAb");
    }

    #[test]
    fn missing_key_policies() {
        let text = "[{{ .nope.deeper }}]";
        assert_eq!(engine(MissingKey::Default).render_str("t", text).unwrap(), "[]");
        assert_eq!(engine(MissingKey::Zero).render_str("t", text).unwrap(), "[]");
        assert_eq!(
            engine(MissingKey::Invalid).render_str("t", text).unwrap(),
            "[<no value>]"
        );

        let err = engine(MissingKey::Error).render_str("file.txt", text).unwrap_err();
        assert_eq!(
            err,
            DomainError::MissingTemplateKey {
                template: "file.txt".into(),
                key: "nope.deeper".into(),
            }
        );
    }

    #[test]
    fn syntax_errors_name_the_template() {
        let err = engine(MissingKey::Default)
            .render_str("src/{{.var", "src/{{.var")
            .unwrap_err();
        assert!(matches!(err, DomainError::TemplateSyntax { ref template, .. } if template == "src/{{.var"));

        let err = engine(MissingKey::Default)
            .render_str("t", "{{ shout .var }}")
            .unwrap_err();
        assert!(err.to_string().contains("function \"shout\" not defined"));
    }

    #[test]
    fn field_on_scalar_is_an_error() {
        let err = engine(MissingKey::Default)
            .render_str("t", "{{ .var.inner }}")
            .unwrap_err();
        assert!(matches!(err, DomainError::TemplateExecution { .. }));
    }

    #[test]
    fn builtin_functions_render() {
        let out = engine(MissingKey::Default)
            .render_str("t", "{{ random.AlphaNum 10 }}|{{ uuid }}")
            .unwrap();
        let (random, id) = out.split_once('|').unwrap();
        assert_eq!(random.len(), 10);
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }
}
