//! Movie payload validation
//!
//! Payloads are checked against a declarative rule table, one entry per
//! field. Full mode requires every mandatory field; partial mode accepts any
//! subset but holds present fields to the same rules. Every violation is
//! collected so a caller can report all of them in one response.

use std::collections::HashMap;
use std::fmt;

use chrono::{Datelike, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::models::{MoviePatch, NewMovie};

pub const MIN_YEAR: i64 = 1900;
pub const DEFAULT_RATE: f64 = 0.0;
const MAX_RATE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidType,
    TooSmall,
    TooBig,
    InvalidString,
    InvalidJson,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub code: IssueCode,
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl Issue {
    fn at(field: &str, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            path: vec![PathSegment::Key(field.to_string())],
            message: message.into(),
        }
    }

    fn required(field: &str) -> Self {
        Self::at(field, IssueCode::InvalidType, "Required")
    }

    fn expected(field: &str, expected: &str, received: &Value) -> Self {
        Self::at(
            field,
            IssueCode::InvalidType,
            format!("Expected {expected}, received {}", type_name(received)),
        )
    }

    /// Issue for a body that could not be read as JSON at all.
    pub fn malformed_body(message: impl Into<String>) -> Self {
        Self {
            code: IssueCode::InvalidJson,
            path: Vec::new(),
            message: message.into(),
        }
    }

    pub fn references(&self, field: &str) -> bool {
        matches!(self.path.first(), Some(PathSegment::Key(key)) if key == field)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssues(Vec<Issue>);

impl ValidationIssues {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self(issues)
    }

    pub fn issues(&self) -> &[Issue] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.0
    }
}

impl fmt::Display for ValidationIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .0
            .iter()
            .map(|issue| match issue.path.first() {
                Some(PathSegment::Key(field)) => format!("{field}: {}", issue.message),
                _ => issue.message.clone(),
            })
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationIssues {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Full,
    Partial,
}

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Text,
    Year,
    PositiveInteger,
    Score,
    Url,
    TextList,
}

#[derive(Debug, Clone, Copy)]
struct FieldRule {
    name: &'static str,
    kind: FieldKind,
    required: bool,
}

const MOVIE_RULES: [FieldRule; 7] = [
    FieldRule {
        name: "title",
        kind: FieldKind::Text,
        required: true,
    },
    FieldRule {
        name: "year",
        kind: FieldKind::Year,
        required: true,
    },
    FieldRule {
        name: "director",
        kind: FieldKind::Text,
        required: true,
    },
    FieldRule {
        name: "duration",
        kind: FieldKind::PositiveInteger,
        required: true,
    },
    FieldRule {
        name: "rate",
        kind: FieldKind::Score,
        required: false,
    },
    FieldRule {
        name: "poster",
        kind: FieldKind::Url,
        required: true,
    },
    FieldRule {
        name: "genre",
        kind: FieldKind::TextList,
        required: true,
    },
];

#[derive(Debug, Clone)]
enum Accepted {
    Text(String),
    Integer(i64),
    Number(f64),
    TextList(Vec<String>),
}

/// The movie schema with its year window fixed at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovieSchema {
    min_year: i64,
    max_year: i64,
}

impl MovieSchema {
    /// Schema whose latest accepted year is next calendar year (UTC).
    pub fn current() -> Self {
        Self::with_max_year(i64::from(Utc::now().year()) + 1)
    }

    pub fn with_max_year(max_year: i64) -> Self {
        Self {
            min_year: MIN_YEAR,
            max_year,
        }
    }

    pub fn max_year(&self) -> i64 {
        self.max_year
    }

    pub fn validate_full(&self, input: &Value) -> Result<NewMovie, ValidationIssues> {
        let patch = self.validate(input, Mode::Full)?;
        let missing = |field: &str| ValidationIssues::new(vec![Issue::required(field)]);

        Ok(NewMovie {
            title: patch.title.ok_or_else(|| missing("title"))?,
            year: patch.year.ok_or_else(|| missing("year"))?,
            director: patch.director.ok_or_else(|| missing("director"))?,
            duration: patch.duration.ok_or_else(|| missing("duration"))?,
            rate: patch.rate.unwrap_or(DEFAULT_RATE),
            poster: patch.poster.ok_or_else(|| missing("poster"))?,
            genre: patch.genre.ok_or_else(|| missing("genre"))?,
        })
    }

    pub fn validate_partial(&self, input: &Value) -> Result<MoviePatch, ValidationIssues> {
        self.validate(input, Mode::Partial)
    }

    fn validate(&self, input: &Value, mode: Mode) -> Result<MoviePatch, ValidationIssues> {
        let Value::Object(object) = input else {
            return Err(ValidationIssues::new(vec![Issue {
                code: IssueCode::InvalidType,
                path: Vec::new(),
                message: format!("Expected object, received {}", type_name(input)),
            }]));
        };

        let mut accepted = HashMap::new();
        let mut issues = Vec::new();

        for rule in &MOVIE_RULES {
            match object.get(rule.name) {
                None if rule.required && mode == Mode::Full => {
                    issues.push(Issue::required(rule.name));
                }
                None => {}
                Some(value) => match self.check(rule, value) {
                    Ok(value) => {
                        accepted.insert(rule.name, value);
                    }
                    Err(mut failed) => issues.append(&mut failed),
                },
            }
        }

        if !issues.is_empty() {
            return Err(ValidationIssues::new(issues));
        }

        Ok(assemble_patch(accepted))
    }

    fn check(&self, rule: &FieldRule, value: &Value) -> Result<Accepted, Vec<Issue>> {
        let field = rule.name;
        match rule.kind {
            FieldKind::Text => check_text(field, value).map(Accepted::Text),
            FieldKind::Year => {
                let year = check_integer(field, value)?;
                if year < self.min_year {
                    return Err(vec![too_small_number(field, self.min_year)]);
                }
                if year > self.max_year {
                    return Err(vec![too_big_number(field, self.max_year)]);
                }
                Ok(Accepted::Integer(year))
            }
            FieldKind::PositiveInteger => {
                let number = check_integer(field, value)?;
                if number <= 0 {
                    return Err(vec![Issue::at(
                        field,
                        IssueCode::TooSmall,
                        "Number must be greater than 0",
                    )]);
                }
                if number > i64::from(u32::MAX) {
                    return Err(vec![too_big_number(field, i64::from(u32::MAX))]);
                }
                Ok(Accepted::Integer(number))
            }
            FieldKind::Score => {
                let score = check_number(field, value)?;
                if score < 0.0 {
                    return Err(vec![too_small_number(field, 0)]);
                }
                if score > MAX_RATE {
                    return Err(vec![too_big_number(field, MAX_RATE as i64)]);
                }
                Ok(Accepted::Number(score))
            }
            FieldKind::Url => {
                let text = check_text(field, value)?;
                if Url::parse(&text).is_err() {
                    return Err(vec![Issue::at(
                        field,
                        IssueCode::InvalidString,
                        "Invalid url",
                    )]);
                }
                Ok(Accepted::Text(text))
            }
            FieldKind::TextList => check_text_list(field, value).map(Accepted::TextList),
        }
    }
}

impl Default for MovieSchema {
    fn default() -> Self {
        Self::current()
    }
}

fn assemble_patch(mut accepted: HashMap<&'static str, Accepted>) -> MoviePatch {
    let mut take = |field: &str| accepted.remove(field);

    MoviePatch {
        title: take("title").and_then(Accepted::into_text),
        year: take("year")
            .and_then(Accepted::into_integer)
            .and_then(|year| i32::try_from(year).ok()),
        director: take("director").and_then(Accepted::into_text),
        duration: take("duration")
            .and_then(Accepted::into_integer)
            .and_then(|duration| u32::try_from(duration).ok()),
        rate: take("rate").and_then(Accepted::into_number),
        poster: take("poster").and_then(Accepted::into_text),
        genre: take("genre").and_then(Accepted::into_text_list),
    }
}

impl Accepted {
    fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    fn into_integer(self) -> Option<i64> {
        match self {
            Self::Integer(number) => Some(number),
            _ => None,
        }
    }

    fn into_number(self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(number),
            _ => None,
        }
    }

    fn into_text_list(self) -> Option<Vec<String>> {
        match self {
            Self::TextList(items) => Some(items),
            _ => None,
        }
    }
}

fn check_text(field: &str, value: &Value) -> Result<String, Vec<Issue>> {
    let Value::String(text) = value else {
        return Err(vec![Issue::expected(field, "string", value)]);
    };
    if text.is_empty() {
        return Err(vec![Issue::at(
            field,
            IssueCode::TooSmall,
            "String must contain at least 1 character(s)",
        )]);
    }
    Ok(text.clone())
}

fn check_number(field: &str, value: &Value) -> Result<f64, Vec<Issue>> {
    value
        .as_f64()
        .filter(|number| number.is_finite())
        .ok_or_else(|| vec![Issue::expected(field, "number", value)])
}

fn check_integer(field: &str, value: &Value) -> Result<i64, Vec<Issue>> {
    let Value::Number(number) = value else {
        return Err(vec![Issue::expected(field, "number", value)]);
    };
    if let Some(integer) = number.as_i64() {
        return Ok(integer);
    }

    match number.as_f64() {
        Some(float) if float.fract() == 0.0 && float.abs() < i64::MAX as f64 => Ok(float as i64),
        Some(float) if float.fract() == 0.0 => Err(vec![too_big_number(field, i64::MAX)]),
        _ => Err(vec![Issue::at(
            field,
            IssueCode::InvalidType,
            "Expected integer, received float",
        )]),
    }
}

fn check_text_list(field: &str, value: &Value) -> Result<Vec<String>, Vec<Issue>> {
    let Value::Array(items) = value else {
        return Err(vec![Issue::expected(field, "array", value)]);
    };
    if items.is_empty() {
        return Err(vec![Issue::at(
            field,
            IssueCode::TooSmall,
            "Array must contain at least 1 element(s)",
        )]);
    }

    let mut accepted = Vec::with_capacity(items.len());
    let mut issues = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match item {
            Value::String(text) => accepted.push(text.clone()),
            other => issues.push(Issue {
                code: IssueCode::InvalidType,
                path: vec![PathSegment::Key(field.to_string()), PathSegment::Index(index)],
                message: format!("Expected string, received {}", type_name(other)),
            }),
        }
    }

    if issues.is_empty() {
        Ok(accepted)
    } else {
        Err(issues)
    }
}

fn too_small_number(field: &str, minimum: i64) -> Issue {
    Issue::at(
        field,
        IssueCode::TooSmall,
        format!("Number must be greater than or equal to {minimum}"),
    )
}

fn too_big_number(field: &str, maximum: i64) -> Issue {
    Issue::at(
        field,
        IssueCode::TooBig,
        format!("Number must be less than or equal to {maximum}"),
    )
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Fields of `object` that the schema does not know about.
pub fn unknown_fields(object: &Map<String, Value>) -> Vec<&str> {
    object
        .keys()
        .map(String::as_str)
        .filter(|key| *key != "id" && MOVIE_RULES.iter().all(|rule| rule.name != *key))
        .collect()
}
