//! `validate` rule evaluation.
//!
//! A rule is a comma-separated list of `key=value` pairs. `min` and `max`
//! compare numbers, durations (bounds written as duration literals) and string
//! lengths. `oneof` takes a `|`-separated allowed set, independent of the
//! field's list separator, and applies to strings and to every element of a
//! string list. Unknown keys are ignored.

use crate::convert::parse_duration;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("must be >= {limit}")]
    BelowMin { limit: String },
    #[error("must be <= {limit}")]
    AboveMax { limit: String },
    #[error("length must be >= {limit}")]
    TooShort { limit: usize },
    #[error("length must be <= {limit}")]
    TooLong { limit: usize },
    #[error("must be one of {allowed:?}")]
    NotOneOf { value: String, allowed: Vec<String> },
    #[error("value {value:?} not in {allowed:?}")]
    ElementNotOneOf { value: String, allowed: Vec<String> },
    #[error("invalid {rule} bound {bound:?}")]
    InvalidBound { rule: &'static str, bound: String },
    #[error("{rule} does not apply to {kind} fields")]
    Incompatible {
        rule: &'static str,
        kind: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Min,
    Max,
}

impl Bound {
    fn name(self) -> &'static str {
        match self {
            Bound::Min => "min",
            Bound::Max => "max",
        }
    }

    fn violation(self, limit: impl ToString) -> ValidationError {
        match self {
            Bound::Min => ValidationError::BelowMin {
                limit: limit.to_string(),
            },
            Bound::Max => ValidationError::AboveMax {
                limit: limit.to_string(),
            },
        }
    }

    fn holds<T: PartialOrd>(self, value: T, limit: T) -> bool {
        match self {
            Bound::Min => value >= limit,
            Bound::Max => value <= limit,
        }
    }
}

/// A parsed rule expression
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rule {
    entries: Vec<(String, String)>,
}

impl Rule {
    pub fn parse(text: &str) -> Self {
        let entries = text
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .filter_map(|part| part.split_once('='))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Evaluate every recognized entry in written order; the first failure wins
    pub fn check(&self, value: &Value) -> Result<(), ValidationError> {
        for (key, arg) in self.entries() {
            match key {
                "min" => check_bound(value, arg, Bound::Min)?,
                "max" => check_bound(value, arg, Bound::Max)?,
                "oneof" => check_one_of(value, arg)?,
                _ => {}
            }
        }
        Ok(())
    }
}

/// Parse `rule` and check `value` against it
pub fn validate_value(value: &Value, rule: &str) -> Result<(), ValidationError> {
    Rule::parse(rule).check(value)
}

fn invalid_bound(bound: Bound, arg: &str) -> ValidationError {
    ValidationError::InvalidBound {
        rule: bound.name(),
        bound: arg.to_string(),
    }
}

fn check_bound(value: &Value, arg: &str, bound: Bound) -> Result<(), ValidationError> {
    match value {
        Value::Duration(d) => {
            let limit = parse_duration(arg).map_err(|_| invalid_bound(bound, arg))?;
            if !bound.holds(*d, limit) {
                return Err(bound.violation(format!("{limit:?}")));
            }
        }
        Value::Int(i) => {
            let limit: i64 = arg.parse().map_err(|_| invalid_bound(bound, arg))?;
            if !bound.holds(*i, limit) {
                return Err(bound.violation(limit));
            }
        }
        Value::Uint(u) => {
            let limit: u64 = arg.parse().map_err(|_| invalid_bound(bound, arg))?;
            if !bound.holds(*u, limit) {
                return Err(bound.violation(limit));
            }
        }
        Value::Float(f) => {
            let limit: f64 = arg.parse().map_err(|_| invalid_bound(bound, arg))?;
            if !bound.holds(*f, limit) {
                return Err(bound.violation(limit));
            }
        }
        Value::Str(s) => {
            let limit: usize = arg.parse().map_err(|_| invalid_bound(bound, arg))?;
            let len = s.len();
            match bound {
                Bound::Min if len < limit => return Err(ValidationError::TooShort { limit }),
                Bound::Max if len > limit => return Err(ValidationError::TooLong { limit }),
                _ => {}
            }
        }
        other => {
            return Err(ValidationError::Incompatible {
                rule: bound.name(),
                kind: other.kind_name(),
            })
        }
    }
    Ok(())
}

fn check_one_of(value: &Value, arg: &str) -> Result<(), ValidationError> {
    let allowed: Vec<&str> = arg.split('|').collect();
    let owned = || allowed.iter().map(|a| a.to_string()).collect::<Vec<_>>();

    match value {
        Value::Str(s) => {
            if allowed.contains(&s.as_str()) {
                Ok(())
            } else {
                Err(ValidationError::NotOneOf {
                    value: s.clone(),
                    allowed: owned(),
                })
            }
        }
        Value::List(items) => match items.iter().find(|i| !allowed.contains(&i.as_str())) {
            Some(item) => Err(ValidationError::ElementNotOneOf {
                value: item.clone(),
                allowed: owned(),
            }),
            None => Ok(()),
        },
        other => Err(ValidationError::Incompatible {
            rule: "oneof",
            kind: other.kind_name(),
        }),
    }
}
