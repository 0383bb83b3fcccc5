use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use parrot_core::{AppError, AppResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

static ALPHA_DASH_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").ok());

/// One parsed validation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    /// Value must be present and non-blank.
    Required,
    /// Blank values skip the remaining rules.
    Nullable,
    /// Value must look like an email address.
    Email,
    /// Value must parse as a number.
    Numeric,
    /// Value must parse as an integer.
    Integer,
    /// Value must be a boolean-like token.
    Boolean,
    /// Value must be a `YYYY-MM-DD` date or an ISO-like date-time.
    Date,
    /// Value must be an absolute http(s) URL.
    Url,
    /// Value may contain letters, digits, dashes and underscores only.
    AlphaDash,
    /// Minimum length, or minimum value in numeric context.
    Min(f64),
    /// Maximum length, or maximum value in numeric context.
    Max(f64),
    /// Value must be one of the listed tokens.
    In(Vec<String>),
    /// Value must match the regular expression.
    Pattern(String),
    /// Value must equal the `{field}_confirmation` input.
    Confirmed,
    /// Value must not exist on another record of the same resource.
    Unique,
}

/// Context passed to a rule check.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Label used in messages.
    pub label: &'a str,
    /// Whether size rules compare values instead of lengths.
    pub numeric: bool,
    /// Submitted confirmation value, when present.
    pub confirmation: Option<&'a str>,
}

/// Outcome of evaluating one rule against a non-blank value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The value satisfies the rule.
    Pass,
    /// The value violates the rule; carries the user-facing message.
    Fail(String),
    /// The rule needs persistence state and is evaluated by the caller.
    Deferred,
}

impl ValidationRule {
    /// Parses a rule string such as `max:255` or `in:draft,published`.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let raw = raw.trim();
        let (name, argument) = match raw.split_once(':') {
            Some((name, argument)) => (name.trim(), Some(argument.trim())),
            None => (raw, None),
        };

        match (name, argument) {
            ("required", None) => Ok(Self::Required),
            ("nullable", None) => Ok(Self::Nullable),
            ("email", None) => Ok(Self::Email),
            ("numeric", None) => Ok(Self::Numeric),
            ("integer", None) => Ok(Self::Integer),
            ("boolean", None) => Ok(Self::Boolean),
            ("date", None) => Ok(Self::Date),
            ("url", None) => Ok(Self::Url),
            ("alpha_dash", None) => Ok(Self::AlphaDash),
            ("confirmed", None) => Ok(Self::Confirmed),
            ("unique", None) => Ok(Self::Unique),
            ("min", Some(argument)) => parse_bound(raw, argument).map(Self::Min),
            ("max", Some(argument)) => parse_bound(raw, argument).map(Self::Max),
            ("in", Some(argument)) => {
                let values: Vec<String> = argument
                    .split(',')
                    .map(|value| value.trim().to_owned())
                    .filter(|value| !value.is_empty())
                    .collect();
                if values.is_empty() {
                    return Err(AppError::Configuration(format!(
                        "validation rule '{raw}' must list at least one value"
                    )));
                }
                Ok(Self::In(values))
            }
            ("regex", Some(pattern)) => {
                Regex::new(pattern).map_err(|error| {
                    AppError::Configuration(format!(
                        "validation rule '{raw}' has an invalid pattern: {error}"
                    ))
                })?;
                Ok(Self::Pattern(pattern.to_owned()))
            }
            _ => Err(AppError::Configuration(format!(
                "unknown validation rule '{raw}'"
            ))),
        }
    }

    /// Returns whether this rule makes size checks numeric.
    #[must_use]
    pub fn implies_numeric(&self) -> bool {
        matches!(self, Self::Numeric | Self::Integer)
    }

    /// Evaluates the rule against a non-blank submitted value.
    #[must_use]
    pub fn check(&self, value: &str, context: RuleContext<'_>) -> RuleOutcome {
        let label = context.label;
        let passed = match self {
            Self::Required => !value.trim().is_empty(),
            Self::Nullable => true,
            Self::Email => matches_pattern(&EMAIL_PATTERN, value.trim()),
            Self::Numeric => value.trim().parse::<f64>().is_ok_and(f64::is_finite),
            Self::Integer => value.trim().parse::<i64>().is_ok(),
            Self::Boolean => matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "0" | "true" | "false" | "on" | "off" | "yes" | "no"
            ),
            Self::Date => is_date(value.trim()),
            Self::Url => Url::parse(value.trim())
                .is_ok_and(|url| matches!(url.scheme(), "http" | "https")),
            Self::AlphaDash => matches_pattern(&ALPHA_DASH_PATTERN, value),
            Self::Min(bound) => size_of(value, context.numeric).is_some_and(|size| size >= *bound),
            Self::Max(bound) => size_of(value, context.numeric).is_some_and(|size| size <= *bound),
            Self::In(values) => values.iter().any(|candidate| candidate == value),
            Self::Pattern(pattern) => Regex::new(pattern).is_ok_and(|regex| regex.is_match(value)),
            Self::Confirmed => context.confirmation == Some(value),
            Self::Unique => return RuleOutcome::Deferred,
        };

        if passed {
            return RuleOutcome::Pass;
        }

        RuleOutcome::Fail(self.message(label, context.numeric))
    }

    /// Returns the user-facing message for a violation.
    #[must_use]
    pub fn message(&self, label: &str, numeric: bool) -> String {
        match self {
            Self::Required => format!("The {label} field is required."),
            Self::Nullable => String::new(),
            Self::Email => format!("The {label} must be a valid email address."),
            Self::Numeric => format!("The {label} must be a number."),
            Self::Integer => format!("The {label} must be an integer."),
            Self::Boolean => format!("The {label} field must be true or false."),
            Self::Date => format!("The {label} is not a valid date."),
            Self::Url => format!("The {label} must be a valid URL."),
            Self::AlphaDash => format!(
                "The {label} may only contain letters, numbers, dashes and underscores."
            ),
            Self::Min(bound) if numeric => format!("The {label} must be at least {bound}."),
            Self::Min(bound) => format!("The {label} must be at least {bound} characters."),
            Self::Max(bound) if numeric => {
                format!("The {label} may not be greater than {bound}.")
            }
            Self::Max(bound) => {
                format!("The {label} may not be greater than {bound} characters.")
            }
            Self::In(_) => format!("The selected {label} is invalid."),
            Self::Pattern(_) => format!("The {label} format is invalid."),
            Self::Confirmed => format!("The {label} confirmation does not match."),
            Self::Unique => format!("The {label} has already been taken."),
        }
    }
}

fn parse_bound(raw: &str, argument: &str) -> AppResult<f64> {
    argument
        .parse::<f64>()
        .ok()
        .filter(|bound| bound.is_finite())
        .ok_or_else(|| {
            AppError::Configuration(format!(
                "validation rule '{raw}' requires a numeric argument"
            ))
        })
}

fn matches_pattern(pattern: &LazyLock<Option<Regex>>, value: &str) -> bool {
    LazyLock::force(pattern)
        .as_ref()
        .is_some_and(|regex| regex.is_match(value))
}

fn is_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
}

fn size_of(value: &str, numeric: bool) -> Option<f64> {
    if numeric {
        return value.trim().parse::<f64>().ok();
    }

    u32::try_from(value.chars().count()).ok().map(f64::from)
}
