//! Filter language for the mock responder.
//!
//! Filters arrive as request parameters: each key names a record field
//! and maps to a `{ "operator": ..., "value": ... }` object. The
//! reserved `_operator` key selects how conditions combine (`and` by
//! default, `or` on request). Structurally broken conditions are parse
//! errors; a condition whose value merely fails to compare (a
//! non-numeric bound, an unparseable date) evaluates to false.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Errors raised while parsing filter parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    /// The condition named an operator the language does not define.
    UnknownOperator(String),

    /// The condition was structurally broken.
    MalformedCondition {
        /// Field the condition was attached to.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The `_operator` key held something other than `and` or `or`.
    InvalidCombinator(String),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::UnknownOperator(name) => {
                write!(f, "Unknown filter operator: {}", name)
            }
            FilterError::MalformedCondition { field, reason } => {
                write!(f, "Malformed filter condition for '{}': {}", field, reason)
            }
            FilterError::InvalidCombinator(value) => {
                write!(f, "Invalid filter combinator: {}", value)
            }
        }
    }
}

impl std::error::Error for FilterError {}

/// Comparison applied by a single filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Exact string equality against the field's text form.
    Equals,
    /// Substring match against the field's text form.
    Contains,
    /// Prefix match against the field's text form.
    StartsWith,
    /// Suffix match against the field's text form.
    EndsWith,
    /// Numeric strictly-greater comparison.
    GreaterThan,
    /// Numeric strictly-less comparison.
    LessThan,
    /// Numeric range check; the value is `min,max`, inclusive on both
    /// ends.
    Between,
    /// Date strictly-earlier comparison.
    Before,
    /// Date strictly-later comparison.
    After,
}

impl FilterOp {
    /// Returns the operator name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Equals => "equals",
            FilterOp::Contains => "contains",
            FilterOp::StartsWith => "startsWith",
            FilterOp::EndsWith => "endsWith",
            FilterOp::GreaterThan => "greaterThan",
            FilterOp::LessThan => "lessThan",
            FilterOp::Between => "between",
            FilterOp::Before => "before",
            FilterOp::After => "after",
        }
    }

    /// Parses an operator name.
    ///
    /// # Arguments
    ///
    /// * `name` - The operator name as it appears in a condition
    ///
    /// # Returns
    ///
    /// The operator, or `FilterError::UnknownOperator` for names outside
    /// the language.
    pub fn from_str(name: &str) -> Result<Self, FilterError> {
        match name {
            "equals" => Ok(FilterOp::Equals),
            "contains" => Ok(FilterOp::Contains),
            "startsWith" => Ok(FilterOp::StartsWith),
            "endsWith" => Ok(FilterOp::EndsWith),
            "greaterThan" => Ok(FilterOp::GreaterThan),
            "lessThan" => Ok(FilterOp::LessThan),
            "between" => Ok(FilterOp::Between),
            "before" => Ok(FilterOp::Before),
            "after" => Ok(FilterOp::After),
            other => Err(FilterError::UnknownOperator(other.to_string())),
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How multiple conditions combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    /// Every condition must match.
    #[default]
    And,
    /// At least one condition must match.
    Or,
}

impl Combinator {
    fn from_str(value: &str) -> Result<Self, FilterError> {
        match value.to_ascii_lowercase().as_str() {
            "and" => Ok(Combinator::And),
            "or" => Ok(Combinator::Or),
            other => Err(FilterError::InvalidCombinator(other.to_string())),
        }
    }
}

/// The views a record field offers to the comparison operators.
///
/// Text is always present. The numeric and date views exist only for
/// fields that genuinely are numbers or dates; conditions that need a
/// missing view evaluate to false.
#[derive(Debug, Clone)]
pub struct FieldView {
    /// Text form of the field, used by the string operators.
    pub text: String,
    /// Numeric form, used by `greaterThan`, `lessThan`, and `between`.
    pub number: Option<f64>,
    /// Date form, used by `before` and `after`.
    pub date: Option<DateTime<Utc>>,
}

impl FieldView {
    /// A field that only offers its text form.
    pub fn text(text: String) -> Self {
        Self {
            text,
            number: None,
            date: None,
        }
    }

    /// A numeric field; the text form is the number's decimal rendering.
    pub fn number(value: f64) -> Self {
        Self {
            text: trim_float(value),
            number: Some(value),
            date: None,
        }
    }

    /// A date field; the text form is the RFC 3339 rendering.
    pub fn date(value: DateTime<Utc>) -> Self {
        Self {
            text: value.to_rfc3339(),
            number: None,
            date: Some(value),
        }
    }
}

/// Renders a float without a trailing `.0` for whole numbers.
fn trim_float(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// A single parsed condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// The comparison to apply.
    pub operator: FilterOp,
    /// The right-hand side, kept in its text form.
    pub value: String,
}

impl Condition {
    /// Parses a condition from its wire form.
    ///
    /// The wire form is an object with an `operator` name and a `value`
    /// that is a string, number, or boolean.
    ///
    /// # Arguments
    ///
    /// * `field` - The field the condition is attached to, for error
    ///   context
    /// * `raw` - The condition object
    pub fn from_value(field: &str, raw: &Value) -> Result<Self, FilterError> {
        let object = raw.as_object().ok_or_else(|| FilterError::MalformedCondition {
            field: field.to_string(),
            reason: "expected an object with operator and value".to_string(),
        })?;

        let operator_name = object
            .get("operator")
            .and_then(Value::as_str)
            .ok_or_else(|| FilterError::MalformedCondition {
                field: field.to_string(),
                reason: "missing operator".to_string(),
            })?;
        let operator = FilterOp::from_str(operator_name)?;

        let value = match object.get("value") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(_) => {
                return Err(FilterError::MalformedCondition {
                    field: field.to_string(),
                    reason: "value must be a string, number, or boolean".to_string(),
                })
            }
            None => {
                return Err(FilterError::MalformedCondition {
                    field: field.to_string(),
                    reason: "missing value".to_string(),
                })
            }
        };

        Ok(Self { operator, value })
    }

    /// Evaluates the condition against one field view.
    pub fn matches(&self, view: &FieldView) -> bool {
        match self.operator {
            FilterOp::Equals => view.text == self.value,
            FilterOp::Contains => view.text.contains(&self.value),
            FilterOp::StartsWith => view.text.starts_with(&self.value),
            FilterOp::EndsWith => view.text.ends_with(&self.value),
            FilterOp::GreaterThan => match (view.number, self.value.trim().parse::<f64>()) {
                (Some(field), Ok(bound)) => field > bound,
                _ => false,
            },
            FilterOp::LessThan => match (view.number, self.value.trim().parse::<f64>()) {
                (Some(field), Ok(bound)) => field < bound,
                _ => false,
            },
            FilterOp::Between => match (view.number, parse_range(&self.value)) {
                (Some(field), Some((min, max))) => field >= min && field <= max,
                _ => false,
            },
            FilterOp::Before => match (view.date, parse_date(&self.value)) {
                (Some(field), Some(bound)) => field < bound,
                _ => false,
            },
            FilterOp::After => match (view.date, parse_date(&self.value)) {
                (Some(field), Some(bound)) => field > bound,
                _ => false,
            },
        }
    }
}

/// Parses a `min,max` range value.
fn parse_range(value: &str) -> Option<(f64, f64)> {
    let (min, max) = value.split_once(',')?;
    let min = min.trim().parse::<f64>().ok()?;
    let max = max.trim().parse::<f64>().ok()?;
    Some((min, max))
}

/// Parses an RFC 3339 timestamp, falling back to a bare `YYYY-MM-DD`
/// date taken as midnight UTC.
fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(DateTime::from_naive_utc_and_offset(
        date.and_hms_opt(0, 0, 0)?,
        Utc,
    ))
}

/// A parsed filter: a set of field conditions and their combinator.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    combinator: Combinator,
    conditions: Vec<(String, Condition)>,
}

impl Filter {
    /// Checks whether the filter has no conditions.
    ///
    /// An empty filter matches every record.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Returns the number of conditions.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Evaluates the filter against a record exposed through a field
    /// lookup.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Maps a field name to its views; `None` means the
    ///   record has no such field, which fails the condition
    pub fn matches<F>(&self, lookup: F) -> bool
    where
        F: Fn(&str) -> Option<FieldView>,
    {
        if self.conditions.is_empty() {
            return true;
        }

        let mut results = self
            .conditions
            .iter()
            .map(|(field, condition)| match lookup(field) {
                Some(view) => condition.matches(&view),
                None => false,
            });

        match self.combinator {
            Combinator::And => results.all(|matched| matched),
            Combinator::Or => results.any(|matched| matched),
        }
    }
}

/// Parses filter parameters into a [`Filter`].
///
/// Every key except the reserved `_operator` becomes a condition. The
/// first structural problem aborts the parse.
///
/// # Arguments
///
/// * `params` - The request parameters to interpret as a filter
pub fn parse_filter(params: &HashMap<String, Value>) -> Result<Filter, FilterError> {
    let mut filter = Filter::default();

    for (key, raw) in params {
        if key == "_operator" {
            let name = raw.as_str().ok_or_else(|| {
                FilterError::InvalidCombinator(raw.to_string())
            })?;
            filter.combinator = Combinator::from_str(name)?;
            continue;
        }
        let condition = Condition::from_value(key, raw)?;
        filter.conditions.push((key.clone(), condition));
    }

    Ok(filter)
}
