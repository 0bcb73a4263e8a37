//! Where-condition triplets as configured by the analytics layer, rendered
//! to SQL `WHERE` clauses for preview and count queries.

use serde::Deserialize;

use crate::error::ConnectorError;

/// A single filter condition, configured as a `[column, op, value]` triplet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawCondition")]
pub struct WhereCondition {
    pub column: String,
    pub op: FilterOp,
    pub value: FilterValue,
}

type RawCondition = (String, String, FilterValue);

impl TryFrom<RawCondition> for WhereCondition {
    type Error = ConnectorError;

    fn try_from((column, op, value): RawCondition) -> Result<Self, Self::Error> {
        Ok(Self {
            column,
            op: FilterOp::parse(&op)?,
            value,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Like,
}

impl FilterOp {
    /// Parse the operator symbol used in connector configs.
    pub fn parse(s: &str) -> Result<Self, ConnectorError> {
        match s {
            "=" | "==" => Ok(FilterOp::Eq),
            "!=" | "<>" => Ok(FilterOp::Neq),
            ">" => Ok(FilterOp::Gt),
            ">=" => Ok(FilterOp::Gte),
            "<" => Ok(FilterOp::Lt),
            "<=" => Ok(FilterOp::Lte),
            "in" | "IN" => Ok(FilterOp::In),
            "like" | "LIKE" => Ok(FilterOp::Like),
            other => Err(ConnectorError::ConfigError(format!(
                "unsupported filter operator '{}'",
                other
            ))),
        }
    }

    fn as_sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Neq => "!=",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::In => "IN",
            FilterOp::Like => "LIKE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    String(String),
    Number(f64),
    StringArray(Vec<String>),
}

fn sanitize_sql_string(s: &str) -> String {
    s.replace('\'', "''")
}

fn sanitize_sql_identifier(s: &str) -> String {
    s.replace('"', "\"\"")
}

fn format_number(n: f64) -> String {
    if n == n.floor() {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl WhereCondition {
    pub fn to_sql(&self) -> String {
        let col = format!("\"{}\"", sanitize_sql_identifier(&self.column));
        match (&self.op, &self.value) {
            (FilterOp::In, FilterValue::StringArray(vals)) => {
                let list = vals
                    .iter()
                    .map(|v| format!("'{}'", sanitize_sql_string(v)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{} IN ({})", col, list)
            }
            (FilterOp::Like, FilterValue::String(v)) => {
                format!("{} LIKE '{}'", col, sanitize_sql_string(v))
            }
            // IN/LIKE with any other value shape is a config mismatch
            (FilterOp::In | FilterOp::Like, _) => format!("{} IS NOT NULL", col),
            (op, FilterValue::String(v)) => {
                format!("{} {} '{}'", col, op.as_sql(), sanitize_sql_string(v))
            }
            (op, FilterValue::Number(n)) => {
                format!("{} {} {}", col, op.as_sql(), format_number(*n))
            }
            // comparison op against an array: fallback
            (_, FilterValue::StringArray(_)) => format!("{} IS NOT NULL", col),
        }
    }
}

/// Render a list of conditions to a `WHERE` clause with a leading space,
/// or an empty string when there are no conditions.
pub fn build_where_clause(conditions: &[WhereCondition]) -> String {
    if conditions.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = conditions.iter().map(|c| c.to_sql()).collect();
    format!(" WHERE {}", parts.join(" AND "))
}
