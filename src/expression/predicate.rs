use crate::core::Value;
use std::fmt;

/// Comparison operators understood by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }
}

/// Boolean condition over the columns of one entity.
///
/// Values are carried as typed parameters, never spliced into query text.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        column: String,
        op: CompareOp,
        value: Value,
    },
    Like {
        column: String,
        pattern: String,
        case_insensitive: bool,
    },
    Between {
        column: String,
        low: Value,
        high: Value,
    },
    IsNull {
        column: String,
        negated: bool,
    },
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn compare(column: impl Into<String>, op: CompareOp, value: Value) -> Self {
        Self::Compare {
            column: column.into(),
            op,
            value,
        }
    }

    pub fn ilike(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Like {
            column: column.into(),
            pattern: pattern.into(),
            case_insensitive: true,
        }
    }

    pub fn between(column: impl Into<String>, low: Value, high: Value) -> Self {
        Self::Between {
            column: column.into(),
            low,
            high,
        }
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::IsNull {
            column: column.into(),
            negated: false,
        }
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::IsNull {
            column: column.into(),
            negated: true,
        }
    }

    /// Conjunction of `parts`; `None` when there is nothing to filter on.
    pub fn all(mut parts: Vec<Predicate>) -> Option<Predicate> {
        match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => Some(Self::And(parts)),
        }
    }

    /// Every column referenced by this predicate, in appearance order.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::Compare { column, .. }
            | Self::Like { column, .. }
            | Self::Between { column, .. }
            | Self::IsNull { column, .. } => vec![column.as_str()],
            Self::And(parts) => parts.iter().flat_map(|p| p.columns()).collect(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare { column, op, value } => {
                write!(f, "{} {} {:?}", column, op.symbol(), value.to_string())
            }
            Self::Like {
                column,
                pattern,
                case_insensitive,
            } => {
                let keyword = if *case_insensitive { "ILIKE" } else { "LIKE" };
                write!(f, "{} {} {:?}", column, keyword, pattern)
            }
            Self::Between { column, low, high } => write!(
                f,
                "{} BETWEEN {:?} AND {:?}",
                column,
                low.to_string(),
                high.to_string()
            ),
            Self::IsNull { column, negated } => {
                if *negated {
                    write!(f, "{} IS NOT NULL", column)
                } else {
                    write!(f, "{} IS NULL", column)
                }
            }
            Self::And(parts) => {
                let rendered: Vec<String> = parts.iter().map(|p| format!("({})", p)).collect();
                write!(f, "{}", rendered.join(" AND "))
            }
        }
    }
}
