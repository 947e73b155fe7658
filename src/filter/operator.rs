use crate::core::DbError;
use crate::expression::CompareOp;
use std::fmt;
use std::str::FromStr;

/// Operator tokens accepted in a filter request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Eq,
    /// `!`
    NotEq,
    /// `~` case-insensitive substring match
    Contains,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `|` inclusive range, `low|high`
    Range,
}

impl Operator {
    pub const ALL: [Operator; 8] = [
        Self::Eq,
        Self::NotEq,
        Self::Contains,
        Self::Lt,
        Self::Gt,
        Self::LtEq,
        Self::GtEq,
        Self::Range,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!",
            Self::Contains => "~",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::Range => "|",
        }
    }

    /// Store comparison for the plain comparison operators.
    pub fn compare_op(&self) -> Option<CompareOp> {
        match self {
            Self::Eq => Some(CompareOp::Eq),
            Self::NotEq => Some(CompareOp::NotEq),
            Self::Lt => Some(CompareOp::Lt),
            Self::Gt => Some(CompareOp::Gt),
            Self::LtEq => Some(CompareOp::LtEq),
            Self::GtEq => Some(CompareOp::GtEq),
            Self::Contains | Self::Range => None,
        }
    }
}

impl FromStr for Operator {
    type Err = DbError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.token() == token)
            .ok_or_else(|| DbError::UnsupportedOperator(format!("Operator '{}' is not supported", token)))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
