use super::{BuildContext, PredicateBuilder, comparison_for, not_handled, unsupported_for};
use crate::core::{Column, DbError, Result, Value};
use crate::expression::Predicate;
use crate::filter::Operator;
use crate::filter::coerce::{accepted_kinds, align_to_column, coerce};

/// `<`, `>`, `<=`, `>=` on ordered attributes.
pub struct OrderedBuilder;

impl OrderedBuilder {
    /// Coerce `raw` and align it with `column`.
    ///
    /// `None` from the first step means no candidate parsed; from the second
    /// that the value cannot be ordered against the attribute.
    pub(crate) fn operand(column: &Column, raw: &str) -> std::result::Result<Value, OperandError> {
        let value = coerce(raw).ok_or(OperandError::Unparseable)?;
        align_to_column(value, column.data_type).ok_or(OperandError::Incomparable)
    }
}

pub(crate) enum OperandError {
    Unparseable,
    Incomparable,
}

impl PredicateBuilder for OrderedBuilder {
    fn name(&self) -> &'static str {
        "ordered"
    }

    fn operators(&self) -> &'static [Operator] {
        &[Operator::Lt, Operator::Gt, Operator::LtEq, Operator::GtEq]
    }

    fn build(
        &self,
        operator: Operator,
        column: &Column,
        raw: &str,
        _context: &BuildContext<'_>,
    ) -> Result<Predicate> {
        if !self.operators().contains(&operator) {
            return Err(not_handled(operator, self));
        }
        if !column.data_type.is_ordered() {
            return Err(unsupported_for(operator, column, "an ordered"));
        }

        let value = Self::operand(column, raw).map_err(|err| match err {
            OperandError::Unparseable => DbError::InvalidValueFormat(format!(
                "'{}' must be one of: {}",
                raw,
                accepted_kinds().collect::<Vec<_>>().join(", ")
            )),
            OperandError::Incomparable => DbError::InvalidValueFormat(format!(
                "'{}' cannot be compared with {} attribute '{}'",
                raw, column.data_type, column.name
            )),
        })?;

        let op = comparison_for(operator, self)?;
        Ok(Predicate::compare(column.name.clone(), op, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataType, EntityDescriptor};
    use crate::expression::CompareOp;
    use crate::filter::FilterConfig;
    use chrono::NaiveDate;

    fn build(op: Operator, column: Column, raw: &str) -> Result<Predicate> {
        let descriptor = EntityDescriptor::new("role", vec![column.clone()]);
        let config = FilterConfig::default();
        OrderedBuilder.build(
            op,
            &column,
            raw,
            &BuildContext {
                descriptor: &descriptor,
                config: &config,
            },
        )
    }

    #[test]
    fn test_integer_comparison() {
        let predicate = build(Operator::GtEq, Column::new("access_level", DataType::Integer), "3").unwrap();
        assert_eq!(
            predicate,
            Predicate::compare("access_level", CompareOp::GtEq, Value::Integer(3))
        );
    }

    #[test]
    fn test_date_against_timestamp() {
        let predicate = build(Operator::Lt, Column::new("created_at", DataType::Timestamp), "2024-05-01").unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            predicate,
            Predicate::compare("created_at", CompareOp::Lt, Value::Timestamp(expected))
        );
    }

    #[test]
    fn test_errors() {
        let level = || Column::new("access_level", DataType::Integer);

        assert!(matches!(
            build(Operator::Lt, level(), "soon"),
            Err(DbError::InvalidValueFormat(_))
        ));
        assert!(matches!(
            build(Operator::Lt, level(), "2024-01-01"),
            Err(DbError::InvalidValueFormat(_))
        ));
        assert!(matches!(
            build(Operator::Gt, Column::new("name", DataType::Text), "5"),
            Err(DbError::UnsupportedOperator(_))
        ));
    }

    #[test]
    fn test_foreign_operators_rejected() {
        for op in [Operator::Eq, Operator::NotEq, Operator::Contains, Operator::Range] {
            assert!(matches!(
                build(op, Column::new("access_level", DataType::Integer), "3"),
                Err(DbError::UnsupportedOperator(_))
            ));
        }
    }
}
