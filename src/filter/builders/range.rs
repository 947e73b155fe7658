use super::{BuildContext, PredicateBuilder, unsupported_for};
use super::ordered::{OperandError, OrderedBuilder};
use crate::core::{Column, DbError, Result, Value};
use crate::expression::Predicate;
use crate::filter::Operator;
use std::cmp::Ordering;

/// `|`: inclusive `low|high` range.
///
/// Bounds are coerced like ordered comparisons. A low bound above the high
/// bound is rejected rather than swapped.
pub struct RangeBuilder;

impl RangeBuilder {
    fn bound(column: &Column, raw: &str, which: &str) -> Result<Value> {
        OrderedBuilder::operand(column, raw).map_err(|err| {
            let reason = match err {
                OperandError::Unparseable => "is not an integer, float, date or time",
                OperandError::Incomparable => "cannot be compared with the attribute",
            };
            DbError::InvalidRangeFormat(format!(
                "{} bound '{}' of '{}' {}",
                which, raw, column.name, reason
            ))
        })
    }
}

impl PredicateBuilder for RangeBuilder {
    fn name(&self) -> &'static str {
        "range"
    }

    fn operators(&self) -> &'static [Operator] {
        &[Operator::Range]
    }

    fn build(
        &self,
        operator: Operator,
        column: &Column,
        raw: &str,
        _context: &BuildContext<'_>,
    ) -> Result<Predicate> {
        if !column.data_type.is_ordered() {
            return Err(unsupported_for(operator, column, "an ordered"));
        }

        let parts: Vec<&str> = raw.split('|').collect();
        let [low, high] = parts.as_slice() else {
            return Err(DbError::InvalidRangeFormat(format!(
                "Range must be two values separated by '|', got '{}'",
                raw
            )));
        };

        let low = Self::bound(column, low, "lower")?;
        let high = Self::bound(column, high, "upper")?;

        if low.compare(&high)? == Ordering::Greater {
            return Err(DbError::InvalidRangeFormat(format!(
                "Lower bound {} exceeds upper bound {}",
                low, high
            )));
        }

        Ok(Predicate::between(column.name.clone(), low, high))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataType, EntityDescriptor};
    use crate::filter::FilterConfig;
    use chrono::NaiveTime;

    fn build(column: Column, raw: &str) -> Result<Predicate> {
        let descriptor = EntityDescriptor::new("role", vec![column.clone()]);
        let config = FilterConfig::default();
        RangeBuilder.build(
            Operator::Range,
            &column,
            raw,
            &BuildContext {
                descriptor: &descriptor,
                config: &config,
            },
        )
    }

    fn level() -> Column {
        Column::new("access_level", DataType::Integer)
    }

    #[test]
    fn test_integer_range() {
        assert_eq!(
            build(level(), "10|20").unwrap(),
            Predicate::between("access_level", Value::Integer(10), Value::Integer(20))
        );
        // equal bounds are a valid single-point range
        assert!(build(level(), "7|7").is_ok());
    }

    #[test]
    fn test_time_range() {
        let opens = Column::new("opens_at", DataType::Time);
        assert_eq!(
            build(opens, "08:00:00|17:30:00").unwrap(),
            Predicate::between(
                "opens_at",
                Value::Time(NaiveTime::from_hms_opt(8, 0, 0).unwrap()),
                Value::Time(NaiveTime::from_hms_opt(17, 30, 0).unwrap())
            )
        );
    }

    #[test]
    fn test_malformed_ranges() {
        for raw in ["10", "10|20|30", "|20", "10|", "a|b", "10|2024-01-01"] {
            assert!(
                matches!(build(level(), raw), Err(DbError::InvalidRangeFormat(_))),
                "{} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_reversed_bounds_rejected() {
        assert!(matches!(
            build(level(), "20|10"),
            Err(DbError::InvalidRangeFormat(_))
        ));
    }

    #[test]
    fn test_non_ordered_attribute() {
        assert!(matches!(
            build(Column::new("name", DataType::Text), "a|b"),
            Err(DbError::UnsupportedOperator(_))
        ));
    }
}
