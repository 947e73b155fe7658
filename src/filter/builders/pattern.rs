use super::{BuildContext, PredicateBuilder, unsupported_for};
use crate::core::{Column, Result};
use crate::expression::Predicate;
use crate::expression::pattern::contains_pattern;
use crate::filter::Operator;

/// `~`: case-insensitive substring match on searchable attributes.
pub struct PatternBuilder;

impl PredicateBuilder for PatternBuilder {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn operators(&self) -> &'static [Operator] {
        &[Operator::Contains]
    }

    fn build(
        &self,
        operator: Operator,
        column: &Column,
        raw: &str,
        context: &BuildContext<'_>,
    ) -> Result<Predicate> {
        if !column.searchable {
            return Err(unsupported_for(operator, column, "a textual"));
        }

        Ok(Predicate::ilike(
            column.name.clone(),
            contains_pattern(raw, context.config.escape_wildcards),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataType, DbError, EntityDescriptor};
    use crate::filter::FilterConfig;

    fn build(column: Column, raw: &str, config: FilterConfig) -> Result<Predicate> {
        let descriptor = EntityDescriptor::new("role", vec![column.clone()]);
        PatternBuilder.build(
            Operator::Contains,
            &column,
            raw,
            &BuildContext {
                descriptor: &descriptor,
                config: &config,
            },
        )
    }

    #[test]
    fn test_wraps_value() {
        let predicate = build(Column::new("name", DataType::Text), "adm", FilterConfig::default()).unwrap();
        assert_eq!(predicate, Predicate::ilike("name", "%adm%"));
    }

    #[test]
    fn test_wildcards_escaped_by_default() {
        let predicate = build(Column::new("name", DataType::Text), "50%", FilterConfig::default()).unwrap();
        assert_eq!(predicate, Predicate::ilike("name", "%50\\%%"));

        let raw = build(
            Column::new("name", DataType::Text),
            "50%",
            FilterConfig::default().escape_wildcards(false),
        )
        .unwrap();
        assert_eq!(raw, Predicate::ilike("name", "%50%%"));
    }

    #[test]
    fn test_rejects_non_textual() {
        let err = build(Column::new("access_level", DataType::Integer), "1", FilterConfig::default())
            .unwrap_err();
        assert!(matches!(err, DbError::UnsupportedOperator(_)));

        let err = build(
            Column::new("password", DataType::Text).not_searchable(),
            "x",
            FilterConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DbError::UnsupportedOperator(_)));
    }
}
