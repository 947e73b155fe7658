use super::super::{EvaluationContext, PredicateEvaluator};
use crate::core::{EntityDescriptor, Result, Row, Value};
use crate::expression::Predicate;

pub struct LikeEvaluator;

impl PredicateEvaluator for LikeEvaluator {
    fn name(&self) -> &'static str {
        "LIKE"
    }

    fn can_evaluate(&self, predicate: &Predicate) -> bool {
        matches!(predicate, Predicate::Like { .. })
    }

    fn evaluate(
        &self,
        predicate: &Predicate,
        row: &Row,
        descriptor: &EntityDescriptor,
        context: &EvaluationContext<'_>,
    ) -> Result<bool> {
        let Predicate::Like {
            column,
            pattern,
            case_insensitive,
        } = predicate
        else {
            unreachable!();
        };

        match context.column_value(column, row, descriptor)? {
            Value::Text(text) => crate::expression::pattern::eval_like(text, pattern, !case_insensitive),
            _ => Ok(false),
        }
    }
}
