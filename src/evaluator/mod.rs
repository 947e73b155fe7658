pub mod plugins;

use crate::core::{DbError, EntityDescriptor, Result, Row, Value};
use crate::expression::Predicate;

/// Evaluates one kind of predicate node against a stored row.
pub trait PredicateEvaluator: Send + Sync {
    /// Evaluator name (for logs)
    fn name(&self) -> &'static str;

    /// Can this evaluator handle the predicate node?
    fn can_evaluate(&self, predicate: &Predicate) -> bool;

    /// Does `row` satisfy the predicate?
    fn evaluate(
        &self,
        predicate: &Predicate,
        row: &Row,
        descriptor: &EntityDescriptor,
        context: &EvaluationContext<'_>,
    ) -> Result<bool>;
}

/// Gives evaluators access to the registry for nested predicates.
pub struct EvaluationContext<'a> {
    registry: &'a EvaluatorRegistry,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(registry: &'a EvaluatorRegistry) -> Self {
        Self { registry }
    }

    pub fn evaluate(&self, predicate: &Predicate, row: &Row, descriptor: &EntityDescriptor) -> Result<bool> {
        if let Some(evaluator) = self.registry.find_evaluator(predicate) {
            return evaluator.evaluate(predicate, row, descriptor, self);
        }

        Err(DbError::ExecutionError(format!(
            "No evaluator found for predicate: {}",
            predicate
        )))
    }

    pub fn column_value<'r>(
        &self,
        column: &str,
        row: &'r Row,
        descriptor: &EntityDescriptor,
    ) -> Result<&'r Value> {
        let idx = descriptor
            .find_column_index(column)
            .ok_or_else(|| DbError::unknown_attribute(descriptor.name(), column))?;
        row.get(idx).ok_or_else(|| {
            DbError::ExecutionError(format!(
                "Row of '{}' has no value at position {}",
                descriptor.name(),
                idx
            ))
        })
    }
}

/// Registry of predicate evaluators
pub struct EvaluatorRegistry {
    evaluators: Vec<Box<dyn PredicateEvaluator>>,
}

impl EvaluatorRegistry {
    pub fn new() -> Self {
        Self {
            evaluators: Vec::new(),
        }
    }

    pub fn register(&mut self, evaluator: Box<dyn PredicateEvaluator>) {
        tracing::trace!(evaluator = evaluator.name(), "registered predicate evaluator");
        self.evaluators.push(evaluator);
    }

    pub fn with_default_evaluators() -> Self {
        use plugins::*;

        let mut registry = Self::new();

        registry.register(Box::new(logical::LogicalEvaluator));
        registry.register(Box::new(comparison::ComparisonEvaluator));
        registry.register(Box::new(like::LikeEvaluator));
        registry.register(Box::new(between::BetweenEvaluator));
        registry.register(Box::new(is_null::IsNullEvaluator));

        registry
    }

    /// Evaluate `predicate` for a single row.
    pub fn matches(&self, predicate: &Predicate, row: &Row, descriptor: &EntityDescriptor) -> Result<bool> {
        EvaluationContext::new(self).evaluate(predicate, row, descriptor)
    }

    fn find_evaluator(&self, predicate: &Predicate) -> Option<&dyn PredicateEvaluator> {
        self.evaluators
            .iter()
            .find(|ev| ev.can_evaluate(predicate))
            .map(|boxed| &**boxed)
    }
}

impl Default for EvaluatorRegistry {
    fn default() -> Self {
        Self::with_default_evaluators()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, DataType};
    use crate::expression::CompareOp;

    fn descriptor() -> EntityDescriptor {
        EntityDescriptor::new(
            "role",
            vec![
                Column::new("name", DataType::Text),
                Column::new("access_level", DataType::Integer),
                Column::new("description", DataType::Text),
            ],
        )
    }

    fn row(name: &str, level: i64, description: Option<&str>) -> Row {
        vec![Value::from(name), Value::Integer(level), Value::from(description)]
    }

    #[test]
    fn test_conjunction() {
        let registry = EvaluatorRegistry::default();
        let d = descriptor();
        let p = Predicate::all(vec![
            Predicate::ilike("name", "%ADM%"),
            Predicate::between("access_level", Value::Integer(5), Value::Integer(10)),
        ])
        .unwrap();

        assert!(registry.matches(&p, &row("admin", 10, None), &d).unwrap());
        assert!(!registry.matches(&p, &row("admin", 4, None), &d).unwrap());
        assert!(!registry.matches(&p, &row("viewer", 7, None), &d).unwrap());
    }

    #[test]
    fn test_null_never_compares() {
        let registry = EvaluatorRegistry::default();
        let d = descriptor();
        let eq = Predicate::compare("description", CompareOp::Eq, Value::from("x"));
        let ne = Predicate::compare("description", CompareOp::NotEq, Value::from("x"));
        let r = row("admin", 1, None);

        assert!(!registry.matches(&eq, &r, &d).unwrap());
        assert!(!registry.matches(&ne, &r, &d).unwrap());
        assert!(registry.matches(&Predicate::is_null("description"), &r, &d).unwrap());
        assert!(!registry.matches(&Predicate::is_not_null("description"), &r, &d).unwrap());
    }

    #[test]
    fn test_unknown_column() {
        let registry = EvaluatorRegistry::default();
        let p = Predicate::is_null("ghost");
        assert!(matches!(
            registry.matches(&p, &row("admin", 1, None), &descriptor()),
            Err(DbError::UnknownAttribute { .. })
        ));
    }
}
