use super::builders::{BuildContext, BuilderRegistry};
use super::validate::validate;
use super::{FilterConfig, FilterRequest, json_filters};
use crate::core::{DbError, EntityDescriptor, Result};
use crate::expression::Predicate;
use crate::planner::SelectPlan;
use crate::result::{QueryMeta, QueryResult};
use crate::storage::{SessionSource, StoreSession};
use std::sync::Arc;
use tracing::{Instrument, debug, info_span, warn};

/// Validated, store-ready form of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub select: SelectPlan,
    /// Names of the values in each returned row
    pub columns: Vec<String>,
    pub projected: bool,
}

impl QueryPlan {
    pub fn predicate(&self) -> Option<&Predicate> {
        self.select.predicate.as_ref()
    }
}

/// Schema-driven filter engine shared by every entity.
///
/// Holds no per-call state: each `query` validates, acquires one session
/// from the source, runs the plan once and releases the session before
/// returning.
pub struct FilterEngine<S: SessionSource> {
    source: Arc<S>,
    builders: Arc<BuilderRegistry>,
    config: FilterConfig,
}

impl<S: SessionSource> Clone for FilterEngine<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            builders: Arc::clone(&self.builders),
            config: self.config.clone(),
        }
    }
}

impl<S: SessionSource> FilterEngine<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            builders: Arc::new(BuilderRegistry::with_default_builders()),
            config: FilterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: FilterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Validate `request` and build its plan without touching the store.
    pub fn plan(&self, descriptor: &EntityDescriptor, request: &FilterRequest) -> Result<QueryPlan> {
        let validated = validate(descriptor, request, &self.config)?;

        let mut predicates = Vec::new();
        if let (Some(operator), Some((column, raw))) = (validated.operator, validated.attribute) {
            let context = BuildContext {
                descriptor,
                config: &self.config,
            };
            predicates.push(self.builders.build(operator, column, raw, &context)?);
        }
        if let (Some(operator), Some(filters)) = (validated.operator, validated.json_filters) {
            predicates.extend(json_filters::build(descriptor, operator, filters, &self.config)?);
        }

        let projection = validated.include.map(|columns| columns.to_vec());
        let columns = projection
            .clone()
            .unwrap_or_else(|| descriptor.column_names());

        Ok(QueryPlan {
            select: SelectPlan::scan(descriptor.name())
                .filter(Predicate::all(predicates))
                .project(projection)
                .window(validated.window)
                .first_only(!request.return_all),
            projected: validated.include.is_some(),
            columns,
        })
    }

    /// Run `request` against the entity described by `descriptor`.
    pub async fn query(&self, descriptor: &EntityDescriptor, request: &FilterRequest) -> Result<QueryResult> {
        let span = info_span!(
            "filter.query",
            entity = descriptor.name(),
            operator = %request.operator
        );

        self.run(descriptor, request).instrument(span).await
    }

    async fn run(&self, descriptor: &EntityDescriptor, request: &FilterRequest) -> Result<QueryResult> {
        let plan = self.plan(descriptor, request)?;
        match plan.predicate() {
            Some(predicate) => debug!(%predicate, window = ?plan.select.window, "built query plan"),
            None => debug!(window = ?plan.select.window, "built query plan without predicate"),
        }

        let mut session = self.source.acquire().await.inspect_err(log_store_failure)?;
        let outcome = session.fetch_counted(&plan.select).await;
        let released = session.close().await;

        let counted = outcome.inspect_err(log_store_failure)?;
        released.inspect_err(log_store_failure)?;

        debug!(
            rows = counted.rows.len(),
            total = counted.total,
            matched = counted.matched,
            "query finished"
        );

        Ok(QueryResult::new(
            plan.columns,
            counted.rows,
            QueryMeta {
                total_count: counted.total,
                matched_count: counted.matched,
            },
            plan.projected,
        ))
    }
}

fn log_store_failure(err: &DbError) {
    if !err.is_client_error() {
        warn!(error = %err, status = err.status_code(), "store failure");
    }
}
