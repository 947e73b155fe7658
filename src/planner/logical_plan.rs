use crate::expression::Predicate;

/// Page window applied after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

impl Window {
    /// Page-based window: page `skip` of `limit` rows each.
    pub fn page(skip: u64, limit: u64) -> Option<Self> {
        Some(Self {
            offset: skip.checked_mul(limit)?,
            limit,
        })
    }
}

/// Read plan executed by a store session.
///
/// Rows come back in storage (insertion) order; `projection` keeps the
/// caller's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectPlan {
    pub entity: String,
    pub predicate: Option<Predicate>,
    pub projection: Option<Vec<String>>,
    pub window: Option<Window>,
    pub first_only: bool,
}

impl SelectPlan {
    pub fn scan(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            predicate: None,
            projection: None,
            window: None,
            first_only: false,
        }
    }

    pub fn filter(mut self, predicate: Option<Predicate>) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn project(mut self, columns: Option<Vec<String>>) -> Self {
        self.projection = columns;
        self
    }

    pub fn window(mut self, window: Option<Window>) -> Self {
        self.window = window;
        self
    }

    pub fn first_only(mut self, first_only: bool) -> Self {
        self.first_only = first_only;
        self
    }
}
