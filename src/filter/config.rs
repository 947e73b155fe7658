use serde::Deserialize;

/// Engine-level options shared by every entity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterConfig {
    /// Largest page size a request may ask for
    pub max_limit: Option<u64>,

    /// Match `%` and `_` in `~` values literally
    pub escape_wildcards: bool,
}

impl FilterConfig {
    pub fn new() -> Self {
        Self {
            max_limit: None,
            escape_wildcards: true,
        }
    }

    pub fn max_limit(mut self, max: u64) -> Self {
        self.max_limit = Some(max);
        self
    }

    pub fn escape_wildcards(mut self, enabled: bool) -> Self {
        self.escape_wildcards = enabled;
        self
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::new()
    }
}
