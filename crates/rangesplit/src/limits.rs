use std::collections::HashMap;

/// Per-tenant limits consulted before a split query is dispatched.
pub trait Limits: Send + Sync + 'static {
    /// Maximum number of sub-queries a tenant may run concurrently.
    fn max_query_parallelism(&self, org_id: &str) -> usize;
}

/// A fixed default with optional per-tenant overrides.
#[derive(Clone, Debug)]
pub struct StaticLimits {
    default_parallelism: usize,
    overrides: HashMap<String, usize>,
}

impl StaticLimits {
    pub fn new(default_parallelism: usize) -> Self {
        Self {
            default_parallelism,
            overrides: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_override(mut self, org_id: impl Into<String>, parallelism: usize) -> Self {
        self.overrides.insert(org_id.into(), parallelism);
        self
    }
}

impl Limits for StaticLimits {
    fn max_query_parallelism(&self, org_id: &str) -> usize {
        self.overrides
            .get(org_id)
            .copied()
            .unwrap_or(self.default_parallelism)
    }
}
