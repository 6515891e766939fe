use crate::{
    config::SplitConfig,
    coordinator::SplitByInterval,
    tenant::ContextTenant,
};
use tower::Layer;

/// A [`tower::Layer`] that wraps a downstream [`Handler`] in a
/// [`SplitByInterval`].
///
/// Each call to [`Layer::layer`] builds an independent splitter with its own
/// task tracker, sharing clones of the limits, merger and tenant resolver.
///
/// [`Handler`]: crate::Handler
#[derive(Clone, Debug)]
pub struct SplitByIntervalLayer<L, M, T = ContextTenant> {
    config: SplitConfig,
    limits: L,
    merger: M,
    tenants: T,
}

impl<L, M> SplitByIntervalLayer<L, M, ContextTenant> {
    pub const fn new(config: SplitConfig, limits: L, merger: M) -> Self {
        Self {
            config,
            limits,
            merger,
            tenants: ContextTenant,
        }
    }
}

impl<L, M, T> SplitByIntervalLayer<L, M, T> {
    #[must_use]
    pub fn with_tenant_resolver<U>(self, tenants: U) -> SplitByIntervalLayer<L, M, U> {
        SplitByIntervalLayer {
            config: self.config,
            limits: self.limits,
            merger: self.merger,
            tenants,
        }
    }
}

impl<H, L, M, T> Layer<H> for SplitByIntervalLayer<L, M, T>
where
    L: Clone,
    M: Clone,
    T: Clone,
{
    type Service = SplitByInterval<H, L, M, T>;

    fn layer(&self, inner: H) -> Self::Service {
        SplitByInterval::with_tenant_resolver(
            inner,
            self.limits.clone(),
            self.merger.clone(),
            self.tenants.clone(),
            self.config,
        )
    }
}
