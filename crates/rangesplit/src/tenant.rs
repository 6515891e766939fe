use crate::{
    context::QueryContext,
    error::{Error, Result},
};

/// Resolves the tenant a query runs on behalf of.
pub trait TenantResolver: Send + Sync + 'static {
    fn resolve(&self, ctx: &QueryContext) -> Result<String>;
}

/// Reads the org id carried by the [`QueryContext`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ContextTenant;

impl TenantResolver for ContextTenant {
    fn resolve(&self, ctx: &QueryContext) -> Result<String> {
        match ctx.org_id() {
            Some(org_id) if !org_id.trim().is_empty() => Ok(org_id.to_string()),
            Some(_) => Err(Error::TenantResolution {
                reason: "org id is empty".to_string(),
            }),
            None => Err(Error::TenantResolution {
                reason: "no org id in context".to_string(),
            }),
        }
    }
}
