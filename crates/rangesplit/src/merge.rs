use crate::error::Result;

/// Combines the partial responses of a split query into one.
///
/// `responses` arrive in dispatch order: ascending time for forward queries,
/// descending for backward ones. Failures should be reported as
/// [`Error::Merge`](crate::Error::Merge).
pub trait Merger<R>: Send + Sync + 'static {
    fn merge(&self, responses: Vec<R>) -> Result<R>;
}

impl<R, F> Merger<R> for F
where
    F: Fn(Vec<R>) -> Result<R> + Send + Sync + 'static,
{
    fn merge(&self, responses: Vec<R>) -> Result<R> {
        self(responses)
    }
}
