//! Explicit origin-context propagation.
//!
//! Each logical operation sets its origin tag at its entry point; `submit`
//! reads the tag from the ambient task context when the caller does not
//! pass one explicitly. This replaces call-stack inspection with a
//! task-local value scoped to the operation's future.

use std::future::Future;

use contracts::OriginTag;

tokio::task_local! {
    static ORIGIN_TAG: OriginTag;
}

/// Run a future with the given origin tag attached to its task context.
///
/// Nested scopes shadow outer ones for their duration.
pub async fn with_origin<F>(tag: impl Into<OriginTag>, fut: F) -> F::Output
where
    F: Future,
{
    ORIGIN_TAG.scope(tag.into(), fut).await
}

/// Synchronous variant of [`with_origin`].
pub fn with_origin_sync<T>(tag: impl Into<OriginTag>, f: impl FnOnce() -> T) -> T {
    ORIGIN_TAG.sync_scope(tag.into(), f)
}

/// The origin tag of the current task context, if one is set.
pub fn current_origin() -> Option<OriginTag> {
    ORIGIN_TAG.try_with(|tag| tag.clone()).ok()
}
