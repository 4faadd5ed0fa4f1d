// src/tracing_core/context.rs
// Request-context propagation: injects session.id/user.id onto every span
// created while a request is being handled (spec §4.6).

tokio::task_local! {
    static REQUEST_CONTEXT: RequestContext;
}

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub session_id: Option<String>,
    pub user_id: Option<String>,
}

/// Runs `f` with `context` installed as the ambient request context; every
/// span opened inside `f` (directly or transitively) can read it back via
/// `current()`.
pub async fn with_context<F, T>(context: RequestContext, f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    REQUEST_CONTEXT.scope(context, f).await
}

/// Reads the ambient request context, if one is installed.
pub fn current() -> Option<RequestContext> {
    REQUEST_CONTEXT.try_with(|ctx| ctx.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn context_is_visible_inside_scope_and_absent_outside() {
        assert!(current().is_none());
        let seen = with_context(
            RequestContext {
                session_id: Some("s1".to_string()),
                user_id: Some("u1".to_string()),
            },
            async { current() },
        )
        .await;
        assert_eq!(seen.unwrap().session_id, Some("s1".to_string()));
        assert!(current().is_none());
    }
}
