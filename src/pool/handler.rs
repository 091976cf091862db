//! The caller-supplied "process request" hook.

use std::sync::Arc;

/// Error returned by a request handler. Logged by the worker, never propagated.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Business logic invoked once per dequeued context.
///
/// Handlers run on worker threads, in parallel, without any lock held.
/// Returning an error (or panicking) drops that one request; the worker
/// carries on with the next.
pub trait RequestHandler<C>: Send + Sync + 'static {
    /// Process one request. The context is owned by the handler from here on.
    fn handle(&self, context: C) -> Result<(), HandlerError>;

    /// Called instead of `handle` when a full queue rejects the context.
    fn reject(&self, context: C) {
        drop(context);
    }
}

impl<C, H> RequestHandler<C> for Arc<H>
where
    H: RequestHandler<C> + ?Sized,
{
    fn handle(&self, context: C) -> Result<(), HandlerError> {
        (**self).handle(context)
    }

    fn reject(&self, context: C) {
        (**self).reject(context)
    }
}

/// Handler backed by a closure. See [`handler_fn`].
#[derive(Clone)]
pub struct FnHandler<F> {
    f: F,
}

/// Wrap a closure as a [`RequestHandler`].
pub fn handler_fn<C, F>(f: F) -> FnHandler<F>
where
    F: Fn(C) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    FnHandler { f }
}

impl<C, F> RequestHandler<C> for FnHandler<F>
where
    F: Fn(C) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    fn handle(&self, context: C) -> Result<(), HandlerError> {
        (self.f)(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn closure_handler_receives_context() {
        let seen = Arc::new(AtomicU32::new(0));
        let handler = {
            let seen = Arc::clone(&seen);
            handler_fn(move |ctx: u32| {
                seen.fetch_add(ctx, Ordering::SeqCst);
                Ok(())
            })
        };
        handler.handle(5).unwrap();
        handler.handle(6).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn closure_errors_pass_through() {
        let handler = handler_fn(|_ctx: u32| Err("boom".into()));
        let err = handler.handle(1).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    struct Rejecting(Arc<AtomicU32>);

    impl RequestHandler<u32> for Rejecting {
        fn handle(&self, _context: u32) -> Result<(), HandlerError> {
            Ok(())
        }

        fn reject(&self, _context: u32) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn arc_handler_delegates_reject() {
        let rejected = Arc::new(AtomicU32::new(0));
        let handler = Arc::new(Rejecting(Arc::clone(&rejected)));
        RequestHandler::reject(&handler, 1);
        assert_eq!(rejected.load(Ordering::SeqCst), 1);
    }
}
