//! The pipeline: an ordered interceptor sequence plus its composed chain.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::chain::Chain;
use crate::interceptor::{
    Handler, Interceptor, Next, SharedInterceptor, from_fn, handler_fn, is_absent, wrap,
};

/// An ordered stack of interceptors, invoked as a single handler.
///
/// Interceptors run in the order they are registered; code after
/// `next.run(ctx)` runs in reverse order, innermost first. The composed chain
/// is rebuilt on every registration, so [`handle`](Pipeline::handle) never
/// sees a stale chain.
///
/// Configure a pipeline fully before sharing it: `register` takes
/// `&mut self`, `handle` and [`extend`](Pipeline::extend) take `&self`.
///
/// ```rust
/// use strata::Pipeline;
///
/// let mut pipeline = Pipeline::new();
/// pipeline
///     .register_fn(|trail: &mut Vec<&'static str>, next| {
///         trail.push("before-a");
///         next.run(trail);
///         trail.push("after-a");
///     })
///     .register_fn(|trail: &mut Vec<&'static str>, next| {
///         trail.push("before-b");
///         next.run(trail);
///         trail.push("after-b");
///     });
///
/// let mut trail = Vec::new();
/// pipeline.handle(&mut trail);
/// assert_eq!(trail, ["before-a", "before-b", "after-b", "after-a"]);
/// ```
pub struct Pipeline<C> {
    interceptors: Vec<SharedInterceptor<C>>,
    chain: Chain<C>,
}

impl<C: 'static> Pipeline<C> {
    /// An empty pipeline. Handling a context with it does nothing.
    pub fn new() -> Self {
        Self::from_shared(Vec::new())
    }

    /// A pipeline pre-seeded with `interceptors`, in order.
    ///
    /// # Panics
    ///
    /// Panics if any of them is an absent slot (`None`).
    #[track_caller]
    pub fn from_interceptors<I>(interceptors: impl IntoIterator<Item = I>) -> Self
    where
        I: Interceptor<C>,
    {
        Self::from_shared(interceptors.into_iter().map(share).collect())
    }

    #[track_caller]
    fn from_shared(interceptors: Vec<SharedInterceptor<C>>) -> Self {
        let chain = Chain::build(&interceptors);
        Self { interceptors, chain }
    }

    /// Appends `interceptor` to the stack. Returns `&mut self` for chaining.
    ///
    /// # Panics
    ///
    /// Panics if `interceptor` is an absent slot (`None`). The pipeline is
    /// left untouched in that case.
    #[track_caller]
    pub fn register<I>(&mut self, interceptor: I) -> &mut Self
    where
        I: Interceptor<C>,
    {
        self.interceptors.push(share(interceptor));
        self.rebuild();
        self
    }

    /// Appends a closure interceptor. See [`from_fn`].
    pub fn register_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut C, Next<'_, C>) + Send + Sync + 'static,
    {
        self.register(from_fn(f))
    }

    /// Appends a terminal handler. The handler runs, then the rest of the
    /// chain runs unconditionally.
    pub fn register_terminal<H>(&mut self, handler: H) -> &mut Self
    where
        H: Handler<C>,
    {
        self.register(wrap(handler))
    }

    /// Appends a terminal handler closure. See [`register_terminal`](Self::register_terminal).
    pub fn register_terminal_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        self.register_terminal(handler_fn(f))
    }

    /// Returns a new pipeline made of this one's interceptors followed by
    /// `interceptors`.
    ///
    /// `self` is not modified, and the two pipelines never share their
    /// sequence: registering on the child does not affect the parent.
    ///
    /// # Panics
    ///
    /// Panics if any of the additions is an absent slot (`None`).
    #[track_caller]
    pub fn extend<I>(&self, interceptors: impl IntoIterator<Item = I>) -> Self
    where
        I: Interceptor<C>,
    {
        let additions = interceptors.into_iter();
        let mut sequence = Vec::with_capacity(self.interceptors.len() + additions.size_hint().0);
        sequence.extend(self.interceptors.iter().cloned());
        sequence.extend(additions.map(share));
        Self::from_shared(sequence)
    }

    /// Runs `ctx` through the stack.
    pub fn handle(&self, ctx: &mut C) {
        self.chain.run(ctx);
    }

    /// The registered interceptors, in execution order.
    pub fn interceptors(&self) -> &[SharedInterceptor<C>] {
        &self.interceptors
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    fn rebuild(&mut self) {
        self.chain = Chain::build(&self.interceptors);
        debug!(interceptors = self.interceptors.len(), "pipeline rebuilt");
    }
}

#[track_caller]
fn share<C, I>(interceptor: I) -> SharedInterceptor<C>
where
    C: 'static,
    I: Interceptor<C>,
{
    assert!(!is_absent::<C, _>(&interceptor), "interceptor cannot be absent");
    Arc::new(interceptor)
}

impl<C: 'static> Default for Pipeline<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> Clone for Pipeline<C> {
    fn clone(&self) -> Self {
        Self::from_shared(self.interceptors.clone())
    }
}

impl<C> fmt::Debug for Pipeline<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

impl<C, I> FromIterator<I> for Pipeline<C>
where
    C: 'static,
    I: Interceptor<C>,
{
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        Self::from_interceptors(iter)
    }
}

/// A pipeline is itself a terminal handler, so it can be nested inside a
/// larger structure or wrapped into another pipeline.
impl<C: 'static> Handler<C> for Pipeline<C> {
    fn call(&self, ctx: &mut C) {
        self.handle(ctx);
    }
}
