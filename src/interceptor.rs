//! Interceptor trait, continuations, and adapters.
//!
//! # Shape of an interceptor
//!
//! An interceptor receives the request context and a [`Next`] continuation
//! standing for everything downstream, already wired:
//!
//! ```text
//! handle(ctx, next)
//!   ├─ before: inspect / mutate ctx
//!   ├─ next.run(ctx)          ← inner interceptors run here (or not at all)
//!   └─ after:  inspect / mutate ctx again, innermost first
//! ```
//!
//! Not calling `next.run` short-circuits the chain. `run` consumes the
//! continuation, so the rest of the chain can be entered at most once per
//! call.
//!
//! # How interceptors are stored
//!
//! A pipeline holds interceptors of different concrete types in one
//! sequence, so they are erased behind [`SharedInterceptor`]
//! (`Arc<dyn Interceptor<C>>`). Closures go through [`from_fn`], terminal
//! handlers through [`wrap`].

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use crate::chain::Link;

// ── Interceptor ──────────────────────────────────────────────────────────────

/// A unit of request-handling behaviour that may delegate to the rest of the
/// chain.
///
/// `C` is the request context. The chain imposes nothing on it beyond being
/// passed by `&mut` to every interceptor.
///
/// ```rust
/// use strata::{Interceptor, Next, Pipeline};
///
/// struct Stamp(&'static str);
///
/// impl Interceptor<Vec<&'static str>> for Stamp {
///     fn handle(&self, trail: &mut Vec<&'static str>, next: Next<'_, Vec<&'static str>>) {
///         trail.push(self.0);
///         next.run(trail);
///     }
/// }
///
/// let pipeline = Pipeline::from_interceptors([Stamp("a"), Stamp("b")]);
/// let mut trail = Vec::new();
/// pipeline.handle(&mut trail);
/// assert_eq!(trail, ["a", "b"]);
/// ```
pub trait Interceptor<C>: Send + Sync + 'static {
    fn handle(&self, ctx: &mut C, next: Next<'_, C>);

    /// `true` for an empty interceptor slot (`None`). Pipelines refuse to
    /// register or build with an absent slot.
    ///
    /// Reserved: the `Seal` argument cannot be named outside this crate, so
    /// only the `Option`, `Arc` and `Box` impls override it.
    #[doc(hidden)]
    fn is_absent(&self, _: sealed::Seal) -> bool {
        false
    }
}

pub(crate) mod sealed {
    #[derive(Clone, Copy, Debug)]
    pub struct Seal;
}

/// Whether `interceptor` is an absent slot.
pub(crate) fn is_absent<C, I>(interceptor: &I) -> bool
where
    I: Interceptor<C> + ?Sized,
{
    interceptor.is_absent(sealed::Seal)
}

/// A type-erased interceptor, shared between every pipeline built from it.
pub type SharedInterceptor<C> = Arc<dyn Interceptor<C>>;

impl<C, I> Interceptor<C> for Arc<I>
where
    I: Interceptor<C> + ?Sized,
{
    fn handle(&self, ctx: &mut C, next: Next<'_, C>) {
        (**self).handle(ctx, next)
    }

    fn is_absent(&self, seal: sealed::Seal) -> bool {
        (**self).is_absent(seal)
    }
}

impl<C, I> Interceptor<C> for Box<I>
where
    I: Interceptor<C> + ?Sized,
{
    fn handle(&self, ctx: &mut C, next: Next<'_, C>) {
        (**self).handle(ctx, next)
    }

    fn is_absent(&self, seal: sealed::Seal) -> bool {
        (**self).is_absent(seal)
    }
}

/// An optional slot. `None` is the absent interceptor: registering it panics,
/// and a built chain never contains one.
impl<C, I> Interceptor<C> for Option<I>
where
    I: Interceptor<C>,
{
    fn handle(&self, ctx: &mut C, next: Next<'_, C>) {
        match self {
            Some(inner) => inner.handle(ctx, next),
            None => unreachable!("absent interceptor reached a built chain"),
        }
    }

    fn is_absent(&self, seal: sealed::Seal) -> bool {
        match self {
            Some(inner) => inner.is_absent(seal),
            None => true,
        }
    }
}

// ── Next ─────────────────────────────────────────────────────────────────────

/// The rest of the chain, fixed when the pipeline was built.
pub struct Next<'a, C> {
    link: Option<&'a Link<C>>,
}

impl<'a, C: 'static> Next<'a, C> {
    pub(crate) fn new(link: Option<&'a Link<C>>) -> Self {
        Self { link }
    }

    /// A continuation that does nothing. Useful for calling an interceptor on
    /// its own, outside any pipeline.
    pub fn end() -> Self {
        Self { link: None }
    }

    /// Whether nothing runs downstream of this point.
    pub fn is_end(&self) -> bool {
        self.link.is_none()
    }

    /// Runs every interceptor downstream of the current one.
    pub fn run(self, ctx: &mut C) {
        if let Some(link) = self.link {
            link.call(ctx);
        }
    }
}

impl<C: 'static> fmt::Debug for Next<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").field("end", &self.is_end()).finish()
    }
}

// ── Closure interceptors ─────────────────────────────────────────────────────

/// Interceptor built from a closure. See [`from_fn`].
#[derive(Clone)]
pub struct FromFn<F>(F);

/// Turns a closure into an [`Interceptor`].
///
/// ```rust
/// use strata::{Pipeline, from_fn};
///
/// let mut pipeline = Pipeline::new();
/// pipeline.register(from_fn(|count: &mut u32, next| {
///     *count += 1;
///     next.run(count);
/// }));
///
/// let mut count = 0;
/// pipeline.handle(&mut count);
/// assert_eq!(count, 1);
/// ```
pub fn from_fn<C, F>(f: F) -> FromFn<F>
where
    F: Fn(&mut C, Next<'_, C>) + Send + Sync + 'static,
{
    FromFn(f)
}

impl<C, F> Interceptor<C> for FromFn<F>
where
    F: Fn(&mut C, Next<'_, C>) + Send + Sync + 'static,
{
    fn handle(&self, ctx: &mut C, next: Next<'_, C>) {
        (self.0)(ctx, next)
    }
}

impl<F> fmt::Debug for FromFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FromFn").field(&type_name::<F>()).finish()
    }
}

// ── Terminal handlers ────────────────────────────────────────────────────────

/// A leaf capability with no notion of "next": a router, a static file
/// server, a whole nested [`Pipeline`](crate::Pipeline).
///
/// Adapt one into a chain position with [`wrap`].
pub trait Handler<C>: Send + Sync + 'static {
    fn call(&self, ctx: &mut C);
}

impl<C, H> Handler<C> for Arc<H>
where
    H: Handler<C> + ?Sized,
{
    fn call(&self, ctx: &mut C) {
        (**self).call(ctx)
    }
}

/// Handler built from a closure. See [`handler_fn`].
#[derive(Clone)]
pub struct HandlerFn<F>(F);

/// Turns a closure into a terminal [`Handler`].
pub fn handler_fn<C, F>(f: F) -> HandlerFn<F>
where
    F: Fn(&mut C) + Send + Sync + 'static,
{
    HandlerFn(f)
}

impl<C, F> Handler<C> for HandlerFn<F>
where
    F: Fn(&mut C) + Send + Sync + 'static,
{
    fn call(&self, ctx: &mut C) {
        (self.0)(ctx)
    }
}

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerFn").field(&type_name::<F>()).finish()
    }
}

/// A terminal handler adapted into an interceptor. See [`wrap`].
#[derive(Clone, Debug)]
pub struct Wrap<H>(H);

/// Adapts a terminal [`Handler`] into an [`Interceptor`].
///
/// The wrapped handler runs first; the continuation is always invoked right
/// after it returns.
pub fn wrap<C, H>(handler: H) -> Wrap<H>
where
    H: Handler<C>,
{
    Wrap(handler)
}

impl<H> Wrap<H> {
    pub fn into_inner(self) -> H {
        self.0
    }
}

impl<C, H> Interceptor<C> for Wrap<H>
where
    C: 'static,
    H: Handler<C>,
{
    fn handle(&self, ctx: &mut C, next: Next<'_, C>) {
        self.0.call(ctx);
        next.run(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Trail = Vec<&'static str>;

    #[test]
    fn end_continuation_does_nothing() {
        let mut trail: Trail = Vec::new();
        let next = Next::end();
        assert!(next.is_end());
        next.run(&mut trail);
        assert!(trail.is_empty());
    }

    #[test]
    fn closure_interceptor_runs_standalone() {
        let stamp = from_fn(|trail: &mut Trail, next| {
            trail.push("stamp");
            next.run(trail);
        });

        let mut trail = Vec::new();
        stamp.handle(&mut trail, Next::end());
        assert_eq!(trail, ["stamp"]);
    }

    #[test]
    fn wrap_runs_handler_then_delegates() {
        let wrapped = wrap(handler_fn(|trail: &mut Trail| trail.push("leaf")));

        let mut trail = Vec::new();
        wrapped.handle(&mut trail, Next::end());
        assert_eq!(trail, ["leaf"]);
    }

    #[test]
    fn option_slots_report_absence() {
        let present = Some(from_fn(|_: &mut Trail, _next| {}));
        let absent: Option<FromFn<fn(&mut Trail, Next<'_, Trail>)>> = None;

        assert!(!is_absent::<Trail, _>(&present));
        assert!(is_absent::<Trail, _>(&absent));
        assert!(is_absent::<Trail, _>(&Arc::new(absent)));
    }

    #[test]
    fn user_interceptors_are_always_present() {
        struct Custom;

        impl Interceptor<Trail> for Custom {
            fn handle(&self, trail: &mut Trail, next: Next<'_, Trail>) {
                next.run(trail);
            }
        }

        let shared: SharedInterceptor<Trail> = Arc::new(Custom);
        assert!(!is_absent::<Trail, _>(&Custom));
        assert!(!is_absent::<Trail, _>(&shared));
        assert!(!is_absent::<Trail, _>(&Some(Box::new(Custom))));
    }

    #[test]
    #[should_panic(expected = "absent interceptor")]
    fn absent_slot_panics_when_called() {
        let absent: Option<FromFn<fn(&mut Trail, Next<'_, Trail>)>> = None;
        absent.handle(&mut Vec::new(), Next::end());
    }

    #[test]
    fn shared_interceptors_forward() {
        let shared: SharedInterceptor<Trail> = Arc::new(from_fn(|trail: &mut Trail, next| {
            trail.push("shared");
            next.run(trail);
        }));
        let boxed: Box<dyn Interceptor<Trail>> = Box::new(Arc::clone(&shared));

        let mut trail = Vec::new();
        boxed.handle(&mut trail, Next::end());
        shared.handle(&mut trail, Next::end());
        assert_eq!(trail, ["shared", "shared"]);
    }
}
