//! Chain builder.
//!
//! Folds an interceptor sequence from the right into a singly linked list of
//! `(interceptor, continuation)` pairs:
//!
//! ```text
//! [A, B, C]  →  Link(A) ─▶ Link(B) ─▶ Link(C) ─▶ end
//! ```
//!
//! The list is built once and never mutated. Invoking link *i* calls
//! `interceptors[i].handle(ctx, Next(link i + 1))`, so each continuation is
//! a plain reference into the list. Construction and teardown are both
//! iterative; only invocation grows the stack, one frame per interceptor that
//! delegates.

use std::sync::Arc;

use crate::interceptor::{Interceptor, Next, SharedInterceptor, is_absent};

pub(crate) struct Link<C> {
    interceptor: SharedInterceptor<C>,
    next: Option<Box<Link<C>>>,
}

impl<C: 'static> Link<C> {
    pub(crate) fn call(&self, ctx: &mut C) {
        self.interceptor.handle(ctx, Next::new(self.next.as_deref()));
    }
}

/// The composed entry point of a pipeline.
pub(crate) struct Chain<C> {
    head: Option<Box<Link<C>>>,
}

impl<C: 'static> Chain<C> {
    /// Builds the chain for `interceptors`, last one first.
    ///
    /// # Panics
    ///
    /// Panics if any interceptor is an absent slot.
    #[track_caller]
    pub(crate) fn build(interceptors: &[SharedInterceptor<C>]) -> Self {
        let mut head = None;
        for (position, interceptor) in interceptors.iter().enumerate().rev() {
            assert!(
                !is_absent::<C, _>(&**interceptor),
                "interceptor at position {position} is absent"
            );
            head = Some(Box::new(Link {
                interceptor: Arc::clone(interceptor),
                next: head,
            }));
        }
        Self { head }
    }

    /// Runs the chain. A chain with no links does nothing.
    pub(crate) fn run(&self, ctx: &mut C) {
        Next::new(self.head.as_deref()).run(ctx);
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        let mut depth = 0;
        let mut link = self.head.as_deref();
        while let Some(current) = link {
            depth += 1;
            link = current.next.as_deref();
        }
        depth
    }
}

impl<C> Drop for Chain<C> {
    // Unlink one node at a time so a long chain doesn't drop recursively.
    fn drop(&mut self) {
        let mut link = self.head.take();
        while let Some(mut current) = link {
            link = current.next.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptor::from_fn;

    type Trail = Vec<String>;

    fn stamp(name: &'static str) -> SharedInterceptor<Trail> {
        Arc::new(from_fn(move |trail: &mut Trail, next| {
            trail.push(name.to_owned());
            next.run(trail);
        }))
    }

    struct Noop;

    impl Interceptor<Trail> for Noop {
        fn handle(&self, trail: &mut Trail, next: Next<'_, Trail>) {
            next.run(trail);
        }
    }

    #[test]
    fn empty_chain_is_a_noop() {
        let chain = Chain::<Trail>::build(&[]);
        let mut trail = Vec::new();
        chain.run(&mut trail);
        assert!(trail.is_empty());
        assert_eq!(chain.depth(), 0);
    }

    #[test]
    fn links_follow_registration_order() {
        let chain = Chain::build(&[stamp("a"), stamp("b"), stamp("c")]);
        assert_eq!(chain.depth(), 3);

        let mut trail = Vec::new();
        chain.run(&mut trail);
        assert_eq!(trail, ["a", "b", "c"]);
    }

    #[test]
    fn chain_can_run_repeatedly() {
        let chain = Chain::build(&[stamp("x")]);
        let mut trail = Vec::new();
        chain.run(&mut trail);
        chain.run(&mut trail);
        assert_eq!(trail, ["x", "x"]);
    }

    #[test]
    #[should_panic(expected = "interceptor at position 1 is absent")]
    fn absent_interceptor_fails_at_build() {
        let absent: SharedInterceptor<Trail> = Arc::new(None::<Noop>);
        let _ = Chain::build(&[stamp("a"), absent]);
    }

    #[test]
    fn long_chains_build_and_drop_without_recursion() {
        let noop: SharedInterceptor<Trail> = Arc::new(Noop);
        let interceptors = vec![noop; 200_000];
        let chain = Chain::build(&interceptors);
        assert_eq!(chain.depth(), 200_000);
        drop(chain);
    }
}
