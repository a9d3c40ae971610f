//! Built-in middleware.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns. Everything here is an ordinary
//! [`Interceptor<Exchange>`](crate::Interceptor); order matters, outermost
//! first:
//!
//! ```rust
//! use strata::Pipeline;
//! use strata::middleware::{Recover, Trace};
//!
//! let mut app = Pipeline::new();
//! app.register(Trace::new())     // sees the final status, including a recovered 500
//!     .register(Recover::new()); // catches panics from everything below it
//! # let _: &strata::Pipeline<strata::Exchange> = &app;
//! ```
//!
//! - [`Trace`]: per-request span with method, path, status, latency
//! - [`Recover`]: turns a panic further down the chain into a `500`

mod recover;
mod trace;

pub use recover::Recover;
pub use trace::Trace;
