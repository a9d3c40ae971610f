//! # strata
//!
//! Onion-style middleware pipelines. Register interceptors in order; each one
//! may inspect or modify the request, answer it, and hand it to the rest of
//! the chain. Control comes back out through every interceptor that
//! delegated, innermost first.
//!
//! ```text
//!  request ──▶ A ──▶ B ──▶ C ─┐
//!                             │  (C answers, or calls next)
//! response ◀── A ◀── B ◀── C ◀┘
//! ```
//!
//! ## The contract
//!
//! The core is three pieces, and none of them knows about HTTP:
//!
//! - [`Interceptor<C>`]: `handle(ctx, next)`; call `next.run(ctx)` to
//!   continue, or don't to short-circuit
//! - [`Pipeline<C>`]: the ordered stack, composed once per registration
//!   and invoked with [`Pipeline::handle`]
//! - [`Handler<C>`] + [`wrap`]: plug a leaf with no notion of "next" (a
//!   router, a file server, another pipeline) into the chain
//!
//! Execution is synchronous and strictly nested. There is no timeout,
//! retry, or cancellation policy: those belong in interceptors.
//!
//! On top of the core sits a thin HTTP transport: [`Exchange`], [`Server`],
//! and a few built-in interceptors in [`middleware`] and [`health`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use strata::{Config, Exchange, Pipeline, Server, StatusCode, health::Probes};
//! use strata::middleware::{Recover, Trace};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), strata::Error> {
//!     let mut app = Pipeline::new();
//!     app.register(Trace::new())
//!         .register(Recover::new())
//!         .register(Probes::new())
//!         .register_fn(|ex: &mut Exchange, next| {
//!             if ex.request.header("authorization").is_none() {
//!                 ex.response.set_status(StatusCode::UNAUTHORIZED);
//!                 return;
//!             }
//!             next.run(ex);
//!         })
//!         .register_terminal_fn(|ex: &mut Exchange| {
//!             ex.response.json(br#"{"id":"42"}"#.to_vec());
//!         });
//!
//!     Server::with_config(Config::from_env()?).serve(app).await
//! }
//! ```

mod chain;
mod config;
mod error;
mod exchange;
mod interceptor;
mod pipeline;
mod request;
mod response;
mod server;

pub mod health;
pub mod middleware;

pub use config::{ADDR_VAR, Config, DEFAULT_ADDR};
pub use error::Error;
pub use exchange::Exchange;
pub use http::{Method, StatusCode};
pub use interceptor::{
    FromFn, Handler, HandlerFn, Interceptor, Next, SharedInterceptor, Wrap, from_fn, handler_fn,
    wrap,
};
pub use pipeline::Pipeline;
pub use request::Request;
pub use response::{ContentType, Response};
pub use server::Server;
