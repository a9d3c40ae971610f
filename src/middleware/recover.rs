//! Panic recovery.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use http::StatusCode;
use tracing::error;

use crate::exchange::Exchange;
use crate::interceptor::{Interceptor, Next};

/// Runs the rest of the chain inside `catch_unwind`.
///
/// A panic below this point is logged, whatever the inner interceptors had
/// written is discarded, and the response becomes `500 Internal Server
/// Error`. Interceptors outside `Recover` then see a normal return.
///
/// With [`expose_details`](Recover::expose_details) the panic message is sent
/// as the body; leave it off in production.
#[derive(Clone, Copy, Debug, Default)]
pub struct Recover {
    expose_details: bool,
}

impl Recover {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expose_details(mut self, expose: bool) -> Self {
        self.expose_details = expose;
        self
    }
}

impl Interceptor<Exchange> for Recover {
    fn handle(&self, ex: &mut Exchange, next: Next<'_, Exchange>) {
        let Err(payload) = catch_unwind(AssertUnwindSafe(|| next.run(ex))) else {
            return;
        };

        let message = panic_message(&*payload);
        error!(method = %ex.request.method(), path = %ex.request.path(), "recovered from panic: {message}");

        let body = if self.expose_details { message } else { "internal server error".to_owned() };
        ex.response
            .reset()
            .text(body)
            .set_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
