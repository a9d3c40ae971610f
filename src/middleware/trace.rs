//! Request tracing.

use std::time::{Duration, Instant};

use tracing::{info, info_span, warn};

use crate::exchange::Exchange;
use crate::interceptor::{Interceptor, Next};

/// Opens a `request` span with method and path, and logs status and latency
/// once the inner chain returns.
///
/// Server errors are logged at `WARN`, everything else at `INFO`. If a panic
/// unwinds through this interceptor nothing is logged here; place it outside
/// [`Recover`](super::Recover) to see those requests as `500`s.
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl Trace {
    pub fn new() -> Self {
        Self
    }
}

impl Interceptor<Exchange> for Trace {
    fn handle(&self, ex: &mut Exchange, next: Next<'_, Exchange>) {
        let span = info_span!(
            "request",
            method = %ex.request.method(),
            path = %ex.request.path(),
        );
        let _entered = span.enter();
        let start = Instant::now();

        next.run(ex);

        let status = ex.response.status().as_u16();
        let latency_us = micros(start.elapsed());
        if ex.response.status().is_server_error() {
            warn!(status, latency_us, "request failed");
        } else {
            info!(status, latency_us, "request completed");
        }
    }
}

/// Whole microseconds in `elapsed`, saturating at `u64::MAX`.
fn micros(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::StatusCode;
    use tracing_test::traced_test;

    use super::*;
    use crate::pipeline::Pipeline;

    fn get(path: &str) -> Exchange {
        Exchange::new(http::Request::get(path).body(Bytes::new()).unwrap().into())
    }

    #[traced_test]
    #[test]
    fn logs_completed_request() {
        let mut app = Pipeline::new();
        app.register(Trace::new())
            .register_terminal_fn(|ex: &mut Exchange| {
                ex.response.text("hi");
            });

        app.handle(&mut get("/hello"));

        assert!(logs_contain("request completed"));
        assert!(logs_contain("status=200"));
        assert!(logs_contain("path=/hello"));
    }

    #[traced_test]
    #[test]
    fn server_errors_are_warnings() {
        let mut app = Pipeline::new();
        app.register(Trace::new())
            .register_terminal_fn(|ex: &mut Exchange| {
                ex.response.set_status(StatusCode::BAD_GATEWAY);
            });

        app.handle(&mut get("/upstream"));

        assert!(logs_contain("request failed"));
        assert!(logs_contain("status=502"));
    }

    #[test]
    fn latency_saturates_instead_of_wrapping() {
        assert_eq!(micros(Duration::from_millis(3)), 3_000);
        assert_eq!(micros(Duration::MAX), u64::MAX);
    }
}
