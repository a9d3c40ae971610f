//! Built-in Kubernetes health-check probes.
//!
//! Kubernetes asks two questions. [`Probes`] answers them.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! `Probes` is an interceptor: on a probe path it answers and stops the chain,
//! everything else passes through untouched. Register it ahead of anything
//! expensive (auth, body parsing) so probes stay cheap:
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use strata::{Pipeline, health::Probes};
//!
//! let warm = Arc::new(AtomicBool::new(false));
//! let flag = Arc::clone(&warm);
//!
//! let mut app = Pipeline::new();
//! app.register(Probes::new().readiness(move || flag.load(Ordering::Relaxed)));
//! # let _: &strata::Pipeline<strata::Exchange> = &app;
//! # warm.store(true, Ordering::Relaxed);
//! ```

use std::fmt;
use std::sync::Arc;

use http::{Method, StatusCode};

use crate::exchange::Exchange;
use crate::interceptor::{Interceptor, Next};

type ReadinessCheck = Arc<dyn Fn() -> bool + Send + Sync>;

/// Answers liveness and readiness probes, delegating every other request.
#[derive(Clone)]
pub struct Probes {
    liveness_path: String,
    readiness_path: String,
    ready: ReadinessCheck,
}

impl Probes {
    /// Probes on `/healthz` and `/readyz`, always ready.
    pub fn new() -> Self {
        Self {
            liveness_path: "/healthz".to_owned(),
            readiness_path: "/readyz".to_owned(),
            ready: Arc::new(|| true),
        }
    }

    pub fn liveness_path(mut self, path: impl Into<String>) -> Self {
        self.liveness_path = path.into();
        self
    }

    pub fn readiness_path(mut self, path: impl Into<String>) -> Self {
        self.readiness_path = path.into();
        self
    }

    /// Gates readiness on `check` (database connections, downstream
    /// services, warm caches). Answered with `503` while it returns `false`.
    pub fn readiness(mut self, check: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.ready = Arc::new(check);
        self
    }
}

impl Default for Probes {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Probes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Probes")
            .field("liveness_path", &self.liveness_path)
            .field("readiness_path", &self.readiness_path)
            .finish_non_exhaustive()
    }
}

impl Interceptor<Exchange> for Probes {
    fn handle(&self, ex: &mut Exchange, next: Next<'_, Exchange>) {
        let method = ex.request.method();
        if method != Method::GET && method != Method::HEAD {
            return next.run(ex);
        }

        let path = ex.request.path();
        if path == self.liveness_path {
            // If the process can answer at all, it is alive.
            ex.response.text("ok");
        } else if path == self.readiness_path {
            if (self.ready)() {
                ex.response.text("ready");
            } else {
                ex.response.text("not ready").set_status(StatusCode::SERVICE_UNAVAILABLE);
            }
        } else {
            next.run(ex);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use bytes::Bytes;

    use super::*;
    use crate::pipeline::Pipeline;

    fn get(path: &str) -> Exchange {
        Exchange::new(http::Request::get(path).body(Bytes::new()).unwrap().into())
    }

    fn app(probes: Probes) -> Pipeline<Exchange> {
        let mut app = Pipeline::new();
        app.register(probes)
            .register_terminal_fn(|ex: &mut Exchange| {
                ex.response.text("app");
            });
        app
    }

    #[test]
    fn liveness_short_circuits() {
        let mut ex = get("/healthz");
        app(Probes::new()).handle(&mut ex);
        assert_eq!(ex.response.status(), StatusCode::OK);
        assert_eq!(ex.response.body(), b"ok");
    }

    #[test]
    fn readiness_follows_check() {
        let warm = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&warm);
        let app = app(Probes::new().readiness(move || flag.load(Ordering::SeqCst)));

        let mut ex = get("/readyz");
        app.handle(&mut ex);
        assert_eq!(ex.response.status(), StatusCode::SERVICE_UNAVAILABLE);

        warm.store(true, Ordering::SeqCst);
        let mut ex = get("/readyz");
        app.handle(&mut ex);
        assert_eq!(ex.response.status(), StatusCode::OK);
        assert_eq!(ex.response.body(), b"ready");
    }

    #[test]
    fn other_paths_pass_through() {
        let mut ex = get("/users");
        app(Probes::new()).handle(&mut ex);
        assert_eq!(ex.response.body(), b"app");
    }

    #[test]
    fn custom_paths_and_methods() {
        let app = app(Probes::new().liveness_path("/live"));

        let mut ex = get("/healthz");
        app.handle(&mut ex);
        assert_eq!(ex.response.body(), b"app");

        let mut ex = get("/live");
        app.handle(&mut ex);
        assert_eq!(ex.response.body(), b"ok");

        let post = http::Request::post("/live").body(Bytes::new()).unwrap();
        let mut ex = Exchange::new(post.into());
        app.handle(&mut ex);
        assert_eq!(ex.response.body(), b"app");
    }
}
