//! Minimal strata example: a traced, panic-safe pipeline with health probes.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl http://localhost:3000/panic
//!   curl http://localhost:3000/healthz

use strata::middleware::{Recover, Trace};
use strata::{Config, Exchange, Method, Pipeline, Server, StatusCode, health::Probes};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut app = Pipeline::new();
    app.register(Trace::new())
        .register(Recover::new())
        .register(Probes::new())
        .register_fn(|ex: &mut Exchange, next| {
            // Runs on the way out as well: every response gets the header.
            next.run(ex);
            ex.response.set_header("server", "strata");
        })
        .register_terminal_fn(users);

    let config = Config::from_env().expect("invalid configuration");
    Server::with_config(config)
        .serve(app)
        .await
        .expect("server error");
}

// A leaf with no notion of "next", adapted into the chain by
// register_terminal_fn. Anything it doesn't answer falls through to 404.
fn users(ex: &mut Exchange) {
    let path = ex.request.path().to_owned();
    let method = ex.request.method().clone();

    match (method, path.as_str()) {
        (Method::GET, "/panic") => panic!("handler bug"),
        (Method::GET, p) if p.starts_with("/users/") => {
            let id = &p["/users/".len()..];
            ex.response.json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes());
        }
        (Method::POST, "/users") => {
            if ex.request.body().is_empty() {
                ex.response.set_status(StatusCode::BAD_REQUEST);
                return;
            }
            ex.response
                .set_status(StatusCode::CREATED)
                .set_header("location", "/users/99")
                .json(br#"{"id":"99","name":"new_user"}"#.to_vec());
        }
        _ => {}
    }
}
