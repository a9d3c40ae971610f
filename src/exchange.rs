//! The HTTP request context threaded through a pipeline.

use crate::request::Request;
use crate::response::Response;

/// One request and the response being built for it.
///
/// This is the context type the [`Server`](crate::Server) runs pipelines
/// with. Fields are public so an interceptor can read the request while
/// writing the response.
#[derive(Debug)]
pub struct Exchange {
    pub request: Request,
    pub response: Response,
}

impl Exchange {
    /// Pairs `request` with an unwritten response.
    pub fn new(request: Request) -> Self {
        Self { request, response: Response::default() }
    }

    pub fn into_response(self) -> Response {
        self.response
    }
}

impl From<Request> for Exchange {
    fn from(request: Request) -> Self {
        Self::new(request)
    }
}
