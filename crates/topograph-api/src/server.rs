//! JSON-lines server over stdio.
//!
//! Reads one request object per line and writes one response object per
//! line. Logs go to stderr, so stdout carries only responses.

use std::io::{self, BufRead, Write};

use crate::controller::Controller;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// A router and controller answering requests one at a time.
#[derive(Debug)]
pub struct Server {
    router: Router,
    controller: Controller,
}

impl Server {
    /// Serve the full API over `controller`.
    pub fn new(controller: Controller) -> Self {
        Self::with_router(Router::api(), controller)
    }

    /// Serve only the routes in `router`.
    pub fn with_router(router: Router, controller: Controller) -> Self {
        Self { router, controller }
    }

    /// The controller requests are dispatched to.
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Answer one request.
    pub fn handle(&self, request: &Request) -> Response {
        let response = self.router.dispatch(&self.controller, request);
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            code = response.code,
            "Handled request"
        );
        response
    }

    /// Answer one raw line. Lines that are not a request object get a 400.
    pub fn handle_line(&self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(&request),
            Err(err) => {
                tracing::debug!(error = %err, "Malformed request line");
                Response::error(400, format!("Malformed request: {err}"))
            }
        }
    }

    /// Serve until `input` is exhausted. Blank lines are skipped.
    ///
    /// Returns the number of requests answered.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub fn run(&self, input: impl BufRead, mut output: impl Write) -> io::Result<usize> {
        let mut handled = 0;
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let response = self.handle_line(&line);
            serde_json::to_writer(&mut output, &response)?;
            writeln!(output)?;
            output.flush()?;
            handled += 1;
        }

        tracing::info!(handled, "Input closed, shutting down");
        Ok(handled)
    }
}
