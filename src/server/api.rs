//! HTTP server implementation using rouille.
//!
//! # Key types
//!
//! - [`ApiServer`] - binds the listener and dispatches requests
//! - [`AppState`] - shared request counter + animator, passed to every handler
//!
//! # Thread safety
//!
//! - rouille runs each request on its own pool thread
//! - `AppState::counter` is the only shared mutable state (one `Mutex`)
//! - rendering allocates its own RNG and frame buffers per request

use std::sync::Arc;

use anyhow::{Result, anyhow};
use log::{debug, error, info};
use rouille::{Request, Response};

use super::form::{Multimap, echo_report, form_or_empty};
use crate::config::ServerConfig;
use crate::core::{AnimationConfig, CurveAnimator, RequestCounter, time_seeded_rng};

/// State shared by all request handlers.
#[derive(Debug, Default)]
pub struct AppState {
    pub counter: RequestCounter,
    pub animator: CurveAnimator,
}

impl AppState {
    pub fn new(animation: AnimationConfig) -> Self {
        Self {
            counter: RequestCounter::new(),
            animator: CurveAnimator::new(animation),
        }
    }
}

/// Coerce a raw `cycles` value. Missing, non-numeric or zero values yield `default`.
pub fn parse_cycles(value: Option<&str>, default: u64) -> u64 {
    value
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(default)
}

fn cycles_param(form: &Multimap, default: u64) -> u64 {
    let first = form.get("cycles").and_then(|v| v.first()).map(String::as_str);
    parse_cycles(first, default)
}

/// HTTP server
pub struct ApiServer {
    addr: String,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            addr: format!("{}:{}", config.host, config.port),
            state: Arc::new(AppState::new(config.animation.clone())),
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Bind and serve until the process exits.
    pub fn run(self) -> Result<()> {
        let state = self.state;
        let server = rouille::Server::new(&self.addr, move |request| {
            Self::handle_request(request, &state)
        })
        .map_err(|e| anyhow!("Failed to bind {}: {}", self.addr, e))?;

        info!("Lissajous server listening on http://{}", server.server_addr());
        server.run();
        Ok(())
    }

    /// Route by path; every method is accepted, unknown paths go to echo.
    pub fn handle_request(request: &Request, state: &AppState) -> Response {
        debug!("{} {}", request.method(), request.raw_url());

        match request.url().as_str() {
            "/count" => Self::count(state),
            "/lissajous" => Self::lissajous(request, state),
            _ => Self::echo(request, state),
        }
    }

    fn echo(request: &Request, state: &AppState) -> Response {
        state.counter.increment();
        let form = form_or_empty(request);
        Response::text(echo_report(request, &form))
    }

    fn count(state: &AppState) -> Response {
        let count = state.counter.read();
        Response::text(format!("Count {}\n", count))
    }

    fn lissajous(request: &Request, state: &AppState) -> Response {
        let form = form_or_empty(request);
        let cycles = cycles_param(&form, state.animator.config().default_cycles);

        let mut rng = time_seeded_rng();
        let mut body = Vec::new();
        match state.animator.write_gif(cycles, &mut rng, &mut body) {
            Ok(()) => {
                debug!("Lissajous: cycles={}, {} bytes", cycles, body.len());
                Response::from_data("image/gif", body)
            }
            Err(e) => {
                error!("Lissajous render failed (cycles={}): {}", cycles, e);
                Response::text(format!("Failed to render animation: {}\n", e)).with_status_code(500)
            }
        }
    }
}
