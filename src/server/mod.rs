//! HTTP server exposing the diagnostic echo, hit counter and Lissajous endpoints.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐                     ┌─────────────────────────┐
//! │   rouille thread pool    │   Arc<AppState>     │   AppState              │
//! │   (one worker/request)   │ ──────────────────▶ │   counter: Mutex<u64>   │
//! │                          │                     │   animator (read-only)  │
//! └──────────────────────────┘                     └─────────────────────────┘
//! ```
//!
//! - **rouille** - sync HTTP server (simpler than async axum/tokio)
//! - **AppState** - counter behind one lock, animator config shared read-only
//!
//! # Endpoints
//!
//! | Method | Path                  | Description                              |
//! |--------|-----------------------|------------------------------------------|
//! | any    | `/count`              | `Count N` (hits on the echo endpoint)    |
//! | any    | `/lissajous?cycles=N` | Animated GIF, `cycles` defaults to 5     |
//! | any    | anything else         | Echo request line/headers/form, counts a hit |

mod api;
pub mod form;

pub use api::{ApiServer, AppState, parse_cycles};
