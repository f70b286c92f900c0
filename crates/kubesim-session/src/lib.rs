//! kubesim-session — drives a `BoundedScaler` on a tokio task.
//!
//! The scaler itself never sleeps. A session owns one scaler and is the
//! only thing that touches it, so user commands and cooldown expirations
//! are applied strictly one after another.
//!
//! # Architecture
//!
//! ```text
//! SessionHandle ──(mpsc: Request)──▶ session task
//!       ▲                              ├── BoundedScaler<P>
//!       │                              ├── pending deadline (single slot)
//!       └──(watch: ScalerSnapshot)──── └── shutdown watch
//! ```
//!
//! Replacing or clearing the pending deadline is the cancellation: a
//! superseded timer simply stops being polled.

pub mod error;
pub mod session;

pub use error::{SessionError, SessionResult};
pub use session::{ScalerSession, SessionHandle};
