//! The scan session: idle -> scanning/uploading -> analyzing -> result.
//!
//! `SessionCore` is the plain state machine; `ScanSession` puts it behind a
//! mutex and drives the timed transitions with cancelable tokio tasks.

mod machine;
mod driver;

pub use self::machine::{CycleId, Phase, SessionCore, SessionState};
pub use self::driver::ScanSession;
