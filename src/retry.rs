//! Retry on transport failure.
//!
//! Only operations that are safe to repeat after a lost response may use
//! this. Server enlistment qualifies: a repeated enlist just yields a fresh
//! server id. Table creation does not: a retry after a lost reply could
//! double-create or report a spurious failure.

use crate::error::{Error, Result};
use crate::logging::{log_at, Log, LogLevel, LogModule};

/// Run `attempt` until it returns anything other than a transient transport
/// failure.
///
/// There is no backoff and no attempt limit; each transient failure is
/// logged at `Notice` and retried immediately. Successes, session misuse and
/// every other error are returned as they are.
pub fn retry_on_transport<T>(log: &dyn Log, mut attempt: impl FnMut() -> Result<T>) -> Result<T> {
    loop {
        match attempt() {
            Err(Error::Transport(err)) if err.is_transient() => {
                log_at!(
                    log,
                    LogModule::Rpc,
                    LogLevel::Notice,
                    "{} trying to talk to coordinator; retrying",
                    err
                );
            }
            outcome => return outcome,
        }
    }
}
