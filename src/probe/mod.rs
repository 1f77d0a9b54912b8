pub mod request;
pub mod result;
pub mod runner;

pub use request::ProbeRequest;
pub use result::ProbeResult;

use std::fmt::Write;

/// Flattens an error and its source chain into one line, so nested
/// transport causes (DNS, TLS handshake, timeout) survive into the result.
fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, ": {}", src);
        err = src;
    }
    s
}
