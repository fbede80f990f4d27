//! Reporting to the CI host.
//!
//! The exit code is the primary contract (0 = proceed, anything else =
//! abort). Failures are additionally surfaced as a GitHub Actions `error`
//! workflow command so they show up as an annotation on the run.
//!
//! See: <https://docs.github.com/actions/reference/workflow-commands-for-github-actions>

use std::io::Write;

/// Escape a message for use as workflow command data.
#[must_use]
pub fn escape_command_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Format an `::error::` workflow command line.
#[must_use]
pub fn error_command(message: &str) -> String {
    format!("::error::{}", escape_command_data(message))
}

/// Report a failure through the host's failure channel.
pub fn report_failure(message: &str) {
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{}", error_command(message)) {
        tracing::warn!(error = %e, "Failed to write failure annotation");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_command_plain() {
        assert_eq!(
            error_command("Rejected by U123"),
            "::error::Rejected by U123"
        );
    }

    #[test]
    fn test_error_command_escapes_newlines_and_percent() {
        assert_eq!(
            error_command("100% broken\r\nsecond line"),
            "::error::100%25 broken%0D%0Asecond line"
        );
    }
}
