use thiserror::Error;

/// Reaching a ready connection with the server failed. Nothing else may be sent afterwards.
#[derive(Debug, Clone, Error)]
pub enum ConnectError {
    #[error("failed to connect to pulse daemon: could not create {0}")]
    Setup(&'static str),
    #[error("failed to connect to pulse daemon: {0}")]
    Refused(String),
    #[error("failed to connect to pulse daemon: {0}")]
    Failed(String),
}

/// A request on an established connection did not succeed. These are recoverable; the session
/// keeps whatever state it had before the request.
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    #[error("the server did not report a default sink")]
    NoDefaultSink,
    #[error("event loop stopped: {0}")]
    Pump(String),
    #[error("{0} was cancelled")]
    Cancelled(&'static str),
    #[error("{op} failed: {reason}")]
    Rejected { op: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_errors_name_the_daemon() {
        let errors = [
            ConnectError::Setup("context"),
            ConnectError::Refused("Connection refused".into()),
            ConnectError::Failed("Access denied".into()),
        ];
        for e in errors {
            assert!(e.to_string().starts_with("failed to connect to pulse daemon: "));
        }
        assert_eq!(
            ConnectError::Setup("main loop").to_string(),
            "failed to connect to pulse daemon: could not create main loop"
        );
    }
}
