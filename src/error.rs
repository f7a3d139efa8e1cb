use std::fmt;

/// Errors talking to a credential store backend.
///
/// Absence of a credential is *not* an error; it is returned as `None`
/// from `CredentialStore::get`. These variants cover the cases where the
/// caller cannot know whether a credential exists at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached.
    Unavailable { detail: String },

    /// The backing store returned a record that could not be decoded.
    Decode { detail: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable { detail } =>
                write!(f, "credential store unreachable: {}", detail),
            StoreError::Decode { detail } =>
                write!(f, "stored credential could not be decoded: {}", detail),
        }
    }
}

impl std::error::Error for StoreError {}

/// Final outcome of a single notification send.
///
/// Closed set: every caller handles each case explicitly, there is no
/// silent fallthrough on unexpected response shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a send outcome reports rate limiting and failures the caller should handle"]
pub enum SendOutcome {
    /// The hosting client accepted the notification for this token.
    Success,

    /// No credential is stored for this recipient; nothing was sent.
    /// This is the expected state for users who never opted in, not a
    /// failure.
    NoToken,

    /// The hosting client throttled this request or this token.
    /// Terminal for this call; backoff is the caller's choice.
    RateLimited,

    /// The send failed before or during delivery.
    Failed(FailureReason),
}

impl SendOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SendOutcome::Success)
    }
}

/// Reasons a send failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The request did not complete within the transport deadline.
    Timeout,

    /// Connection-level failure reaching the notification endpoint.
    Network { detail: String },

    /// The endpoint answered with a non-success status other than 429.
    /// Status and body are preserved for diagnostics.
    Status { status: u16, body: String },

    /// The endpoint answered 2xx with a body that could not be decoded.
    InvalidResponse { detail: String },

    /// The credential could not be resolved from the store.
    Store(StoreError),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Timeout =>
                write!(f, "request timed out"),
            FailureReason::Network { detail } =>
                write!(f, "network error: {}", detail),
            FailureReason::Status { status, body } =>
                write!(f, "endpoint returned HTTP {}: {}", status, body),
            FailureReason::InvalidResponse { detail } =>
                write!(f, "endpoint returned an undecodable body: {}", detail),
            FailureReason::Store(err) =>
                write!(f, "credential lookup failed: {}", err),
        }
    }
}
