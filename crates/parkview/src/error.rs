use thiserror::Error;

/// Rejected input at a parsing boundary (query params, CLI args, payload fields).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("invalid time '{0}', expected HH:MM with hours 0-23 and minutes 0-59")]
    InvalidTimeFormat(String),

    #[error("unknown permit '{0}', expected one of none, yellow, red, blue")]
    UnknownPermit(String),

    #[error("unknown day '{0}', expected one of Mon, Tue, Wed, Thu, Fri, Sat, Sun")]
    UnknownDay(String),

    #[error("unknown lot type '{0}', expected one of yellow, red, blue")]
    UnknownLotType(String),

    #[error("invalid position [{lat}, {lng}]")]
    InvalidPosition { lat: f64, lng: f64 },
}

/// A lot fetch that could not produce a usable lot set.
///
/// The registry is never modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl FetchError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedPayload(msg.into())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return Self::Status(status.as_u16());
        }
        if e.is_decode() {
            return Self::MalformedPayload(e.to_string());
        }
        Self::Request(e.to_string())
    }
}
