use thiserror::Error;

/// Raised while building options; a deployment mistake, never a per-request failure.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("claim type is empty, provide a claim type name when configuring the middleware")]
    MissingClaimType,

    #[error("cookie name is empty")]
    EmptyCookieName,
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("invalid base64 cookie value: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("cookie value is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Errors surfaced while processing a single request.
#[derive(Error, Debug)]
pub enum AnonymousUserError {
    #[error("cookie codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("invalid Set-Cookie header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),
}
