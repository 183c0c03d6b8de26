use aws_sdk_directconnect::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use dxlookup_provider::ProviderError;
use thiserror::Error;

/// Message returned when a lookup matches nothing.
pub const NO_MATCH_MESSAGE: &str =
    "Your query returned no results. Please change your search criteria and try again.";

/// Message returned when a lookup matches more than one resource.
pub const AMBIGUOUS_MATCH_MESSAGE: &str =
    "Your query returned more than one result. Please try a more specific search criteria.";

/// Errors specific to AWS API calls.
#[derive(Debug, Error)]
pub enum AwsProviderError {
    /// The AWS SDK returned an error from the service.
    #[error("AWS service error: {0}")]
    ServiceError(String),

    /// The request was throttled by the AWS service.
    #[error("AWS request throttled")]
    Throttled,

    /// A network or connection error occurred communicating with AWS.
    #[error("AWS connection error: {0}")]
    Connection(String),

    /// The request timed out.
    #[error("AWS request timed out")]
    Timeout,

    /// AWS credential or caller identity resolution failed.
    #[error("credential error: {0}")]
    CredentialError(String),

    /// Configuration is invalid.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl From<AwsProviderError> for ProviderError {
    fn from(err: AwsProviderError) -> Self {
        match err {
            AwsProviderError::ServiceError(msg) => ProviderError::ExecutionFailed(msg),
            AwsProviderError::Throttled => ProviderError::RateLimited,
            AwsProviderError::Connection(msg) => ProviderError::Connection(msg),
            AwsProviderError::Timeout => ProviderError::Timeout(std::time::Duration::from_secs(30)),
            AwsProviderError::CredentialError(msg) | AwsProviderError::Configuration(msg) => {
                ProviderError::Configuration(msg)
            }
        }
    }
}

/// Classify an AWS SDK error string into the appropriate [`AwsProviderError`].
///
/// Looks for throttling, timeout and connection patterns in the message;
/// anything else is a service error carrying the original text.
pub fn classify_sdk_error(error_str: &str) -> AwsProviderError {
    let lower = error_str.to_lowercase();
    if lower.contains("throttl") || lower.contains("rate exceed") || lower.contains("too many") {
        AwsProviderError::Throttled
    } else if lower.contains("timeout") || lower.contains("timed out") {
        AwsProviderError::Timeout
    } else if lower.contains("connection")
        || lower.contains("connect")
        || lower.contains("dns")
        || lower.contains("network")
    {
        AwsProviderError::Connection(error_str.to_owned())
    } else {
        AwsProviderError::ServiceError(error_str.to_owned())
    }
}

/// Classify a failed SDK call into the appropriate [`AwsProviderError`].
///
/// Timeouts and dispatch failures are read off the error variant. Service
/// errors are classified by their error code, since Direct Connect messages
/// routinely mention "connection" and would fool [`classify_sdk_error`].
/// Anything else falls back to message inspection.
pub fn classify_service_error<E, R>(err: &SdkError<E, R>) -> AwsProviderError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err {
        SdkError::TimeoutError(_) => AwsProviderError::Timeout,
        SdkError::DispatchFailure(_) => {
            AwsProviderError::Connection(DisplayErrorContext(err).to_string())
        }
        SdkError::ServiceError(ctx) => {
            let service_err = ctx.err();
            let code = service_err.code().unwrap_or("Unknown");
            if code.contains("Throttl") || code.contains("TooManyRequests") {
                AwsProviderError::Throttled
            } else {
                let message = service_err.message().unwrap_or("no message");
                AwsProviderError::ServiceError(format!("{code}: {message}"))
            }
        }
        _ => classify_sdk_error(&DisplayErrorContext(err).to_string()),
    }
}

/// Failure modes of a single-resource lookup.
///
/// A lookup must resolve to exactly one resource. Zero or several matches are
/// errors, and a failed API call is passed through as-is.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The describe call itself failed.
    #[error(transparent)]
    Remote(#[from] AwsProviderError),

    /// Nothing matched after filtering.
    #[error("{}", NO_MATCH_MESSAGE)]
    NoMatch,

    /// More than one resource matched after filtering.
    #[error("{}", AMBIGUOUS_MATCH_MESSAGE)]
    AmbiguousMatch,
}

impl From<LookupError> for ProviderError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::Remote(e) => e.into(),
            LookupError::NoMatch => ProviderError::NotFound(NO_MATCH_MESSAGE.to_owned()),
            LookupError::AmbiguousMatch => {
                ProviderError::Ambiguous(AMBIGUOUS_MATCH_MESSAGE.to_owned())
            }
        }
    }
}
