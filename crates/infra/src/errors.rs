//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use skyfit_domain::SkyfitError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SkyfitError);

impl From<InfraError> for SkyfitError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SkyfitError> for InfraError {
    fn from(value: SkyfitError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SkyfitError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        let err = if value.is_decode() {
            SkyfitError::Parse(format!("failed to decode calendar response: {value}"))
        } else if value.is_timeout() {
            SkyfitError::CollaboratorUnavailable(format!("calendar request timed out: {value}"))
        } else {
            SkyfitError::CollaboratorUnavailable(format!("calendar request failed: {value}"))
        };
        InfraError(err)
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → SkyfitError */
/* -------------------------------------------------------------------------- */

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(SkyfitError::Config(format!("io error: {value}")))
    }
}
