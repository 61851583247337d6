//! DigitalOcean provider error types

use fleetgate_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DigitalOceanError {
    #[error("DigitalOcean rejected the access token: {0}")]
    Unauthorized(String),

    #[error("DigitalOcean API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<DigitalOceanError> for CloudError {
    fn from(err: DigitalOceanError) -> Self {
        match err {
            DigitalOceanError::Unauthorized(message) => CloudError::AuthenticationFailed(message),
            DigitalOceanError::Api { status: 404, message } => {
                CloudError::ResourceNotFound(message)
            }
            DigitalOceanError::Api { status, message } => CloudError::ApiError { status, message },
            DigitalOceanError::InvalidConfig(message) => CloudError::InvalidConfig(message),
            DigitalOceanError::Http(e) => CloudError::Transport(e.to_string()),
            DigitalOceanError::Json(e) => CloudError::Json(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, DigitalOceanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_maps_to_authentication_failed() {
        let err: CloudError = DigitalOceanError::Unauthorized("nope".to_string()).into();
        assert!(matches!(err, CloudError::AuthenticationFailed(m) if m == "nope"));
    }

    #[test]
    fn test_not_found_maps_to_resource_not_found() {
        let err: CloudError = DigitalOceanError::Api {
            status: 404,
            message: "droplet not found".to_string(),
        }
        .into();
        assert!(matches!(err, CloudError::ResourceNotFound(_)));
    }

    #[test]
    fn test_other_status_keeps_code() {
        let err: CloudError = DigitalOceanError::Api {
            status: 422,
            message: "tag name invalid".to_string(),
        }
        .into();
        assert!(matches!(err, CloudError::ApiError { status: 422, .. }));
    }
}
