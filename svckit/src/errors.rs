use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Invalid filter: {0}")]
    Filter(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl DashError {
    /// Data-source failures abort the render; everything else is a local fault.
    pub fn is_data_source(&self) -> bool {
        matches!(self, DashError::Auth(_) | DashError::Query(_) | DashError::Network(_))
    }

    /// Caller mistakes, reported back instead of rendering an empty dashboard.
    pub fn is_client_error(&self) -> bool {
        matches!(self, DashError::Filter(_))
    }
}

impl From<reqwest::Error> for DashError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DashError::Schema(err.to_string())
        } else {
            DashError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DashError {
    fn from(err: serde_json::Error) -> Self {
        DashError::Schema(err.to_string())
    }
}

impl From<config::ConfigError> for DashError {
    fn from(err: config::ConfigError) -> Self {
        DashError::Config(err.to_string())
    }
}

impl From<anyhow::Error> for DashError {
    fn from(err: anyhow::Error) -> Self {
        DashError::Unknown(err.to_string())
    }
}
