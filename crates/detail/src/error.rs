#[derive(Debug, Clone, PartialEq)]
pub enum DetailError {
    /// Request could not be sent or the connection failed.
    Transport(String),
    Status { url: String, status: u16 },
    Decode(String),
    NotFound(String),
    MissingApiKey,
    NoCoordinates,
}

impl std::fmt::Display for DetailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetailError::Transport(msg) => write!(f, "request failed: {msg}"),
            DetailError::Status { url, status } => write!(f, "HTTP {status} from {url}"),
            DetailError::Decode(msg) => write!(f, "unexpected response: {msg}"),
            DetailError::NotFound(what) => write!(f, "no result for {what}"),
            DetailError::MissingApiKey => write!(f, "no AI API key configured"),
            DetailError::NoCoordinates => write!(f, "no coordinates to look up weather for"),
        }
    }
}

impl std::error::Error for DetailError {}

impl From<serde_json::Error> for DetailError {
    fn from(err: serde_json::Error) -> Self {
        DetailError::Decode(err.to_string())
    }
}
