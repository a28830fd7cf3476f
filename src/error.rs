use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    /// No valid session, or the server rejected the token. The session store
    /// has already been cleared by the time this surfaces.
    Unauthorized,
    NotFound,
    /// Transport-level failure (connection refused, timeout, bad body).
    Network(String),
    /// Non-2xx response that is neither 401 nor 404.
    Server { status: u16, message: String },
    /// Rejected client-side before any network dispatch.
    Validation(&'static str),
    /// Token persistence failure.
    Storage(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized => write!(f, "未授權，請先登入"),
            ApiError::NotFound => write!(f, "找不到資源"),
            ApiError::Network(msg) => write!(f, "網路錯誤：{msg}"),
            ApiError::Server { status, message } => write!(f, "伺服器錯誤（{status}）：{message}"),
            ApiError::Validation(msg) => write!(f, "{msg}"),
            ApiError::Storage(msg) => write!(f, "無法存取登入狀態：{msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Storage(err.to_string())
    }
}
