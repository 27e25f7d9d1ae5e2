use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub struct FWIError {
    msg: String,
}

impl FWIError {
    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl From<String> for FWIError {
    fn from(msg: String) -> Self {
        FWIError { msg }
    }
}

impl From<FWIError> for String {
    fn from(value: FWIError) -> String {
        value.msg
    }
}

impl From<&str> for FWIError {
    fn from(msg: &str) -> Self {
        FWIError { msg: msg.into() }
    }
}

impl From<std::io::Error> for FWIError {
    fn from(err: std::io::Error) -> Self {
        FWIError {
            msg: err.to_string(),
        }
    }
}

impl Display for FWIError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl std::error::Error for FWIError {}
