#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GranteeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// id不是字符串
    #[error("invalid id type: {0}")]
    InvalidIdType(String),
    #[error("unexpected value: {0}")]
    UnexpectedValue(String),
    #[error("logic error: {0}")]
    Logic(String),
    #[error("xml error: {0}")]
    Xml(String),
}

impl From<quick_xml::DeError> for GranteeError {
    fn from(e: quick_xml::DeError) -> Self {
        GranteeError::Xml(e.to_string())
    }
}
