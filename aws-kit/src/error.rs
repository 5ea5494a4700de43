use crate::credentials::CredentialsError;
use crate::exception::ServiceResponseError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// 配置错误：缺少必要参数、参数值非法等，构建client时同步返回，不会重试
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid config type: {0}")]
    InvalidConfigType(String),
    #[error("credentials error: {0}")]
    Credentials(#[from] CredentialsError),
    #[error(transparent)]
    Service(#[from] ServiceResponseError),
    #[error("response status is not success: {status}, body: {body}")]
    RequestFailed { status: String, body: String },
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("io error: {0}")]
    IO(#[from] std::io::Error),
    #[error("error: {0}")]
    Common(String),
}

impl From<aws_kit_common::Error> for Error {
    fn from(e: aws_kit_common::Error) -> Self {
        match e {
            aws_kit_common::Error::Common(msg) => Error::Common(msg),
            aws_kit_common::Error::RequestAPIFailed { status, message } => Error::RequestFailed {
                status,
                body: message,
            },
            aws_kit_common::Error::Reqwest(e) => Error::Reqwest(e),
        }
    }
}
