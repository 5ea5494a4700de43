use super::{ExceptionFactory, RawResponse};
use crate::Error;
use crate::client::Subscriber;
use std::sync::Arc;

/// Turns error responses into [`Error::Service`].
#[derive(Debug, Clone)]
pub struct ExceptionListener {
    factory: Arc<dyn ExceptionFactory>,
}

impl ExceptionListener {
    pub const NAME: &'static str = "exception_listener";

    pub fn new(factory: Arc<dyn ExceptionFactory>) -> Self {
        Self { factory }
    }
}

impl Subscriber for ExceptionListener {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn on_request_error(&self, response: &RawResponse) -> Option<Error> {
        let e = self.factory.from_response(response);
        tracing::debug!(exception = %e.exception_type, status = e.status, "service returned an error");
        Some(Error::Service(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::ServiceResponseError;
    use reqwest::StatusCode;
    use reqwest::header::HeaderMap;

    #[derive(Debug)]
    struct FixedFactory(ServiceResponseError);

    impl ExceptionFactory for FixedFactory {
        fn from_response(&self, _response: &RawResponse) -> ServiceResponseError {
            self.0.clone()
        }
    }

    #[test]
    fn returns_the_factory_error() {
        let expected = ServiceResponseError {
            exception_type: "FooException".to_owned(),
            code: Some("Foo".to_owned()),
            message: Some("Foo".to_owned()),
            request_id: None,
            kind: None,
            status: 200,
        };
        let listener = ExceptionListener::new(Arc::new(FixedFactory(expected.clone())));
        let resp = RawResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: String::new(),
        };

        match listener.on_request_error(&resp) {
            Some(Error::Service(e)) => assert_eq!(e, expected),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
