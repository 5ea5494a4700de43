use crate::Error;
use crate::exception::RawResponse;
use std::fmt::Debug;

/// Hooks attached to a client that run around every request.
///
/// Subscribers run in the order they were attached.
pub trait Subscriber: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    /// Called before the request is signed.
    fn before_send(&self, _request: &mut reqwest::Request) -> Result<(), Error> {
        Ok(())
    }

    /// Called with every error response that will not be retried; the first
    /// subscriber returning an error decides what the caller sees.
    fn on_request_error(&self, _response: &RawResponse) -> Option<Error> {
        None
    }
}
