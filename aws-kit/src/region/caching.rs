use super::{Endpoint, EndpointProvider};
use crate::Error;
use std::collections::HashMap;
use std::sync::Mutex;

/// Remembers every endpoint resolved by the wrapped provider. Failed lookups
/// are not cached.
#[derive(Debug)]
pub struct CachingEndpointProvider<P> {
    inner: P,
    cache: Mutex<HashMap<(String, String), Endpoint>>,
}

impl<P: EndpointProvider> CachingEndpointProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl<P: EndpointProvider> EndpointProvider for CachingEndpointProvider<P> {
    fn get_endpoint(&self, service: &str, region: &str) -> Result<Endpoint, Error> {
        let key = (service.to_owned(), region.to_owned());
        if let Some(e) = self.cache.lock().unwrap_or_else(|e| e.into_inner()).get(&key) {
            return Ok(e.clone());
        }

        let endpoint = self.inner.get_endpoint(service, region)?;
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, endpoint.clone());
        Ok(endpoint)
    }
}
