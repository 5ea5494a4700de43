use aws_kit_common::helper::hash_sha256;

pub const DEFAULT_KEY_FILTER: &str =
    "header=date,x-amz-date,x-amz-security-token,x-amzn-authorization";

/// Parsed `params.cache.key_filter` value: `header=a,b;query=c`.
///
/// Listed headers and query parameters change on every request and are left
/// out of cache keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheKeyFilter {
    headers: Vec<String>,
    query: Vec<String>,
}

impl CacheKeyFilter {
    pub fn parse(s: &str) -> Self {
        let mut filter = Self::default();
        for part in s.split(';') {
            let Some((kind, names)) = part.split_once('=') else {
                continue;
            };
            let names = names
                .split(',')
                .map(|n| n.trim().to_ascii_lowercase())
                .filter(|n| !n.is_empty());
            match kind.trim() {
                "header" => filter.headers.extend(names),
                "query" => filter.query.extend(names),
                _ => {}
            }
        }
        filter
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn query(&self) -> &[String] {
        &self.query
    }

    /// Only GET and HEAD responses are cacheable.
    pub fn cache_key(&self, request: &reqwest::Request) -> Option<String> {
        if !matches!(*request.method(), reqwest::Method::GET | reqwest::Method::HEAD) {
            return None;
        }

        let mut url = request.url().clone();
        let mut pairs = url
            .query_pairs()
            .filter(|(k, _)| !self.query.contains(&k.to_ascii_lowercase()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect::<Vec<_>>();
        pairs.sort();
        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }

        let mut headers = request
            .headers()
            .iter()
            .filter(|(k, _)| !self.headers.iter().any(|h| h == k.as_str()))
            .map(|(k, v)| format!("{}:{}", k.as_str(), String::from_utf8_lossy(v.as_bytes())))
            .collect::<Vec<_>>();
        headers.sort();

        let raw = format!("{} {}\n{}", request.method(), url, headers.join("\n"));
        Some(hash_sha256(raw.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use reqwest::{Method, Request};
    use url::Url;

    fn get(url: &str, date: &str) -> Request {
        let mut req = Request::new(Method::GET, Url::parse(url).unwrap());
        req.headers_mut()
            .insert("x-amz-date", HeaderValue::from_str(date).unwrap());
        req.headers_mut()
            .insert("x-amz-glacier-version", HeaderValue::from_static("2012-06-01"));
        req
    }

    #[test]
    fn parses_default_filter() {
        let f = CacheKeyFilter::parse(DEFAULT_KEY_FILTER);
        assert_eq!(
            f.headers(),
            ["date", "x-amz-date", "x-amz-security-token", "x-amzn-authorization"]
        );
        assert!(f.query().is_empty());
    }

    #[test]
    fn filtered_headers_do_not_change_the_key() {
        let f = CacheKeyFilter::parse(DEFAULT_KEY_FILTER);
        let a = f.cache_key(&get("https://h/-/vaults?limit=1&marker=a", "20130524T000000Z"));
        let b = f.cache_key(&get("https://h/-/vaults?marker=a&limit=1", "20240101T000000Z"));
        assert!(a.is_some());
        assert_eq!(a, b);

        let c = f.cache_key(&get("https://h/-/vaults?limit=2", "20130524T000000Z"));
        assert_ne!(a, c);
    }

    #[test]
    fn only_reads_are_cacheable() {
        let f = CacheKeyFilter::parse(DEFAULT_KEY_FILTER);
        let req = Request::new(Method::PUT, Url::parse("https://h/-/vaults/v").unwrap());
        assert_eq!(f.cache_key(&req), None);
    }
}
