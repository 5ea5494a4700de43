use super::tree_hash::{linear_hash, tree_hash};
use crate::Error;
use crate::client::Subscriber;
use crate::signature::CONTENT_SHA256;
use reqwest::Method;
use reqwest::header::HeaderValue;

pub const TREE_HASH: &str = "x-amz-sha256-tree-hash";

/// Adds the checksum headers Glacier requires on archive and part uploads
/// when the caller did not provide them.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlacierUploadListener;

impl GlacierUploadListener {
    pub const NAME: &'static str = "glacier_upload";

    /// POST `…/{account}/vaults/{vault}/archives` or
    /// PUT `…/{account}/vaults/{vault}/multipart-uploads/{upload_id}`
    ///
    /// Only the trailing segments are matched, `base_url` may carry a path prefix.
    pub fn is_upload(method: &Method, path: &str) -> bool {
        let segments = path.trim_matches('/').split('/').collect::<Vec<_>>();
        match segments.as_slice() {
            [.., _, "vaults", _, "archives"] => method == Method::POST,
            [.., _, "vaults", _, "multipart-uploads", _] => method == Method::PUT,
            _ => false,
        }
    }
}

impl Subscriber for GlacierUploadListener {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn before_send(&self, request: &mut reqwest::Request) -> Result<(), Error> {
        if !Self::is_upload(request.method(), request.url().path()) {
            return Ok(());
        }
        let has_linear = request.headers().contains_key(CONTENT_SHA256);
        let has_tree = request.headers().contains_key(TREE_HASH);
        if has_linear && has_tree {
            return Ok(());
        }

        let Some(body) = request.body().and_then(|b| b.as_bytes()) else {
            tracing::debug!(url = %request.url(), "upload body is streamed, checksums not computed");
            return Ok(());
        };
        let linear = linear_hash(body);
        let tree = tree_hash(body);

        let to_value = |s: String| {
            HeaderValue::from_str(&s)
                .map_err(|_| Error::Common(format!("invalid checksum header value [{s}]")))
        };
        if !has_linear {
            request.headers_mut().insert(CONTENT_SHA256, to_value(linear)?);
        }
        if !has_tree {
            request.headers_mut().insert(TREE_HASH, to_value(tree)?);
        }
        Ok(())
    }
}
