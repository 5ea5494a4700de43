//! SHA-256 tree hash: 1 MiB chunks hashed individually, then adjacent digests
//! concatenated and hashed pairwise until one digest remains.

use sha2::{Digest, Sha256};

pub const MB: usize = 1024 * 1024;

type Digest32 = [u8; 32];

fn sha256(bytes: &[u8]) -> Digest32 {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(bytes));
    out
}

fn sha256_pair(a: &Digest32, b: &Digest32) -> Digest32 {
    let mut h = Sha256::new();
    h.update(a);
    h.update(b);
    let mut out = [0u8; 32];
    out.copy_from_slice(&h.finalize());
    out
}

/// Incremental tree hash, for bodies that arrive in pieces.
#[derive(Debug, Clone, Default)]
pub struct TreeHash {
    checksums: Vec<Digest32>,
    buffer: Vec<u8>,
}

impl TreeHash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, mut data: &[u8]) -> &mut Self {
        while !data.is_empty() {
            let take = (MB - self.buffer.len()).min(data.len());
            self.buffer.extend_from_slice(&data[..take]);
            data = &data[take..];
            if self.buffer.len() == MB {
                self.checksums.push(sha256(&self.buffer));
                self.buffer.clear();
            }
        }
        self
    }

    /// Hex encoded root digest.
    pub fn finish(mut self) -> String {
        if !self.buffer.is_empty() || self.checksums.is_empty() {
            self.checksums.push(sha256(&self.buffer));
        }
        hex::encode(root(self.checksums))
    }
}

fn root(mut level: Vec<Digest32>) -> Digest32 {
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair.get(1) {
                Some(b) => sha256_pair(&pair[0], b),
                // 奇数个时最后一个直接提升到上一层
                None => pair[0],
            })
            .collect();
    }
    level[0]
}

pub fn tree_hash(data: &[u8]) -> String {
    let mut h = TreeHash::new();
    h.update(data);
    h.finish()
}

/// hex(sha256(data)), the `x-amz-content-sha256` value.
pub fn linear_hash(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Combines the tree hashes of consecutive parts into the archive's tree hash.
///
/// Only valid when every part but the last is a power of two MiB in size.
pub fn combine_tree_hashes<S: AsRef<str>>(hashes: &[S]) -> Result<String, hex::FromHexError> {
    if hashes.is_empty() {
        return Ok(tree_hash(&[]));
    }
    let level = hashes
        .iter()
        .map(|h| {
            let mut d = [0u8; 32];
            hex::decode_to_slice(h.as_ref(), &mut d)?;
            Ok(d)
        })
        .collect::<Result<Vec<_>, hex::FromHexError>>()?;
    Ok(hex::encode(root(level)))
}
