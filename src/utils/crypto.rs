use ring::digest::{Context, SHA256};

use crate::error::{NodeError, Result};
use data_encoding::HEXLOWER;
use std::time::{SystemTime, UNIX_EPOCH};

/// Length in bytes of every digest used by the chain
pub const HASH_LEN: usize = 32;

/// A SHA-256 digest
pub type Hash = [u8; HASH_LEN];

/// Seconds since the Unix epoch
pub fn current_timestamp() -> Result<i64> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| NodeError::Clock(format!("System time error: {e}")))?
        .as_secs();

    i64::try_from(secs).map_err(|_| NodeError::Clock("Timestamp overflow".to_string()))
}

pub fn sha256_digest(data: &[u8]) -> Hash {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(digest.as_ref());
    out
}

/// Lowercase hex rendering used in log lines
pub fn hash_to_hex(hash: &Hash) -> String {
    HEXLOWER.encode(hash)
}
