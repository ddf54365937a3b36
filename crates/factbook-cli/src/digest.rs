//! Content digests for raw documents.

use sha2::{Digest, Sha256};

/// Lower-case hex SHA-256 of `bytes`.
pub fn source_digest(bytes: &[u8]) -> String { hex::encode(Sha256::digest(bytes)) }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn digest_is_stable_hex() {
    assert_eq!(
      source_digest(b"abc"),
      "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(source_digest(b"").len(), 64);
  }
}
