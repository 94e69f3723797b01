//! Bearer tokens for residents.
//!
//! A token is 32 random bytes, URL-safe base64 without padding. Only its
//! SHA-256 digest (lowercase hex) is ever persisted.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};

const TOKEN_BYTES: usize = 32;

/// A freshly minted token and the digest to store for it.
pub struct IssuedToken {
  pub token:  String,
  pub digest: String,
}

pub fn issue() -> IssuedToken {
  let mut raw = [0u8; TOKEN_BYTES];
  OsRng.fill_bytes(&mut raw);
  let token = URL_SAFE_NO_PAD.encode(raw);
  let digest = digest(&token);
  IssuedToken { token, digest }
}

pub fn digest(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }
