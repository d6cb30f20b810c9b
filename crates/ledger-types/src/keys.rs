//! Ed25519 key types.
//!
//! Keys render to and parse from the hex form used by the ledger's tooling:
//! the raw 32-byte key wrapped in its fixed DER envelope, e.g. `302a…` for
//! public keys and `302e…` for private keys. Parsing accepts both the DER
//! form and bare 32-byte hex.

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// DER envelopes for ed25519 keys (RFC 8410).
const DER_PREFIX_PRIVATE: &str = "302e020100300506032b657004220420";
const DER_PREFIX_PUBLIC: &str = "302a300506032b6570032100";

/// Errors that can occur when parsing or validating keys.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
	#[error("invalid key: {0}")]
	Invalid(String),
}

/// An ed25519 public key.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
	pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, KeyError> {
		let key = VerifyingKey::from_bytes(bytes)
			.map_err(|e| KeyError::Invalid(format!("not a valid ed25519 point: {}", e)))?;
		Ok(Self(key))
	}

	pub fn as_bytes(&self) -> &[u8; 32] {
		self.0.as_bytes()
	}
}

impl fmt::Debug for PublicKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "PublicKey({})", self)
	}
}

impl fmt::Display for PublicKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}", DER_PREFIX_PUBLIC, hex::encode(self.as_bytes()))
	}
}

impl FromStr for PublicKey {
	type Err = KeyError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let bytes = decode_key_hex(s, DER_PREFIX_PUBLIC)?;
		Self::from_bytes(&bytes)
	}
}

/// An ed25519 private key.
///
/// The debug representation never includes key material.
#[derive(Clone)]
pub struct PrivateKey(SigningKey);

impl PrivateKey {
	/// Generates a fresh key from the operating system RNG.
	///
	/// Every call produces independent key material.
	pub fn generate() -> Self {
		Self(SigningKey::generate(&mut OsRng))
	}

	pub fn from_bytes(bytes: &[u8; 32]) -> Self {
		Self(SigningKey::from_bytes(bytes))
	}

	pub fn public_key(&self) -> PublicKey {
		PublicKey(self.0.verifying_key())
	}

	/// Signs a message, returning the 64-byte ed25519 signature.
	pub fn sign(&self, message: &[u8]) -> Vec<u8> {
		self.0.sign(message).to_bytes().to_vec()
	}
}

impl fmt::Debug for PrivateKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("PrivateKey(..)")
	}
}

impl fmt::Display for PrivateKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}{}",
			DER_PREFIX_PRIVATE,
			hex::encode(self.0.to_bytes())
		)
	}
}

impl FromStr for PrivateKey {
	type Err = KeyError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let bytes = decode_key_hex(s, DER_PREFIX_PRIVATE)?;
		Ok(Self::from_bytes(&bytes))
	}
}

fn decode_key_hex(s: &str, der_prefix: &str) -> Result<[u8; 32], KeyError> {
	let hex_str = s.strip_prefix(der_prefix).unwrap_or(s);
	let decoded =
		hex::decode(hex_str).map_err(|_| KeyError::Invalid("not valid hexadecimal".to_string()))?;
	decoded
		.as_slice()
		.try_into()
		.map_err(|_| KeyError::Invalid(format!("expected 32 bytes, got {}", decoded.len())))
}
