//! Entity identifier types for the ledger.
//!
//! Every addressable object on the network (account, file, contract) is
//! identified by a `shard.realm.num` triple. This module defines the shared
//! [`EntityId`] representation plus typed wrappers so an account id cannot be
//! passed where a file id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing entity identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntityIdError {
	/// The string is not of the form `shard.realm.num`.
	#[error("malformed entity id '{0}': expected shard.realm.num")]
	Malformed(String),
}

/// A `shard.realm.num` entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
	pub shard: u64,
	pub realm: u64,
	pub num: u64,
}

impl EntityId {
	pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
		Self { shard, realm, num }
	}
}

impl fmt::Display for EntityId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
	}
}

impl FromStr for EntityId {
	type Err = EntityIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let malformed = || EntityIdError::Malformed(s.to_string());

		// `u64::from_str` tolerates a leading `+`; the wire form is digits
		// only, so vet each component before parsing.
		let component = |part: &str| {
			if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
				return Err(malformed());
			}
			part.parse::<u64>().map_err(|_| malformed())
		};

		let mut parts = s.split('.');
		let shard = parts.next().ok_or_else(malformed)?;
		let realm = parts.next().ok_or_else(malformed)?;
		let num = parts.next().ok_or_else(malformed)?;
		if parts.next().is_some() {
			return Err(malformed());
		}

		Ok(Self {
			shard: component(shard)?,
			realm: component(realm)?,
			num: component(num)?,
		})
	}
}

macro_rules! entity_id_wrapper {
	($(#[$doc:meta])* $name:ident) => {
		$(#[$doc])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		pub struct $name(pub EntityId);

		impl $name {
			pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
				Self(EntityId::new(shard, realm, num))
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				self.0.fmt(f)
			}
		}

		impl FromStr for $name {
			type Err = EntityIdError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				s.parse().map(Self)
			}
		}
	};
}

entity_id_wrapper! {
	/// Identifier of an account on the network.
	AccountId
}

entity_id_wrapper! {
	/// Identifier of a file stored through the network's file service.
	FileId
}

entity_id_wrapper! {
	/// Identifier of a deployed smart contract.
	ContractId
}

/// Identifier of a submitted transaction, in the network's
/// `payer@seconds.nanos` string form.
///
/// Kept opaque: the gateway assigns it and callers only ever echo it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionId(pub String);

impl fmt::Display for TransactionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_well_formed_id() {
		let id: EntityId = "0.0.1001".parse().unwrap();
		assert_eq!(id, EntityId::new(0, 0, 1001));
	}

	#[test]
	fn display_round_trips() {
		let id = AccountId::new(0, 0, 100);
		assert_eq!(id.to_string(), "0.0.100");
		assert_eq!(id.to_string().parse::<AccountId>().unwrap(), id);
	}

	#[test]
	fn rejects_malformed_ids() {
		for bad in [
			"", "abc", "0.0", "0.0.x", "1.2.3.4", "0..5", "-1.0.2", "+1.0.2", "0.+1.2", " 1.0.2",
		] {
			let err = bad.parse::<AccountId>().unwrap_err();
			assert_eq!(err, EntityIdError::Malformed(bad.to_string()));
		}
	}

	#[test]
	fn typed_wrappers_are_distinct() {
		let file: FileId = "0.0.500".parse().unwrap();
		let contract: ContractId = "0.0.500".parse().unwrap();
		assert_eq!(file.0, contract.0);
	}
}
