//! Transaction requests, receipts, and query results.
//!
//! Requests carry only the operation-specific fields; the operator identity,
//! payment, and signing are supplied by the client that submits them.

use crate::entity::{AccountId, ContractId, FileId, TransactionId};
use crate::hbar::Hbar;
use crate::keys::PublicKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request to create a new account holding the given key.
#[derive(Debug, Clone)]
pub struct AccountCreate {
	/// Public key that will control the new account.
	pub key: PublicKey,
	/// Balance transferred from the operator at creation.
	pub initial_balance: Hbar,
}

/// Request to store a byte payload through the network's file service.
#[derive(Debug, Clone)]
pub struct FileCreate {
	/// Keys that may later modify or delete the file.
	pub keys: Vec<PublicKey>,
	/// The file body.
	pub contents: Vec<u8>,
	/// Per-transaction fee ceiling override; falls back to the client
	/// default when absent.
	pub max_fee: Option<Hbar>,
}

/// Request to instantiate a contract from previously uploaded bytecode.
#[derive(Debug, Clone)]
pub struct ContractCreate {
	/// File holding the compiled bytecode.
	pub bytecode_file: FileId,
	/// Execution-resource allowance for the constructor.
	pub gas: u64,
	/// Key allowed to administer the contract after creation.
	pub admin_key: Option<PublicKey>,
}

/// Final status of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
	Success,
	InsufficientPayerBalance,
	InsufficientTxFee,
	InvalidSignature,
	Other(String),
}

impl ReceiptStatus {
	/// Maps a gateway status code onto a known variant.
	pub fn from_code(code: &str) -> Self {
		match code {
			"SUCCESS" => Self::Success,
			"INSUFFICIENT_PAYER_BALANCE" => Self::InsufficientPayerBalance,
			"INSUFFICIENT_TX_FEE" => Self::InsufficientTxFee,
			"INVALID_SIGNATURE" => Self::InvalidSignature,
			other => Self::Other(other.to_string()),
		}
	}

	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success)
	}
}

impl fmt::Display for ReceiptStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Success => f.write_str("SUCCESS"),
			Self::InsufficientPayerBalance => f.write_str("INSUFFICIENT_PAYER_BALANCE"),
			Self::InsufficientTxFee => f.write_str("INSUFFICIENT_TX_FEE"),
			Self::InvalidSignature => f.write_str("INVALID_SIGNATURE"),
			Self::Other(code) => f.write_str(code),
		}
	}
}

/// Confirmation record returned once a submitted transaction reaches
/// finality.
///
/// The identifier fields are populated according to the operation: account
/// creation yields `account_id`, file creation `file_id`, contract creation
/// `contract_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionReceipt {
	pub transaction_id: TransactionId,
	pub status: ReceiptStatus,
	pub account_id: Option<AccountId>,
	pub file_id: Option<FileId>,
	pub contract_id: Option<ContractId>,
}

impl TransactionReceipt {
	/// A receipt carrying only a transaction id and status.
	pub fn new(transaction_id: TransactionId, status: ReceiptStatus) -> Self {
		Self {
			transaction_id,
			status,
			account_id: None,
			file_id: None,
			contract_id: None,
		}
	}
}

/// Result of an account balance query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
	pub hbars: Hbar,
}

impl fmt::Display for AccountBalance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.hbars.fmt(f)
	}
}
