//! Ledger client abstraction.
//!
//! All network interaction goes through the [`LedgerInterface`] trait, which
//! exposes the five capabilities the operations in this workspace need:
//! account creation, balance lookup, file upload, file read-back, and
//! contract creation. Swapping the backing vendor SDK or transport means
//! providing another implementation of this trait; nothing above it changes.

use async_trait::async_trait;
use ledger_types::{
	AccountBalance, AccountCreate, AccountId, ConfigSchema, ContractCreate, EntityIdError,
	FileCreate, FileId, KeyError, ReceiptStatus, TransactionReceipt,
};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub mod implementations {
	pub mod http;
}

/// Errors produced by ledger providers and the service wrapper.
#[derive(Debug, Error)]
pub enum LedgerError {
	/// The gateway or transport could not be reached, or answered with
	/// something unusable.
	#[error("network failure: {0}")]
	Network(String),
	/// An identifier string did not parse; no request was attempted.
	#[error("malformed identifier: {0}")]
	MalformedIdentifier(String),
	/// Key material did not parse or failed validation.
	#[error("invalid key: {0}")]
	InvalidKey(String),
	/// The requested entity does not exist on the network.
	#[error("not found: {0}")]
	NotFound(String),
	/// The payer could not cover the transfer or the transaction fee.
	#[error("insufficient funds: {0}")]
	InsufficientFunds(String),
	/// No receipt became available within the polling deadline.
	#[error("receipt not available after {0:?}")]
	ReceiptTimeout(Duration),
	/// The network processed the transaction and rejected it.
	#[error("transaction rejected: {0}")]
	Rejected(ReceiptStatus),
}

impl From<EntityIdError> for LedgerError {
	fn from(err: EntityIdError) -> Self {
		Self::MalformedIdentifier(err.to_string())
	}
}

impl From<KeyError> for LedgerError {
	fn from(err: KeyError) -> Self {
		Self::InvalidKey(err.to_string())
	}
}

/// Capability interface over a ledger network.
///
/// Submissions block until the transaction's receipt is available; queries
/// return their result directly. Implementations own credential handling,
/// signing, transport, and receipt polling.
#[async_trait]
pub trait LedgerInterface: Send + Sync {
	/// Schema for this provider's TOML configuration section.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Creates an account and waits for its receipt.
	async fn create_account(
		&self,
		request: AccountCreate,
	) -> Result<TransactionReceipt, LedgerError>;

	/// Queries an account's balance.
	async fn get_balance(&self, account: &AccountId) -> Result<AccountBalance, LedgerError>;

	/// Stores a file and waits for its receipt.
	async fn create_file(&self, request: FileCreate) -> Result<TransactionReceipt, LedgerError>;

	/// Reads back the contents of a stored file.
	async fn get_file_contents(&self, file: &FileId) -> Result<Vec<u8>, LedgerError>;

	/// Instantiates a contract from uploaded bytecode and waits for its
	/// receipt.
	async fn create_contract(
		&self,
		request: ContractCreate,
	) -> Result<TransactionReceipt, LedgerError>;
}

/// High-level ledger service wrapping a boxed provider.
///
/// Beyond delegation, the service enforces the receipt contract: a receipt
/// whose status is not `SUCCESS` is turned into the matching [`LedgerError`],
/// so callers only ever see successful receipts.
pub struct LedgerService {
	provider: Box<dyn LedgerInterface>,
}

impl LedgerService {
	pub fn new(provider: Box<dyn LedgerInterface>) -> Self {
		Self { provider }
	}

	pub async fn create_account(
		&self,
		request: AccountCreate,
	) -> Result<TransactionReceipt, LedgerError> {
		let receipt = self.provider.create_account(request).await?;
		checked(receipt)
	}

	pub async fn get_balance(&self, account: &AccountId) -> Result<AccountBalance, LedgerError> {
		self.provider.get_balance(account).await
	}

	pub async fn create_file(
		&self,
		request: FileCreate,
	) -> Result<TransactionReceipt, LedgerError> {
		let receipt = self.provider.create_file(request).await?;
		checked(receipt)
	}

	pub async fn get_file_contents(&self, file: &FileId) -> Result<Vec<u8>, LedgerError> {
		self.provider.get_file_contents(file).await
	}

	pub async fn create_contract(
		&self,
		request: ContractCreate,
	) -> Result<TransactionReceipt, LedgerError> {
		let receipt = self.provider.create_contract(request).await?;
		checked(receipt)
	}
}

/// Converts a failed receipt into the matching error.
fn checked(receipt: TransactionReceipt) -> Result<TransactionReceipt, LedgerError> {
	match &receipt.status {
		ReceiptStatus::Success => {
			info!(transaction = %receipt.transaction_id, "transaction succeeded");
			Ok(receipt)
		}
		ReceiptStatus::InsufficientPayerBalance | ReceiptStatus::InsufficientTxFee => {
			warn!(
				transaction = %receipt.transaction_id,
				status = %receipt.status,
				"transaction failed"
			);
			Err(LedgerError::InsufficientFunds(receipt.status.to_string()))
		}
		status => {
			warn!(
				transaction = %receipt.transaction_id,
				status = %status,
				"transaction failed"
			);
			Err(LedgerError::Rejected(status.clone()))
		}
	}
}
