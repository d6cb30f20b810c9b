//! The network's native currency denomination.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of tinybars in one hbar.
pub const TINYBARS_PER_HBAR: i64 = 100_000_000;

/// An amount of the network's native currency, stored in tinybars.
#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Hbar(i64);

impl Hbar {
	pub const ZERO: Hbar = Hbar(0);

	pub const fn from_tinybars(tinybars: i64) -> Self {
		Self(tinybars)
	}

	pub const fn from_hbars(hbars: i64) -> Self {
		Self(hbars * TINYBARS_PER_HBAR)
	}

	pub const fn to_tinybars(self) -> i64 {
		self.0
	}

	pub const fn is_negative(self) -> bool {
		self.0 < 0
	}
}

/// Whole-hbar amounts render as `N ℏ`; anything with a fractional part is
/// rendered in tinybars, which avoids lossy decimal formatting.
impl fmt::Display for Hbar {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.0 % TINYBARS_PER_HBAR == 0 {
			write!(f, "{} ℏ", self.0 / TINYBARS_PER_HBAR)
		} else {
			write!(f, "{} tℏ", self.0)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn constructors_agree() {
		assert_eq!(Hbar::from_hbars(2), Hbar::from_tinybars(200_000_000));
		assert_eq!(Hbar::ZERO, Hbar::from_tinybars(0));
	}

	#[test]
	fn whole_amounts_display_in_hbars() {
		assert_eq!(Hbar::from_hbars(10).to_string(), "10 ℏ");
		assert_eq!(Hbar::ZERO.to_string(), "0 ℏ");
		assert_eq!(Hbar::from_hbars(-3).to_string(), "-3 ℏ");
	}

	#[test]
	fn fractional_amounts_display_in_tinybars() {
		assert_eq!(Hbar::from_tinybars(1000).to_string(), "1000 tℏ");
		assert_eq!(Hbar::from_tinybars(150_000_001).to_string(), "150000001 tℏ");
	}
}
