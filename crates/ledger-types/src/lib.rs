pub mod entity;
pub mod hbar;
pub mod keys;
pub mod transaction;
pub mod validation;

pub use entity::*;
pub use hbar::*;
pub use keys::*;
pub use transaction::*;
pub use validation::*;
