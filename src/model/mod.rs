//! Types that represent the core data model: `Amount`, `Transaction` and `Transactions`.
mod amount;
mod mapping;
mod transaction;

pub use amount::{Amount, AmountError};
pub use mapping::{Header, Mapping, MappingError};
pub use transaction::{parse_date, Transaction, Transactions, AMOUNT_STR, DATE_STR, TYPE_STR};
