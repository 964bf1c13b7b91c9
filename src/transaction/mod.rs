pub mod model;
pub mod pool;

pub use model::{Transaction, TxStatus, parse_amount};
pub use pool::TransactionPool;
