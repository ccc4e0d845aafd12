pub mod etherscan;
pub mod types;

pub use etherscan::{EtherscanClient, ExplorerError};
pub use types::{NativeTx, TokenTx};
