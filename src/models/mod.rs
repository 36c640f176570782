mod amount;
pub mod fees;
pub mod pool;
mod token;

pub use amount::Amount;
pub use fees::{ClaimBatchOutcome, ClaimBatchResult, FeeMetric, FeeTotals};
pub use pool::{PoolRecord, TokenMetadata};
pub use token::TokenAccount;
