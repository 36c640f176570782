//! Fee totals and claiming.

mod aggregate;
pub mod claim;

pub use aggregate::aggregate;
pub use claim::{
    claim_all, claim_one, eligible_for_claim, ClaimPipeline, ClaimRequest, FeeClaimer,
    TransactionDrafter, TransactionSigner, TransactionSubmitter,
};
