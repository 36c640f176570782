use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{error, info};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use crate::error::ClaimError;
use crate::models::{Amount, ClaimBatchOutcome, ClaimBatchResult, FeeMetric};
use crate::utils::format_pubkey;

/// Everything needed to draft a fee-claim transaction for one pool
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimRequest {
    pub pool: Pubkey,
    pub claimer: Pubkey,
    pub payer: Pubkey,
    pub max_base: Amount,
    pub max_quote: Amount,
    pub receiver: Option<Pubkey>,
}

/// Produces an unsigned, serialized claim transaction
#[async_trait]
pub trait TransactionDrafter: Send + Sync {
    async fn draft_claim(&self, request: &ClaimRequest) -> Result<Vec<u8>>;
}

/// Adds the claimer's signature to a serialized transaction
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign(&self, unsigned: Vec<u8>) -> Result<Vec<u8>>;
}

/// Sends a signed, serialized transaction and waits for its signature
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit(&self, signed: Vec<u8>) -> Result<Signature>;
}

/// Draft, sign and submit a single claim. The first failing step ends the pipeline.
pub async fn claim_one<D, S, U>(
    drafter: &D,
    signer: &S,
    submitter: &U,
    request: &ClaimRequest,
) -> Result<Signature, ClaimError>
where
    D: TransactionDrafter + ?Sized,
    S: TransactionSigner + ?Sized,
    U: TransactionSubmitter + ?Sized,
{
    let unsigned = drafter
        .draft_claim(request)
        .await
        .map_err(|e| ClaimError::draft(format!("{:#}", e)))?;

    let signed = signer
        .sign(unsigned)
        .await
        .map_err(|e| ClaimError::sign(format!("{:#}", e)))?;

    submitter
        .submit(signed)
        .await
        .map_err(|e| ClaimError::submit(format!("{:#}", e)))
}

/// Claims the fees of one pool
#[async_trait]
pub trait FeeClaimer: Send + Sync {
    async fn claim(
        &self,
        pool: &Pubkey,
        max_base: &Amount,
        max_quote: &Amount,
    ) -> Result<Signature, ClaimError>;
}

/// A [`FeeClaimer`] that runs [`claim_one`] for a fixed claimer and payer
pub struct ClaimPipeline<D, S, U> {
    pub drafter: D,
    pub signer: S,
    pub submitter: U,
    pub claimer: Pubkey,
    pub payer: Pubkey,
    pub receiver: Option<Pubkey>,
}

#[async_trait]
impl<D, S, U> FeeClaimer for ClaimPipeline<D, S, U>
where
    D: TransactionDrafter,
    S: TransactionSigner,
    U: TransactionSubmitter,
{
    async fn claim(
        &self,
        pool: &Pubkey,
        max_base: &Amount,
        max_quote: &Amount,
    ) -> Result<Signature, ClaimError> {
        let request = ClaimRequest {
            pool: *pool,
            claimer: self.claimer,
            payer: self.payer,
            max_base: max_base.clone(),
            max_quote: max_quote.clone(),
            receiver: self.receiver,
        };
        claim_one(&self.drafter, &self.signer, &self.submitter, &request).await
    }
}

/// Records whose partner quote fee reaches the threshold
pub fn eligible_for_claim<'a>(records: &'a [FeeMetric], threshold: &Amount) -> Vec<&'a FeeMetric> {
    records
        .iter()
        .filter(|record| record.partner_quote_fee >= *threshold)
        .collect()
}

/// Claim partner fees for every eligible pool, one pool at a time.
///
/// A failed claim is counted and logged and the batch moves on to the next pool.
pub async fn claim_all<C>(records: &[FeeMetric], threshold: &Amount, claimer: &C) -> ClaimBatchOutcome
where
    C: FeeClaimer + ?Sized,
{
    let eligible = eligible_for_claim(records, threshold);
    if eligible.is_empty() {
        info!("No pools with partner quote fees at or above {}", threshold);
        return ClaimBatchOutcome::NothingToClaim;
    }

    info!("Claiming fees from {} pools", eligible.len());

    // Claims share the fee payer, so they must not overlap.
    let result = stream::iter(eligible)
        .fold(ClaimBatchResult::default(), |mut acc, record| async move {
            let pool = format_pubkey(&record.pool_address);
            match claimer
                .claim(
                    &record.pool_address,
                    &record.partner_base_fee,
                    &record.partner_quote_fee,
                )
                .await
            {
                Ok(signature) => {
                    acc.success_count += 1;
                    info!("Claimed fees from pool {}: {}", pool, signature);
                }
                Err(e) => {
                    acc.fail_count += 1;
                    error!("Failed to claim fees from pool {}: {}", pool, e);
                }
            }
            acc
        })
        .await;

    info!(
        "Claim batch finished: {} succeeded, {} failed",
        result.success_count, result.fail_count
    );
    ClaimBatchOutcome::Completed(result)
}
