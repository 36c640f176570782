use solana_sdk::hash::hashv;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

use crate::solana::rpc_helpers::{
    associated_token_address, find_pda, ASSOCIATED_TOKEN_PROGRAM_ID as ATA_PROGRAM_ID,
};
use crate::source::ClaimKind;

/// Accounts a fee claim touches, resolved by the caller
#[derive(Debug, Clone)]
pub struct ClaimAccounts {
    pub program_id: Pubkey,
    pub pool: Pubkey,
    pub config: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
    pub base_token_program: Pubkey,
    pub quote_token_program: Pubkey,
    pub claimer: Pubkey,
    pub payer: Pubkey,
    pub receiver: Pubkey,
}

/// First 8 bytes of sha256("global:<name>")
fn instruction_discriminator(name: &str) -> [u8; 8] {
    let hash = hashv(&[format!("global:{}", name).as_bytes()]);
    let mut out = [0u8; 8];
    out.copy_from_slice(&hash.to_bytes()[..8]);
    out
}

/// Create the receiver's token account if it does not exist yet
pub fn create_ata_idempotent(payer: &Pubkey, owner: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Instruction {
    let ata = associated_token_address(owner, mint, token_program);
    Instruction {
        program_id: ATA_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(ata, false),
            AccountMeta::new_readonly(*owner, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(solana_sdk::system_program::id(), false),
            AccountMeta::new_readonly(*token_program, false),
        ],
        data: vec![1],
    }
}

/// The program's partner or creator trading-fee claim instruction
pub fn claim_trading_fee(kind: ClaimKind, accounts: &ClaimAccounts, max_base: u64, max_quote: u64) -> Instruction {
    let name = match kind {
        ClaimKind::Partner => "claim_trading_fee",
        ClaimKind::Creator => "claim_creator_trading_fee",
    };

    let mut data = instruction_discriminator(name).to_vec();
    data.extend_from_slice(&max_base.to_le_bytes());
    data.extend_from_slice(&max_quote.to_le_bytes());

    let pool_authority = find_pda(&[b"pool_authority"], &accounts.program_id);
    let event_authority = find_pda(&[b"__event_authority"], &accounts.program_id);
    let receiver_base =
        associated_token_address(&accounts.receiver, &accounts.base_mint, &accounts.base_token_program);
    let receiver_quote =
        associated_token_address(&accounts.receiver, &accounts.quote_mint, &accounts.quote_token_program);

    let mut metas = vec![AccountMeta::new_readonly(pool_authority, false)];
    if kind == ClaimKind::Partner {
        metas.push(AccountMeta::new_readonly(accounts.config, false));
    }
    metas.extend([
        AccountMeta::new(accounts.pool, false),
        AccountMeta::new(receiver_base, false),
        AccountMeta::new(receiver_quote, false),
        AccountMeta::new(accounts.base_vault, false),
        AccountMeta::new(accounts.quote_vault, false),
        AccountMeta::new_readonly(accounts.base_mint, false),
        AccountMeta::new_readonly(accounts.quote_mint, false),
        AccountMeta::new_readonly(accounts.claimer, true),
        AccountMeta::new_readonly(accounts.base_token_program, false),
        AccountMeta::new_readonly(accounts.quote_token_program, false),
        AccountMeta::new_readonly(event_authority, false),
        AccountMeta::new_readonly(accounts.program_id, false),
    ]);

    Instruction {
        program_id: accounts.program_id,
        accounts: metas,
        data,
    }
}

/// Receiver token accounts followed by the claim itself
pub fn claim_instructions(kind: ClaimKind, accounts: &ClaimAccounts, max_base: u64, max_quote: u64) -> Vec<Instruction> {
    vec![
        create_ata_idempotent(&accounts.payer, &accounts.receiver, &accounts.base_mint, &accounts.base_token_program),
        create_ata_idempotent(&accounts.payer, &accounts.receiver, &accounts.quote_mint, &accounts.quote_token_program),
        claim_trading_fee(kind, accounts, max_base, max_quote),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts() -> ClaimAccounts {
        let claimer = Pubkey::new_unique();
        ClaimAccounts {
            program_id: Pubkey::new_unique(),
            pool: Pubkey::new_unique(),
            config: Pubkey::new_unique(),
            base_mint: Pubkey::new_unique(),
            quote_mint: Pubkey::new_unique(),
            base_vault: Pubkey::new_unique(),
            quote_vault: Pubkey::new_unique(),
            base_token_program: Pubkey::new_unique(),
            quote_token_program: Pubkey::new_unique(),
            claimer,
            payer: claimer,
            receiver: claimer,
        }
    }

    #[test]
    fn partner_claim_includes_config_and_amounts() {
        let accounts = accounts();
        let ix = claim_trading_fee(ClaimKind::Partner, &accounts, 7, 9);

        assert_eq!(ix.accounts.len(), 14);
        assert_eq!(ix.accounts[1].pubkey, accounts.config);
        assert_eq!(&ix.data[8..16], &7u64.to_le_bytes());
        assert_eq!(&ix.data[16..24], &9u64.to_le_bytes());

        let signers: Vec<_> = ix.accounts.iter().filter(|m| m.is_signer).collect();
        assert_eq!(signers.len(), 1);
        assert_eq!(signers[0].pubkey, accounts.claimer);
    }

    #[test]
    fn creator_claim_skips_config_and_uses_its_own_discriminator() {
        let accounts = accounts();
        let creator = claim_trading_fee(ClaimKind::Creator, &accounts, 1, 1);
        let partner = claim_trading_fee(ClaimKind::Partner, &accounts, 1, 1);

        assert_eq!(creator.accounts.len(), 13);
        assert!(creator.accounts.iter().all(|m| m.pubkey != accounts.config));
        assert_ne!(creator.data[..8], partner.data[..8]);
    }

    #[test]
    fn claim_is_preceded_by_receiver_account_setup() {
        let ixs = claim_instructions(ClaimKind::Partner, &accounts(), 1, 1);
        assert_eq!(ixs.len(), 3);
        assert_eq!(ixs[0].program_id, ATA_PROGRAM_ID);
        assert_eq!(ixs[1].program_id, ATA_PROGRAM_ID);
    }
}
