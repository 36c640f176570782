use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::pubkey::Pubkey;

pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// Filter accounts whose bytes at `offset` equal `pubkey`
pub fn memcmp_pubkey(offset: usize, pubkey: &Pubkey) -> RpcFilterType {
    RpcFilterType::Memcmp(Memcmp::new_base58_encoded(offset, pubkey.as_ref()))
}

/// Filter accounts that start with an 8-byte Anchor discriminator
pub fn memcmp_discriminator(discriminator: &[u8; 8]) -> RpcFilterType {
    RpcFilterType::Memcmp(Memcmp::new_base58_encoded(0, discriminator))
}

/// Calculate the program-derived address (PDA)
pub fn find_pda(seeds: &[&[u8]], program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(seeds, program_id).0
}

/// Associated token account of `wallet` for `mint`
pub fn associated_token_address(wallet: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    find_pda(
        &[wallet.as_ref(), token_program.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
}
