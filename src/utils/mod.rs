mod convert;
mod format;
pub mod serde_pubkey;

pub use convert::format_units;
pub use convert::lamports_to_sol;
pub use convert::pubkey_from_str;
pub use convert::sol_to_lamports;
pub use format::format_pubkey;
