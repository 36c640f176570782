mod types;

pub use types::{load_config, load_config_from, Config};
