pub mod filter;
pub mod format;
pub mod record;
pub mod stats;
