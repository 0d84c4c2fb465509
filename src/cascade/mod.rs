pub mod aggregator;
pub mod error;
pub mod filter_cascade;
