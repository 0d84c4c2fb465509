pub mod dataset_loader;
pub mod error;
pub mod observation_table;
pub mod partition;
pub mod value_column;
