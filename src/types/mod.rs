pub mod admin_level;
pub mod join_key;
pub mod parameter;
