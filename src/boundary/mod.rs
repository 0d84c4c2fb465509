pub mod boundary_loader;
pub mod error;
pub mod topology;
