pub mod backend;
pub mod compress;
pub mod config;
pub mod crypto;
pub mod envelope;
pub mod errors;
pub mod store;
