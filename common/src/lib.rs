pub mod capability;
pub mod config;
pub mod error;
pub mod exec;
pub mod model;
pub mod pairing;
