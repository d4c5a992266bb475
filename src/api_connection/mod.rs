pub mod connection;
pub mod endpoints;
