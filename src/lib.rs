pub mod api_connection;
pub mod cli;
pub mod config;
pub mod error;
pub mod favorites;
pub mod filters;
pub mod flows;
pub mod llm;
pub mod pantry;
pub mod prompts;
pub mod reconciler;
pub mod schema;
pub mod serving;
pub mod session;
