pub mod config;
pub mod logging;

pub mod filter;
pub mod http;
pub mod ledger;
pub mod naming;
pub mod orchestrator;
pub mod record;
pub mod resolver;
pub mod retry;
pub mod source;
pub mod transfer;
