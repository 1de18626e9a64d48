// Library for tests to access modules

pub mod ceiling;
pub mod config;
pub mod credential_cache;
pub mod engine;
pub mod error;
pub mod history_repo;
pub mod interfaces;
pub mod models;
pub mod monitor_store;
pub mod persist;
pub mod pfsense;
pub mod rate_calc;
pub mod source;
pub mod status;
pub mod version;
pub mod worker;
