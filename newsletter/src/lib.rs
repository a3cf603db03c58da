pub mod adapters;
pub mod campaign_handler;
pub mod configuration;
pub mod domain;
pub mod proxy;
pub mod startup;
pub mod subscribe_handler;
pub mod utils;
