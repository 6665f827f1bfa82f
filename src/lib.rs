pub mod calendar;
pub mod commands;
pub mod config;
pub mod engine;
pub mod layout;
pub mod limits;
pub mod model;
pub mod money;
pub mod notify;
pub mod observability;
pub mod ticker;
