//! Infrastructure layer: stores, startup configuration, outbound mail, and
//! background work (notification delivery, deactivation sweep).

pub mod cache;
pub mod config;
pub mod mailer;
pub mod notify;
pub mod stores;
pub mod sweep;
pub mod tasks;
