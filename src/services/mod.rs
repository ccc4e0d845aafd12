pub mod alerts;
pub mod notifier;
pub mod premium_service;
pub mod scheduler;
pub mod whale_monitor;
