pub mod citizens;
pub mod health;
pub mod metrics;
