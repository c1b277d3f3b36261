pub mod config;
pub mod github;
pub mod metrics;
pub mod output;
pub mod pipeline;
pub mod plot;
