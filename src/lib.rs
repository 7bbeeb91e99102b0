pub mod error;
pub mod instruction;
pub mod validate;
pub mod interpreter;
pub mod robot;
pub mod scoring;
pub mod compress;
pub mod choreography;
pub mod tournament;
pub mod metrics;
pub mod logging;
