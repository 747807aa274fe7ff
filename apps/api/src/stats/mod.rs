// Statistics over stored analyses.

pub mod aggregator;
pub mod handlers;
