//! HTTP 미들웨어.

mod metrics;

pub use metrics::metrics_layer;
