pub mod convert;
pub mod health;
pub mod metrics;

pub use convert::convert_pdf;
pub use health::health_check;
pub use self::metrics::metrics_endpoint;
