pub mod converter;
pub mod executor;
pub mod metrics;
pub mod storage;

pub use converter::{CommandConverter, Converter};
pub use executor::CommandExecutor;
pub use self::metrics::{get_metrics, init_metrics, record_conversion};
pub use storage::MediaStorage;
