use thiserror::Error;
/// Failures while opening or reading the acquisition channel.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("failed to open serial port {port} @ {baud} baud: {source}")]
    ConnectionFailure {
        port: String,
        baud: u32,
        #[source]
        source: serialport::Error,
    },
    #[error("no samples received during the {window_ms} ms calibration window; check wiring and port")]
    NoDataReceived { window_ms: u128 },
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serial port error: {0}")]
    Port(#[from] serialport::Error),
}
/// Why a single line from the microcontroller was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected} field(s), got {actual}")]
    FieldCount { expected: &'static str, actual: usize },
    #[error("field {field:?} is not a number")]
    NotNumeric { field: String },
}
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}
