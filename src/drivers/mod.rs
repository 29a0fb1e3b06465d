// src/drivers/mod.rs
// 声明同级目录下的子模块文件
pub mod buffer;
pub mod calibration;
pub mod crossing;
pub mod error;
pub mod peaks;
pub mod report;
pub mod serial;
pub mod session;
pub mod source;
pub mod trigger;
// 公开导出这些模块里的结构体，方便外部调用
pub use buffer::{RollingWindow, WindowSnapshot};
pub use calibration::{CalibratedRate, SampleRateCalibrator};
pub use error::{AcquisitionError, ConfigError, ParseError};
pub use peaks::PeakEventDetector;
pub use report::DeltaReporter;
pub use serial::SerialLineSource;
pub use session::DetectorSession;
#[cfg(test)]
pub use source::ManualSource;
pub use source::{LineSource, SimulatedSource};
pub use trigger::DualChannelTriggerTracker;
