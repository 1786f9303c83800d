//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use cpr_sdk::prelude::*;
//! ```

// 驱动层
pub use crate::driver::{
    FrameTiming, JointConfig, JointFault, JointProtocol, JointProtocolBuilder, JointSet,
    JointStatus, ProtocolMode,
};

// 协议层
pub use crate::protocol::{CprFrame, ErrorFlags, JointCalibration};

// 传输层（常用 Trait）
pub use crate::can::{BufferedFrame, CanTransport};

// 错误类型
pub use crate::can::CanError;
pub use crate::driver::DriverError;
pub use crate::protocol::ProtocolError;
