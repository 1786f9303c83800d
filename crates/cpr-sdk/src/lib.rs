//! CPR SDK - CPR 关节控制器 CAN 协议层
//!
//! 把以角度思考的运动控制器和通过 CAN 总线驱动的关节电机控制器连接起来。
//!
//! # 架构设计
//!
//! - **协议层** (`protocol`): 帧构建/解析、错误位域、角度 ⇄ tick 换算
//! - **传输层** (`can`): `CanTransport` 接口（具体实现由宿主提供）
//! - **驱动层** (`driver`): `JointProtocol`、生命周期序列、关节配置
//!
//! # 快速开始
//!
//! ```rust,ignore
//! use cpr_sdk::prelude::*;
//!
//! cpr_sdk::init_logger();
//!
//! let protocol = JointProtocolBuilder::new(my_transport)
//!     .joints_file("joints.toml")
//!     .build()?;
//!
//! protocol.connect();
//! protocol.reset_error();
//! protocol.enable_motors();
//! protocol.set_joints(&[0.0, 10.0, -10.0, 45.0]);
//! println!("{}", protocol.error_message());
//! ```

pub mod can {
    pub use cpr_can::*;
}

pub mod driver {
    pub use cpr_driver::*;
}

pub mod protocol {
    pub use cpr_protocol::*;
}

pub mod prelude;

// --- 用户以此为界 ---

pub use can::{CanError, CanTransport, CprFrame};
pub use driver::{DriverError, JointProtocol, JointProtocolBuilder, JointSet, JointStatus};
pub use protocol::ProtocolError;

use tracing_subscriber::EnvFilter;

/// 默认日志级别（未设置 `RUST_LOG` 时使用）
pub const DEFAULT_LOG_FILTER: &str = "info";

/// 初始化日志
///
/// 使用 `RUST_LOG` 环境变量过滤，未设置时为 `info`。
/// 重复调用是安全的：已有全局 subscriber 时直接返回。
pub fn init_logger() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_twice() {
        init_logger();
        init_logger();
        tracing::info!("logger initialized");
    }
}
