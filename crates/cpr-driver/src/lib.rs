//! 驱动层模块
//!
//! CPR 关节控制器的协议转换层，包括：
//! - 角度 ⇄ tick 换算与位置指令发送
//! - 反馈帧读取与错误状态汇总
//! - 归零、清错、使能、失能等生命周期序列
//! - 关节配置（TOML）
//!
//! CAN 传输本身由 [`cpr_can::CanTransport`] 的实现提供。

mod builder;
pub mod config;
mod error;
mod joint_protocol;
pub mod mode;
pub mod status;
pub mod timing;

pub use builder::JointProtocolBuilder;
pub use config::{JointConfig, JointSet};
pub use error::DriverError;
pub use joint_protocol::JointProtocol;
pub use mode::{AtomicProtocolMode, ProtocolMode};
pub use status::{JointFault, JointStatus};
pub use timing::{FrameTiming, LIFECYCLE_FRAME_GAP, POSITION_FRAME_GAP, ZERO_FRAME_GAP};
