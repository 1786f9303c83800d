//! 驱动层错误类型定义

use cpr_can::CanError;
use cpr_protocol::ProtocolError;
use std::time::Duration;
use thiserror::Error;

/// 驱动层错误类型
///
/// 字面语义的操作（`set_joints`、`read_joints`、生命周期序列）不返回错误，
/// 只有带检查的接口和配置加载会产生 `DriverError`。
#[derive(Error, Debug)]
pub enum DriverError {
    /// CAN 传输错误
    #[error("CAN transport error: {0}")]
    Can(#[from] CanError),

    /// 协议解析错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 配置无效
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// 配置文件读写失败
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML 解析失败
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML 序列化失败
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// 输入的关节数量与配置不一致
    #[error("Joint count mismatch: expected {expected}, got {actual}")]
    JointCountMismatch { expected: usize, actual: usize },

    /// 反馈节点从未上报过帧
    #[error("No feedback received from node {node}")]
    NoFeedback { node: u16 },

    /// 反馈帧过旧
    #[error("Stale feedback from node {node}: {age:?} old")]
    StaleFeedback { node: u16, age: Duration },
}
