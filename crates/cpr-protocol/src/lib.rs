//! # CPR Protocol
//!
//! CPR 关节控制器 CAN 总线协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `ids`: 节点地址约定（指令节点 / 反馈节点）
//! - `constants`: 操作码与固定字节
//! - `control`: 指令帧构建
//! - `feedback`: 反馈帧解析与错误位域
//! - `units`: 角度 ⇄ 编码器 tick 换算
//!
//! ## 字节序
//!
//! 位置字段为 16 位无符号整数，高字节在前（大端字节序）。

pub mod constants;
pub mod control;
pub mod feedback;
pub mod ids;
pub mod units;

// 重新导出常用类型
pub use constants::*;
pub use control::*;
pub use feedback::*;
pub use ids::*;
pub use units::*;

/// CAN 2.0 标准帧的统一抽象
///
/// 协议层和传输层之间的中间类型：协议层只构建/解析 `CprFrame`，
/// 具体的 CAN 实现由 `cpr-can` 的 `CanTransport` 负责。
///
/// ```text
/// Protocol Layer (cpr-protocol)
///     ↓ TryFrom<CprFrame> 解析 / to_frame() 构建
/// CprFrame (此类型)
///     ↓
/// Transport Layer (cpr-can)
/// ```
///
/// # 转换示例
///
/// ```rust
/// use cpr_protocol::CprFrame;
///
/// let frame = CprFrame::new(16, &[0x01, 0x09]);
///
/// assert_eq!(frame.id(), 16);
/// assert_eq!(frame.data_slice(), &[0x01, 0x09]);
/// assert_eq!(frame.data(), &[0x01, 0x09, 0, 0, 0, 0, 0, 0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CprFrame {
    /// CAN ID（即关节控制器的节点地址）
    pub id: u32,

    /// 帧数据（固定 8 字节，未使用部分为 0）
    pub data: [u8; 8],

    /// 有效数据长度 (0-8)
    pub len: u8,

    /// 硬件时间戳（微秒），0 表示不可用
    pub timestamp_us: u64,
}

impl CprFrame {
    /// 创建标准帧
    ///
    /// 超过 8 字节的数据会被截断。
    pub fn new(id: u16, data: &[u8]) -> Self {
        let mut fixed_data = [0u8; 8];
        let len = data.len().min(8);
        fixed_data[..len].copy_from_slice(&data[..len]);

        Self {
            id: id as u32,
            data: fixed_data,
            len: len as u8,
            timestamp_us: 0,
        }
    }

    /// 使用完整 8 字节负载和显式长度创建帧（长度上限为 8）
    pub fn with_len(id: u16, data: [u8; 8], len: u8) -> Self {
        Self {
            id: id as u32,
            data,
            len: len.min(8),
            timestamp_us: 0,
        }
    }

    /// 获取数据切片（只包含有效数据）
    pub fn data_slice(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    /// 获取 CAN ID
    pub fn id(&self) -> u32 {
        self.id
    }

    /// 获取完整数据（8字节固定数组）
    pub fn data(&self) -> &[u8; 8] {
        &self.data
    }
}

use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid frame length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid CAN ID: 0x{id:X}")]
    InvalidCanId { id: u32 },

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: String, value: u8 },

    #[error("Non-finite joint angle: {degrees}")]
    NonFiniteAngle { degrees: f64 },
}

/// 大端字节序转 u16
pub fn bytes_to_u16_be(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

/// u16 转大端字节序
pub fn u16_to_bytes_be(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}
