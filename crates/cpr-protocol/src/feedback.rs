//! 反馈帧结构体定义
//!
//! 关节控制器在反馈节点（`node_id + 1`）上周期性上报：
//!
//! | Byte | 内容 |
//! |------|------|
//! | 0    | 错误位域（见 [`ErrorFlags`]） |
//! | 2    | 当前位置 tick 高字节 |
//! | 3    | 当前位置 tick 低字节 |

use crate::{CprFrame, ProtocolError, bytes_to_u16_be};
use bilge::prelude::*;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// 解析位置所需的最小帧长度
pub const FEEDBACK_MIN_LEN: u8 = 4;

/// 错误位名称，按 Bit 0 → Bit 7 排列
pub const FAULT_NAMES: [&str; 8] = [
    "WTD",
    "VelLag",
    "motorNotEnabled",
    "CommWatchDog",
    "PosLag",
    "Enc",
    "OvCurr",
    "CAN",
];

/// 控制器错误位域（反馈帧 Byte 0）
///
/// - Bit 0: 看门狗超时
/// - Bit 1: 速度滞后
/// - Bit 2: 电机未使能
/// - Bit 3: 通信看门狗
/// - Bit 4: 位置滞后
/// - Bit 5: 编码器故障
/// - Bit 6: 过流
/// - Bit 7: CAN 故障
///
/// bilge 默认使用 LSB first 位序，第一个字段即 Bit 0。
#[bitsize(8)]
#[derive(FromBits, DebugBits, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorFlags {
    pub watchdog_timeout: bool,  // Bit 0
    pub velocity_lag: bool,      // Bit 1
    pub motor_not_enabled: bool, // Bit 2
    pub comm_watchdog: bool,     // Bit 3
    pub position_lag: bool,      // Bit 4
    pub encoder_fault: bool,     // Bit 5
    pub over_current: bool,      // Bit 6
    pub can_fault: bool,         // Bit 7
}

impl ErrorFlags {
    /// 从原始字节构造
    pub fn from_raw(raw: u8) -> Self {
        Self::from(u8::new(raw))
    }

    /// 原始字节
    pub fn raw(&self) -> u8 {
        u8::from(*self)
    }

    /// 无任何错误
    pub fn is_clear(&self) -> bool {
        self.raw() == 0
    }

    /// 当前置位的错误名称（Bit 0 → Bit 7）
    pub fn active_names(&self) -> Vec<&'static str> {
        let raw = self.raw();
        FAULT_NAMES
            .iter()
            .enumerate()
            .filter(|(bit, _)| raw & (1 << bit) != 0)
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for ErrorFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self::from_raw(self.raw() | rhs.raw())
    }
}

impl BitOrAssign for ErrorFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

/// 以空格分隔输出置位的错误名称；无错误时输出空串
impl fmt::Display for ErrorFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.active_names().join(" "))
    }
}

// ============================================================================
// 关节反馈
// ============================================================================

/// 关节反馈帧
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JointFeedback {
    pub error_flags: ErrorFlags, // Byte 0
    pub ticks: u16,              // Byte 2-3，大端
}

impl JointFeedback {
    /// 直接从 8 字节负载解析，不做长度检查
    ///
    /// 传输层可能返回未完整填充的缓冲区，此时按缓冲区现有内容解析。
    pub fn from_payload(data: &[u8; 8]) -> Self {
        Self {
            error_flags: ErrorFlags::from_raw(data[0]),
            ticks: bytes_to_u16_be([data[2], data[3]]),
        }
    }
}

impl TryFrom<CprFrame> for JointFeedback {
    type Error = ProtocolError;

    fn try_from(frame: CprFrame) -> Result<Self, Self::Error> {
        if frame.len < FEEDBACK_MIN_LEN {
            return Err(ProtocolError::InvalidLength {
                expected: FEEDBACK_MIN_LEN as usize,
                actual: frame.len as usize,
            });
        }

        Ok(Self::from_payload(&frame.data))
    }
}
