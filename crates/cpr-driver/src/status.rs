//! 关节状态汇总

use cpr_protocol::ErrorFlags;
use std::fmt;

/// 所有关节的汇总状态
///
/// 各关节的错误位按位或合并为一个 [`ErrorFlags`]，
/// 合并后无法再区分是哪个关节报告的错误；需要逐关节信息时使用
/// [`JointProtocol::joint_faults`](crate::JointProtocol::joint_faults)。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointStatus {
    /// 传输层未连接
    NotConnected,
    /// 所有关节无错误
    Running,
    /// 至少一个关节报告错误
    Faults(ErrorFlags),
}

impl JointStatus {
    /// 由合并后的错误位构造（已连接）
    pub fn from_flags(flags: ErrorFlags) -> Self {
        if flags.is_clear() {
            Self::Running
        } else {
            Self::Faults(flags)
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// 合并后的错误位（未连接时为 None）
    pub fn flags(&self) -> Option<ErrorFlags> {
        match self {
            Self::NotConnected => None,
            Self::Running => Some(ErrorFlags::default()),
            Self::Faults(flags) => Some(*flags),
        }
    }
}

impl fmt::Display for JointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => f.write_str("Not connected"),
            Self::Running => f.write_str("running"),
            Self::Faults(flags) => write!(f, "{}", flags),
        }
    }
}

/// 单个关节的错误位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointFault {
    pub index: usize,
    pub node_id: u16,
    pub flags: ErrorFlags,
}
