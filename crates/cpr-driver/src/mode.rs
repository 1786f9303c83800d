//! 协议模式定义
//!
//! 描述 `JointProtocol` 当前是否处于生命周期序列中，用于决定
//! 周期性位置指令是否允许发送。

use std::sync::atomic::{AtomicU8, Ordering};

/// 协议工作模式
///
/// # 模式说明
///
/// - **Idle**: 空闲，位置指令可以发送
/// - **CommandSequenceActive**: 生命周期序列（归零/清错/使能/失能）进行中，
///   位置指令被丢弃，避免打断序列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ProtocolMode {
    /// 空闲（默认）
    #[default]
    Idle = 0,

    /// 生命周期序列进行中
    CommandSequenceActive = 1,
}

impl ProtocolMode {
    /// 从 u8 转换
    ///
    /// 如果值无效，返回 Idle。
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::CommandSequenceActive,
            _ => Self::Idle,
        }
    }

    /// 转换为 u8
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// 是否空闲
    pub fn is_idle(self) -> bool {
        self == Self::Idle
    }

    /// 是否处于生命周期序列中
    pub fn is_sequence_active(self) -> bool {
        self == Self::CommandSequenceActive
    }
}

/// 协议模式（原子版本，用于线程间共享）
#[derive(Debug)]
pub struct AtomicProtocolMode {
    inner: AtomicU8,
}

impl AtomicProtocolMode {
    /// 创建新的原子模式
    pub fn new(mode: ProtocolMode) -> Self {
        Self {
            inner: AtomicU8::new(mode.as_u8()),
        }
    }

    /// 获取当前模式
    pub fn get(&self, ordering: Ordering) -> ProtocolMode {
        ProtocolMode::from_u8(self.inner.load(ordering))
    }

    /// 设置模式
    pub fn set(&self, mode: ProtocolMode, ordering: Ordering) {
        self.inner.store(mode.as_u8(), ordering);
    }
}

impl Default for AtomicProtocolMode {
    fn default() -> Self {
        Self::new(ProtocolMode::Idle)
    }
}
