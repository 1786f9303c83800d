//! 帧间隔定义
//!
//! 关节控制器共享同一条总线，且固件处理指令需要时间。
//! 每发送一帧后都会阻塞等待固定间隔。

use std::time::Duration;

/// 位置指令之间的间隔（避免周期性指令挤占总线）
pub const POSITION_FRAME_GAP: Duration = Duration::from_millis(2);

/// 归零指令之间的间隔
///
/// 固件要求在时间窗口内收到两次归零指令才会生效，间隔必须远小于该窗口。
pub const ZERO_FRAME_GAP: Duration = Duration::from_millis(5);

/// 清错/使能/失能指令之间的间隔（控制器处理指令的时间）
pub const LIFECYCLE_FRAME_GAP: Duration = Duration::from_millis(3);

/// 帧间隔配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTiming {
    pub position_gap: Duration,
    pub zero_gap: Duration,
    pub lifecycle_gap: Duration,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self {
            position_gap: POSITION_FRAME_GAP,
            zero_gap: ZERO_FRAME_GAP,
            lifecycle_gap: LIFECYCLE_FRAME_GAP,
        }
    }
}

/// 阻塞等待指定间隔
///
/// 毫秒级间隔使用 `spin_sleep`，避免系统调度器把 2ms 拉长到 10ms 以上。
pub(crate) fn pace(gap: Duration) {
    if !gap.is_zero() {
        spin_sleep::sleep(gap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_default_timing() {
        let timing = FrameTiming::default();
        assert_eq!(timing.position_gap, Duration::from_millis(2));
        assert_eq!(timing.zero_gap, Duration::from_millis(5));
        assert_eq!(timing.lifecycle_gap, Duration::from_millis(3));
    }

    #[test]
    fn test_pace_blocks_at_least_gap() {
        let start = Instant::now();
        pace(Duration::from_millis(3));
        assert!(start.elapsed() >= Duration::from_millis(3));
    }

    #[test]
    fn test_pace_zero_returns_immediately() {
        let start = Instant::now();
        pace(Duration::ZERO);
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
