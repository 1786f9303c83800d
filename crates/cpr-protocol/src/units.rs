//! 角度 ⇄ 编码器 tick 换算
//!
//! 控制器以编码器 tick 为位置单位，上层以角度（度）思考。
//! 每个关节的换算由两个参数决定：
//!
//! - `ticks_per_degree`：比例系数，符号表示机械方向（反装电机为负）
//! - `tick_zero`：0° 对应的 tick 值（机械零点偏移）
//!
//! 正向换算截断到整数 tick（向零取整），亚 tick 精度被丢弃，
//! 与硬件固定的编码器分辨率一致。

use crate::ProtocolError;

/// 单个关节的标定参数
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointCalibration {
    /// 每度对应的 tick 数（带符号）
    pub ticks_per_degree: f64,
    /// 0° 对应的 tick 值
    pub tick_zero: i32,
}

impl JointCalibration {
    pub const fn new(ticks_per_degree: f64, tick_zero: i32) -> Self {
        Self {
            ticks_per_degree,
            tick_zero,
        }
    }

    /// 角度 → tick（向零截断）
    ///
    /// ```rust
    /// use cpr_protocol::JointCalibration;
    ///
    /// let cal = JointCalibration::new(-65.87, 32000);
    /// assert_eq!(cal.degrees_to_ticks(10.0), 31341);
    /// ```
    pub fn degrees_to_ticks(&self, degrees: f64) -> i32 {
        (self.tick_zero as f64 + degrees * self.ticks_per_degree).trunc() as i32
    }

    /// tick → 角度
    pub fn ticks_to_degrees(&self, ticks: u16) -> f64 {
        (ticks as f64 - self.tick_zero as f64) / self.ticks_per_degree
    }

    /// 角度 → 线上 16 位 tick 值
    ///
    /// 返回 `(ticks, saturated)`；超出 `0..=u16::MAX` 的值被饱和，
    /// `saturated` 为 true 表示发生了饱和。
    /// NaN 和无穷大没有对应的位置，返回 `NonFiniteAngle`。
    pub fn degrees_to_wire_ticks(&self, degrees: f64) -> Result<(u16, bool), ProtocolError> {
        if !degrees.is_finite() {
            return Err(ProtocolError::NonFiniteAngle { degrees });
        }
        let ticks = self.degrees_to_ticks(degrees);
        let clamped = ticks.clamp(0, u16::MAX as i32);
        Ok((clamped as u16, clamped != ticks))
    }

    /// 一个 tick 对应的角度（度，恒为正）
    pub fn degrees_per_tick(&self) -> f64 {
        1.0 / self.ticks_per_degree.abs()
    }
}
