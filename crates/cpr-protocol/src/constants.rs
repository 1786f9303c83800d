//! 协议常量定义
//!
//! 集中定义控制器固件要求的固定字节，避免在代码中散落"魔法数"。

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 位置指令操作码（Byte 0）
pub const OPCODE_SET_POSITION: u8 = 0x04;

/// 位置指令中的速度限制（Byte 1）
pub const POSITION_VELOCITY: u8 = 125;

/// 位置指令中的计数字节（Byte 4）
pub const POSITION_COUNTER: u8 = 45;

/// 位置指令帧长度
pub const POSITION_FRAME_LEN: u8 = 5;

/// 生命周期指令的首字节（Byte 0）
pub const OPCODE_COMMAND: u8 = 0x01;

/// 归零指令第三字节（固件要求的固定值）
pub const ZERO_RESET_ARG: u8 = 125;

/// 归零指令帧长度
pub const ZERO_RESET_FRAME_LEN: u8 = 4;

/// 使能/失能/清错指令帧长度
pub const SHORT_COMMAND_FRAME_LEN: u8 = 2;

/// 生命周期指令子操作码（Byte 1）
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum CommandCode {
    /// 清除错误
    ResetError = 0x06,
    /// 将当前位置设为零点（需在时间窗口内收到两次）
    ZeroPosition = 0x08,
    /// 使能电机
    EnableMotor = 0x09,
    /// 失能电机
    DisableMotor = 0x0A,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_code_values() {
        assert_eq!(u8::from(CommandCode::ResetError), 6);
        assert_eq!(u8::from(CommandCode::ZeroPosition), 8);
        assert_eq!(u8::from(CommandCode::EnableMotor), 9);
        assert_eq!(u8::from(CommandCode::DisableMotor), 10);
    }

    #[test]
    fn test_command_code_try_from() {
        assert_eq!(CommandCode::try_from(0x09).ok(), Some(CommandCode::EnableMotor));
        assert!(CommandCode::try_from(0x07).is_err());
    }
}
