//! 指令帧结构体定义
//!
//! 包含位置指令和生命周期指令（清错、归零、使能、失能）的帧构建。

use crate::CprFrame;
use crate::constants::*;
use crate::ids::node_id_from_can_id;
use crate::{ProtocolError, bytes_to_u16_be, u16_to_bytes_be};

// ============================================================================
// 位置指令
// ============================================================================

/// 位置指令（5 字节）
///
/// | Byte | 内容 |
/// |------|------|
/// | 0    | 操作码 `0x04` |
/// | 1    | 速度限制 125 |
/// | 2    | tick 高字节 |
/// | 3    | tick 低字节 |
/// | 4    | 计数字节 45 |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionCommand {
    pub node_id: u16,
    pub ticks: u16,
}

impl PositionCommand {
    pub fn new(node_id: u16, ticks: u16) -> Self {
        Self { node_id, ticks }
    }

    /// 转换为 CAN 帧
    pub fn to_frame(self) -> CprFrame {
        let [high, low] = u16_to_bytes_be(self.ticks);
        CprFrame::new(
            self.node_id,
            &[OPCODE_SET_POSITION, POSITION_VELOCITY, high, low, POSITION_COUNTER],
        )
    }
}

impl TryFrom<CprFrame> for PositionCommand {
    type Error = ProtocolError;

    fn try_from(frame: CprFrame) -> Result<Self, Self::Error> {
        if frame.len != POSITION_FRAME_LEN {
            return Err(ProtocolError::InvalidLength {
                expected: POSITION_FRAME_LEN as usize,
                actual: frame.len as usize,
            });
        }
        if frame.data[0] != OPCODE_SET_POSITION {
            return Err(ProtocolError::InvalidValue {
                field: "opcode".to_string(),
                value: frame.data[0],
            });
        }

        Ok(Self {
            node_id: node_id_from_can_id(frame.id)?,
            ticks: bytes_to_u16_be([frame.data[2], frame.data[3]]),
        })
    }
}

// ============================================================================
// 生命周期指令
// ============================================================================

/// 生命周期指令（清错 / 归零 / 使能 / 失能）
///
/// Byte 0 固定为 `0x01`，Byte 1 为子操作码。归零指令额外携带
/// Byte 2 = 125，长度为 4；其余指令长度为 2。剩余字节补零。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleCommand {
    pub node_id: u16,
    pub code: CommandCode,
}

impl LifecycleCommand {
    pub fn new(node_id: u16, code: CommandCode) -> Self {
        Self { node_id, code }
    }

    pub fn reset_error(node_id: u16) -> Self {
        Self::new(node_id, CommandCode::ResetError)
    }

    pub fn zero_position(node_id: u16) -> Self {
        Self::new(node_id, CommandCode::ZeroPosition)
    }

    pub fn enable(node_id: u16) -> Self {
        Self::new(node_id, CommandCode::EnableMotor)
    }

    pub fn disable(node_id: u16) -> Self {
        Self::new(node_id, CommandCode::DisableMotor)
    }

    /// 帧长度
    pub fn frame_len(&self) -> u8 {
        match self.code {
            CommandCode::ZeroPosition => ZERO_RESET_FRAME_LEN,
            _ => SHORT_COMMAND_FRAME_LEN,
        }
    }

    /// 转换为 CAN 帧
    pub fn to_frame(self) -> CprFrame {
        let mut data = [0u8; 8];
        data[0] = OPCODE_COMMAND;
        data[1] = self.code.into();
        if self.code == CommandCode::ZeroPosition {
            data[2] = ZERO_RESET_ARG;
        }
        // Byte 3-7: 保留，已初始化为 0

        CprFrame::with_len(self.node_id, data, self.frame_len())
    }
}

impl TryFrom<CprFrame> for LifecycleCommand {
    type Error = ProtocolError;

    fn try_from(frame: CprFrame) -> Result<Self, Self::Error> {
        if frame.len < SHORT_COMMAND_FRAME_LEN {
            return Err(ProtocolError::InvalidLength {
                expected: SHORT_COMMAND_FRAME_LEN as usize,
                actual: frame.len as usize,
            });
        }
        if frame.data[0] != OPCODE_COMMAND {
            return Err(ProtocolError::InvalidValue {
                field: "opcode".to_string(),
                value: frame.data[0],
            });
        }
        let code =
            CommandCode::try_from(frame.data[1]).map_err(|e| ProtocolError::InvalidValue {
                field: "CommandCode".to_string(),
                value: e.number,
            })?;

        Ok(Self::new(node_id_from_can_id(frame.id)?, code))
    }
}
