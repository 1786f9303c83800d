//! 节点地址约定
//!
//! 每个关节控制器占用两个相邻的 CAN ID：
//! - 指令节点 `node_id`：接收位置指令和生命周期指令
//! - 反馈节点 `node_id + 1`：周期性上报错误位域和当前位置

use crate::ProtocolError;

/// 反馈节点相对指令节点的偏移
pub const FEEDBACK_NODE_OFFSET: u16 = 1;

/// CAN 2.0 标准帧（11-bit）的最大 ID
pub const STANDARD_ID_MAX: u16 = 0x7FF;

/// Mover4 默认关节指令节点（J1..J4）
pub const DEFAULT_JOINT_NODE_IDS: [u16; 4] = [16, 32, 48, 64];

/// 由指令节点地址得到反馈节点地址
pub const fn feedback_node(node_id: u16) -> u16 {
    node_id + FEEDBACK_NODE_OFFSET
}

/// 节点地址（及其反馈节点）是否落在标准帧 ID 范围内
pub const fn is_valid_node_id(node_id: u16) -> bool {
    node_id < STANDARD_ID_MAX
}

/// 从帧 ID 取节点地址（必须是 11-bit 标准帧 ID）
pub fn node_id_from_can_id(id: u32) -> Result<u16, ProtocolError> {
    if id > STANDARD_ID_MAX as u32 {
        return Err(ProtocolError::InvalidCanId { id });
    }
    Ok(id as u16)
}
