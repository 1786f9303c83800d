//! Mock 传输层
//!
//! 用于测试的内存 CAN 总线：记录所有写入的帧，允许注入反馈帧、
//! 连接失败和写入失败。`MockTransport` 交给协议层持有，
//! `MockBusHandle` 留在测试代码中观察和操控总线状态。

use crate::{BufferedFrame, CanError, CanTransport, CprFrame};
use cpr_protocol::feedback_node;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::trace;

/// 已写入总线的帧
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrittenFrame {
    pub frame: CprFrame,
    pub written_at: Instant,
}

#[derive(Debug, Default)]
struct MockBusState {
    connected: bool,
    fail_connect: bool,
    reject_writes: bool,
    written: Vec<WrittenFrame>,
    feedback: HashMap<u16, BufferedFrame>,
    connect_calls: usize,
    disconnect_calls: usize,
    read_calls: usize,
}

/// 内存 CAN 传输
#[derive(Debug)]
pub struct MockTransport {
    state: Arc<Mutex<MockBusState>>,
}

/// 测试侧的总线句柄（可克隆）
#[derive(Debug, Clone)]
pub struct MockBusHandle {
    state: Arc<Mutex<MockBusState>>,
}

impl MockTransport {
    /// 创建传输和对应的观察句柄
    pub fn new() -> (Self, MockBusHandle) {
        let state = Arc::new(Mutex::new(MockBusState::default()));
        (
            Self {
                state: state.clone(),
            },
            MockBusHandle { state },
        )
    }

    /// 创建已连接的传输
    pub fn connected() -> (Self, MockBusHandle) {
        let (transport, handle) = Self::new();
        handle.set_connected(true);
        (transport, handle)
    }
}

impl CanTransport for MockTransport {
    fn connect(&mut self) -> Result<(), CanError> {
        let mut state = self.state.lock();
        state.connect_calls += 1;
        if state.fail_connect {
            return Err(CanError::Device("mock connect failure".to_string()));
        }
        state.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), CanError> {
        let mut state = self.state.lock();
        state.disconnect_calls += 1;
        state.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    fn write_message(&mut self, frame: CprFrame) -> Result<(), CanError> {
        let mut state = self.state.lock();
        if state.reject_writes {
            return Err(CanError::WriteRejected {
                node_id: frame.id as u16,
            });
        }
        trace!("mock write: id={} data={:?}", frame.id, frame.data_slice());
        state.written.push(WrittenFrame {
            frame,
            written_at: Instant::now(),
        });
        Ok(())
    }

    fn last_message(&mut self, node_id: u16) -> Option<BufferedFrame> {
        let mut state = self.state.lock();
        state.read_calls += 1;
        state.feedback.get(&node_id).copied()
    }
}

impl MockBusHandle {
    pub fn set_connected(&self, connected: bool) {
        self.state.lock().connected = connected;
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    /// 后续 `connect()` 调用失败
    pub fn set_fail_connect(&self, fail: bool) {
        self.state.lock().fail_connect = fail;
    }

    /// 后续 `write_message()` 调用返回 `WriteRejected`
    pub fn set_reject_writes(&self, reject: bool) {
        self.state.lock().reject_writes = reject;
    }

    /// 在指定节点缓存一帧（接收时间为当前时刻）
    pub fn push_feedback(&self, node_id: u16, frame: CprFrame) {
        self.push_feedback_at(node_id, frame, Instant::now());
    }

    /// 在指定节点缓存一帧，并指定接收时间
    pub fn push_feedback_at(&self, node_id: u16, frame: CprFrame, received_at: Instant) {
        self.state
            .lock()
            .feedback
            .insert(node_id, BufferedFrame::new(frame, received_at));
    }

    /// 模拟关节控制器上报：写入 `node_id + 1` 反馈节点
    pub fn push_joint_feedback(&self, node_id: u16, error_raw: u8, ticks: u16) {
        let node = feedback_node(node_id);
        let [high, low] = ticks.to_be_bytes();
        self.push_feedback(node, CprFrame::new(node, &[error_raw, 0, high, low, 0, 0, 0, 0]));
    }

    pub fn clear_feedback(&self) {
        self.state.lock().feedback.clear();
    }

    /// 所有已写入的帧（按写入顺序）
    pub fn written(&self) -> Vec<WrittenFrame> {
        self.state.lock().written.clone()
    }

    /// 所有已写入的帧（仅帧内容）
    pub fn written_frames(&self) -> Vec<CprFrame> {
        self.state.lock().written.iter().map(|w| w.frame).collect()
    }

    pub fn clear_written(&self) {
        self.state.lock().written.clear();
    }

    pub fn connect_calls(&self) -> usize {
        self.state.lock().connect_calls
    }

    pub fn disconnect_calls(&self) -> usize {
        self.state.lock().disconnect_calls
    }

    /// `last_message()` 被调用的次数
    pub fn read_calls(&self) -> usize {
        self.state.lock().read_calls
    }
}
