//! # CPR CAN Transport Layer
//!
//! 协议层与 CAN 传输层之间的窄接口。
//!
//! 连接管理、帧收发和按节点缓存最新帧都由传输层实现；
//! 协议层只通过 [`CanTransport`] 使用这些能力。

use std::time::{Duration, Instant};
use thiserror::Error;

// 重新导出 cpr-protocol 中的 CprFrame
pub use cpr_protocol::CprFrame;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockBusHandle, MockTransport, WrittenFrame};

/// 传输层统一错误类型
#[derive(Error, Debug)]
pub enum CanError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device Error: {0}")]
    Device(String),
    #[error("Transport not connected")]
    NotConnected,
    #[error("Write rejected for node {node_id}")]
    WriteRejected { node_id: u16 },
}

/// 传输层缓存的最新帧
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferedFrame {
    pub frame: CprFrame,
    /// 传输层收到该帧的时刻
    pub received_at: Instant,
}

impl BufferedFrame {
    pub fn new(frame: CprFrame, received_at: Instant) -> Self {
        Self { frame, received_at }
    }

    /// 以当前时刻作为接收时间
    pub fn now(frame: CprFrame) -> Self {
        Self::new(frame, Instant::now())
    }

    /// 距离接收已过去的时间
    pub fn age(&self) -> Duration {
        self.received_at.elapsed()
    }
}

/// CAN 传输能力
///
/// 写入是尽力而为的：`write_message` 返回 `Ok` 只表示传输层接受了帧，
/// 不保证帧到达总线。`last_message` 返回该节点最近缓存的一帧，
/// 不保证新鲜度；从未收到过帧时返回 `None`。
pub trait CanTransport {
    fn connect(&mut self) -> Result<(), CanError>;
    fn disconnect(&mut self) -> Result<(), CanError>;
    fn is_connected(&self) -> bool;
    fn write_message(&mut self, frame: CprFrame) -> Result<(), CanError>;
    fn last_message(&mut self, node_id: u16) -> Option<BufferedFrame>;
}

impl<T: CanTransport + ?Sized> CanTransport for Box<T> {
    fn connect(&mut self) -> Result<(), CanError> {
        (**self).connect()
    }

    fn disconnect(&mut self) -> Result<(), CanError> {
        (**self).disconnect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn write_message(&mut self, frame: CprFrame) -> Result<(), CanError> {
        (**self).write_message(frame)
    }

    fn last_message(&mut self, node_id: u16) -> Option<BufferedFrame> {
        (**self).last_message(node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_error_display() {
        assert_eq!(CanError::NotConnected.to_string(), "Transport not connected");
        assert_eq!(
            CanError::WriteRejected { node_id: 16 }.to_string(),
            "Write rejected for node 16"
        );
        assert!(CanError::Device("bus off".into()).to_string().contains("bus off"));
    }

    #[test]
    fn test_buffered_frame_age() {
        let past = Instant::now() - Duration::from_millis(50);
        let buffered = BufferedFrame::new(CprFrame::new(17, &[0; 4]), past);
        assert!(buffered.age() >= Duration::from_millis(50));
    }

    #[test]
    fn test_boxed_transport() {
        let (mock, handle) = MockTransport::new();
        let mut boxed: Box<dyn CanTransport> = Box::new(mock);
        boxed.connect().unwrap();
        assert!(boxed.is_connected());
        boxed.write_message(CprFrame::new(16, &[1, 9])).unwrap();
        assert_eq!(handle.written_frames().len(), 1);
    }
}
