//! JointProtocol 模块
//!
//! 在角度空间的调用者与 CAN 传输层之间做协议转换：
//! 角度 ⇄ tick 换算、指令帧构建、错误位解码，以及归零/清错/使能/失能
//! 等多步生命周期序列的编排。
//!
//! # 并发模型
//!
//! 同步阻塞。每个公开操作在整个调用期间持有同一把互斥锁，
//! 因此两个生命周期序列的帧不会在总线上交错。
//! 生命周期序列进行期间，`set_joints` 在获取锁之前就被丢弃（而不是排队）。

use crate::config::{JointConfig, JointSet};
use crate::error::DriverError;
use crate::mode::{AtomicProtocolMode, ProtocolMode};
use crate::status::{JointFault, JointStatus};
use crate::timing::{FrameTiming, pace};
use cpr_can::{CanTransport, CprFrame};
use cpr_protocol::{ErrorFlags, JointFeedback, LifecycleCommand, PositionCommand};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// CPR 关节协议层
///
/// 独占持有关节配置、指令发送标志和传输层。
///
/// # Example
///
/// ```rust
/// use cpr_can::MockTransport;
/// use cpr_driver::JointProtocol;
///
/// let (transport, bus) = MockTransport::new();
/// let protocol = JointProtocol::new(transport);
///
/// assert!(protocol.connect());
/// protocol.set_joints(&[0.0, 10.0, -10.0, 45.0]);
/// assert_eq!(bus.written_frames().len(), 4);
/// ```
pub struct JointProtocol<T: CanTransport> {
    joints: JointSet,
    transport: Mutex<T>,
    /// 位置指令发送标志（连接成功后置位，生命周期序列期间清除）
    comm_enabled: AtomicBool,
    mode: AtomicProtocolMode,
    /// 已进入（含等待锁）的生命周期序列数量
    active_sequences: AtomicUsize,
    timing: FrameTiming,
}

/// 生命周期序列守卫
///
/// 构造时进入 `CommandSequenceActive` 并清除发送标志；
/// 最后一个守卫释放时恢复 `Idle` 并置位发送标志（包括 panic 展开）。
struct SequenceGuard<'a> {
    comm_enabled: &'a AtomicBool,
    mode: &'a AtomicProtocolMode,
    active_sequences: &'a AtomicUsize,
}

impl<'a> SequenceGuard<'a> {
    fn enter(
        comm_enabled: &'a AtomicBool,
        mode: &'a AtomicProtocolMode,
        active_sequences: &'a AtomicUsize,
    ) -> Self {
        active_sequences.fetch_add(1, Ordering::SeqCst);
        comm_enabled.store(false, Ordering::SeqCst);
        mode.set(ProtocolMode::CommandSequenceActive, Ordering::SeqCst);
        Self {
            comm_enabled,
            mode,
            active_sequences,
        }
    }
}

impl Drop for SequenceGuard<'_> {
    fn drop(&mut self) {
        if self.active_sequences.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.mode.set(ProtocolMode::Idle, Ordering::SeqCst);
            self.comm_enabled.store(true, Ordering::SeqCst);
        }
    }
}

impl<T: CanTransport> JointProtocol<T> {
    /// 使用 Mover4 默认关节配置创建
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, JointSet::mover4(), FrameTiming::default())
    }

    /// 使用指定配置创建（配置已由 `JointSet` 校验）
    pub fn with_config(transport: T, joints: JointSet, timing: FrameTiming) -> Self {
        Self {
            joints,
            transport: Mutex::new(transport),
            comm_enabled: AtomicBool::new(false),
            mode: AtomicProtocolMode::new(ProtocolMode::Idle),
            active_sequences: AtomicUsize::new(0),
            timing,
        }
    }

    /// 关节配置
    pub fn joints(&self) -> &JointSet {
        &self.joints
    }

    pub fn timing(&self) -> FrameTiming {
        self.timing
    }

    /// 当前协议模式
    pub fn mode(&self) -> ProtocolMode {
        self.mode.get(Ordering::SeqCst)
    }

    /// 位置指令发送标志
    pub fn comm_enabled(&self) -> bool {
        self.comm_enabled.load(Ordering::SeqCst)
    }

    /// 位置指令当前是否会被发送
    fn commands_allowed(&self) -> bool {
        self.comm_enabled() && self.mode().is_idle()
    }

    // ========================================================================
    // 连接管理
    // ========================================================================

    /// 连接传输层
    ///
    /// 已连接时不会再次请求连接。发送标志被设为连接结果。
    pub fn connect(&self) -> bool {
        let mut transport = self.transport.lock();
        if !transport.is_connected()
            && let Err(e) = transport.connect()
        {
            warn!("Transport connect failed: {}", e);
        }

        let connected = transport.is_connected();
        self.comm_enabled.store(connected, Ordering::SeqCst);
        info!("Protocol: connect -> {}", connected);
        connected
    }

    /// 断开传输层
    ///
    /// 返回断开**之后**的连接状态（成功断开时为 false）。
    /// 断开后发送标志被清除。
    pub fn disconnect(&self) -> bool {
        let mut transport = self.transport.lock();
        if transport.is_connected()
            && let Err(e) = transport.disconnect()
        {
            warn!("Transport disconnect failed: {}", e);
        }

        let connected = transport.is_connected();
        if !connected {
            self.comm_enabled.store(false, Ordering::SeqCst);
        }
        info!("Protocol: disconnect -> connected = {}", connected);
        connected
    }

    /// 传输层连接状态（无副作用）
    pub fn connection_status(&self) -> bool {
        self.transport.lock().is_connected()
    }

    // ========================================================================
    // 位置指令
    // ========================================================================

    /// 发送目标关节角度（度）
    ///
    /// 发送标志未置位或生命周期序列进行中时什么也不做。
    /// 角度数量不符或含 NaN/无穷大时整批丢弃。
    /// 以上情况和写入失败都只记录日志，不返回错误。
    pub fn set_joints(&self, angles: &[f64]) {
        if let Err(e) = self.set_joints_checked(angles) {
            warn!("set_joints: {}", e);
        }
    }

    /// 发送目标关节角度，并报告问题
    ///
    /// - `Ok(false)`：指令被门控丢弃，未发送任何帧
    /// - `Ok(true)`：所有关节的帧都已被传输层接受
    /// - `Err(JointCountMismatch)`：输入数量与配置不一致，未发送任何帧
    /// - `Err(Protocol(NonFiniteAngle))`：某个角度为 NaN 或无穷大，未发送任何帧
    /// - `Err(Can)`：某个关节写入失败（其余关节仍然发送），返回第一个错误
    pub fn set_joints_checked(&self, angles: &[f64]) -> Result<bool, DriverError> {
        if !self.commands_allowed() {
            trace!("set_joints dropped: command sending disabled");
            return Ok(false);
        }
        if angles.len() != self.joints.len() {
            return Err(DriverError::JointCountMismatch {
                expected: self.joints.len(),
                actual: angles.len(),
            });
        }

        // 先换算全部关节，任一角度无效时整批不发送
        let mut targets = Vec::with_capacity(angles.len());
        for (index, (joint, &angle)) in self.joints.iter().zip(angles).enumerate() {
            let (ticks, saturated) = joint.calibration().degrees_to_wire_ticks(angle)?;
            if saturated {
                warn!(
                    "Joint {} target {:.3}° outside encoder range, clamped to {} ticks",
                    index, angle, ticks
                );
            }
            targets.push(PositionCommand::new(joint.node_id, ticks));
        }

        let mut transport = self.transport.lock();
        // 等锁期间可能进入了生命周期序列
        if !self.commands_allowed() {
            trace!("set_joints dropped: lifecycle sequence started");
            return Ok(false);
        }

        let mut first_error = None;
        for command in targets {
            if let Err(e) = transport.write_message(command.to_frame()) {
                debug!("Position write to node {} failed: {}", command.node_id, e);
                first_error.get_or_insert(e);
            }
            pace(self.timing.position_gap);
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(true),
        }
    }

    // ========================================================================
    // 反馈读取
    // ========================================================================

    /// 读取当前关节角度（度）
    ///
    /// 直接使用传输层缓存的最新反馈帧，不检查新鲜度；
    /// 从未收到反馈的节点按全零负载解析。
    pub fn read_joints(&self) -> Vec<f64> {
        let mut transport = self.transport.lock();
        self.joints
            .iter()
            .map(|joint| {
                let feedback = Self::latest_feedback(&mut *transport, joint);
                joint.calibration().ticks_to_degrees(feedback.ticks)
            })
            .collect()
    }

    /// 读取当前关节角度，并检查反馈是否存在且足够新
    pub fn read_joints_checked(&self, max_age: Duration) -> Result<Vec<f64>, DriverError> {
        let mut transport = self.transport.lock();
        let mut angles = Vec::with_capacity(self.joints.len());
        for joint in &self.joints {
            let node = joint.feedback_node();
            let buffered = transport
                .last_message(node)
                .ok_or(DriverError::NoFeedback { node })?;

            let age = buffered.age();
            if age > max_age {
                return Err(DriverError::StaleFeedback { node, age });
            }

            let feedback = JointFeedback::try_from(buffered.frame)?;
            angles.push(joint.calibration().ticks_to_degrees(feedback.ticks));
        }
        Ok(angles)
    }

    fn latest_feedback(transport: &mut T, joint: &JointConfig) -> JointFeedback {
        let data = transport
            .last_message(joint.feedback_node())
            .map(|buffered| buffered.frame.data)
            .unwrap_or_default();
        JointFeedback::from_payload(&data)
    }

    // ========================================================================
    // 错误状态
    // ========================================================================

    /// 汇总所有关节的错误状态
    ///
    /// 未连接时直接返回 `NotConnected`，不读取传输层。
    pub fn status(&self) -> JointStatus {
        let mut transport = self.transport.lock();
        if !transport.is_connected() {
            return JointStatus::NotConnected;
        }

        let mut merged = ErrorFlags::default();
        for joint in &self.joints {
            merged |= Self::latest_feedback(&mut *transport, joint).error_flags;
        }
        JointStatus::from_flags(merged)
    }

    /// 错误状态文本："Not connected"、"running" 或以空格分隔的错误名称
    pub fn error_message(&self) -> String {
        self.status().to_string()
    }

    /// 逐关节的错误位（未连接时为 None）
    pub fn joint_faults(&self) -> Option<Vec<JointFault>> {
        let mut transport = self.transport.lock();
        if !transport.is_connected() {
            return None;
        }

        let faults = self
            .joints
            .iter()
            .enumerate()
            .map(|(index, joint)| JointFault {
                index,
                node_id: joint.node_id,
                flags: Self::latest_feedback(&mut *transport, joint).error_flags,
            })
            .collect();
        Some(faults)
    }

    // ========================================================================
    // 生命周期序列
    // ========================================================================

    fn enter_sequence(&self) -> SequenceGuard<'_> {
        SequenceGuard::enter(&self.comm_enabled, &self.mode, &self.active_sequences)
    }

    /// 向每个关节发送同一种生命周期指令，每帧后等待 `gap`
    fn broadcast(
        &self,
        transport: &mut T,
        command: fn(u16) -> LifecycleCommand,
        repeat: usize,
        gap: Duration,
    ) {
        for joint in &self.joints {
            let frame: CprFrame = command(joint.node_id).to_frame();
            for _ in 0..repeat {
                if let Err(e) = transport.write_message(frame) {
                    warn!(
                        "Lifecycle write {:?} to node {} failed: {}",
                        frame.data_slice(),
                        joint.node_id,
                        e
                    );
                }
                pace(gap);
            }
        }
    }

    /// 将所有关节的当前位置设为零点
    ///
    /// 先失能电机（否则零点移动后电机会跳变），再向每个关节连续发送两次
    /// 归零指令：固件只在时间窗口内收到两次时才生效。
    pub fn reset_joints_to_zero(&self) {
        let _guard = self.enter_sequence();
        let mut transport = self.transport.lock();

        self.broadcast(
            &mut *transport,
            LifecycleCommand::disable,
            1,
            self.timing.lifecycle_gap,
        );
        info!("Motors disabled");

        self.broadcast(
            &mut *transport,
            LifecycleCommand::zero_position,
            2,
            self.timing.zero_gap,
        );
        info!("Joints set to zero");
    }

    /// 清除所有关节的错误
    pub fn reset_error(&self) {
        let _guard = self.enter_sequence();
        let mut transport = self.transport.lock();
        self.broadcast(
            &mut *transport,
            LifecycleCommand::reset_error,
            1,
            self.timing.lifecycle_gap,
        );
        info!("Errors reset");
    }

    /// 使能所有关节电机
    pub fn enable_motors(&self) {
        let _guard = self.enter_sequence();
        let mut transport = self.transport.lock();
        self.broadcast(
            &mut *transport,
            LifecycleCommand::enable,
            1,
            self.timing.lifecycle_gap,
        );
        info!("Motors enabled");
    }

    /// 失能所有关节电机
    pub fn disable_motors(&self) {
        let _guard = self.enter_sequence();
        let mut transport = self.transport.lock();
        self.broadcast(
            &mut *transport,
            LifecycleCommand::disable,
            1,
            self.timing.lifecycle_gap,
        );
        info!("Motors disabled");
    }
}
