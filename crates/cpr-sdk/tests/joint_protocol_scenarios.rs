//! JointProtocol 端到端场景测试
//!
//! 使用内存总线（MockTransport）验证角度换算、帧格式、门控、
//! 生命周期序列和错误状态汇总。

use cpr_sdk::can::{MockBusHandle, MockTransport};
use cpr_sdk::prelude::*;
use cpr_sdk::protocol::{CommandCode, LifecycleCommand, OPCODE_SET_POSITION, PositionCommand};
use std::time::{Duration, Instant};

const NODES: [u16; 4] = [16, 32, 48, 64];

fn mover4() -> (JointProtocol<MockTransport>, MockBusHandle) {
    let (transport, bus) = MockTransport::new();
    let protocol = JointProtocolBuilder::new(transport).build().unwrap();
    (protocol, bus)
}

fn report_all(bus: &MockBusHandle, error_raw: u8) {
    for node in NODES {
        bus.push_joint_feedback(node, error_raw, 32000);
    }
}

fn lifecycle_codes(frames: &[CprFrame]) -> Vec<CommandCode> {
    frames
        .iter()
        .map(|f| LifecycleCommand::try_from(*f).unwrap().code)
        .collect()
}

// ============================================================================
// 角度换算与位置指令
// ============================================================================

#[test]
fn test_reference_conversion_on_the_wire() {
    let (protocol, bus) = mover4();
    protocol.connect();
    protocol.set_joints(&[10.0, 0.0, 0.0, 0.0]);

    let frame = bus.written_frames()[0];
    assert_eq!(frame.id, 16);
    assert_eq!(frame.len, 5);
    assert_eq!(frame.data[0], OPCODE_SET_POSITION);
    assert_eq!(u16::from_be_bytes([frame.data[2], frame.data[3]]), 31341);

    // 控制器把同一 tick 值回报后，读回的角度应接近 10°
    bus.push_joint_feedback(16, 0, 31341);
    let angle = protocol.read_joints()[0];
    assert!((angle - 10.0).abs() < 1.0 / 65.87, "angle = {}", angle);
}

#[test]
fn test_set_then_read_matches_within_one_tick() {
    let (protocol, bus) = mover4();
    protocol.connect();

    let targets = [12.5, -33.3, 90.0, -7.25];
    protocol.set_joints(&targets);

    // 控制器"到位"：把收到的 tick 原样回报
    for frame in bus.written_frames() {
        let cmd = PositionCommand::try_from(frame).unwrap();
        bus.push_joint_feedback(cmd.node_id, 0, cmd.ticks);
    }

    let angles = protocol.read_joints();
    for (i, (target, actual)) in targets.iter().zip(&angles).enumerate() {
        let resolution = protocol.joints().get(i).unwrap().calibration().degrees_per_tick();
        assert!(
            (target - actual).abs() <= resolution,
            "joint {}: target {} actual {}",
            i,
            target,
            actual
        );
    }
}

#[test]
fn test_position_frames_are_paced() {
    let (protocol, bus) = mover4();
    protocol.connect();

    let start = Instant::now();
    protocol.set_joints(&[0.0; 4]);
    assert!(start.elapsed() >= 4 * cpr_sdk::driver::POSITION_FRAME_GAP);

    let written = bus.written();
    for pair in written.windows(2) {
        assert!(pair[1].written_at - pair[0].written_at >= cpr_sdk::driver::POSITION_FRAME_GAP);
    }
}

// ============================================================================
// 门控
// ============================================================================

#[test]
fn test_set_joints_before_connect_issues_no_writes() {
    let (protocol, bus) = mover4();
    protocol.set_joints(&[1.0, 2.0, 3.0, 4.0]);
    assert!(bus.written_frames().is_empty());
}

#[test]
fn test_set_joints_after_disconnect_issues_no_writes() {
    let (protocol, bus) = mover4();
    protocol.connect();
    protocol.disconnect();
    protocol.set_joints(&[1.0, 2.0, 3.0, 4.0]);
    assert!(bus.written_frames().is_empty());
}

// ============================================================================
// 生命周期序列
// ============================================================================

#[test]
fn test_reset_joints_to_zero() {
    let (protocol, bus) = mover4();
    protocol.connect();

    let start = Instant::now();
    protocol.reset_joints_to_zero();
    let elapsed = start.elapsed();

    let written = bus.written();
    let frames: Vec<CprFrame> = written.iter().map(|w| w.frame).collect();
    let codes = lifecycle_codes(&frames);

    // (a) 所有失能帧都在第一个归零帧之前
    let first_zero = codes
        .iter()
        .position(|c| *c == CommandCode::ZeroPosition)
        .unwrap();
    assert_eq!(&codes[..first_zero], &[CommandCode::DisableMotor; 4]);

    // (b) 每个关节恰好两次归零帧
    for node in NODES {
        let count = frames
            .iter()
            .zip(&codes)
            .filter(|(f, c)| f.id == node as u32 && **c == CommandCode::ZeroPosition)
            .count();
        assert_eq!(count, 2, "node {}", node);
    }

    // 同一关节的两次归零帧间隔不小于归零间隔
    for pair in written[first_zero..].chunks(2) {
        assert_eq!(pair[0].frame.id, pair[1].frame.id);
        assert!(pair[1].written_at - pair[0].written_at >= cpr_sdk::driver::ZERO_FRAME_GAP);
    }

    // (c) 完成后恢复发送标志
    assert!(protocol.comm_enabled());
    assert_eq!(protocol.mode(), ProtocolMode::Idle);

    let minimum = 4 * cpr_sdk::driver::LIFECYCLE_FRAME_GAP + 8 * cpr_sdk::driver::ZERO_FRAME_GAP;
    assert!(elapsed >= minimum, "elapsed {:?}", elapsed);
}

#[test]
fn test_enable_reset_disable_round() {
    let (protocol, bus) = mover4();
    protocol.connect();

    protocol.reset_error();
    protocol.enable_motors();
    protocol.set_joints(&[5.0; 4]);
    protocol.disable_motors();

    let frames = bus.written_frames();
    assert_eq!(frames.len(), 16);
    assert_eq!(lifecycle_codes(&frames[..4]), vec![CommandCode::ResetError; 4]);
    assert_eq!(lifecycle_codes(&frames[4..8]), vec![CommandCode::EnableMotor; 4]);
    assert!(frames[8..12].iter().all(|f| f.data[0] == OPCODE_SET_POSITION));
    assert_eq!(lifecycle_codes(&frames[12..]), vec![CommandCode::DisableMotor; 4]);
}

// ============================================================================
// 错误状态
// ============================================================================

#[test]
fn test_status_not_connected_without_reads() {
    let (protocol, bus) = mover4();
    report_all(&bus, 0xFF);
    assert_eq!(protocol.error_message(), "Not connected");
    assert_eq!(bus.read_calls(), 0);
}

#[test]
fn test_status_running() {
    let (protocol, bus) = mover4();
    protocol.connect();
    report_all(&bus, 0);
    assert_eq!(protocol.error_message(), "running");
    assert_eq!(protocol.status(), JointStatus::Running);
}

#[test]
fn test_status_single_joint_fault() {
    let (protocol, bus) = mover4();
    protocol.connect();
    report_all(&bus, 0);
    bus.push_joint_feedback(48, 0b1000_0001, 32000);

    assert_eq!(protocol.error_message(), "WTD CAN");
}

#[test]
fn test_status_merges_same_bit_without_duplicates() {
    let (protocol, bus) = mover4();
    protocol.connect();
    report_all(&bus, 0b1000_0001);
    bus.push_joint_feedback(16, 0b0000_0001, 32000);

    assert_eq!(protocol.error_message(), "WTD CAN");
}

#[test]
fn test_status_loses_per_joint_attribution() {
    // 已知限制：合并后的状态无法区分是哪个关节报错
    let (protocol, bus) = mover4();
    protocol.connect();

    report_all(&bus, 0);
    bus.push_joint_feedback(16, 0b0001_0000, 32000);
    let first = protocol.status();

    report_all(&bus, 0);
    bus.push_joint_feedback(64, 0b0001_0000, 32000);
    let second = protocol.status();

    assert_eq!(first, second);
    assert_eq!(first.to_string(), "PosLag");

    // 逐关节接口保留归属
    let faults = protocol.joint_faults().unwrap();
    assert!(faults[3].flags.position_lag());
    assert!(faults[0].flags.is_clear());
}

// ============================================================================
// 反馈新鲜度
// ============================================================================

#[test]
fn test_literal_read_accepts_stale_feedback() {
    let (protocol, bus) = mover4();
    protocol.connect();

    let old = Instant::now() - Duration::from_secs(5);
    for node in NODES {
        let feedback = node + 1;
        bus.push_feedback_at(feedback, CprFrame::new(feedback, &[0, 0, 0x7D, 0x00]), old);
    }

    assert_eq!(protocol.read_joints(), vec![0.0; 4]);
    assert!(matches!(
        protocol.read_joints_checked(Duration::from_secs(1)),
        Err(DriverError::StaleFeedback { node: 17, .. })
    ));
}

#[test]
fn test_checked_read_with_fresh_feedback() {
    let (protocol, bus) = mover4();
    protocol.connect();
    report_all(&bus, 0);
    assert_eq!(
        protocol.read_joints_checked(Duration::from_secs(1)).unwrap(),
        vec![0.0; 4]
    );
}
