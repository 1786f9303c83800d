//! 内存总线上的完整会话演示
//!
//! 运行：
//! ```bash
//! RUST_LOG=debug cargo run -p cpr-sdk --example mock_session --features mock
//! ```

use cpr_sdk::can::MockTransport;
use cpr_sdk::prelude::*;
use cpr_sdk::protocol::PositionCommand;

fn main() -> Result<(), DriverError> {
    cpr_sdk::init_logger();

    let (transport, bus) = MockTransport::new();
    let protocol = JointProtocolBuilder::new(transport)
        .joints(JointSet::mover4())
        .build()?;

    println!("status before connect: {}", protocol.error_message());

    if !protocol.connect() {
        eprintln!("failed to connect");
        return Ok(());
    }

    protocol.reset_error();
    protocol.enable_motors();

    let targets = [0.0, 10.0, -10.0, 45.0];
    protocol.set_joints(&targets);

    // 模拟控制器到位：把收到的 tick 原样回报，并让第 3 个关节报告位置滞后
    for frame in bus.written_frames() {
        if let Ok(cmd) = PositionCommand::try_from(frame) {
            let error_raw = if cmd.node_id == 48 { 0b0001_0000 } else { 0 };
            bus.push_joint_feedback(cmd.node_id, error_raw, cmd.ticks);
        }
    }

    let angles = protocol.read_joints();
    for (target, actual) in targets.iter().zip(&angles) {
        println!("target {:>7.2}°  actual {:>7.3}°", target, actual);
    }
    println!("status: {}", protocol.error_message());

    if let Some(faults) = protocol.joint_faults() {
        for fault in faults.iter().filter(|f| !f.flags.is_clear()) {
            println!("joint {} (node {}): {}", fault.index, fault.node_id, fault.flags);
        }
    }

    protocol.reset_joints_to_zero();
    protocol.disable_motors();
    protocol.disconnect();

    println!("frames written: {}", bus.written_frames().len());
    Ok(())
}
