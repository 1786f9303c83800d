//! Builder 模式实现
//!
//! 提供链式构造 `JointProtocol` 实例的便捷方式。

use crate::config::JointSet;
use crate::error::DriverError;
use crate::joint_protocol::JointProtocol;
use crate::timing::FrameTiming;
use cpr_can::CanTransport;
use std::path::PathBuf;
use tracing::debug;

/// JointProtocol Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use cpr_can::MockTransport;
/// use cpr_driver::JointProtocolBuilder;
///
/// let (transport, _bus) = MockTransport::new();
/// let protocol = JointProtocolBuilder::new(transport)
///     .joints_file("/etc/cpr/joints.toml")
///     .build()
///     .unwrap();
/// ```
pub struct JointProtocolBuilder<T: CanTransport> {
    transport: T,
    joints: Option<JointSet>,
    joints_file: Option<PathBuf>,
    timing: FrameTiming,
}

impl<T: CanTransport> JointProtocolBuilder<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            joints: None,
            joints_file: None,
            timing: FrameTiming::default(),
        }
    }

    /// 指定关节配置（默认 Mover4）
    pub fn joints(mut self, joints: JointSet) -> Self {
        self.joints = Some(joints);
        self
    }

    /// 从 TOML 文件加载关节配置（优先于 `joints()`）
    pub fn joints_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.joints_file = Some(path.into());
        self
    }

    /// 指定帧间隔
    pub fn timing(mut self, timing: FrameTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn build(self) -> Result<JointProtocol<T>, DriverError> {
        let joints = match (self.joints_file, self.joints) {
            (Some(path), _) => {
                debug!("Loading joint configuration from {}", path.display());
                JointSet::load_from_file(&path)?
            },
            (None, Some(joints)) => joints,
            (None, None) => JointSet::mover4(),
        };

        Ok(JointProtocol::with_config(self.transport, joints, self.timing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JointConfig;
    use cpr_can::MockTransport;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builder_defaults() {
        let (transport, _bus) = MockTransport::new();
        let protocol = JointProtocolBuilder::new(transport).build().unwrap();
        assert_eq!(protocol.joints(), &JointSet::mover4());
        assert_eq!(protocol.timing(), FrameTiming::default());
    }

    #[test]
    fn test_builder_custom_joints_and_timing() {
        let (transport, _bus) = MockTransport::new();
        let joints = JointSet::new(vec![
            JointConfig::new(0x100, 40.0, 30000),
            JointConfig::new(0x110, -40.0, 30000),
        ])
        .unwrap();
        let timing = FrameTiming {
            position_gap: Duration::from_millis(1),
            ..FrameTiming::default()
        };

        let protocol = JointProtocolBuilder::new(transport)
            .joints(joints.clone())
            .timing(timing)
            .build()
            .unwrap();
        assert_eq!(protocol.joints(), &joints);
        assert_eq!(protocol.timing().position_gap, Duration::from_millis(1));
    }

    #[test]
    fn test_builder_joints_file() {
        let file = NamedTempFile::new().unwrap();
        let joints = JointSet::new(vec![JointConfig::new(0x200, 12.5, 1000)]).unwrap();
        joints.save_to_file(file.path()).unwrap();

        let (transport, _bus) = MockTransport::new();
        let protocol = JointProtocolBuilder::new(transport)
            .joints(JointSet::mover4())
            .joints_file(file.path())
            .build()
            .unwrap();
        assert_eq!(protocol.joints(), &joints);
    }

    #[test]
    fn test_builder_bad_file() {
        let (transport, _bus) = MockTransport::new();
        let result = JointProtocolBuilder::new(transport)
            .joints_file("/nonexistent/joints.toml")
            .build();
        assert!(matches!(result, Err(DriverError::Io(_))));
    }
}
