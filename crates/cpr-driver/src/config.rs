//! # 关节配置
//!
//! 每个关节一条配置记录（节点地址、比例系数、零点偏移），
//! 构造后只读。可以从 TOML 文件加载：
//!
//! ```toml
//! [[joints]]
//! node_id = 16
//! ticks_per_degree = -65.87
//! tick_zero = 32000
//! ```

use crate::error::DriverError;
use cpr_protocol::{
    DEFAULT_JOINT_NODE_IDS, JointCalibration, STANDARD_ID_MAX, feedback_node, is_valid_node_id,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// 单个关节配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointConfig {
    /// 指令节点地址（反馈节点为 `node_id + 1`）
    pub node_id: u16,
    /// 每度对应的 tick 数，符号表示机械方向
    pub ticks_per_degree: f64,
    /// 0° 对应的 tick 值
    pub tick_zero: i32,
}

impl JointConfig {
    pub const fn new(node_id: u16, ticks_per_degree: f64, tick_zero: i32) -> Self {
        Self {
            node_id,
            ticks_per_degree,
            tick_zero,
        }
    }

    /// 反馈节点地址
    pub fn feedback_node(&self) -> u16 {
        feedback_node(self.node_id)
    }

    /// 标定参数
    pub fn calibration(&self) -> JointCalibration {
        JointCalibration::new(self.ticks_per_degree, self.tick_zero)
    }
}

/// 有序的关节配置集合
///
/// 关节数量在构造时确定；索引即关节序号（0 起）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointSet {
    joints: Vec<JointConfig>,
}

impl JointSet {
    /// 创建并校验配置
    pub fn new(joints: Vec<JointConfig>) -> Result<Self, DriverError> {
        let set = Self { joints };
        set.validate()?;
        Ok(set)
    }

    /// CPR Mover4 默认配置
    pub fn mover4() -> Self {
        let ticks_per_degree = [-65.87, -65.87, 65.87, -101.0];
        let joints = DEFAULT_JOINT_NODE_IDS
            .iter()
            .zip(ticks_per_degree)
            .map(|(&node_id, scale)| JointConfig::new(node_id, scale, 32000))
            .collect();
        Self { joints }
    }

    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str) -> Result<Self, DriverError> {
        let set: Self = toml::from_str(content)?;
        set.validate()?;
        Ok(set)
    }

    /// 从 TOML 文件加载
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, DriverError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String, DriverError> {
        Ok(toml::to_string(self)?)
    }

    /// 保存到 TOML 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), DriverError> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// 关节数量
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&JointConfig> {
        self.joints.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JointConfig> {
        self.joints.iter()
    }

    /// 所有指令节点地址（按关节顺序）
    pub fn node_ids(&self) -> Vec<u16> {
        self.joints.iter().map(|j| j.node_id).collect()
    }

    fn validate(&self) -> Result<(), DriverError> {
        if self.joints.is_empty() {
            return Err(DriverError::Config("at least one joint is required".to_string()));
        }

        // 指令节点和反馈节点都不能与其他关节重叠
        let mut used = HashSet::new();
        for (index, joint) in self.joints.iter().enumerate() {
            if !is_valid_node_id(joint.node_id) {
                return Err(DriverError::Config(format!(
                    "joint {index}: node id {} out of range (max {})",
                    joint.node_id,
                    STANDARD_ID_MAX - 1
                )));
            }
            if !joint.ticks_per_degree.is_finite() || joint.ticks_per_degree == 0.0 {
                return Err(DriverError::Config(format!(
                    "joint {index}: ticks_per_degree must be finite and non-zero, got {}",
                    joint.ticks_per_degree
                )));
            }
            for node in [joint.node_id, joint.feedback_node()] {
                if !used.insert(node) {
                    return Err(DriverError::Config(format!(
                        "joint {index}: node id {node} already in use"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for JointSet {
    fn default() -> Self {
        Self::mover4()
    }
}

impl<'a> IntoIterator for &'a JointSet {
    type Item = &'a JointConfig;
    type IntoIter = std::slice::Iter<'a, JointConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.joints.iter()
    }
}
