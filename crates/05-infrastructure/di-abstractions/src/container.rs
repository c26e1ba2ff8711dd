//! 容器配置

use crate::resolver::ResolveOptions;
use serde::{Deserialize, Serialize};

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 是否自动注册未注册但可构造的类型（按瞬时生命周期）
    pub enable_auto_registration: bool,
    /// 是否在解析链上检测循环依赖
    pub enable_resolution_guard: bool,
    /// 最大解析深度
    pub max_resolution_depth: usize,
    /// 不参与验证的诊断规则名称
    pub disabled_rules: Vec<String>,
}

impl ContainerConfig {
    /// 解析选项
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            detect_cycles: self.enable_resolution_guard,
            max_depth: self.max_resolution_depth,
            auto_register: self.enable_auto_registration,
        }
    }

    /// 规则是否启用
    pub fn is_rule_enabled(&self, name: &str) -> bool {
        !self.disabled_rules.iter().any(|rule| rule == name)
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            enable_auto_registration: true,
            enable_resolution_guard: true,
            max_resolution_depth: 100,
            disabled_rules: Vec::new(),
        }
    }
}
