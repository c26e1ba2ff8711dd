//! 容器诊断
//!
//! 按固定顺序执行诊断规则，单条规则的失败不会影响其他规则。

mod ambiguous_lifestyles;
mod circular_dependency;
mod disposable_transient;
mod lifestyle_mismatch;
mod short_circuited;
mod torn_lifestyles;
mod unregistered_dependencies;

pub use ambiguous_lifestyles::AmbiguousLifestyles;
pub use circular_dependency::CircularDependencyRule;
pub use disposable_transient::DisposableTransientComponents;
pub use lifestyle_mismatch::LifestyleMismatch;
pub use short_circuited::ShortCircuitedDependencies;
pub use torn_lifestyles::TornLifestyles;
pub use unregistered_dependencies::UnregisteredDependencies;

use di_abstractions::{ContainerConfig, DiagnosticContext, DiagnosticRule};
use infrastructure_common::RuleReport;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// 诊断引擎
pub struct DiagnosticEngine {
    rules: Vec<Box<dyn DiagnosticRule>>,
}

impl DiagnosticEngine {
    /// 创建不含规则的引擎
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// 内置规则，按执行顺序
    pub fn default_rules() -> Vec<Box<dyn DiagnosticRule>> {
        vec![
            Box::new(AmbiguousLifestyles),
            Box::new(LifestyleMismatch),
            Box::new(ShortCircuitedDependencies),
            Box::new(UnregisteredDependencies),
            Box::new(CircularDependencyRule),
            Box::new(DisposableTransientComponents),
            Box::new(TornLifestyles),
        ]
    }

    /// 包含全部内置规则的引擎
    pub fn with_default_rules() -> Self {
        Self {
            rules: Self::default_rules(),
        }
    }

    /// 按配置过滤内置规则
    pub fn from_config(config: &ContainerConfig) -> Self {
        let rules = Self::default_rules()
            .into_iter()
            .filter(|rule| {
                let enabled = config.is_rule_enabled(rule.name());
                if !enabled {
                    debug!("诊断规则已禁用: {}", rule.name());
                }
                enabled
            })
            .collect();
        Self { rules }
    }

    /// 追加规则
    pub fn add_rule(&mut self, rule: Box<dyn DiagnosticRule>) {
        self.rules.push(rule);
    }

    /// 规则名称，按执行顺序
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// 执行全部规则，只返回有警告的报告
    pub fn run(&self, context: &DiagnosticContext<'_>) -> Vec<RuleReport> {
        let mut reports = Vec::new();
        for rule in &self.rules {
            let warnings = run_isolated(rule.as_ref(), context);
            if warnings.is_empty() {
                debug!("诊断规则通过: {}", rule.name());
            } else {
                warn!("诊断规则 {} 报告了 {} 条警告", rule.name(), warnings.len());
                reports.push(RuleReport::new(rule.name(), warnings));
            }
        }
        reports
    }
}

impl Default for DiagnosticEngine {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

impl std::fmt::Debug for DiagnosticEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticEngine")
            .field("rules", &self.rule_names())
            .finish()
    }
}

/// 执行单条规则，错误与 panic 都转换为一条警告
fn run_isolated(rule: &dyn DiagnosticRule, context: &DiagnosticContext<'_>) -> Vec<String> {
    match panic::catch_unwind(AssertUnwindSafe(|| rule.verify(context))) {
        Ok(Ok(warnings)) => warnings,
        Ok(Err(e)) => {
            warn!("诊断规则执行失败: {}, 错误: {}", rule.name(), e);
            vec![e.to_string()]
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!("诊断规则执行时发生 panic: {}, 信息: {}", rule.name(), message);
            vec![message]
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
