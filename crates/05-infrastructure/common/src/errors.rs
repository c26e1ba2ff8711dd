//! 错误类型定义

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置类型转换失败: {message}")]
    TypeConversionError { message: String },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("服务未注册: {type_name}")]
    UnregisteredService { type_name: String },

    #[error("依赖解析失败: {type_name} 依赖的 {dependency} 无法解析, 原因: {source}")]
    DependencyResolutionFailed {
        type_name: String,
        dependency: String,
        source: Box<DependencyError>,
    },

    #[error("组件创建失败: {type_name}, 原因: {source}")]
    ComponentCreationFailed {
        type_name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("循环依赖检测到: {dependency_chain}")]
    CircularDependency { dependency_chain: String },

    #[error("解析深度超过上限 {max_depth}: {type_name}")]
    ResolutionDepthExceeded { type_name: String, max_depth: usize },

    #[error("组件注册失败: {type_name}, 原因: {message}")]
    RegistrationError { type_name: String, message: String },

    #[error("契约元数据无效: {type_name}, 原因: {message}")]
    InvalidContractMetadata { type_name: String, message: String },

    #[error("缺少构造参数: {type_name} 的第 {position} 个参数")]
    MissingArgument { type_name: String, position: usize },

    #[error("类型转换失败: 期望 {expected}")]
    TypeMismatch { expected: String },

    #[error("容器已释放: {container}")]
    ContainerDisposed { container: String },
}

impl DependencyError {
    /// 沿依赖链找到最内层的错误
    pub fn root_cause(&self) -> &DependencyError {
        let mut current = self;
        while let Self::DependencyResolutionFailed { source, .. } = current {
            current = &**source;
        }
        current
    }

    /// 依赖链上的类型名称，从请求方开始
    pub fn resolution_chain(&self) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self;
        while let Self::DependencyResolutionFailed {
            type_name,
            dependency,
            source,
        } = current
        {
            if chain.last() != Some(&type_name.as_str()) {
                chain.push(type_name.as_str());
            }
            chain.push(dependency.as_str());
            current = &**source;
        }
        chain
    }
}

/// 单条诊断规则的报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleReport {
    /// 规则名称
    pub rule: String,
    /// 警告列表
    pub warnings: Vec<String>,
}

impl RuleReport {
    /// 创建规则报告
    pub fn new(rule: impl Into<String>, warnings: Vec<String>) -> Self {
        Self {
            rule: rule.into(),
            warnings,
        }
    }
}

/// 容器验证失败
///
/// 汇总所有报告了问题的规则及其警告，不会只包含部分规则。
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("容器验证失败:{}", render_reports(.reports))]
pub struct VerificationError {
    reports: Vec<RuleReport>,
}

impl VerificationError {
    /// 从规则报告创建验证错误
    pub fn new(reports: Vec<RuleReport>) -> Self {
        Self { reports }
    }

    /// 所有规则报告
    pub fn reports(&self) -> &[RuleReport] {
        &self.reports
    }

    /// 按名称查找规则报告
    pub fn rule(&self, name: &str) -> Option<&RuleReport> {
        self.reports.iter().find(|report| report.rule == name)
    }

    /// 指定规则是否报告了该警告
    pub fn contains_warning(&self, rule: &str, warning: &str) -> bool {
        self.rule(rule)
            .map(|report| report.warnings.iter().any(|w| w == warning))
            .unwrap_or(false)
    }

    /// 警告总数
    pub fn warning_count(&self) -> usize {
        self.reports.iter().map(|report| report.warnings.len()).sum()
    }

    /// 序列化为 JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.reports)
    }
}

fn render_reports(reports: &[RuleReport]) -> String {
    let mut rendered = String::new();
    for report in reports {
        rendered.push_str(&format!("\nDiagnostics for {}:", report.rule));
        for warning in &report.warnings {
            rendered.push_str(&format!("\n  - {warning}"));
        }
    }
    rendered
}

/// 生命周期管理错误类型
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("释放失败 ({}): {}", .failures.len(), .failures.join("; "))]
    DisposalFailed { failures: Vec<String> },
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("{source}")]
    VerificationFailed {
        #[from]
        source: VerificationError,
    },

    #[error("生命周期错误: {source}")]
    LifecycleError {
        #[from]
        source: LifecycleError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type LifecycleResult<T> = Result<T, LifecycleError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn unregistered(name: &str) -> DependencyError {
        DependencyError::UnregisteredService {
            type_name: name.to_string(),
        }
    }

    #[test]
    fn test_root_cause_and_chain() {
        let error = DependencyError::DependencyResolutionFailed {
            type_name: "A".to_string(),
            dependency: "B".to_string(),
            source: Box::new(DependencyError::DependencyResolutionFailed {
                type_name: "B".to_string(),
                dependency: "C".to_string(),
                source: Box::new(unregistered("C")),
            }),
        };

        assert!(matches!(
            error.root_cause(),
            DependencyError::UnregisteredService { type_name } if type_name == "C"
        ));
        assert_eq!(error.resolution_chain(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_verification_error_rendering() {
        let error = VerificationError::new(vec![RuleReport::new(
            "LifestyleMismatch",
            vec!["Bah (Singleton) depends on Foo (Transient)".to_string()],
        )]);

        assert_eq!(
            error.to_string(),
            "容器验证失败:\nDiagnostics for LifestyleMismatch:\n  - Bah (Singleton) depends on Foo (Transient)"
        );
        assert_eq!(error.warning_count(), 1);
        assert!(error.contains_warning(
            "LifestyleMismatch",
            "Bah (Singleton) depends on Foo (Transient)"
        ));

        let json = error.to_json().unwrap();
        assert!(json.contains("\"rule\": \"LifestyleMismatch\""));
    }
}
