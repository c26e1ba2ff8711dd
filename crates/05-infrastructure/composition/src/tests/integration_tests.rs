//! 容器构建器集成测试

use super::super::builder::{ContainerBuilder, LoggingConfig};
use di_abstractions::{Arguments, ContainerConfig, Dependency, Dispose, Injectable};
use infrastructure_common::{
    ConfigError, ContractId, DependencyResult, InfrastructureError, Lifetime,
};
use std::io::Write;
use std::sync::{Arc, Once};
use tempfile::NamedTempFile;

static INIT_LOGGER: Once = Once::new();

/// 初始化测试日志系统（只初始化一次）
fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .try_init()
            .ok();
    });
}

fn toml_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

struct Settings;

impl Injectable for Settings {
    fn create(_arguments: &mut Arguments) -> DependencyResult<Self> {
        Ok(Self)
    }
}

struct Gateway {
    settings: Arc<Settings>,
}

impl Injectable for Gateway {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::required::<Settings>()]
    }

    fn contracts() -> Vec<ContractId> {
        vec![ContractId::from_static("billing.Gateway")]
    }

    fn create(arguments: &mut Arguments) -> DependencyResult<Self> {
        Ok(Self {
            settings: arguments.next()?,
        })
    }
}

struct Pool;

impl Injectable for Pool {
    fn create(_arguments: &mut Arguments) -> DependencyResult<Self> {
        Ok(Self)
    }
}

impl Dispose for Pool {
    fn dispose(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err(anyhow::anyhow!("pool drained twice").into())
    }
}

/// 测试构建并解析
#[test]
fn test_build_and_resolve() {
    init_test_logger();
    let container = ContainerBuilder::new()
        .add_component::<Settings>()
        .add_component::<Gateway>()
        .register::<Settings>(Lifetime::Singleton)
        .register::<Gateway>(Lifetime::Singleton)
        .build()
        .expect("构建容器应该成功");

    let gateway = container.resolve::<Gateway>().unwrap();
    assert!(Arc::ptr_eq(
        &gateway.settings,
        &container.resolve::<Settings>().unwrap()
    ));
    assert_eq!(
        container
            .resolve_all(&ContractId::from_static("billing.Gateway"))
            .unwrap()
            .len(),
        1
    );
    assert_eq!(container.config(), &ContainerConfig::default());
}

/// 测试构建时验证
#[test]
fn test_build_fails_verification() {
    init_test_logger();
    let result = ContainerBuilder::new()
        .add_component::<Settings>()
        .add_component::<Gateway>()
        .register::<Settings>(Lifetime::Transient)
        .register::<Gateway>(Lifetime::Singleton)
        .build();

    match result {
        Err(InfrastructureError::VerificationFailed { source }) => {
            assert!(source.contains_warning(
                "LifestyleMismatch",
                "Gateway (Singleton) depends on Settings (Transient)"
            ));
        }
        Err(other) => panic!("期望验证失败, 实际: {other}"),
        Ok(_) => panic!("期望验证失败"),
    }
}

/// 测试关闭构建时验证
#[test]
fn test_build_without_verification() {
    init_test_logger();
    let container = ContainerBuilder::new()
        .add_disposable_component::<Pool>()
        .register::<Pool>(Lifetime::Transient)
        .verify_on_build(false)
        .build()
        .expect("关闭验证后构建应该成功");

    let diagnostics = container.diagnose();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].rule, "DisposableTransientComponents");
}

/// 测试释放失败会汇总到错误中
#[test]
fn test_dispose_reports_failures() {
    init_test_logger();
    let container = ContainerBuilder::new()
        .add_disposable_component::<Pool>()
        .register::<Pool>(Lifetime::Singleton)
        .build()
        .unwrap();
    container.resolve::<Pool>().unwrap();

    let error = InfrastructureError::from(container.dispose().unwrap_err());
    assert!(error.to_string().contains("pool drained twice"));
}

/// 测试从 TOML 文件加载配置
#[test]
fn test_load_config_from_toml() {
    init_test_logger();
    let file = toml_file(
        r#"
[container]
enable_auto_registration = false
max_resolution_depth = 16
disabled_rules = ["TornLifestyles", "AmbiguousLifestyles"]
"#,
    );

    let builder = ContainerBuilder::new()
        .add_config_toml(file.path())
        .expect("添加配置文件应该成功");
    let config = builder.load_config().unwrap();

    assert!(!config.enable_auto_registration);
    assert!(config.enable_resolution_guard);
    assert_eq!(config.max_resolution_depth, 16);
    assert!(!config.is_rule_enabled("TornLifestyles"));
    assert!(config.is_rule_enabled("LifestyleMismatch"));
}

/// 测试缺少配置节时使用默认值
#[test]
fn test_missing_section_uses_defaults() {
    init_test_logger();
    let file = toml_file(
        r#"
[server]
port = 8080
"#,
    );

    let config = ContainerBuilder::new()
        .add_config_toml(file.path())
        .unwrap()
        .load_config()
        .unwrap();
    assert_eq!(config, ContainerConfig::default());
}

/// 测试配置文件不存在
#[test]
fn test_missing_config_file() {
    let result = ContainerBuilder::new().add_config_toml("./does-not-exist/container.toml");
    assert!(matches!(
        result,
        Err(InfrastructureError::ConfigError {
            source: ConfigError::FileNotFound { .. }
        })
    ));
}

/// 测试解析深度为 0 的配置被拒绝
#[test]
fn test_zero_resolution_depth_rejected() {
    init_test_logger();
    let file = toml_file(
        r#"
[container]
max_resolution_depth = 0
"#,
    );

    let builder = ContainerBuilder::new().add_config_toml(file.path()).unwrap();
    assert!(matches!(
        builder.load_config(),
        Err(InfrastructureError::ConfigError {
            source: ConfigError::ValidationError { .. }
        })
    ));
    assert!(builder.build().is_err());
}

/// 测试配置值类型错误
#[test]
fn test_invalid_config_value() {
    init_test_logger();
    let file = toml_file(
        r#"
[container]
max_resolution_depth = "deep"
"#,
    );

    let result = ContainerBuilder::new()
        .add_config_toml(file.path())
        .unwrap()
        .load_config();
    assert!(matches!(
        result,
        Err(InfrastructureError::ConfigError {
            source: ConfigError::TypeConversionError { .. }
        })
    ));
}

/// 测试环境变量覆盖 TOML 配置
#[test]
fn test_env_vars_override_toml() {
    init_test_logger();
    let file = toml_file(
        r#"
[container]
max_resolution_depth = 16
"#,
    );
    std::env::set_var("LORNBUILDERTEST_CONTAINER__MAX_RESOLUTION_DEPTH", "42");
    std::env::set_var("LORNBUILDERTEST_CONTAINER__ENABLE_RESOLUTION_GUARD", "false");

    let config = ContainerBuilder::new()
        .add_config_toml(file.path())
        .unwrap()
        .add_config_env_vars("LORNBUILDERTEST")
        .load_config()
        .unwrap();

    std::env::remove_var("LORNBUILDERTEST_CONTAINER__MAX_RESOLUTION_DEPTH");
    std::env::remove_var("LORNBUILDERTEST_CONTAINER__ENABLE_RESOLUTION_GUARD");

    assert_eq!(config.max_resolution_depth, 42);
    assert!(!config.enable_resolution_guard);
}

/// 测试配置作用于构建出的容器
#[test]
fn test_loaded_config_applies_to_container() {
    init_test_logger();
    let file = toml_file(
        r#"
[container]
enable_auto_registration = false
"#,
    );

    let container = ContainerBuilder::new()
        .add_component::<Settings>()
        .add_config_toml(file.path())
        .unwrap()
        .build()
        .unwrap();

    assert!(container.resolve::<Settings>().is_err());
}

/// 测试日志预设
#[test]
fn test_logging_presets() {
    let development = LoggingConfig::development();
    assert_eq!(development.level, tracing::Level::DEBUG);
    assert!(!development.json_format);

    let production = LoggingConfig::production();
    assert_eq!(production.level, tracing::Level::INFO);
    assert!(production.json_format);
}
