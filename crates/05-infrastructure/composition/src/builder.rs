//! 容器构建器

use di_abstractions::{ContainerConfig, Dispose, Injectable};
use di_impl::{ComponentCatalog, ComponentDescriptor, Container};
use infrastructure_common::{
    ConfigError, ConfigResult, ContractId, InfrastructureError, InfrastructureResult, Lifetime,
    TypeKey,
};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// 容器配置所在的配置节
pub const CONTAINER_SECTION: &str = "container";

/// 配置源
#[derive(Debug, Clone)]
enum ConfigSource {
    /// TOML 配置文件
    Toml(PathBuf),
    /// 带前缀的环境变量
    Environment(String),
}

/// 待执行的注册
#[derive(Debug, Clone)]
struct PendingRegistration {
    key: TypeKey,
    lifetime: Lifetime,
    contracts: Vec<ContractId>,
}

/// 容器构建器
///
/// 使用建造者模式组装组件目录、注册、配置源与日志，构建可用的根容器
pub struct ContainerBuilder {
    /// 组件目录
    catalog: ComponentCatalog,
    /// 注册列表，按调用顺序
    registrations: Vec<PendingRegistration>,
    /// 配置源列表，后添加的覆盖先添加的
    config_sources: Vec<ConfigSource>,
    /// 没有配置源时使用的配置
    config: ContainerConfig,
    /// 构建时是否执行验证
    verify_on_build: bool,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl ContainerBuilder {
    /// 创建新的容器构建器
    pub fn new() -> Self {
        Self {
            catalog: ComponentCatalog::new(),
            registrations: Vec::new(),
            config_sources: Vec::new(),
            config: ContainerConfig::default(),
            verify_on_build: true,
            logging_enabled: false,
            logging_config: LoggingConfig::default(),
        }
    }

    /// 使用已有的组件目录
    pub fn with_catalog(mut self, catalog: ComponentCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// 向目录添加组件
    pub fn add_component<T: Injectable>(mut self) -> Self {
        self.catalog = self.catalog.with::<T>();
        self
    }

    /// 向目录添加可释放组件
    pub fn add_disposable_component<T: Injectable + Dispose>(mut self) -> Self {
        self.catalog = self.catalog.with_disposable::<T>();
        self
    }

    /// 向目录添加描述符
    pub fn add_descriptor(mut self, descriptor: ComponentDescriptor) -> Self {
        self.catalog.add_descriptor(descriptor);
        self
    }

    /// 注册组件
    pub fn register<T: Send + Sync + 'static>(self, lifetime: Lifetime) -> Self {
        self.register_implementing::<T>(lifetime, Vec::new())
    }

    /// 注册组件并声明额外的契约
    pub fn register_implementing<T: Send + Sync + 'static>(
        mut self,
        lifetime: Lifetime,
        contracts: impl IntoIterator<Item = ContractId>,
    ) -> Self {
        let key = TypeKey::of::<T>();
        debug!("添加注册: {} ({})", key, lifetime);
        self.registrations.push(PendingRegistration {
            key,
            lifetime,
            contracts: contracts.into_iter().collect(),
        });
        self
    }

    /// 直接指定容器配置（没有配置源时生效）
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// 添加 TOML 配置文件
    pub fn add_config_toml<P: AsRef<Path>>(mut self, path: P) -> Result<Self, InfrastructureError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        info!("添加 TOML 配置文件: {}", path.display());
        self.config_sources
            .push(ConfigSource::Toml(path.to_path_buf()));
        Ok(self)
    }

    /// 添加环境变量配置源
    ///
    /// 例如前缀为 `LORN` 时，`LORN_CONTAINER__MAX_RESOLUTION_DEPTH=50`
    /// 对应 `container.max_resolution_depth`
    pub fn add_config_env_vars<S: Into<String>>(mut self, prefix: S) -> Self {
        let prefix = prefix.into();
        info!("添加环境变量配置源，前缀: {}", prefix);
        self.config_sources.push(ConfigSource::Environment(prefix));
        self
    }

    /// 构建时是否执行验证
    pub fn verify_on_build(mut self, enabled: bool) -> Self {
        self.verify_on_build = enabled;
        self
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true;
        self
    }

    /// 从配置源加载容器配置
    ///
    /// 没有配置源时返回直接指定的配置；配置源中缺少 `container` 节时使用默认值
    pub fn load_config(&self) -> InfrastructureResult<ContainerConfig> {
        let config = if self.config_sources.is_empty() {
            self.config.clone()
        } else {
            self.bind_sources()?
        };
        validate_config(&config)?;
        Ok(config)
    }

    fn bind_sources(&self) -> InfrastructureResult<ContainerConfig> {
        let mut builder = config::Config::builder();
        for source in &self.config_sources {
            builder = match source {
                ConfigSource::Toml(path) => builder.add_source(
                    config::File::from(path.as_path())
                        .format(config::FileFormat::Toml)
                        .required(true),
                ),
                ConfigSource::Environment(prefix) => builder.add_source(
                    config::Environment::with_prefix(prefix)
                        .prefix_separator("_")
                        .separator("__")
                        .try_parsing(true)
                        .list_separator(",")
                        .with_list_parse_key("container.disabled_rules"),
                ),
            };
        }

        let settings = builder.build().map_err(|e| {
            error!("配置构建失败: {}", e);
            ConfigError::ParseError {
                source: Box::new(e),
            }
        })?;

        match settings.get::<ContainerConfig>(CONTAINER_SECTION) {
            Ok(config) => {
                debug!("配置绑定成功: {}", CONTAINER_SECTION);
                Ok(config)
            }
            Err(config::ConfigError::NotFound(_)) => {
                debug!("未找到配置节 {}, 使用默认配置", CONTAINER_SECTION);
                Ok(ContainerConfig::default())
            }
            Err(e) => {
                error!("配置绑定失败: path={}, error={}", CONTAINER_SECTION, e);
                Err(ConfigError::TypeConversionError {
                    message: e.to_string(),
                }
                .into())
            }
        }
    }

    /// 构建容器
    pub fn build(self) -> InfrastructureResult<Container> {
        if self.logging_enabled {
            self.initialize_logging()?;
        }

        info!("开始构建容器");
        let config = self.load_config()?;
        let container = Container::with_config(self.catalog, config);

        let registration_count = self.registrations.len();
        for registration in self.registrations {
            container.register_key_implementing(
                registration.key,
                registration.lifetime,
                registration.contracts,
            )?;
        }

        if self.verify_on_build {
            if let Err(verification) = container.verify() {
                if let Err(e) = container.dispose() {
                    warn!("释放验证失败的容器时出错: {}", e);
                }
                return Err(verification.into());
            }
        }

        info!("构建容器完成，注册了 {} 个组件", registration_count);
        Ok(container)
    }

    /// 初始化日志系统
    fn initialize_logging(&self) -> Result<(), InfrastructureError> {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(self.logging_config.level)
            .with_target(self.logging_config.show_target)
            .with_thread_ids(self.logging_config.show_thread_ids)
            .with_file(self.logging_config.show_file)
            .with_line_number(self.logging_config.show_line_number);

        if self.logging_config.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        }
        .map_err(|e| InfrastructureError::BootstrapFailed {
            message: format!("日志初始化失败: {}", e),
        })?;

        info!("日志系统初始化完成");
        Ok(())
    }
}

/// 校验容器配置
fn validate_config(config: &ContainerConfig) -> ConfigResult<()> {
    if config.max_resolution_depth == 0 {
        return Err(ConfigError::ValidationError {
            message: format!("{CONTAINER_SECTION}.max_resolution_depth 必须大于 0"),
        });
    }
    Ok(())
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }
}
