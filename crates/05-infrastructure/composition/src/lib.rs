//! # 基础设施组合层
//!
//! 将组件目录、配置源与日志组合成一个可用的 IoC 根容器。
//!
//! ## 主要功能
//!
//! - **容器构建器**: 使用构建者模式组装组件与注册
//! - **配置源管理**: TOML 文件与环境变量分层加载 `container` 配置节
//! - **日志初始化**: 开发与生产两套 `tracing-subscriber` 预设
//! - **构建时验证**: 默认在构建完成前执行全部诊断规则
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use di_abstractions::{Arguments, Injectable};
//! use infrastructure_common::{DependencyResult, Lifetime};
//! use infrastructure_composition::{ContainerBuilder, LoggingConfig};
//!
//! struct Clock;
//!
//! impl Injectable for Clock {
//!     fn create(_arguments: &mut Arguments) -> DependencyResult<Self> {
//!         Ok(Clock)
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let container = ContainerBuilder::new()
//!         .add_component::<Clock>()
//!         .register::<Clock>(Lifetime::Singleton)
//!         .add_config_toml("config/container.toml")?
//!         .add_config_env_vars("LORN")
//!         .with_logging(LoggingConfig::development())
//!         .build()?;
//!
//!     let clock = container.resolve::<Clock>()?;
//!     # let _ = clock;
//!     container.dispose()?;
//!     Ok(())
//! }
//! ```

pub mod builder;

#[cfg(test)]
mod tests;

pub use builder::{ContainerBuilder, LoggingConfig, CONTAINER_SECTION};

// 重新导出错误类型
pub use infrastructure_common::InfrastructureError;
