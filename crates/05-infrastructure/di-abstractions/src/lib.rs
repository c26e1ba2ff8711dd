//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义容器与外部协作者之间的接口。
//!
//! ## 核心接口
//!
//! - [`DependencyProvider`] - 构造参数提供者
//! - [`ContractProvider`] - 契约声明提供者
//! - [`ComponentActivator`] - 组件激活与释放能力探测
//! - [`Resolver`] - 组件解析器
//! - [`DiagnosticRule`] - 诊断规则

pub mod container;
pub mod diagnostic;
pub mod dispose;
pub mod factory;
pub mod provider;
pub mod resolver;

pub use container::*;
pub use diagnostic::*;
pub use dispose::*;
pub use factory::*;
pub use provider::*;
pub use resolver::*;
