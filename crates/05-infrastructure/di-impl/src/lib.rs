//! # 依赖注入具体实现
//!
//! 提供 IoC 容器、生命周期作用域、组件目录与诊断规则的具体实现。
//!
//! ## 生命周期
//!
//! - `Transient` - 每次解析都创建新实例，容器不跟踪也不释放
//! - `Singleton` - 根容器内唯一，所有作用域共享
//! - `Scoped` - 每个作用域一个实例，在根容器上解析时与单例行为一致
//!
//! ## 示例
//!
//! ```
//! use di_abstractions::{Arguments, Injectable};
//! use di_impl::{ComponentCatalog, Container};
//! use infrastructure_common::{DependencyResult, Lifetime};
//!
//! struct Clock;
//!
//! impl Injectable for Clock {
//!     fn create(_arguments: &mut Arguments) -> DependencyResult<Self> {
//!         Ok(Clock)
//!     }
//! }
//!
//! let container = Container::new(ComponentCatalog::new().with::<Clock>());
//! container.register::<Clock>(Lifetime::Singleton).unwrap();
//!
//! let first = container.resolve::<Clock>().unwrap();
//! let second = container.resolve::<Clock>().unwrap();
//! assert!(std::sync::Arc::ptr_eq(&first, &second));
//! ```

pub mod catalog;
pub mod container;
pub mod contracts;
pub mod diagnostics;
pub mod registration;
pub mod scope;
pub mod strategy;

pub use catalog::{ComponentCatalog, ComponentDescriptor, DisposeProbe};
pub use container::Container;
pub use contracts::InterfaceRegistry;
pub use diagnostics::{
    AmbiguousLifestyles, CircularDependencyRule, DiagnosticEngine, DisposableTransientComponents,
    LifestyleMismatch, ShortCircuitedDependencies, TornLifestyles, UnregisteredDependencies,
};
pub use registration::{Registration, RegistrationStore};
pub use scope::LifetimeScope;
pub use strategy::ContainerKind;
