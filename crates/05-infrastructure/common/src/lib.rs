//! # Infrastructure Common
//!
//! 这个 crate 提供了 Lorn IoC 容器各层共享的基础类型。
//!
//! ## 核心类型
//!
//! - [`TypeKey`] - 类型标识（按身份比较，名称仅用于展示）
//! - [`ContractId`] - 契约标识
//! - [`Lifetime`] - 组件生命周期
//! - [`DependencyError`] / [`VerificationError`] - 解析与验证错误

pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
