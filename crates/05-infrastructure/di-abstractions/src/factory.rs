//! 组件工厂抽象接口
//!
//! 组件通过 [`Injectable`] 显式声明构造参数与契约，替代运行时反射

use crate::provider::{Arguments, Dependency, Instance};
use infrastructure_common::{ContractId, DependencyResult};
use std::sync::Arc;

/// 可注入组件 trait
pub trait Injectable: Send + Sync + Sized + 'static {
    /// 构造参数类型列表，按声明顺序
    fn dependencies() -> Vec<Dependency> {
        Vec::new()
    }

    /// 组件实现的契约
    fn contracts() -> Vec<ContractId> {
        Vec::new()
    }

    /// 使用已解析的参数创建组件实例
    fn create(arguments: &mut Arguments) -> DependencyResult<Self>;
}

/// 组件工厂函数类型
pub type ComponentFactoryFn = Arc<dyn Fn(&mut Arguments) -> DependencyResult<Instance> + Send + Sync>;

/// 为 [`Injectable`] 组件生成工厂函数
pub fn injectable_factory<T: Injectable>() -> ComponentFactoryFn {
    Arc::new(|arguments: &mut Arguments| {
        let component = T::create(arguments)?;
        Ok(Arc::new(component) as Instance)
    })
}
