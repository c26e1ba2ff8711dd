//! 组件解析器抽象接口
//!
//! 提供依赖解析和组件实例化的能力

use crate::provider::Instance;
use infrastructure_common::{
    ContractId, DependencyError, DependencyResult, LifecycleResult, TypeKey,
};
use std::sync::Arc;

/// 组件解析器 trait
///
/// 根容器与作用域都实现此 trait，诊断规则通过它做实例身份检查
pub trait Resolver: Send + Sync {
    /// 解析指定类型的组件
    fn resolve_key(&self, key: &TypeKey) -> DependencyResult<Instance>;

    /// 按注册顺序解析契约的全部实现
    fn resolve_contract(&self, contract: &ContractId) -> DependencyResult<Vec<Instance>>;

    /// 创建子作用域
    fn create_child_scope(&self) -> Box<dyn Resolver>;

    /// 释放当前容器或作用域
    fn dispose_scope(&self) -> LifecycleResult<()>;

    /// 只解析已注册的类型，依赖图中未注册的类型不会被自动注册
    fn resolve_registered(&self, key: &TypeKey) -> DependencyResult<Instance> {
        self.resolve_key(key)
    }
}

/// 带类型转换的解析扩展
pub trait ResolverExt: Resolver {
    /// 解析并转换为具体类型
    fn resolve_as<T: Send + Sync + 'static>(&self) -> DependencyResult<Arc<T>> {
        self.resolve_key(&TypeKey::of::<T>())?
            .downcast::<T>()
            .map_err(|_| DependencyError::TypeMismatch {
                expected: std::any::type_name::<T>().to_string(),
            })
    }
}

impl<R: Resolver + ?Sized> ResolverExt for R {}

/// 两个实例是否为同一对象
pub fn same_instance(left: &Instance, right: &Instance) -> bool {
    std::ptr::eq(
        Arc::as_ptr(left) as *const (),
        Arc::as_ptr(right) as *const (),
    )
}

/// 解析上下文
///
/// 记录当前解析链，用于在递归解析时发现循环依赖与过深的依赖图
#[derive(Debug, Clone)]
pub struct ResolveContext {
    /// 当前解析链
    pub resolution_chain: Vec<TypeKey>,
    /// 解析选项
    pub options: ResolveOptions,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub fn new() -> Self {
        Self::with_options(ResolveOptions::default())
    }

    /// 使用指定选项创建解析上下文
    pub fn with_options(options: ResolveOptions) -> Self {
        Self {
            resolution_chain: Vec::new(),
            options,
        }
    }

    /// 添加类型到解析链
    pub fn push_type(&mut self, key: TypeKey) -> DependencyResult<()> {
        if self.options.detect_cycles && self.resolution_chain.contains(&key) {
            return Err(DependencyError::CircularDependency {
                dependency_chain: self.render_chain(key),
            });
        }
        if self.resolution_chain.len() >= self.options.max_depth {
            return Err(DependencyError::ResolutionDepthExceeded {
                type_name: key.name().to_string(),
                max_depth: self.options.max_depth,
            });
        }
        self.resolution_chain.push(key);
        Ok(())
    }

    /// 从解析链中移除类型
    pub fn pop_type(&mut self) {
        self.resolution_chain.pop();
    }

    /// 当前解析深度
    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }

    fn render_chain(&self, closing: TypeKey) -> String {
        self.resolution_chain
            .iter()
            .chain(std::iter::once(&closing))
            .map(|key| key.name())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 解析选项
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// 是否检测解析链上的循环
    pub detect_cycles: bool,
    /// 最大递归深度
    pub max_depth: usize,
    /// 是否自动注册未注册但可构造的类型
    pub auto_register: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            detect_cycles: true,
            max_depth: 100,
            auto_register: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;

    #[test]
    fn test_push_type_detects_cycle() {
        let mut context = ResolveContext::new();
        context.push_type(TypeKey::of::<A>()).unwrap();
        context.push_type(TypeKey::of::<B>()).unwrap();

        match context.push_type(TypeKey::of::<A>()) {
            Err(DependencyError::CircularDependency { dependency_chain }) => {
                assert_eq!(dependency_chain, "A -> B -> A");
            }
            other => panic!("期望循环依赖错误, 实际: {other:?}"),
        }
    }

    #[test]
    fn test_push_type_depth_limit() {
        let mut context = ResolveContext::with_options(ResolveOptions {
            detect_cycles: false,
            max_depth: 1,
            ..ResolveOptions::default()
        });
        context.push_type(TypeKey::of::<A>()).unwrap();
        assert!(matches!(
            context.push_type(TypeKey::of::<A>()),
            Err(DependencyError::ResolutionDepthExceeded { max_depth: 1, .. })
        ));

        context.pop_type();
        assert_eq!(context.depth(), 0);
    }

    #[test]
    fn test_same_instance() {
        let first: Instance = Arc::new(A);
        let second: Instance = Arc::new(A);
        assert!(same_instance(&first, &first.clone()));
        assert!(!same_instance(&first, &second));
    }
}
