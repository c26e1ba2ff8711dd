//! 解析策略
//!
//! 根容器与作用域共享同一套注册表，只在实例缓存位置和释放范围上不同。

use crate::container::Container;
use crate::scope::release_instance;
use di_abstractions::{Instance, ResolveContext};
use infrastructure_common::{DependencyResult, Lifetime, TypeKey};
use tracing::{debug, trace};

/// 容器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// 根容器
    Root,
    /// 子作用域
    Scope,
}

/// 解析策略 trait
pub(crate) trait ResolveStrategy: Send + Sync {
    /// 容器类型
    fn kind(&self) -> ContainerKind;

    /// 按生命周期解析已注册的类型
    fn resolve(
        &self,
        container: &Container,
        key: &TypeKey,
        lifetime: Lifetime,
        context: &mut ResolveContext,
    ) -> DependencyResult<Instance>;

    /// 释放容器持有的实例，返回释放失败的描述
    fn dispose(&self, container: &Container) -> Vec<String>;
}

/// 根容器策略
///
/// 单例与作用域组件都缓存在注册表中
pub(crate) struct RootStrategy;

impl ResolveStrategy for RootStrategy {
    fn kind(&self) -> ContainerKind {
        ContainerKind::Root
    }

    fn resolve(
        &self,
        container: &Container,
        key: &TypeKey,
        lifetime: Lifetime,
        context: &mut ResolveContext,
    ) -> DependencyResult<Instance> {
        if !lifetime.is_cacheable() {
            return container.construct(key, context);
        }

        let cached = container.registry().store.lock().cached_instance(key);
        if let Some(instance) = cached {
            trace!("命中根容器缓存: {}", key);
            return Ok(instance);
        }

        let instance = container.construct(key, context)?;
        Ok(container.registry().store.lock().cache_instance(key, instance))
    }

    fn dispose(&self, container: &Container) -> Vec<String> {
        let registry = container.registry();
        let source = registry.source.as_ref();
        let mut failures = Vec::new();

        container.scope().dispose_children(source, &mut failures);

        let instances = registry.store.lock().take_instances();
        debug!("根容器释放 {} 个缓存实例", instances.len());
        for (key, instance) in instances.iter().rev() {
            release_instance(source, key, instance, &mut failures);
        }

        registry.store.lock().clear();
        registry.contracts.write().clear();
        failures
    }
}

/// 作用域策略
///
/// 作用域组件缓存在当前作用域，其余生命周期交给父容器
pub(crate) struct ScopeStrategy {
    pub(crate) parent: Container,
}

impl ResolveStrategy for ScopeStrategy {
    fn kind(&self) -> ContainerKind {
        ContainerKind::Scope
    }

    fn resolve(
        &self,
        container: &Container,
        key: &TypeKey,
        lifetime: Lifetime,
        context: &mut ResolveContext,
    ) -> DependencyResult<Instance> {
        if lifetime != Lifetime::Scoped {
            return self.parent.resolve_in(key, context);
        }

        let cached = container.scope().cached(key);
        if let Some(instance) = cached {
            trace!("命中作用域缓存: {} ({})", key, container.name());
            return Ok(instance);
        }

        let instance = container.construct(key, context)?;
        Ok(container.scope().cache_instance(*key, instance))
    }

    fn dispose(&self, container: &Container) -> Vec<String> {
        let source = container.registry().source.as_ref();
        let mut failures = Vec::new();

        container.scope().dispose_children(source, &mut failures);
        container.scope().release_cache(source, &mut failures);
        self.parent.scope().detach_child(container.scope().id());
        failures
    }
}
