//! 组件目录
//!
//! 显式声明的组件元数据：构造参数、契约、工厂与释放能力。
//! 容器通过 [`ComponentSource`](di_abstractions::ComponentSource) 查询它。

use di_abstractions::{
    injectable_factory, Arguments, ComponentActivator, ComponentFactoryFn, ContractProvider,
    Dependency, DependencyProvider, Dispose, Injectable, Instance,
};
use infrastructure_common::{ContractId, DependencyError, DependencyResult, TypeKey};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// 释放能力探测函数
pub type DisposeProbe = fn(&Instance) -> Option<&dyn Dispose>;

fn probe_dispose<T: Dispose>(instance: &Instance) -> Option<&dyn Dispose> {
    instance
        .downcast_ref::<T>()
        .map(|component| component as &dyn Dispose)
}

/// 组件描述符
#[derive(Clone)]
pub struct ComponentDescriptor {
    key: TypeKey,
    dependencies: Vec<Dependency>,
    contracts: Vec<ContractId>,
    factory: ComponentFactoryFn,
    dispose_probe: Option<DisposeProbe>,
}

impl ComponentDescriptor {
    /// 使用工厂函数创建描述符
    pub fn new(key: TypeKey, factory: ComponentFactoryFn) -> Self {
        Self {
            key,
            dependencies: Vec::new(),
            contracts: Vec::new(),
            factory,
            dispose_probe: None,
        }
    }

    /// 从 [`Injectable`] 组件创建描述符
    pub fn injectable<T: Injectable>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            dependencies: T::dependencies(),
            contracts: T::contracts(),
            factory: injectable_factory::<T>(),
            dispose_probe: None,
        }
    }

    /// 追加构造参数
    pub fn depends_on(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// 追加实现的契约
    pub fn implementing(mut self, contract: impl Into<ContractId>) -> Self {
        self.contracts.push(contract.into());
        self
    }

    /// 声明实例可以被释放
    pub fn disposable<T: Dispose>(mut self) -> Self {
        self.dispose_probe = Some(probe_dispose::<T>);
        self
    }

    /// 组件类型
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// 构造参数
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// 声明的契约
    pub fn contracts(&self) -> &[ContractId] {
        &self.contracts
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("key", &self.key)
            .field("dependencies", &self.dependencies)
            .field("contracts", &self.contracts)
            .field("disposable", &self.dispose_probe.is_some())
            .field("factory", &"<function>")
            .finish()
    }
}

/// 组件目录
#[derive(Debug, Clone, Default)]
pub struct ComponentCatalog {
    descriptors: HashMap<TypeKey, ComponentDescriptor>,
}

impl ComponentCatalog {
    /// 创建空目录
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加组件
    pub fn with<T: Injectable>(mut self) -> Self {
        self.add_descriptor(ComponentDescriptor::injectable::<T>());
        self
    }

    /// 添加可释放组件
    pub fn with_disposable<T: Injectable + Dispose>(mut self) -> Self {
        self.add_descriptor(ComponentDescriptor::injectable::<T>().disposable::<T>());
        self
    }

    /// 添加描述符
    pub fn with_descriptor(mut self, descriptor: ComponentDescriptor) -> Self {
        self.add_descriptor(descriptor);
        self
    }

    /// 添加描述符，返回被替换的旧描述符
    pub fn add_descriptor(&mut self, descriptor: ComponentDescriptor) -> Option<ComponentDescriptor> {
        debug!("目录添加组件: {}", descriptor.key);
        self.descriptors.insert(descriptor.key, descriptor)
    }

    /// 获取描述符
    pub fn descriptor(&self, key: &TypeKey) -> Option<&ComponentDescriptor> {
        self.descriptors.get(key)
    }

    /// 是否包含组件
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.descriptors.contains_key(key)
    }

    /// 组件数量
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl DependencyProvider for ComponentCatalog {
    fn get_dependencies(&self, key: &TypeKey) -> Vec<Dependency> {
        self.descriptors
            .get(key)
            .map(|descriptor| descriptor.dependencies.clone())
            .unwrap_or_default()
    }
}

impl ContractProvider for ComponentCatalog {
    fn get_declared_contracts(&self, key: &TypeKey) -> DependencyResult<Vec<ContractId>> {
        let Some(descriptor) = self.descriptors.get(key) else {
            return Ok(Vec::new());
        };

        let mut seen = HashSet::new();
        for contract in &descriptor.contracts {
            if !contract.is_well_formed() {
                return Err(DependencyError::InvalidContractMetadata {
                    type_name: key.name().to_string(),
                    message: format!("契约名称不合法: {contract:?}"),
                });
            }
            if !seen.insert(contract) {
                return Err(DependencyError::InvalidContractMetadata {
                    type_name: key.name().to_string(),
                    message: format!("契约重复声明: {contract}"),
                });
            }
        }

        Ok(descriptor.contracts.clone())
    }
}

impl ComponentActivator for ComponentCatalog {
    fn can_activate(&self, key: &TypeKey) -> bool {
        self.descriptors.contains_key(key)
    }

    fn activate(&self, key: &TypeKey, mut arguments: Arguments) -> DependencyResult<Instance> {
        let descriptor = self
            .descriptors
            .get(key)
            .ok_or_else(|| DependencyError::UnregisteredService {
                type_name: key.name().to_string(),
            })?;

        (descriptor.factory)(&mut arguments).map_err(|error| DependencyError::ComponentCreationFailed {
            type_name: key.name().to_string(),
            source: Box::new(error),
        })
    }

    fn is_disposable(&self, key: &TypeKey) -> bool {
        self.descriptors
            .get(key)
            .map(|descriptor| descriptor.dispose_probe.is_some())
            .unwrap_or(false)
    }

    fn as_disposable<'a>(&self, key: &TypeKey, instance: &'a Instance) -> Option<&'a dyn Dispose> {
        let probe = self.descriptors.get(key)?.dispose_probe?;
        probe(instance)
    }
}
