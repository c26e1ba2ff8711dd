//! IoC 容器
//!
//! [`Container`] 是根容器与子作用域共用的句柄。所有作用域共享根容器的注册表，
//! 单例缓存在根容器，作用域组件缓存在创建它们的作用域。

use crate::contracts::InterfaceRegistry;
use crate::diagnostics::DiagnosticEngine;
use crate::registration::RegistrationStore;
use crate::scope::LifetimeScope;
use crate::strategy::{ContainerKind, ResolveStrategy, RootStrategy, ScopeStrategy};
use di_abstractions::{
    Arguments, ComponentSource, ContainerConfig, DiagnosticContext, Instance, RegistrationInfo,
    ResolveContext, ResolveOptions, Resolver,
};
use infrastructure_common::{
    ContractId, DependencyError, DependencyResult, Lifetime, LifecycleError, LifecycleResult,
    RuleReport, TypeKey, VerificationError,
};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 根容器与全部作用域共享的注册状态
pub(crate) struct Registry {
    pub(crate) source: Arc<dyn ComponentSource>,
    pub(crate) config: ContainerConfig,
    pub(crate) store: Mutex<RegistrationStore>,
    pub(crate) contracts: RwLock<InterfaceRegistry>,
    pub(crate) diagnostics: DiagnosticEngine,
}

/// IoC 容器
///
/// 克隆得到的是同一个容器的另一个句柄。
#[derive(Clone)]
pub struct Container {
    registry: Arc<Registry>,
    scope: Arc<LifetimeScope>,
    strategy: Arc<dyn ResolveStrategy>,
}

impl Container {
    /// 使用默认配置创建根容器
    pub fn new<S: ComponentSource + 'static>(source: S) -> Self {
        Self::with_config(source, ContainerConfig::default())
    }

    /// 使用指定配置创建根容器
    pub fn with_config<S: ComponentSource + 'static>(source: S, config: ContainerConfig) -> Self {
        Self::from_source(Arc::new(source), config)
    }

    /// 从共享的元数据来源创建根容器
    pub fn from_source(source: Arc<dyn ComponentSource>, config: ContainerConfig) -> Self {
        let diagnostics = DiagnosticEngine::from_config(&config);
        Self::with_diagnostics(source, config, diagnostics)
    }

    /// 使用自定义诊断引擎创建根容器
    pub fn with_diagnostics(
        source: Arc<dyn ComponentSource>,
        config: ContainerConfig,
        diagnostics: DiagnosticEngine,
    ) -> Self {
        let container = Self {
            registry: Arc::new(Registry {
                source,
                config,
                store: Mutex::new(RegistrationStore::new()),
                contracts: RwLock::new(InterfaceRegistry::new()),
                diagnostics,
            }),
            scope: Arc::new(LifetimeScope::root()),
            strategy: Arc::new(RootStrategy),
        };
        info!("创建容器: {}", container.name());
        container
    }

    /// 容器类型
    pub fn kind(&self) -> ContainerKind {
        self.strategy.kind()
    }

    /// 容器ID
    pub fn id(&self) -> Uuid {
        self.scope.id()
    }

    /// 容器名称
    pub fn name(&self) -> &str {
        self.scope.name()
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.registry.config
    }

    /// 当前作用域状态
    pub fn scope(&self) -> &LifetimeScope {
        &self.scope
    }

    /// 是否已释放
    pub fn is_disposed(&self) -> bool {
        self.scope.is_disposed()
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn source(&self) -> &dyn ComponentSource {
        self.registry.source.as_ref()
    }

    /// 注册组件
    pub fn register<T: Send + Sync + 'static>(&self, lifetime: Lifetime) -> DependencyResult<()> {
        self.register_key(TypeKey::of::<T>(), lifetime)
    }

    /// 注册单例组件
    pub fn register_singleton<T: Send + Sync + 'static>(&self) -> DependencyResult<()> {
        self.register::<T>(Lifetime::Singleton)
    }

    /// 注册作用域组件
    pub fn register_scoped<T: Send + Sync + 'static>(&self) -> DependencyResult<()> {
        self.register::<T>(Lifetime::Scoped)
    }

    /// 注册瞬时组件
    pub fn register_transient<T: Send + Sync + 'static>(&self) -> DependencyResult<()> {
        self.register::<T>(Lifetime::Transient)
    }

    /// 按类型标识注册组件
    pub fn register_key(&self, key: TypeKey, lifetime: Lifetime) -> DependencyResult<()> {
        self.register_key_implementing(key, lifetime, Vec::new())
    }

    /// 注册组件，并额外声明它实现的契约
    pub fn register_implementing<T: Send + Sync + 'static>(
        &self,
        lifetime: Lifetime,
        contracts: impl IntoIterator<Item = ContractId>,
    ) -> DependencyResult<()> {
        self.register_key_implementing(TypeKey::of::<T>(), lifetime, contracts.into_iter().collect())
    }

    /// 按类型标识注册组件，`extra` 与类型自身声明的契约合并
    ///
    /// 契约不合法时返回错误，注册表保持不变
    pub fn register_key_implementing(
        &self,
        key: TypeKey,
        lifetime: Lifetime,
        extra: Vec<ContractId>,
    ) -> DependencyResult<()> {
        self.ensure_live()?;
        if self.kind() == ContainerKind::Scope {
            return Err(DependencyError::RegistrationError {
                type_name: key.name().to_string(),
                message: format!("作用域 {} 不接受注册", self.name()),
            });
        }

        let mut contracts = self.registry.source.get_declared_contracts(&key)?;
        for contract in extra {
            if !contract.is_well_formed() {
                return Err(DependencyError::InvalidContractMetadata {
                    type_name: key.name().to_string(),
                    message: format!("契约名称不合法: {contract:?}"),
                });
            }
            if !contracts.contains(&contract) {
                contracts.push(contract);
            }
        }

        let previous = self.registry.store.lock().register(key, lifetime);
        match previous {
            Some(previous) if previous != lifetime => {
                warn!("组件 {} 的生命周期由 {} 改为 {}", key, previous, lifetime);
            }
            Some(_) => debug!("重复注册组件: {} ({})", key, lifetime),
            None => info!("注册组件: {} ({})", key, lifetime),
        }

        let mut registry = self.registry.contracts.write();
        for contract in contracts {
            if registry.add(contract.clone(), key) {
                debug!("组件 {} 实现契约 {}", key, contract);
            }
        }
        Ok(())
    }

    /// 类型是否已注册
    pub fn is_registered<T: Send + Sync + 'static>(&self) -> bool {
        self.is_registered_key(&TypeKey::of::<T>())
    }

    /// 类型标识是否已注册
    pub fn is_registered_key(&self, key: &TypeKey) -> bool {
        self.registry.store.lock().contains(key)
    }

    /// 类型的生命周期
    pub fn lifetime_of(&self, key: &TypeKey) -> Option<Lifetime> {
        self.registry.store.lock().lifetime_of(key)
    }

    /// 当前注册表快照，按注册顺序
    pub fn registrations(&self) -> Vec<RegistrationInfo> {
        self.registry.store.lock().snapshot()
    }

    /// 注册调用历史
    pub fn registration_history(&self) -> Vec<RegistrationInfo> {
        self.registry.store.lock().history()
    }

    /// 契约的实现类型，按注册顺序
    pub fn implementers(&self, contract: &ContractId) -> Vec<TypeKey> {
        self.registry.contracts.read().implementers(contract)
    }

    /// 类型实现的契约
    pub fn contracts_of(&self, key: &TypeKey) -> Vec<ContractId> {
        self.registry.contracts.read().contracts_of(key)
    }

    /// 解析组件
    pub fn resolve<T: Send + Sync + 'static>(&self) -> DependencyResult<Arc<T>> {
        self.resolve_key(&TypeKey::of::<T>())?
            .downcast::<T>()
            .map_err(|_| DependencyError::TypeMismatch {
                expected: std::any::type_name::<T>().to_string(),
            })
    }

    /// 按类型标识解析组件
    pub fn resolve_key(&self, key: &TypeKey) -> DependencyResult<Instance> {
        debug!("解析组件: {} ({})", key, self.name());
        let mut context = ResolveContext::with_options(self.registry.config.resolve_options());
        self.resolve_in(key, &mut context)
    }

    /// 只解析已注册的类型，依赖链上遇到未注册的类型时失败而不自动注册
    pub fn resolve_registered(&self, key: &TypeKey) -> DependencyResult<Instance> {
        let options = ResolveOptions {
            auto_register: false,
            ..self.registry.config.resolve_options()
        };
        let mut context = ResolveContext::with_options(options);
        self.resolve_in(key, &mut context)
    }

    /// 按注册顺序解析契约的全部实现，未知契约返回空列表
    pub fn resolve_all(&self, contract: &ContractId) -> DependencyResult<Vec<Instance>> {
        self.implementers(contract)
            .iter()
            .map(|key| self.resolve_key(key))
            .collect()
    }

    pub(crate) fn resolve_in(
        &self,
        key: &TypeKey,
        context: &mut ResolveContext,
    ) -> DependencyResult<Instance> {
        self.ensure_live()?;
        let lifetime = self.lookup_lifetime(key, context)?;
        self.strategy.resolve(self, key, lifetime, context)
    }

    fn lookup_lifetime(&self, key: &TypeKey, context: &ResolveContext) -> DependencyResult<Lifetime> {
        let mut store = self.registry.store.lock();
        if let Some(lifetime) = store.lifetime_of(key) {
            return Ok(lifetime);
        }

        if context.options.auto_register && self.registry.source.can_activate(key) {
            debug!("自动注册组件: {} (Transient)", key);
            return Ok(store.auto_register(*key));
        }

        Err(DependencyError::UnregisteredService {
            type_name: key.name().to_string(),
        })
    }

    /// 解析构造参数并创建实例
    pub(crate) fn construct(
        &self,
        key: &TypeKey,
        context: &mut ResolveContext,
    ) -> DependencyResult<Instance> {
        context.push_type(*key)?;
        let result = self.construct_with_dependencies(key, context);
        context.pop_type();
        result
    }

    fn construct_with_dependencies(
        &self,
        key: &TypeKey,
        context: &mut ResolveContext,
    ) -> DependencyResult<Instance> {
        let dependencies = self.registry.source.get_dependencies(key);
        let mut values = Vec::with_capacity(dependencies.len());

        for dependency in &dependencies {
            match self.resolve_in(&dependency.key, context) {
                Ok(instance) => values.push(Some(instance)),
                Err(DependencyError::UnregisteredService { .. }) if dependency.optional => {
                    debug!("可选依赖 {} 无法解析, {} 将收到空值", dependency.key, key);
                    values.push(None);
                }
                Err(e) => {
                    return Err(DependencyError::DependencyResolutionFailed {
                        type_name: key.name().to_string(),
                        dependency: dependency.key.name().to_string(),
                        source: Box::new(e),
                    });
                }
            }
        }

        debug!("创建组件实例: {}", key);
        self.registry
            .source
            .activate(key, Arguments::new(*key, values))
    }

    fn ensure_live(&self) -> DependencyResult<()> {
        if self.is_disposed() {
            return Err(DependencyError::ContainerDisposed {
                container: self.name().to_string(),
            });
        }
        Ok(())
    }

    /// 创建子作用域
    ///
    /// 在已释放的容器上创建的作用域同样处于已释放状态
    pub fn create_scope(&self) -> Container {
        let scope = Arc::new(self.scope.child());
        if self.is_disposed() {
            warn!("容器 {} 已释放, 新作用域 {} 不可用", self.name(), scope.name());
            scope.begin_dispose();
        } else {
            self.scope.attach_child(scope.clone());
            debug!("创建作用域: {}", scope.name());
        }

        Container {
            registry: self.registry.clone(),
            scope,
            strategy: Arc::new(ScopeStrategy {
                parent: self.clone(),
            }),
        }
    }

    /// 释放容器
    ///
    /// 先释放全部子作用域，再按缓存的逆序释放实例。重复调用不做任何事。
    /// 单个实例释放失败不会中断其余实例的释放，失败信息汇总在返回的错误中。
    pub fn dispose(&self) -> LifecycleResult<()> {
        if !self.scope.begin_dispose() {
            debug!("容器 {} 已释放, 忽略", self.name());
            return Ok(());
        }

        info!("释放容器: {}", self.name());
        let failures = self.strategy.dispose(self);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(LifecycleError::DisposalFailed { failures })
        }
    }

    /// 执行诊断规则，返回有警告的规则报告
    pub fn diagnose(&self) -> Vec<RuleReport> {
        let registrations = self.registrations();
        let history = self.registration_history();
        let context = DiagnosticContext::new(&registrations, &history, self.source(), self)
            .with_auto_registration(self.registry.config.enable_auto_registration);
        self.registry.diagnostics.run(&context)
    }

    /// 验证容器配置，任何规则报告问题时返回全部报告
    pub fn verify(&self) -> Result<(), VerificationError> {
        let reports = self.diagnose();
        if reports.is_empty() {
            info!("容器验证通过: {}", self.name());
            return Ok(());
        }

        let error = VerificationError::new(reports);
        warn!("容器验证失败, 共 {} 条警告", error.warning_count());
        Err(error)
    }
}

impl Resolver for Container {
    fn resolve_key(&self, key: &TypeKey) -> DependencyResult<Instance> {
        Container::resolve_key(self, key)
    }

    fn resolve_contract(&self, contract: &ContractId) -> DependencyResult<Vec<Instance>> {
        self.resolve_all(contract)
    }

    fn create_child_scope(&self) -> Box<dyn Resolver> {
        Box::new(self.create_scope())
    }

    fn dispose_scope(&self) -> LifecycleResult<()> {
        self.dispose()
    }

    fn resolve_registered(&self, key: &TypeKey) -> DependencyResult<Instance> {
        Container::resolve_registered(self, key)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("kind", &self.kind())
            .field("scope", &self.scope)
            .field("registrations", &self.registry.store.lock().len())
            .finish()
    }
}
