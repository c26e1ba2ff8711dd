//! 诊断规则抽象接口
//!
//! 规则只读取注册信息快照；身份类规则额外通过 [`Resolver`] 做实际解析

use crate::provider::{ComponentSource, Dependency};
use crate::resolver::Resolver;
use infrastructure_common::{Lifetime, TypeKey};
use std::collections::HashMap;

/// 注册信息快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationInfo {
    /// 组件类型
    pub key: TypeKey,
    /// 生命周期
    pub lifetime: Lifetime,
}

impl RegistrationInfo {
    /// 创建注册信息
    pub fn new(key: TypeKey, lifetime: Lifetime) -> Self {
        Self { key, lifetime }
    }
}

/// 规则执行结果
pub type RuleResult = Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>>;

/// 诊断规则 trait
pub trait DiagnosticRule: Send + Sync {
    /// 规则名称
    fn name(&self) -> &'static str;

    /// 规则描述
    fn description(&self) -> &'static str;

    /// 执行规则，返回警告列表
    fn verify(&self, context: &DiagnosticContext<'_>) -> RuleResult;
}

/// 诊断上下文
pub struct DiagnosticContext<'a> {
    registrations: &'a [RegistrationInfo],
    history: &'a [RegistrationInfo],
    lifetimes: HashMap<TypeKey, Lifetime>,
    source: &'a dyn ComponentSource,
    resolver: &'a dyn Resolver,
    auto_registration: bool,
}

impl<'a> DiagnosticContext<'a> {
    /// 创建诊断上下文
    ///
    /// `registrations` 为当前注册表（按注册顺序），`history` 为每一次注册调用
    pub fn new(
        registrations: &'a [RegistrationInfo],
        history: &'a [RegistrationInfo],
        source: &'a dyn ComponentSource,
        resolver: &'a dyn Resolver,
    ) -> Self {
        let lifetimes = registrations
            .iter()
            .map(|registration| (registration.key, registration.lifetime))
            .collect();

        Self {
            registrations,
            history,
            lifetimes,
            source,
            resolver,
            auto_registration: true,
        }
    }

    /// 设置解析时是否会自动注册可构造的类型
    pub fn with_auto_registration(mut self, enabled: bool) -> Self {
        self.auto_registration = enabled;
        self
    }

    /// 当前注册表
    pub fn registrations(&self) -> &'a [RegistrationInfo] {
        self.registrations
    }

    /// 注册调用历史
    pub fn history(&self) -> &'a [RegistrationInfo] {
        self.history
    }

    /// 类型的生命周期，未注册时为 `None`
    pub fn lifetime_of(&self, key: &TypeKey) -> Option<Lifetime> {
        self.lifetimes.get(key).copied()
    }

    /// 类型是否已注册
    pub fn is_registered(&self, key: &TypeKey) -> bool {
        self.lifetimes.contains_key(key)
    }

    /// 类型的构造参数
    pub fn dependencies(&self, key: &TypeKey) -> Vec<Dependency> {
        self.source.get_dependencies(key)
    }

    /// 类型是否可以被构造
    pub fn can_activate(&self, key: &TypeKey) -> bool {
        self.source.can_activate(key)
    }

    /// 未注册的类型在解析时能否被自动注册
    pub fn can_auto_register(&self, key: &TypeKey) -> bool {
        self.auto_registration && self.source.can_activate(key)
    }

    /// 类型是否具备释放能力
    pub fn is_disposable(&self, key: &TypeKey) -> bool {
        self.source.is_disposable(key)
    }

    /// 用于实例身份检查的解析器
    pub fn resolver(&self) -> &'a dyn Resolver {
        self.resolver
    }
}
