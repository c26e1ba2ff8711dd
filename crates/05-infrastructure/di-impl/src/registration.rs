//! 组件注册表

use di_abstractions::{Instance, RegistrationInfo};
use infrastructure_common::{Lifetime, TypeKey};
use std::collections::HashMap;

/// 单个类型的注册信息
#[derive(Debug, Clone)]
pub struct Registration {
    /// 组件类型
    pub key: TypeKey,
    /// 生命周期
    pub lifetime: Lifetime,
    /// 根容器缓存的实例
    pub instance: Option<Instance>,
    /// 是否由解析时自动注册
    pub auto_registered: bool,
}

impl Registration {
    fn new(key: TypeKey, lifetime: Lifetime, auto_registered: bool) -> Self {
        Self {
            key,
            lifetime,
            instance: None,
            auto_registered,
        }
    }
}

/// 注册表
///
/// 每个类型最多一条注册，保留首次注册的顺序。
/// `history` 记录每一次显式注册调用，包括覆盖。
#[derive(Debug, Default)]
pub struct RegistrationStore {
    entries: HashMap<TypeKey, Registration>,
    order: Vec<TypeKey>,
    history: Vec<RegistrationInfo>,
}

impl RegistrationStore {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册类型，返回被覆盖的旧生命周期
    ///
    /// 覆盖时保留已缓存的实例，使其仍在容器释放时被释放
    pub fn register(&mut self, key: TypeKey, lifetime: Lifetime) -> Option<Lifetime> {
        self.history.push(RegistrationInfo::new(key, lifetime));

        match self.entries.get_mut(&key) {
            Some(existing) => {
                let previous = existing.lifetime;
                existing.lifetime = lifetime;
                existing.auto_registered = false;
                Some(previous)
            }
            None => {
                self.entries.insert(key, Registration::new(key, lifetime, false));
                self.order.push(key);
                None
            }
        }
    }

    /// 以瞬时生命周期自动注册
    pub fn auto_register(&mut self, key: TypeKey) -> Lifetime {
        if let Some(existing) = self.entries.get(&key) {
            return existing.lifetime;
        }
        self.entries
            .insert(key, Registration::new(key, Lifetime::Transient, true));
        self.order.push(key);
        Lifetime::Transient
    }

    /// 类型的生命周期
    pub fn lifetime_of(&self, key: &TypeKey) -> Option<Lifetime> {
        self.entries.get(key).map(|registration| registration.lifetime)
    }

    /// 获取注册信息
    pub fn get(&self, key: &TypeKey) -> Option<&Registration> {
        self.entries.get(key)
    }

    /// 是否已注册
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.entries.contains_key(key)
    }

    /// 已缓存的实例
    pub fn cached_instance(&self, key: &TypeKey) -> Option<Instance> {
        self.entries
            .get(key)
            .and_then(|registration| registration.instance.clone())
    }

    /// 缓存实例
    ///
    /// 已有缓存时保留先写入的实例并返回它
    pub fn cache_instance(&mut self, key: &TypeKey, instance: Instance) -> Instance {
        match self.entries.get_mut(key) {
            Some(registration) => registration.instance.get_or_insert(instance).clone(),
            None => instance,
        }
    }

    /// 按注册顺序生成快照
    pub fn snapshot(&self) -> Vec<RegistrationInfo> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key))
            .map(|registration| RegistrationInfo::new(registration.key, registration.lifetime))
            .collect()
    }

    /// 注册调用历史
    pub fn history(&self) -> Vec<RegistrationInfo> {
        self.history.clone()
    }

    /// 按注册顺序取出全部缓存实例
    pub fn take_instances(&mut self) -> Vec<(TypeKey, Instance)> {
        let mut instances = Vec::new();
        for key in &self.order {
            if let Some(instance) = self
                .entries
                .get_mut(key)
                .and_then(|registration| registration.instance.take())
            {
                instances.push((*key, instance));
            }
        }
        instances
    }

    /// 清空注册表
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.history.clear();
    }

    /// 注册数量
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
