//! 生命周期作用域
//!
//! 保存作用域内缓存的实例与子作用域。父作用域只持有子作用域的状态，
//! 子作用域的容器句柄持有父容器，因此两者之间没有引用环。

use chrono::{DateTime, Utc};
use di_abstractions::{ComponentSource, Instance};
use infrastructure_common::TypeKey;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

#[derive(Default)]
struct ScopeCache {
    instances: HashMap<TypeKey, Instance>,
    order: Vec<TypeKey>,
}

/// 生命周期作用域
pub struct LifetimeScope {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
    cache: Mutex<ScopeCache>,
    children: Mutex<Vec<Arc<LifetimeScope>>>,
    disposed: AtomicBool,
}

impl LifetimeScope {
    /// 根作用域
    pub(crate) fn root() -> Self {
        Self::with_id(Uuid::new_v4(), |_| "root".to_string())
    }

    /// 派生子作用域（尚未挂到父作用域上）
    pub(crate) fn child(&self) -> Self {
        Self::with_id(Uuid::new_v4(), |id| {
            format!("{}.{}", self.name, &id.simple().to_string()[..8])
        })
    }

    fn with_id(id: Uuid, name: impl FnOnce(&Uuid) -> String) -> Self {
        Self {
            id,
            name: name(&id),
            created_at: Utc::now(),
            cache: Mutex::new(ScopeCache::default()),
            children: Mutex::new(Vec::new()),
            disposed: AtomicBool::new(false),
        }
    }

    /// 作用域ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 作用域名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 创建时间
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 是否已释放
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// 已缓存的实例
    pub(crate) fn cached(&self, key: &TypeKey) -> Option<Instance> {
        self.cache.lock().instances.get(key).cloned()
    }

    /// 缓存实例，已有缓存时返回先写入的实例
    pub(crate) fn cache_instance(&self, key: TypeKey, instance: Instance) -> Instance {
        let mut cache = self.cache.lock();
        if let Some(existing) = cache.instances.get(&key) {
            return existing.clone();
        }
        cache.instances.insert(key, instance.clone());
        cache.order.push(key);
        instance
    }

    /// 缓存实例数量
    pub fn cached_count(&self) -> usize {
        self.cache.lock().order.len()
    }

    /// 活动的子作用域数量
    pub fn child_count(&self) -> usize {
        self.children.lock().len()
    }

    pub(crate) fn attach_child(&self, child: Arc<LifetimeScope>) {
        self.children.lock().push(child);
    }

    pub(crate) fn detach_child(&self, id: Uuid) -> bool {
        let mut children = self.children.lock();
        let before = children.len();
        children.retain(|child| child.id != id);
        children.len() != before
    }

    /// 标记为已释放，仅第一次调用返回 `true`
    pub(crate) fn begin_dispose(&self) -> bool {
        !self.disposed.swap(true, Ordering::AcqRel)
    }

    /// 释放全部子作用域
    pub(crate) fn dispose_children(&self, source: &dyn ComponentSource, failures: &mut Vec<String>) {
        let children = std::mem::take(&mut *self.children.lock());
        for child in children {
            child.dispose_tree(source, failures);
        }
    }

    /// 按缓存的逆序释放实例
    pub(crate) fn release_cache(&self, source: &dyn ComponentSource, failures: &mut Vec<String>) {
        let ScopeCache { mut instances, order } = std::mem::take(&mut *self.cache.lock());
        for key in order.iter().rev() {
            if let Some(instance) = instances.remove(key) {
                release_instance(source, key, &instance, failures);
            }
        }
    }

    fn dispose_tree(&self, source: &dyn ComponentSource, failures: &mut Vec<String>) {
        if !self.begin_dispose() {
            return;
        }
        debug!("释放作用域: {}", self.name);
        self.dispose_children(source, failures);
        self.release_cache(source, failures);
    }
}

impl std::fmt::Debug for LifetimeScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifetimeScope")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("created_at", &self.created_at)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// 释放单个实例，失败记入 `failures` 而不中断
pub(crate) fn release_instance(
    source: &dyn ComponentSource,
    key: &TypeKey,
    instance: &Instance,
    failures: &mut Vec<String>,
) {
    let Some(disposable) = source.as_disposable(key, instance) else {
        return;
    };

    debug!("释放组件: {}", key);
    if let Err(e) = disposable.dispose() {
        error!("释放组件失败: {}, 错误: {}", key, e);
        failures.push(format!("{key}: {e}"));
    }
}
