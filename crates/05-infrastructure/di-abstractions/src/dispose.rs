//! 组件释放能力

/// 可释放组件 trait
///
/// 容器在释放自身或作用域时，对缓存的单例与作用域实例调用一次 `dispose`。
/// 瞬时实例不被容器跟踪，也不会被释放。
pub trait Dispose: Send + Sync + 'static {
    /// 释放组件持有的资源
    fn dispose(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
