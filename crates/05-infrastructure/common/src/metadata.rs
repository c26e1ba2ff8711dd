//! 元数据定义
//!
//! 提供类型标识与契约标识

use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 类型标识
///
/// 以 `TypeId` 作为身份，名称仅用于展示：两个同名的不同类型互不相等。
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
    full_name: &'static str,
}

impl TypeKey {
    /// 从类型获取类型标识
    pub fn of<T: ?Sized + 'static>() -> Self {
        let full_name = std::any::type_name::<T>();
        Self {
            id: TypeId::of::<T>(),
            name: short_name(full_name),
            full_name,
        }
    }

    /// 类型ID
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// 简短的类型名称（不包含模块路径）
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 完整类型路径
    pub fn full_name(&self) -> &'static str {
        self.full_name
    }
}

/// 截掉模块路径，保留泛型参数
fn short_name(full_name: &'static str) -> &'static str {
    let base = full_name.split('<').next().unwrap_or(full_name);
    match base.rfind("::") {
        Some(index) => &full_name[index + 2..],
        None => full_name,
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.full_name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// 契约标识
///
/// 由调用方持有的命名空间字符串，例如 `"billing.PaymentGateway"`。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(Cow<'static, str>);

impl ContractId {
    /// 创建契约标识
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// 从静态字符串创建契约标识
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// 契约名称
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 名称非空且不含空白字符
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty() && !self.0.chars().any(char::is_whitespace)
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ContractId {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for ContractId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
