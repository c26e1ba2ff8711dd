//! 依赖元数据提供者抽象接口
//!
//! 容器不关心依赖信息从哪里来，只通过这里的 trait 查询

use crate::dispose::Dispose;
use infrastructure_common::{ContractId, DependencyError, DependencyResult, TypeKey};
use std::any::Any;
use std::sync::Arc;

/// 已解析的组件实例
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 构造参数声明
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dependency {
    /// 参数类型
    pub key: TypeKey,
    /// 无法解析时是否以空值代替
    pub optional: bool,
}

impl Dependency {
    /// 必需依赖
    pub fn required<T: Send + Sync + 'static>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            optional: false,
        }
    }

    /// 可选依赖
    pub fn optional<T: Send + Sync + 'static>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            optional: true,
        }
    }
}

/// 依赖提供者
///
/// 按构造参数声明顺序返回依赖列表，无参数时返回空列表
pub trait DependencyProvider: Send + Sync {
    /// 获取依赖列表
    fn get_dependencies(&self, key: &TypeKey) -> Vec<Dependency>;
}

/// 契约声明提供者
pub trait ContractProvider: Send + Sync {
    /// 获取类型声明实现的契约
    fn get_declared_contracts(&self, key: &TypeKey) -> DependencyResult<Vec<ContractId>>;
}

/// 组件激活器
///
/// 负责用已解析的参数构造实例，并探测实例的释放能力
pub trait ComponentActivator: Send + Sync {
    /// 是否能构造该类型
    fn can_activate(&self, key: &TypeKey) -> bool;

    /// 构造实例
    fn activate(&self, key: &TypeKey, arguments: Arguments) -> DependencyResult<Instance>;

    /// 该类型是否具备释放能力
    fn is_disposable(&self, key: &TypeKey) -> bool;

    /// 探测实例的释放能力
    fn as_disposable<'a>(&self, key: &TypeKey, instance: &'a Instance) -> Option<&'a dyn Dispose>;
}

/// 组件元数据来源：依赖、契约与激活能力的组合
pub trait ComponentSource: DependencyProvider + ContractProvider + ComponentActivator {}

impl<T> ComponentSource for T where T: DependencyProvider + ContractProvider + ComponentActivator + ?Sized {}

/// 构造参数
///
/// 按声明顺序依次取出，可选依赖未能解析时对应位置为空
#[derive(Debug)]
pub struct Arguments {
    owner: TypeKey,
    values: std::vec::IntoIter<Option<Instance>>,
    position: usize,
}

impl Arguments {
    /// 创建构造参数
    pub fn new(owner: TypeKey, values: Vec<Option<Instance>>) -> Self {
        Self {
            owner,
            values: values.into_iter(),
            position: 0,
        }
    }

    /// 被构造的类型
    pub fn owner(&self) -> TypeKey {
        self.owner
    }

    /// 剩余参数数量
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// 取出下一个必需参数
    pub fn next<T: Send + Sync + 'static>(&mut self) -> DependencyResult<Arc<T>> {
        let position = self.position;
        self.next_optional::<T>()?
            .ok_or_else(|| DependencyError::MissingArgument {
                type_name: self.owner.name().to_string(),
                position,
            })
    }

    /// 取出下一个可选参数
    pub fn next_optional<T: Send + Sync + 'static>(&mut self) -> DependencyResult<Option<Arc<T>>> {
        let position = self.position;
        let slot = self.values.next().ok_or_else(|| DependencyError::MissingArgument {
            type_name: self.owner.name().to_string(),
            position,
        })?;
        self.position += 1;

        slot.map(|instance| {
            instance
                .downcast::<T>()
                .map_err(|_| DependencyError::TypeMismatch {
                    expected: std::any::type_name::<T>().to_string(),
                })
        })
        .transpose()
    }
}
