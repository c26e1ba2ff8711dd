//! 契约注册表

use infrastructure_common::{ContractId, TypeKey};
use std::collections::HashMap;

/// 契约到实现类型的映射，实现列表保持注册顺序
#[derive(Debug, Default)]
pub struct InterfaceRegistry {
    implementers: HashMap<ContractId, Vec<TypeKey>>,
}

impl InterfaceRegistry {
    /// 创建空的契约注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录实现关系，已存在时返回 `false`
    pub fn add(&mut self, contract: ContractId, key: TypeKey) -> bool {
        let implementers = self.implementers.entry(contract).or_default();
        if implementers.contains(&key) {
            return false;
        }
        implementers.push(key);
        true
    }

    /// 契约的全部实现类型
    pub fn implementers(&self, contract: &ContractId) -> Vec<TypeKey> {
        self.implementers.get(contract).cloned().unwrap_or_default()
    }

    /// 类型实现的契约
    pub fn contracts_of(&self, key: &TypeKey) -> Vec<ContractId> {
        let mut contracts: Vec<ContractId> = self
            .implementers
            .iter()
            .filter(|(_, implementers)| implementers.contains(key))
            .map(|(contract, _)| contract.clone())
            .collect();
        contracts.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        contracts
    }

    /// 契约数量
    pub fn len(&self) -> usize {
        self.implementers.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.implementers.is_empty()
    }

    /// 清空
    pub fn clear(&mut self) {
        self.implementers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Email;
    struct Sms;

    #[test]
    fn test_implementers_keep_order_without_duplicates() {
        let contract = ContractId::from_static("notify.Channel");
        let mut registry = InterfaceRegistry::new();

        assert!(registry.add(contract.clone(), TypeKey::of::<Sms>()));
        assert!(registry.add(contract.clone(), TypeKey::of::<Email>()));
        assert!(!registry.add(contract.clone(), TypeKey::of::<Sms>()));

        assert_eq!(
            registry.implementers(&contract),
            vec![TypeKey::of::<Sms>(), TypeKey::of::<Email>()]
        );
        assert_eq!(registry.contracts_of(&TypeKey::of::<Email>()), vec![contract]);
        assert!(registry
            .implementers(&ContractId::from_static("missing"))
            .is_empty());
    }
}
