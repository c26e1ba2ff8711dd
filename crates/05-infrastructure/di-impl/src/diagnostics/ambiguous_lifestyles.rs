//! 同一类型以不同生命周期多次注册

use di_abstractions::{DiagnosticContext, DiagnosticRule, RuleResult};
use infrastructure_common::{Lifetime, TypeKey};

/// 检测以多种生命周期注册过的类型
///
/// 依据注册调用历史判断，覆盖注册后仍会报告
#[derive(Debug, Default, Clone, Copy)]
pub struct AmbiguousLifestyles;

impl DiagnosticRule for AmbiguousLifestyles {
    fn name(&self) -> &'static str {
        "AmbiguousLifestyles"
    }

    fn description(&self) -> &'static str {
        "Detects services registered multiple times with different lifestyles."
    }

    fn verify(&self, context: &DiagnosticContext<'_>) -> RuleResult {
        let mut groups: Vec<(TypeKey, Vec<Lifetime>)> = Vec::new();
        for registration in context.history() {
            match groups.iter_mut().find(|(key, _)| *key == registration.key) {
                Some((_, lifetimes)) => {
                    if !lifetimes.contains(&registration.lifetime) {
                        lifetimes.push(registration.lifetime);
                    }
                }
                None => groups.push((registration.key, vec![registration.lifetime])),
            }
        }

        Ok(groups
            .into_iter()
            .filter(|(_, lifetimes)| lifetimes.len() > 1)
            .map(|(key, lifetimes)| {
                let names: Vec<&str> = lifetimes.iter().map(|lifetime| lifetime.as_str()).collect();
                format!(
                    "{} is registered with multiple lifestyles ({})",
                    key,
                    names.join(", ")
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::test_support::run_rule;
    use crate::{ComponentCatalog, Container};
    use di_abstractions::{Arguments, Injectable};
    use infrastructure_common::DependencyResult;

    struct Cache;

    impl Injectable for Cache {
        fn create(_arguments: &mut Arguments) -> DependencyResult<Self> {
            Ok(Self)
        }
    }

    #[test]
    fn test_reports_lifestyles_in_registration_order() {
        let container = Container::new(ComponentCatalog::new().with::<Cache>());
        container.register::<Cache>(Lifetime::Transient).unwrap();
        container.register::<Cache>(Lifetime::Singleton).unwrap();
        container.register::<Cache>(Lifetime::Transient).unwrap();

        assert_eq!(
            run_rule(&AmbiguousLifestyles, &container),
            vec!["Cache is registered with multiple lifestyles (Transient, Singleton)".to_string()]
        );
    }

    #[test]
    fn test_same_lifestyle_twice_is_fine() {
        let container = Container::new(ComponentCatalog::new().with::<Cache>());
        container.register::<Cache>(Lifetime::Scoped).unwrap();
        container.register::<Cache>(Lifetime::Scoped).unwrap();

        assert!(run_rule(&AmbiguousLifestyles, &container).is_empty());
    }
}
