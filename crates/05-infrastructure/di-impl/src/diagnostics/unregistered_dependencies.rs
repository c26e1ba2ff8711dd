//! 未注册的依赖

use di_abstractions::{DiagnosticContext, DiagnosticRule, RuleResult};
use infrastructure_common::TypeKey;
use std::collections::HashSet;

/// 检测构造参数中未注册的类型
#[derive(Debug, Default, Clone, Copy)]
pub struct UnregisteredDependencies;

impl UnregisteredDependencies {
    fn analyze(
        context: &DiagnosticContext<'_>,
        key: TypeKey,
        visited: &mut HashSet<TypeKey>,
        warnings: &mut Vec<String>,
    ) {
        if !visited.insert(key) {
            return;
        }

        for dependency in context.dependencies(&key) {
            if context.is_registered(&dependency.key) {
                Self::analyze(context, dependency.key, visited, warnings);
            } else {
                warnings.push(format!(
                    "{} required by {} has not been registered with the container",
                    dependency.key, key
                ));
            }
        }
    }
}

impl DiagnosticRule for UnregisteredDependencies {
    fn name(&self) -> &'static str {
        "UnregisteredDependencies"
    }

    fn description(&self) -> &'static str {
        "Detects dependencies that have not been registered with the container."
    }

    fn verify(&self, context: &DiagnosticContext<'_>) -> RuleResult {
        let mut visited = HashSet::new();
        let mut warnings = Vec::new();
        for registration in context.registrations() {
            Self::analyze(context, registration.key, &mut visited, &mut warnings);
        }
        Ok(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::test_support::run_rule;
    use crate::{ComponentCatalog, Container};
    use di_abstractions::{Arguments, Dependency, Injectable};
    use infrastructure_common::{DependencyResult, Lifetime};

    struct Connection;

    impl Injectable for Connection {
        fn create(_arguments: &mut Arguments) -> DependencyResult<Self> {
            Ok(Self)
        }
    }

    struct Repository;

    impl Injectable for Repository {
        fn dependencies() -> Vec<Dependency> {
            vec![Dependency::required::<Connection>()]
        }

        fn create(arguments: &mut Arguments) -> DependencyResult<Self> {
            arguments.next::<Connection>()?;
            Ok(Self)
        }
    }

    #[test]
    fn test_missing_registration_is_reported() {
        let container =
            Container::new(ComponentCatalog::new().with::<Connection>().with::<Repository>());
        container.register::<Repository>(Lifetime::Transient).unwrap();

        assert_eq!(
            run_rule(&UnregisteredDependencies, &container),
            vec!["Connection required by Repository has not been registered with the container"
                .to_string()]
        );

        container.register::<Connection>(Lifetime::Singleton).unwrap();
        assert!(run_rule(&UnregisteredDependencies, &container).is_empty());
    }
}
