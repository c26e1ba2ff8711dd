//! 生命周期被撕裂：声明为共享的组件实际产生了多个实例

use di_abstractions::{same_instance, DiagnosticContext, DiagnosticRule, Resolver, RuleResult};
use infrastructure_common::{DependencyResult, Lifetime, TypeKey};
use tracing::warn;

/// 通过实际解析检查单例与作用域组件的实例身份
///
/// 作用域检查会创建两个临时子作用域，检查结束后释放
#[derive(Debug, Default, Clone, Copy)]
pub struct TornLifestyles;

impl TornLifestyles {
    fn check_singleton(
        resolver: &dyn Resolver,
        key: &TypeKey,
        warnings: &mut Vec<String>,
    ) -> DependencyResult<()> {
        let first = resolver.resolve_registered(key)?;
        let second = resolver.resolve_registered(key)?;
        if !same_instance(&first, &second) {
            warnings.push(format!(
                "Multiple instances of {key} are created despite being registered as Singleton"
            ));
        }
        Ok(())
    }

    fn check_scoped(
        first_scope: &dyn Resolver,
        second_scope: &dyn Resolver,
        key: &TypeKey,
        warnings: &mut Vec<String>,
    ) -> DependencyResult<()> {
        let first = first_scope.resolve_registered(key)?;
        let second = first_scope.resolve_registered(key)?;
        if !same_instance(&first, &second) {
            warnings.push(format!(
                "Multiple instances of {key} are created despite being registered as Scoped"
            ));
        }

        let other = second_scope.resolve_registered(key)?;
        if same_instance(&first, &other) {
            warnings.push(format!(
                "{key} is shared across scopes despite being registered as Scoped"
            ));
        }
        Ok(())
    }

    fn release_probe(scope: &dyn Resolver) {
        if let Err(e) = scope.dispose_scope() {
            warn!("释放诊断作用域失败: {}", e);
        }
    }
}

impl DiagnosticRule for TornLifestyles {
    fn name(&self) -> &'static str {
        "TornLifestyles"
    }

    fn description(&self) -> &'static str {
        "Detects singleton and scoped components that produce more than one instance."
    }

    fn verify(&self, context: &DiagnosticContext<'_>) -> RuleResult {
        let resolver = context.resolver();
        let mut warnings = Vec::new();

        for registration in context.registrations() {
            let key = &registration.key;
            let outcome = match registration.lifetime {
                Lifetime::Singleton => Self::check_singleton(resolver, key, &mut warnings),
                Lifetime::Scoped => {
                    let first_scope = resolver.create_child_scope();
                    let second_scope = resolver.create_child_scope();
                    let outcome = Self::check_scoped(
                        first_scope.as_ref(),
                        second_scope.as_ref(),
                        key,
                        &mut warnings,
                    );
                    Self::release_probe(second_scope.as_ref());
                    Self::release_probe(first_scope.as_ref());
                    outcome
                }
                Lifetime::Transient => Ok(()),
            };

            if let Err(e) = outcome {
                warnings.push(format!(
                    "{} could not be resolved to check its {} lifestyle: {}",
                    key, registration.lifetime, e
                ));
            }
        }

        Ok(warnings)
    }
}
