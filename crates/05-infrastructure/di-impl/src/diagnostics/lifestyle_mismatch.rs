//! 生命周期不匹配（俘获依赖）

use di_abstractions::{DiagnosticContext, DiagnosticRule, RuleResult};
use infrastructure_common::{Lifetime, TypeKey};
use std::collections::HashSet;

/// 检测依赖了更短生命周期组件的组件
///
/// 未注册的依赖由 [`UnregisteredDependencies`](super::UnregisteredDependencies) 负责，这里跳过
#[derive(Debug, Default, Clone, Copy)]
pub struct LifestyleMismatch;

impl LifestyleMismatch {
    fn analyze(
        context: &DiagnosticContext<'_>,
        key: TypeKey,
        lifetime: Lifetime,
        visited: &mut HashSet<TypeKey>,
        warnings: &mut Vec<String>,
    ) {
        if !visited.insert(key) {
            return;
        }

        for dependency in context.dependencies(&key) {
            let Some(dependency_lifetime) = context.lifetime_of(&dependency.key) else {
                continue;
            };

            if lifetime.severity() > dependency_lifetime.severity() {
                warnings.push(format!(
                    "{} ({}) depends on {} ({})",
                    key, lifetime, dependency.key, dependency_lifetime
                ));
            }

            Self::analyze(context, dependency.key, dependency_lifetime, visited, warnings);
        }
    }
}

impl DiagnosticRule for LifestyleMismatch {
    fn name(&self) -> &'static str {
        "LifestyleMismatch"
    }

    fn description(&self) -> &'static str {
        "Detects components that depend on services with a shorter lifestyle."
    }

    fn verify(&self, context: &DiagnosticContext<'_>) -> RuleResult {
        let mut visited = HashSet::new();
        let mut warnings = Vec::new();
        for registration in context.registrations() {
            Self::analyze(
                context,
                registration.key,
                registration.lifetime,
                &mut visited,
                &mut warnings,
            );
        }
        Ok(warnings)
    }
}
