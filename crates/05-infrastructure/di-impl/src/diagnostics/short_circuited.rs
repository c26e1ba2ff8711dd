//! 可选依赖被空值替代

use di_abstractions::{DiagnosticContext, DiagnosticRule, RuleResult};
use infrastructure_common::TypeKey;
use std::collections::HashSet;

/// 检测无法解析、将以空值传入的可选构造参数
#[derive(Debug, Default, Clone, Copy)]
pub struct ShortCircuitedDependencies;

impl ShortCircuitedDependencies {
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
            } else if dependency.optional && !context.can_auto_register(&dependency.key) {
                warnings.push(format!(
                    "A dependency in {} is being replaced with None ({} cannot be resolved)",
                    key, dependency.key
                ));
            }
        }
    }
}

impl DiagnosticRule for ShortCircuitedDependencies {
    fn name(&self) -> &'static str {
        "ShortCircuitedDependencies"
    }

    fn description(&self) -> &'static str {
        "Detects optional dependencies that will be short-circuited to an absent value."
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
