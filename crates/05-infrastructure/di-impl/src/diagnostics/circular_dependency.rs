//! 循环依赖

use di_abstractions::{DiagnosticContext, DiagnosticRule, RuleResult};
use infrastructure_common::TypeKey;
use std::collections::HashSet;

/// 检测依赖图中的环
#[derive(Debug, Default, Clone, Copy)]
pub struct CircularDependencyRule;

impl CircularDependencyRule {
    fn detect(
        context: &DiagnosticContext<'_>,
        key: TypeKey,
        visited: &mut HashSet<TypeKey>,
        stack: &mut Vec<TypeKey>,
        warnings: &mut Vec<String>,
    ) {
        if visited.contains(&key) {
            return;
        }

        if stack.contains(&key) {
            let path: Vec<&str> = stack
                .iter()
                .chain(std::iter::once(&key))
                .map(|entry| entry.name())
                .collect();
            warnings.push(format!(
                "{} is involved in a circular dependency ({})",
                key,
                path.join(" -> ")
            ));
            return;
        }

        stack.push(key);
        for dependency in context.dependencies(&key) {
            Self::detect(context, dependency.key, visited, stack, warnings);
        }
        stack.pop();
        visited.insert(key);
    }
}

impl DiagnosticRule for CircularDependencyRule {
    fn name(&self) -> &'static str {
        "CircularDependencyRule"
    }

    fn description(&self) -> &'static str {
        "Detects circular dependencies between components."
    }

    fn verify(&self, context: &DiagnosticContext<'_>) -> RuleResult {
        let mut visited = HashSet::new();
        let mut stack = Vec::new();
        let mut warnings = Vec::new();
        for registration in context.registrations() {
            Self::detect(
                context,
                registration.key,
                &mut visited,
                &mut stack,
                &mut warnings,
            );
        }
        Ok(warnings)
    }
}
