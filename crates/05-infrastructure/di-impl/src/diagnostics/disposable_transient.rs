//! 可释放的瞬时组件

use di_abstractions::{DiagnosticContext, DiagnosticRule, RuleResult};
use infrastructure_common::Lifetime;

/// 检测注册为瞬时却具备释放能力的组件（容器不会释放它们）
#[derive(Debug, Default, Clone, Copy)]
pub struct DisposableTransientComponents;

impl DiagnosticRule for DisposableTransientComponents {
    fn name(&self) -> &'static str {
        "DisposableTransientComponents"
    }

    fn description(&self) -> &'static str {
        "Detects transient components that implement Dispose."
    }

    fn verify(&self, context: &DiagnosticContext<'_>) -> RuleResult {
        Ok(context
            .registrations()
            .iter()
            .filter(|registration| {
                registration.lifetime == Lifetime::Transient
                    && context.is_disposable(&registration.key)
            })
            .map(|registration| {
                format!("{} is transient and also implements Dispose", registration.key)
            })
            .collect())
    }
}
