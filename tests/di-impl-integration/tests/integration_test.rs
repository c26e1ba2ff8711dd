//! Centralized verification scenarios for the di-impl crate
use di_abstractions::{
    Arguments, ContainerConfig, Dependency, DiagnosticContext, DiagnosticRule, Dispose,
    Injectable, RuleResult,
};
use di_impl::{ComponentCatalog, Container, DiagnosticEngine, LifestyleMismatch};
use infrastructure_common::{DependencyResult, Lifetime, RuleReport};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::thread;

static INIT_LOGGER: Once = Once::new();

fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// 统计构造次数
static PRINTER_CREATED: AtomicUsize = AtomicUsize::new(0);

struct Printer;

impl Injectable for Printer {
    fn create(_arguments: &mut Arguments) -> DependencyResult<Self> {
        PRINTER_CREATED.fetch_add(1, Ordering::SeqCst);
        Ok(Self)
    }
}

struct Spooler {
    printer: Arc<Printer>,
}

impl Injectable for Spooler {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::required::<Printer>()]
    }

    fn create(arguments: &mut Arguments) -> DependencyResult<Self> {
        Ok(Self {
            printer: arguments.next()?,
        })
    }
}

struct Queue;

impl Injectable for Queue {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::required::<Spooler>(), Dependency::required::<Driver>()]
    }

    fn create(arguments: &mut Arguments) -> DependencyResult<Self> {
        arguments.next::<Spooler>()?;
        arguments.next::<Driver>()?;
        Ok(Self)
    }
}

/// 未加入目录的驱动
struct Driver;

struct TempFile;

impl Injectable for TempFile {
    fn create(_arguments: &mut Arguments) -> DependencyResult<Self> {
        Ok(Self)
    }
}

impl Dispose for TempFile {
    fn dispose(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

/// 总是 panic 的规则
struct Exploding;

impl DiagnosticRule for Exploding {
    fn name(&self) -> &'static str {
        "Exploding"
    }

    fn description(&self) -> &'static str {
        "panics on every run"
    }

    fn verify(&self, _context: &DiagnosticContext<'_>) -> RuleResult {
        panic!("boom")
    }
}

fn catalog() -> ComponentCatalog {
    ComponentCatalog::new()
        .with::<Printer>()
        .with::<Spooler>()
        .with::<Queue>()
        .with_disposable::<TempFile>()
}

#[test]
fn test_verification_aggregates_every_rule() {
    init_test_logger();
    let container = Container::new(catalog());
    container.register::<Printer>(Lifetime::Transient).unwrap();
    container.register::<Printer>(Lifetime::Scoped).unwrap();
    container.register::<Spooler>(Lifetime::Singleton).unwrap();
    container.register::<Queue>(Lifetime::Transient).unwrap();
    container.register::<TempFile>(Lifetime::Transient).unwrap();

    let error = container.verify().unwrap_err();
    let rules: Vec<&str> = error
        .reports()
        .iter()
        .map(|report| report.rule.as_str())
        .collect();
    assert_eq!(
        rules,
        vec![
            "AmbiguousLifestyles",
            "LifestyleMismatch",
            "UnregisteredDependencies",
            "DisposableTransientComponents",
        ]
    );

    assert!(error.contains_warning(
        "AmbiguousLifestyles",
        "Printer is registered with multiple lifestyles (Transient, Scoped)"
    ));
    assert!(error.contains_warning(
        "LifestyleMismatch",
        "Spooler (Singleton) depends on Printer (Scoped)"
    ));
    assert!(error.contains_warning(
        "UnregisteredDependencies",
        "Driver required by Queue has not been registered with the container"
    ));
    assert!(error.contains_warning(
        "DisposableTransientComponents",
        "TempFile is transient and also implements Dispose"
    ));
    assert_eq!(error.warning_count(), 4);

    let json: serde_json::Value = serde_json::from_str(&error.to_json().unwrap()).unwrap();
    assert_eq!(json[0]["rule"], "AmbiguousLifestyles");
    assert_eq!(container.diagnose(), error.reports().to_vec());
}

#[test]
fn test_clean_container_verifies() {
    init_test_logger();
    let container = Container::new(catalog());
    container.register::<Printer>(Lifetime::Singleton).unwrap();
    container.register::<Spooler>(Lifetime::Scoped).unwrap();
    container.register::<TempFile>(Lifetime::Scoped).unwrap();

    assert!(container.verify().is_ok());
    assert_eq!(container.scope().child_count(), 0);
}

#[test]
fn test_panicking_rule_does_not_abort_verification() {
    init_test_logger();
    let mut engine = DiagnosticEngine::new();
    engine.add_rule(Box::new(Exploding));
    engine.add_rule(Box::new(LifestyleMismatch));

    let container = Container::with_diagnostics(
        Arc::new(catalog()),
        ContainerConfig::default(),
        engine,
    );
    container.register::<Printer>(Lifetime::Transient).unwrap();
    container.register::<Spooler>(Lifetime::Singleton).unwrap();

    let error = container.verify().unwrap_err();
    assert_eq!(
        error.reports(),
        &[
            RuleReport::new("Exploding", vec!["boom".to_string()]),
            RuleReport::new(
                "LifestyleMismatch",
                vec!["Spooler (Singleton) depends on Printer (Transient)".to_string()]
            ),
        ]
    );
}

#[test]
fn test_singleton_shared_across_threads() {
    init_test_logger();
    let container = Container::new(catalog());
    container.register::<Printer>(Lifetime::Transient).unwrap();
    container.register::<Spooler>(Lifetime::Singleton).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let container = container.clone();
            thread::spawn(move || container.resolve::<Spooler>().unwrap())
        })
        .collect();
    let spoolers: Vec<Arc<Spooler>> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    for spooler in &spoolers {
        assert!(Arc::ptr_eq(spooler, &spoolers[0]));
        assert!(Arc::ptr_eq(&spooler.printer, &spoolers[0].printer));
    }
}

#[test]
fn test_scopes_in_threads_stay_isolated() {
    init_test_logger();
    let container = Container::new(catalog());
    container.register::<TempFile>(Lifetime::Scoped).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let scope = container.create_scope();
            thread::spawn(move || {
                let first = scope.resolve::<TempFile>().unwrap();
                let second = scope.resolve::<TempFile>().unwrap();
                assert!(Arc::ptr_eq(&first, &second));
                first
            })
        })
        .collect();
    let files: Vec<Arc<TempFile>> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    for (index, file) in files.iter().enumerate() {
        for other in &files[index + 1..] {
            assert!(!Arc::ptr_eq(file, other));
        }
    }

    assert_eq!(container.scope().child_count(), 4);
    container.dispose().unwrap();
    assert_eq!(container.scope().child_count(), 0);
}

#[test]
fn test_transient_dependency_constructed_per_resolution() {
    init_test_logger();
    let container = Container::new(catalog());
    container.register::<Printer>(Lifetime::Transient).unwrap();
    container.register::<Spooler>(Lifetime::Transient).unwrap();

    let before = PRINTER_CREATED.load(Ordering::SeqCst);
    let first = container.resolve::<Spooler>().unwrap();
    let second = container.resolve::<Spooler>().unwrap();

    assert!(!Arc::ptr_eq(&first.printer, &second.printer));
    assert!(PRINTER_CREATED.load(Ordering::SeqCst) >= before + 2);
}
