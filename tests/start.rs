//! Container start-up: validation and eager singletons.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wirebox::{ComponentDefinition, ContainerOptions, DiError, HookError, Registry, Resolver};

struct Database;
struct Repository {
    _db: Arc<Database>,
}
struct Missing;

#[test]
fn eager_start_constructs_in_registration_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let (first, second) = (order.clone(), order.clone());

    let mut registry = Registry::new();
    registry
        .register(ComponentDefinition::singleton::<Database, _>(move |_| {
            first.lock().unwrap().push("database");
            Ok(Arc::new(Database))
        }))
        .unwrap();
    registry
        .register(
            ComponentDefinition::singleton::<Repository, _>(move |args| {
                second.lock().unwrap().push("repository");
                Ok(Arc::new(Repository { _db: args.next()? }))
            })
            .depends_on::<Database>(),
        )
        .unwrap();

    let container = registry.start(&ContainerOptions::default()).unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["database", "repository"]);
    assert_eq!(container.cached_singletons(), 2);

    container.resolve::<Repository>().unwrap();
    assert_eq!(order.lock().unwrap().len(), 2);
}

#[test]
fn eager_start_skips_prototypes() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();

    let mut registry = Registry::new();
    registry
        .register(ComponentDefinition::prototype::<Database, _>(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Database))
        }))
        .unwrap();

    let container = registry.start(&ContainerOptions::default()).unwrap();
    assert_eq!(built.load(Ordering::SeqCst), 0);
    assert_eq!(container.cached_singletons(), 0);
}

#[test]
fn validation_rejects_missing_dependency_before_construction() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();

    let mut registry = Registry::new();
    registry
        .register(ComponentDefinition::singleton::<Database, _>(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Database))
        }))
        .unwrap();
    registry
        .register(
            ComponentDefinition::singleton::<Repository, _>(|args| Ok(Arc::new(Repository { _db: args.next()? })))
                .named("Repository")
                .depends_on::<Database>()
                .depends_on::<Missing>(),
        )
        .unwrap();

    let report = registry.validate();
    assert_eq!(report.issues().len(), 1);
    assert_eq!(report.issues()[0].component, "Repository");

    let err = registry.start(&ContainerOptions::default()).unwrap_err();
    assert!(matches!(err, DiError::NoSuchComponent { .. }));
    assert_eq!(built.load(Ordering::SeqCst), 0);
}

#[test]
fn lazy_start_defers_failures_to_lookup() {
    let mut registry = Registry::new();
    registry
        .register(ComponentDefinition::singleton::<Repository, _>(|args| {
            Ok(Arc::new(Repository { _db: args.next()? }))
        })
        .depends_on::<Database>())
        .unwrap();

    let container = registry.start(&ContainerOptions::lazy()).unwrap();
    assert!(matches!(container.resolve::<Repository>(), Err(DiError::NoSuchComponent { .. })));
}

#[test]
fn failed_eager_start_tears_down_what_was_built() {
    let destroyed = Arc::new(AtomicUsize::new(0));
    let counter = destroyed.clone();

    let mut registry = Registry::new();
    registry
        .register(ComponentDefinition::singleton::<Database, _>(|_| Ok(Arc::new(Database))).pre_destroy(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }))
        .unwrap();
    registry
        .register(
            ComponentDefinition::singleton::<Missing, _>(|_| Ok(Arc::new(Missing)))
                .named("Missing")
                .post_construct(|_| Err(HookError::from("cannot connect"))),
        )
        .unwrap();

    match registry.start(&ContainerOptions::default()) {
        Err(DiError::InitializationFailed { component, source }) => {
            assert_eq!(component, "Missing");
            assert_eq!(source.to_string(), "cannot connect");
        }
        Err(other) => panic!("expected InitializationFailed, got {:?}", other),
        Ok(_) => panic!("start succeeded with a failing singleton"),
    }
    assert_eq!(destroyed.load(Ordering::SeqCst), 1);
}

#[test]
fn validation_can_be_skipped() {
    let mut registry = Registry::new();
    registry
        .register(ComponentDefinition::prototype::<Repository, _>(|args| {
            Ok(Arc::new(Repository { _db: args.next()? }))
        })
        .depends_on::<Database>())
        .unwrap();

    let options = ContainerOptions::default().validate_on_start(false);
    assert!(registry.start(&options).is_ok());
}

#[cfg(feature = "config")]
#[test]
fn options_load_from_json() {
    let options = ContainerOptions::from_json(r#"{ "eager_singletons": false }"#).unwrap();
    assert!(!options.eager_singletons);
    assert!(options.validate_on_start);
}
