use std::sync::{mpsc, Arc, Barrier};
use std::time::Duration;
use wirebox::{ComponentDefinition, DiError, Provider, Registry, Resolver};

struct X {
    _y: Arc<Y>,
}

struct Y {
    _x: Arc<X>,
}

fn assert_cycle<T>(result: Result<T, DiError>, expected_path: &[&str]) {
    match result {
        Err(DiError::CyclicDependency(path)) => assert_eq!(path, expected_path, "wrong cycle path"),
        Err(other) => panic!("expected CyclicDependency, got {:?}", other),
        Ok(_) => panic!("cyclic graph resolved"),
    }
}

fn two_node_cycle(lifetime_x: wirebox::Lifetime, lifetime_y: wirebox::Lifetime) -> Registry {
    let mut registry = Registry::new();
    registry
        .register(
            ComponentDefinition::with_lifetime::<X, _>(lifetime_x, |args| Ok(Arc::new(X { _y: args.next()? })))
                .named("X")
                .depends_on::<Y>(),
        )
        .unwrap();
    registry
        .register(
            ComponentDefinition::with_lifetime::<Y, _>(lifetime_y, |args| Ok(Arc::new(Y { _x: args.next()? })))
                .named("Y")
                .depends_on::<X>(),
        )
        .unwrap();
    registry
}

#[test]
fn singleton_cycle_reports_path() {
    use wirebox::Lifetime::Singleton;

    let container = two_node_cycle(Singleton, Singleton).build();
    assert_cycle(container.resolve::<X>(), &["X", "Y", "X"]);
    assert_cycle(container.resolve::<Y>(), &["Y", "X", "Y"]);
    assert_eq!(container.cached_singletons(), 0);
}

#[test]
fn prototype_cycle_reports_path() {
    use wirebox::Lifetime::Prototype;

    let container = two_node_cycle(Prototype, Prototype).build();
    assert_cycle(container.resolve::<X>(), &["X", "Y", "X"]);
}

#[test]
fn mixed_lifetime_cycle_reports_path() {
    use wirebox::Lifetime::{Prototype, Singleton};

    let container = two_node_cycle(Singleton, Prototype).build();
    assert_cycle(container.resolve::<Y>(), &["Y", "X", "Y"]);
}

#[test]
fn self_dependency_is_a_cycle() {
    struct Selfish;

    let mut registry = Registry::new();
    registry
        .register(
            ComponentDefinition::singleton::<Selfish, _>(|args| {
                let _me: Arc<Selfish> = args.next()?;
                Ok(Arc::new(Selfish))
            })
            .named("Selfish")
            .depends_on::<Selfish>(),
        )
        .unwrap();

    let container = registry.build();
    assert_cycle(container.resolve::<Selfish>(), &["Selfish", "Selfish"]);
}

#[test]
fn three_node_cycle_reports_full_path() {
    struct A;
    struct B;
    struct C;

    let mut registry = Registry::new();
    registry
        .register(ComponentDefinition::prototype::<A, _>(|_| Ok(Arc::new(A))).named("A").depends_on::<B>())
        .unwrap();
    registry
        .register(ComponentDefinition::prototype::<B, _>(|_| Ok(Arc::new(B))).named("B").depends_on::<C>())
        .unwrap();
    registry
        .register(ComponentDefinition::prototype::<C, _>(|_| Ok(Arc::new(C))).named("C").depends_on::<B>())
        .unwrap();

    let container = registry.build();
    // A is not part of the cycle
    assert_cycle(container.resolve::<A>(), &["B", "C", "B"]);
}

#[test]
fn cycle_is_caught_by_validation() {
    use wirebox::Lifetime::Singleton;

    let report = two_node_cycle(Singleton, Singleton).validate();
    assert!(!report.is_ok());
    assert_cycle(report.into_result(), &["X", "Y", "X"]);
}

#[test]
fn provider_breaks_the_cycle() {
    struct Parent {
        children: Provider<Child>,
    }
    struct Child {
        parent: Arc<Parent>,
    }

    let mut registry = Registry::new();
    registry
        .register(
            ComponentDefinition::singleton::<Parent, _>(|args| Ok(Arc::new(Parent { children: args.provider()? })))
                .provider_of::<Child>(),
        )
        .unwrap();
    registry
        .register(
            ComponentDefinition::prototype::<Child, _>(|args| Ok(Arc::new(Child { parent: args.next()? })))
                .depends_on::<Parent>(),
        )
        .unwrap();

    assert!(registry.validate().is_ok());

    let container = registry.build();
    let parent = container.resolve::<Parent>().unwrap();
    let child = parent.children.get().unwrap();
    assert!(Arc::ptr_eq(&parent, &child.parent));
}

#[test]
fn provider_of_itself_is_allowed() {
    struct Node {
        next: Provider<Node>,
    }

    let mut registry = Registry::new();
    registry
        .register(
            ComponentDefinition::prototype::<Node, _>(|args| Ok(Arc::new(Node { next: args.provider()? })))
                .provider_of::<Node>(),
        )
        .unwrap();

    let container = registry.build();
    let first = container.resolve::<Node>().unwrap();
    let second = first.next.get().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn container_recovers_after_cycle() {
    use wirebox::Lifetime::Singleton;

    struct Healthy;

    let mut registry = two_node_cycle(Singleton, Singleton);
    registry.register(ComponentDefinition::singleton::<Healthy, _>(|_| Ok(Arc::new(Healthy)))).unwrap();

    let container = registry.build();
    assert!(container.resolve::<X>().is_err());
    assert!(container.resolve::<Healthy>().is_ok());
    assert!(container.resolve::<X>().is_err());
}

#[test]
fn racing_entry_points_into_a_cycle_fail_fast() {
    struct SlowA;
    struct SlowB;
    struct P {
        _slow: Arc<SlowA>,
        _q: Arc<Q>,
    }
    struct Q {
        _slow: Arc<SlowB>,
        _p: Arc<P>,
    }

    let mut registry = Registry::new();
    registry
        .register(ComponentDefinition::prototype::<SlowA, _>(|_| {
            std::thread::sleep(Duration::from_millis(200));
            Ok(Arc::new(SlowA))
        }))
        .unwrap();
    registry
        .register(ComponentDefinition::prototype::<SlowB, _>(|_| {
            std::thread::sleep(Duration::from_millis(200));
            Ok(Arc::new(SlowB))
        }))
        .unwrap();
    registry
        .register(
            ComponentDefinition::singleton::<P, _>(|args| Ok(Arc::new(P { _slow: args.next()?, _q: args.next()? })))
                .named("P")
                .depends_on::<SlowA>()
                .depends_on::<Q>(),
        )
        .unwrap();
    registry
        .register(
            ComponentDefinition::singleton::<Q, _>(|args| Ok(Arc::new(Q { _slow: args.next()?, _p: args.next()? })))
                .named("Q")
                .depends_on::<SlowB>()
                .depends_on::<P>(),
        )
        .unwrap();

    let container = registry.build();
    let barrier = Arc::new(Barrier::new(2));
    let (tx, rx) = mpsc::channel();

    for entry in ["P", "Q"] {
        let container = container.clone();
        let barrier = barrier.clone();
        let tx = tx.clone();
        std::thread::spawn(move || {
            barrier.wait();
            let result = if entry == "P" {
                container.resolve::<P>().map(|_| ())
            } else {
                container.resolve::<Q>().map(|_| ())
            };
            let _ = tx.send((entry, result));
        });
    }

    for _ in 0..2 {
        let (entry, result) = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("lookup blocked on a cyclic graph");
        match entry {
            "P" => assert_cycle(result, &["P", "Q", "P"]),
            _ => assert_cycle(result, &["Q", "P", "Q"]),
        }
    }
    assert_eq!(container.cached_singletons(), 0);
}

#[test]
fn provider_lookup_inside_constructor_is_a_cycle() {
    struct Eager;

    let mut registry = Registry::new();
    registry
        .register(
            ComponentDefinition::singleton::<Eager, _>(|args| {
                let _me: Arc<Eager> = args.provider::<Eager>()?.get()?;
                Ok(Arc::new(Eager))
            })
            .named("Eager")
            .provider_of::<Eager>(),
        )
        .unwrap();

    // Deferred edges are not checked statically
    assert!(registry.validate().is_ok());

    let container = registry.build();
    assert_cycle(container.resolve::<Eager>(), &["Eager", "Eager"]);
    assert_eq!(container.cached_singletons(), 0);
}
