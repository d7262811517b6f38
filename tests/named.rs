use ferrous_locator::{DiError, Key, Lifetime, Registry, Resolver};
use std::rc::Rc;

#[test]
fn test_named_resolve() {
    let registry = Registry::new();
    registry.register_named::<String, _>("a", |_| Ok("a".to_string()));
    registry.register_named::<String, _>("b", |_| Ok("b".to_string()));

    assert_eq!(*registry.resolve_named::<String>("a").unwrap(), "a");
    assert_eq!(*registry.resolve_named::<String>("b").unwrap(), "b");

    // The unnamed binding is a separate key
    assert!(matches!(
        registry.resolve::<String>(),
        Err(DiError::NotRegistered(key)) if key == Key::of::<String>()
    ));
}

#[test]
fn test_named_create() {
    let registry = Registry::new();
    registry.register_named::<String, _>("a", |_| Ok("a".to_string()));
    registry.register_named::<String, _>("b", |_| Ok("b".to_string()));

    assert_eq!(*registry.create_named::<String>("a").unwrap(), "a");
    assert_eq!(*registry.create_named::<String>("b").unwrap(), "b");
}

#[test]
fn test_named_bindings_cache_independently() {
    let registry = Registry::new();
    registry.register_named::<Vec<u8>, _>("a", |_| Ok(vec![1]));
    registry.register_named::<Vec<u8>, _>("b", |_| Ok(vec![1]));

    let a1 = registry.resolve_named::<Vec<u8>>("a").unwrap();
    let a2 = registry.resolve_named::<Vec<u8>>("a").unwrap();
    let b = registry.resolve_named::<Vec<u8>>("b").unwrap();

    assert!(Rc::ptr_eq(&a1, &a2));
    assert!(!Rc::ptr_eq(&a1, &b));
}

#[test]
fn test_named_singleton_only() {
    let registry = Registry::new();
    registry.register_named_with::<String, _>("config", Lifetime::SingletonOnly, |_| Ok("cfg".to_string()));
    registry.register_named::<String, _>("request", |_| Ok("req".to_string()));

    assert!(matches!(
        registry.create_named::<String>("config"),
        Err(DiError::SingletonOnlyViolation(key)) if key == Key::named::<String>("config")
    ));
    assert!(registry.create_named::<String>("request").is_ok());
}

#[test]
fn test_named_overrides() {
    struct Greeting(Rc<String>);

    let registry = Registry::new();
    registry.register_named::<Greeting, _>("formal", |r| Ok(Greeting(r.resolve_named::<String>("title")?)));

    let greeting = registry
        .create_named_with::<Greeting>("formal", |r| {
            r.register_named::<String, _>("title", |_| Ok("Dr.".to_string()))
        })
        .unwrap();
    assert_eq!(*greeting.0, "Dr.");

    let again = registry
        .resolve_named_with::<Greeting>("formal", |r| {
            r.register_named::<String, _>("title", |_| Ok("Prof.".to_string()))
        })
        .unwrap();
    // The create above left its instance in the cache
    assert_eq!(*again.0, "Dr.");
    assert_eq!(registry.overlay_len(), 0);
}

#[test]
fn test_keyed_names() {
    let registry = Registry::new();
    registry.register_keyed("IValue<String>", "a", Lifetime::Shared, |_| Ok("a".to_string()));
    registry.register_keyed("IValue<String>", "b", Lifetime::Shared, |_| Ok("b".to_string()));

    assert_eq!(*registry.resolve_keyed::<String>("IValue<String>", "a").unwrap(), "a");
    assert_eq!(*registry.create_keyed::<String>("IValue<String>", "b").unwrap(), "b");

    let overridden = registry
        .create_keyed_with::<String>("IValue<String>", "a", |r| {
            r.register_keyed("IValue<String>", "a", Lifetime::Shared, |_| Ok("shadow".to_string()))
        })
        .unwrap();
    assert_eq!(*overridden, "shadow");
    assert_eq!(*registry.resolve_keyed::<String>("IValue<String>", "a").unwrap(), "a");
    assert_eq!(
        *registry
            .resolve_keyed_with::<String>("IValue<String>", "b", |_| {})
            .unwrap(),
        "b"
    );
}

trait Label {
    fn text(&self) -> String;
}

struct Fixed(&'static str);

impl Label for Fixed {
    fn text(&self) -> String {
        self.0.to_string()
    }
}

struct Prefixed(Rc<String>);

impl Label for Prefixed {
    fn text(&self) -> String {
        format!("> {}", self.0)
    }
}

#[test]
fn test_named_trait_bindings() {
    let registry = Registry::new();
    registry.register_trait_with::<dyn Label, _>("a", Lifetime::Shared, |_| Ok(Rc::new(Fixed("a")) as Rc<dyn Label>));
    registry.register_trait_with::<dyn Label, _>("b", Lifetime::Shared, |_| Ok(Rc::new(Fixed("b")) as Rc<dyn Label>));

    let a = registry.resolve_trait_named::<dyn Label>("a").unwrap();
    let b = registry.resolve_trait_named::<dyn Label>("b").unwrap();
    assert_eq!(a.text(), "a");
    assert_eq!(b.text(), "b");
    assert!(Rc::ptr_eq(&a, &registry.resolve_trait_named::<dyn Label>("a").unwrap()));

    let fresh_a = registry.create_trait_named::<dyn Label>("a").unwrap();
    let fresh_b = registry.create_trait_named::<dyn Label>("b").unwrap();
    assert_eq!(fresh_a.text(), "a");
    assert_eq!(fresh_b.text(), "b");
    assert!(!Rc::ptr_eq(&a, &fresh_a));

    // Unnamed lookup is a different key
    assert!(matches!(
        registry.resolve_trait::<dyn Label>(),
        Err(DiError::NotRegistered(key)) if key == Key::of::<dyn Label>()
    ));
}

#[test]
fn test_named_trait_singleton_only() {
    let registry = Registry::new();
    registry.register_trait_with::<dyn Label, _>("app", Lifetime::SingletonOnly, |_| {
        Ok(Rc::new(Fixed("app")) as Rc<dyn Label>)
    });

    assert_eq!(registry.resolve_trait_named::<dyn Label>("app").unwrap().text(), "app");
    assert!(matches!(
        registry.create_trait_named::<dyn Label>("app"),
        Err(DiError::SingletonOnlyViolation(key)) if key == Key::named::<dyn Label>("app")
    ));
}

#[test]
fn test_named_trait_overrides() {
    let registry = Registry::new();
    registry.register_trait_with::<dyn Label, _>("prefixed", Lifetime::Shared, |r| {
        Ok(Rc::new(Prefixed(r.resolve_named::<String>("title")?)) as Rc<dyn Label>)
    });

    let created = registry
        .create_trait_named_with::<dyn Label>("prefixed", |r| {
            r.register_named::<String, _>("title", |_| Ok("first".to_string()))
        })
        .unwrap();
    assert_eq!(created.text(), "> first");

    // Cached by the create above, so the new override is not consulted
    let resolved = registry
        .resolve_trait_named_with::<dyn Label>("prefixed", |r| {
            r.register_named::<String, _>("title", |_| Ok("second".to_string()))
        })
        .unwrap();
    assert!(Rc::ptr_eq(&created, &resolved));
    assert_eq!(registry.overlay_len(), 0);
    assert!(registry.resolve_named::<String>("title").is_err());
}
