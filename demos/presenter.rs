//! Wires a screen presenter from an application-wide text service and a
//! per-screen argument supplied as a one-call override.
//!
//! Run with `RUST_LOG=debug` to see the registry's own events.

use ferrous_locator::{DiResult, Lifetime, LoggingObserver, Registry, Resolver, ResolverCore};
use std::cell::RefCell;
use std::rc::Rc;

// ===== Services =====

trait TextService {
    fn hello_world(&self) -> String;
}

struct EnglishTextService;

impl TextService for EnglishTextService {
    fn hello_world(&self) -> String {
        "Hello, world!".to_string()
    }
}

/// Stand-in for a UI surface the presenter writes to.
struct Screen {
    name: String,
    text: RefCell<String>,
}

impl Screen {
    fn new(name: &str) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            text: RefCell::new(String::new()),
        })
    }
}

trait Presenter {
    fn init_view(&self);
}

struct MainPresenter {
    text_service: Rc<dyn TextService>,
    screen: Rc<Screen>,
}

impl Presenter for MainPresenter {
    fn init_view(&self) {
        *self.screen.text.borrow_mut() = self.text_service.hello_world();
    }
}

// ===== Application wiring =====

fn build_registry() -> Registry {
    let mut registry = Registry::new();
    registry.add_observer(Rc::new(LoggingObserver::with_prefix("[demo]")));

    registry.register_trait_with::<dyn TextService, _>("", Lifetime::SingletonOnly, |_| {
        Ok(Rc::new(EnglishTextService) as Rc<dyn TextService>)
    });
    registry.register_trait::<dyn Presenter, _>(|r| {
        Ok(Rc::new(MainPresenter {
            text_service: r.resolve_trait::<dyn TextService>()?,
            screen: r.resolve_trait::<Screen>()?,
        }) as Rc<dyn Presenter>)
    });
    registry
}

/// Builds a presenter for `screen`. The screen is bound only for this call;
/// screens only see the read-only side of the registry.
fn open_screen(registry: &dyn ResolverCore, screen: &Rc<Screen>) -> DiResult<()> {
    let presenter = registry.create_trait_with::<dyn Presenter>(|r| {
        let screen = screen.clone();
        r.register_trait::<Screen, _>(move |_| Ok(screen.clone()));
    })?;
    presenter.init_view();
    Ok(())
}

fn main() -> DiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let registry = build_registry();

    for name in ["main", "settings"] {
        let screen = Screen::new(name);
        open_screen(&registry, &screen)?;
        println!("{}: {}", screen.name, screen.text.borrow());
    }

    // No screen is bound permanently
    if let Err(err) = registry.create_trait::<dyn Presenter>() {
        println!("Without a screen override: {}", err);
    }

    // The text service is shared and can never be rebuilt
    if let Err(err) = registry.create_trait::<dyn TextService>() {
        println!("Rebuilding the text service: {}", err);
    }

    println!("Permanent bindings: {}", registry.len());
    Ok(())
}
