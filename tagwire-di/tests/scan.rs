#[cfg(all(feature = "derive", feature = "threadsafe"))]
mod scan_test {
    use std::any::TypeId;
    use tagwire_di::container::ContainerBuilder;
    use tagwire_di::metadata::Injected;
    use tagwire_di::InstantiationError;
    use tagwire_di::{binding, Injectable};

    trait Greeter {
        fn greet(&self, name: &str) -> String;
    }

    type GreeterBase = dyn Greeter + Send + Sync;

    #[derive(Injectable)]
    #[injectable(tag = "en")]
    struct EnglishGreeter;

    #[binding]
    impl Greeter for EnglishGreeter {
        fn greet(&self, name: &str) -> String {
            format!("Hello, {name}!")
        }
    }

    #[derive(Injectable)]
    #[injectable(tag = "pl")]
    struct PolishGreeter;

    #[binding]
    impl Greeter for PolishGreeter {
        fn greet(&self, name: &str) -> String {
            format!("Cześć, {name}!")
        }
    }

    #[derive(Injectable)]
    #[injectable(singleton)]
    struct Reception {
        #[inject(tag = "pl")]
        greeter: Injected<GreeterBase>,
    }

    #[derive(Injectable)]
    struct Lobby {
        #[inject]
        _greeter: Injected<GreeterBase>,
    }

    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn should_collect_bindings_from_inventory() {
        init_logging();

        let container = ContainerBuilder::new().unwrap().build();
        let registry = container.registry();

        assert!(registry.is_registered(TypeId::of::<GreeterBase>()));
        assert!(registry.is_registered(TypeId::of::<EnglishGreeter>()));
        assert!(registry.is_registered(TypeId::of::<Reception>()));

        let tags = registry
            .bindings(TypeId::of::<GreeterBase>())
            .into_iter()
            .map(|(tag, _)| tag)
            .collect::<Vec<_>>();
        assert_eq!(tags, vec![Some("en".to_string()), Some("pl".to_string())]);
    }

    #[test]
    fn should_instantiate_scanned_types() {
        init_logging();

        let mut container = ContainerBuilder::new().unwrap().build();

        let english = container.instantiate_tagged::<GreeterBase>("en").unwrap();
        assert_eq!(english.greet("Ann"), "Hello, Ann!");

        let reception = container.instantiate::<Reception>().unwrap();
        assert_eq!(reception.greeter.greet("Ann"), "Cześć, Ann!");

        let same_reception = container.instantiate::<Reception>().unwrap();
        assert!(std::sync::Arc::ptr_eq(&reception, &same_reception));
    }

    #[test]
    fn should_reject_untagged_injection_of_ambiguous_base() {
        init_logging();

        let mut container = ContainerBuilder::new().unwrap().build();

        assert!(matches!(
            container.instantiate::<Lobby>().err().unwrap(),
            InstantiationError::AmbiguousBinding { candidates, .. } if candidates.len() == 2
        ));
    }
}
