#[cfg(all(feature = "derive", feature = "threadsafe"))]
mod injection_test {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tagwire_di::binding_registry::BindingRegistry;
    use tagwire_di::config::{ContainerConfig, CycleDetection};
    use tagwire_di::container::Container;
    use tagwire_di::instance_provider::InstancePtr;
    use tagwire_di::metadata::Injected;
    use tagwire_di::InstantiationError;
    use tagwire_di::{binding, injection_points, Injectable};

    trait HttpService {
        fn get_string(&self) -> String;
    }

    trait NewsService {
        fn http_service(&self) -> InstancePtr<dyn HttpService + Send + Sync>;
        fn describe(&self) -> String;
    }

    #[derive(Injectable)]
    struct MySuperUselessService;

    impl MySuperUselessService {
        fn value(&self) -> String {
            "super useless".to_string()
        }
    }

    #[derive(Injectable)]
    #[injectable(injection_points)]
    struct MyUselessService {
        #[injectable(default)]
        super_useless: Option<InstancePtr<MySuperUselessService>>,
    }

    #[injection_points]
    impl MyUselessService {
        #[inject]
        fn set_super_useless(&mut self, service: InstancePtr<MySuperUselessService>) {
            self.super_useless = Some(service);
        }

        fn value(&self) -> String {
            let super_useless = self
                .super_useless
                .as_ref()
                .map(|service| service.value())
                .unwrap_or_default();
            format!("useless {super_useless}")
        }
    }

    #[derive(Injectable)]
    struct MyOtherUselessService;

    #[derive(Injectable)]
    #[injectable(injection_points)]
    struct DarkWebHttpService {
        #[injectable(default)]
        useless: Option<InstancePtr<MyUselessService>>,
        #[injectable(default)]
        other_useless: Option<InstancePtr<MyOtherUselessService>>,
    }

    #[injection_points]
    impl DarkWebHttpService {
        #[inject]
        fn set_useless(&mut self, service: InstancePtr<MyUselessService>) {
            self.useless = Some(service);
        }

        #[inject]
        fn set_other_useless(&mut self, service: InstancePtr<MyOtherUselessService>) {
            self.other_useless = Some(service);
        }
    }

    #[binding]
    impl HttpService for DarkWebHttpService {
        fn get_string(&self) -> String {
            let useless = self
                .useless
                .as_ref()
                .map(|service| service.value())
                .unwrap_or_default();
            let other = self
                .other_useless
                .as_ref()
                .map(|_| "other useless")
                .unwrap_or_default();
            format!("hi {useless} {other}")
        }
    }

    #[derive(Injectable)]
    #[injectable(injection_points)]
    struct RssNewsService {
        http_service: InstancePtr<dyn HttpService + Send + Sync>,
        #[inject]
        useless: Injected<MyUselessService>,
    }

    #[injection_points]
    impl RssNewsService {
        #[inject]
        fn new(http_service: InstancePtr<dyn HttpService + Send + Sync>) -> Self {
            Self {
                http_service,
                useless: Injected::empty(),
            }
        }
    }

    #[binding]
    impl NewsService for RssNewsService {
        fn http_service(&self) -> InstancePtr<dyn HttpService + Send + Sync> {
            self.http_service.clone()
        }

        fn describe(&self) -> String {
            format!("RssNewsService: {}", self.useless.value())
        }
    }

    trait UnimplementedService {}

    #[derive(Injectable)]
    struct MyService {
        #[inject]
        _unimplemented: Injected<dyn UnimplementedService + Send + Sync>,
    }

    #[derive(Injectable)]
    struct EpicService {
        _name: String,
    }

    #[derive(Injectable)]
    struct DependsOnEpicService {
        #[inject]
        _epic: Injected<EpicService>,
    }

    #[derive(Injectable)]
    #[injectable(injection_points)]
    struct ConstructorCycleA(InstancePtr<ConstructorCycleB>);

    #[injection_points]
    impl ConstructorCycleA {
        #[inject]
        fn new(dependency: InstancePtr<ConstructorCycleB>) -> Self {
            Self(dependency)
        }
    }

    #[derive(Injectable)]
    #[injectable(injection_points)]
    struct ConstructorCycleB(InstancePtr<ConstructorCycleC>);

    #[injection_points]
    impl ConstructorCycleB {
        #[inject]
        fn new(dependency: InstancePtr<ConstructorCycleC>) -> Self {
            Self(dependency)
        }
    }

    #[derive(Injectable)]
    #[injectable(injection_points)]
    struct ConstructorCycleC(InstancePtr<ConstructorCycleA>);

    #[injection_points]
    impl ConstructorCycleC {
        #[inject]
        fn new(dependency: InstancePtr<ConstructorCycleA>) -> Self {
            Self(dependency)
        }
    }

    #[derive(Injectable)]
    struct FieldCycleA {
        #[inject]
        _b: Injected<FieldCycleB>,
    }

    #[derive(Injectable)]
    struct FieldCycleB {
        #[inject]
        _c: Injected<FieldCycleC>,
    }

    #[derive(Injectable)]
    #[injectable(injection_points)]
    struct FieldCycleC {
        #[injectable(default)]
        a: Option<InstancePtr<FieldCycleA>>,
    }

    #[injection_points]
    impl FieldCycleC {
        #[inject]
        fn set_a(&mut self, a: InstancePtr<FieldCycleA>) {
            self.a = Some(a);
        }
    }

    // a diamond which is not a cycle
    #[derive(Injectable)]
    struct Diamond {
        #[inject]
        left: Injected<MyUselessService>,
        #[inject]
        right: Injected<MyUselessService>,
    }

    trait Counter {
        fn count(&self) -> usize;
    }

    #[derive(Injectable)]
    #[injectable(singleton, tag = "global")]
    struct GlobalCounter {
        #[injectable(default)]
        state: AtomicUsize,
    }

    #[binding]
    impl Counter for GlobalCounter {
        fn count(&self) -> usize {
            self.state.fetch_add(1, Ordering::SeqCst)
        }
    }

    #[derive(Injectable)]
    #[injectable(tag = "local")]
    struct LocalCounter {
        #[injectable(default)]
        state: AtomicUsize,
    }

    #[binding]
    impl Counter for LocalCounter {
        fn count(&self) -> usize {
            self.state.fetch_add(1, Ordering::SeqCst)
        }
    }

    fn create_registry() -> BindingRegistry {
        let mut registry = BindingRegistry::default();
        registry
            .register::<dyn HttpService + Send + Sync, DarkWebHttpService>()
            .unwrap();
        registry
            .register::<dyn NewsService + Send + Sync, RssNewsService>()
            .unwrap();
        registry
            .register::<MyUselessService, MyUselessService>()
            .unwrap();
        registry
            .register::<MyOtherUselessService, MyOtherUselessService>()
            .unwrap();
        registry
            .register::<MySuperUselessService, MySuperUselessService>()
            .unwrap();
        registry.register::<MyService, MyService>().unwrap();
        registry.register::<EpicService, EpicService>().unwrap();
        registry
            .register::<DependsOnEpicService, DependsOnEpicService>()
            .unwrap();
        registry
            .register::<ConstructorCycleA, ConstructorCycleA>()
            .unwrap();
        registry
            .register::<ConstructorCycleB, ConstructorCycleB>()
            .unwrap();
        registry
            .register::<ConstructorCycleC, ConstructorCycleC>()
            .unwrap();
        registry.register::<FieldCycleA, FieldCycleA>().unwrap();
        registry.register::<FieldCycleB, FieldCycleB>().unwrap();
        registry.register::<FieldCycleC, FieldCycleC>().unwrap();
        registry.register::<Diamond, Diamond>().unwrap();
        registry
            .register::<dyn Counter + Send + Sync, GlobalCounter>()
            .unwrap();
        registry
            .register::<dyn Counter + Send + Sync, LocalCounter>()
            .unwrap();
        registry
    }

    fn create_container() -> Container {
        Container::new(create_registry(), ContainerConfig::default())
    }

    fn assert_cycle(error: InstantiationError, members: &[&str]) {
        match error {
            InstantiationError::CyclicDependency(types) => {
                for member in members {
                    assert!(
                        types.iter().any(|name| name.ends_with(member)),
                        "{member} missing in {types:?}"
                    );
                }
            }
            error => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn should_inject_constructor_fields_and_setters() {
        let mut container = create_container();

        let news_service = container
            .instantiate::<dyn NewsService + Send + Sync>()
            .unwrap();

        assert_eq!(
            news_service.http_service().get_string(),
            "hi useless super useless other useless"
        );
        assert_eq!(
            news_service.describe(),
            "RssNewsService: useless super useless"
        );
    }

    #[test]
    fn should_fail_on_missing_implementation() {
        let mut container = create_container();

        assert!(matches!(
            container.instantiate::<MyService>().err().unwrap(),
            InstantiationError::ImplementationNotFound { tag: None, .. }
        ));
    }

    #[test]
    fn should_fail_on_missing_default_constructor() {
        let mut container = create_container();

        let expected =
            InstantiationError::NoDefaultConstructor(std::any::type_name::<EpicService>().to_string());
        assert_eq!(container.instantiate::<EpicService>().err().unwrap(), expected);
        assert_eq!(
            container.instantiate::<DependsOnEpicService>().err().unwrap(),
            expected
        );
    }

    #[test]
    fn should_detect_constructor_cycles() {
        let mut container = create_container();

        assert_cycle(
            container.instantiate::<ConstructorCycleA>().err().unwrap(),
            &["ConstructorCycleA", "ConstructorCycleB", "ConstructorCycleC"],
        );
    }

    #[test]
    fn should_detect_field_and_setter_cycles() {
        let mut container = create_container();

        assert_cycle(
            container.instantiate::<FieldCycleB>().err().unwrap(),
            &["FieldCycleA", "FieldCycleB", "FieldCycleC"],
        );
    }

    #[test]
    fn should_detect_cycles_with_recursion_counter() {
        let mut container = Container::new(
            create_registry(),
            ContainerConfig::new(CycleDetection::RecursionCounter, 32),
        );

        assert_cycle(
            container.instantiate::<ConstructorCycleA>().err().unwrap(),
            &["ConstructorCycleA", "ConstructorCycleB", "ConstructorCycleC"],
        );
    }

    #[test]
    fn should_allow_shared_dependencies() {
        let mut container = create_container();

        let diamond = container.instantiate::<Diamond>().unwrap();

        assert_eq!(diamond.left.value(), diamond.right.value());
        assert!(!InstancePtr::ptr_eq(
            diamond.left.get().unwrap(),
            diamond.right.get().unwrap()
        ));
    }

    #[test]
    fn should_reuse_singletons_only() {
        let mut container = create_container();

        let global_1 = container
            .instantiate_tagged::<dyn Counter + Send + Sync>("global")
            .unwrap();
        assert_eq!(global_1.count(), 0);
        assert_eq!(global_1.count(), 1);

        let local_1 = container
            .instantiate_tagged::<dyn Counter + Send + Sync>("local")
            .unwrap();
        assert_eq!(local_1.count(), 0);
        assert_eq!(local_1.count(), 1);

        let global_2 = container
            .instantiate_tagged::<dyn Counter + Send + Sync>("global")
            .unwrap();
        assert!(InstancePtr::ptr_eq(&global_1, &global_2));
        assert_eq!(global_2.count(), 2);

        let local_2 = container
            .instantiate_tagged::<dyn Counter + Send + Sync>("local")
            .unwrap();
        assert!(!InstancePtr::ptr_eq(&local_1, &local_2));
        assert_eq!(local_2.count(), 0);
    }
}
