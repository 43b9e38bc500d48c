use tagwire_di::container::ContainerBuilder;
use tagwire_di::instance_provider::InstancePtr;
use tagwire_di::metadata::Injected;
use tagwire_di::{binding, injection_points, Injectable};

// a trait with multiple implementations, distinguished by tags
trait Operator {
    fn act(&self, a: i32, b: i32) -> i32;
}

type OperatorPtr = InstancePtr<dyn Operator + Send + Sync>;

#[derive(Injectable)]
#[injectable(tag = "add")]
struct AddOperator;

// we're telling the container to provide AddOperator when asked for dyn Operator tagged "add"
#[binding]
impl Operator for AddOperator {
    fn act(&self, a: i32, b: i32) -> i32 {
        a + b
    }
}

#[derive(Injectable)]
#[injectable(tag = "subtract")]
struct SubtractOperator;

#[binding]
impl Operator for SubtractOperator {
    fn act(&self, a: i32, b: i32) -> i32 {
        a - b
    }
}

#[derive(Injectable)]
#[injectable(tag = "multiply")]
struct MultiplyOperator;

#[binding]
impl Operator for MultiplyOperator {
    fn act(&self, a: i32, b: i32) -> i32 {
        a * b
    }
}

// computes (a + b) * (a - b), with every dependency injected in a different way
#[derive(Injectable)]
#[injectable(injection_points)]
struct Calculator {
    // constructor injection
    add: OperatorPtr,
    // field injection
    #[inject(tag = "subtract")]
    subtract: Injected<dyn Operator + Send + Sync>,
    // setter injection
    #[injectable(default)]
    multiply: Option<OperatorPtr>,
}

#[injection_points]
impl Calculator {
    #[inject]
    fn new(#[tag = "add"] add: OperatorPtr) -> Self {
        Self {
            add,
            subtract: Injected::empty(),
            multiply: None,
        }
    }

    #[inject]
    fn set_multiply(&mut self, #[tag = "multiply"] multiply: OperatorPtr) {
        self.multiply = Some(multiply);
    }

    fn operation(&self, a: i32, b: i32) -> Option<i32> {
        let multiply = self.multiply.as_ref()?;
        Some(multiply.act(self.add.act(a, b), self.subtract.act(a, b)))
    }
}

//noinspection DuplicatedCode
// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    // run with RUST_LOG=tagwire_di=trace to see how the graph is resolved
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // all types deriving Injectable and all #[binding] impls are registered automatically
    let mut container = ContainerBuilder::new()
        .expect("error initializing ContainerBuilder")
        .build();

    let calculator = container
        .instantiate::<Calculator>()
        .expect("error creating Calculator");

    // prints "(51 + 39) * (51 - 39) = 1080"
    println!(
        "(51 + 39) * (51 - 39) = {}",
        calculator.operation(51, 39).expect("multiply not injected")
    );
}
