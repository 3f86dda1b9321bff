//! Built-in test cases

mod example;
mod network;

pub use example::ExampleTest;
pub use network::NetworkTest;
