//! Built-in plugins

mod device_state;
mod example;
mod screenshot;

pub use device_state::{ActivityPlugin, NetworkStatePlugin};
pub use example::ExamplePlugin;
pub use screenshot::ScreenshotPlugin;
