mod error;
mod interface;
mod registry;

pub use error::ToolInvokeError;
pub use interface::{ToolDescriptor, ToolServerInterface};
pub use registry::{RegistryOptions, ServerEndpoint, ServerToolCount, ToolRegistry};
