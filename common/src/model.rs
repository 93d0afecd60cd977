mod gpu;
mod interface;
mod node;
mod result;
mod switch;

pub use gpu::Gpu;
pub use interface::{InterfaceType, NetworkInterface};
pub use node::Node;
pub use result::ExecutionResult;
pub use switch::NetworkSwitch;
