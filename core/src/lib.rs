pub mod compile;
pub mod pipeline;
pub mod registry;
