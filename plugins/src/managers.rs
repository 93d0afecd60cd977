pub mod sequential;
pub mod topology;
