pub mod adjustment;
pub mod pipeline;
pub mod transform;
