pub mod xk_pipeline;

pub use xk_pipeline::XkPipeline;
