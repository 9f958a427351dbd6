pub mod assembler;
pub mod cache;
pub mod classifier;
pub mod crawler;
pub mod etl;
pub mod extract;
pub mod markup;
pub mod reference;

pub use crate::domain::model::{Extracted, TransformResult};
pub use crate::domain::ports::{Fetcher, Pipeline, Storage, TableSink};
pub use crate::utils::error::Result;
