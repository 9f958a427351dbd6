// Application layer: pipelines wiring core logic to adapters.

pub mod pipelines;
