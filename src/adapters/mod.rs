// Adapters layer: concrete implementations of the domain ports (http, sinks).

pub mod http;
pub mod sink;

pub use http::HttpFetcher;
pub use sink::{CsvSink, XlsxSink};
