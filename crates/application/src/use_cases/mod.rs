//! Application use cases (pipeline orchestration).

mod generate_source;

pub use generate_source::*;
