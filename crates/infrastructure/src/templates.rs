//! Bundled handler skeleton.

/// AWS Lambda C++ handler skeleton with `{{NAME}}` placeholders.
pub const BUNDLED_TEMPLATE: &str = include_str!("../templates/main.cpp");
