//! llmfactory library exports

pub mod core;
pub mod inference;

#[cfg(test)]
pub mod test_support;
