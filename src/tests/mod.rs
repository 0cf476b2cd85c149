// Test modules for all components
pub mod fixtures;
pub mod test_agent;
