#[path = "materials/registry.rs"]
mod registry;
