pub mod document;
pub mod extract;
pub mod fetch;
pub mod render;
pub mod resolver;
