pub mod engine;
pub mod extractor;
pub mod pdf;
pub mod renderer;
pub mod reports;
pub mod resolver;
pub mod validator;
