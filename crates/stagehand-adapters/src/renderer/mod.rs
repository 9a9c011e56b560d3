//! Template rendering adapters.

mod functions;
mod template;

pub use template::TemplateEngine;
