//! Tree assembly over resolved documents.

mod binding;
mod builder;

pub use binding::bind_templates;
pub use builder::MetadataTreeBuilder;
