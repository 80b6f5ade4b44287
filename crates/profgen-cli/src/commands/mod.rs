pub mod build;
pub mod completions;
pub mod inspect;
