pub mod list_behaviors;
pub mod run;
pub mod validate;
