pub mod demo;
pub mod identifier;
pub mod rules;
