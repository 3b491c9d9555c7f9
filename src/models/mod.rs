pub mod classify_types;
pub mod session_types;
