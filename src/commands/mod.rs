//! Application service layer: storage, generation and weather behind
//! string-error functions the front end calls directly

pub mod plan;
pub mod weather;
