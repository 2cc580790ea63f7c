pub mod evaluation;
pub mod weather;
