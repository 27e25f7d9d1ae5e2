pub mod grid;
pub mod output;
