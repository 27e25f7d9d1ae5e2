pub mod binary;
pub mod prelude;
