pub mod helpers;
pub mod prelude;
pub mod zbin;
