pub mod functions;
pub mod fwi;
