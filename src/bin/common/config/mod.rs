pub mod builder;
pub mod models;

#[cfg(test)]
mod test;
