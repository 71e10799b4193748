pub mod migrate;
pub mod prerequisites;
