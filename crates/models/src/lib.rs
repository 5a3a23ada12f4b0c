pub mod errors;
pub mod db;
pub mod admin;
pub mod employee;
pub mod document;

#[cfg(test)]
mod tests;
