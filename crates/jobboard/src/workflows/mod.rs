pub mod profile;
pub mod screening;
