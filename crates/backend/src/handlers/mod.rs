pub mod admin;
pub mod pages;
pub mod plant;
pub mod system;
