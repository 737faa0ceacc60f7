pub mod hello;
pub mod users;
