pub mod controller;
pub mod roles;
pub mod router;
pub mod service;
