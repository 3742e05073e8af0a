pub mod auth;
pub mod batches;
pub mod pages;
pub mod verify;
