pub mod controller;
pub mod keyboard;
