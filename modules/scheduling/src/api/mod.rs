pub mod openapi;
pub mod problem;
pub mod rest;
