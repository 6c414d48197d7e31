//! HTTP controllers

pub mod hello_world;
