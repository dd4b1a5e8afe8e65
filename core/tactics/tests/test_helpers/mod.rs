#![allow(dead_code)]

pub mod level_builder;
