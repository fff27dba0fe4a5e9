// Person → PPE detection pipeline

pub mod batch;
pub mod cascade;
pub mod detector;
pub mod geometry;
pub mod render;
pub mod types;
