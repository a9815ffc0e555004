pub mod blend;
pub mod canvas;
pub mod color_analysis;
pub mod config;
pub mod context;
pub mod gradient;
pub mod job;
pub mod pipeline;
pub mod smart_expansion;
