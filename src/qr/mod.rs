pub mod encoder;
pub mod renderer;
