//! Generative modules (simulated backends)

mod text_generator;

pub use text_generator::TextGeneratorModule;
