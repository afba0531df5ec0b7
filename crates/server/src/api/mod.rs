mod generate;

pub use generate::{generate_pdf, health_check, preflight};
