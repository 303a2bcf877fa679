mod canvas;
mod fill;

pub use canvas::BrailleCanvas;
pub use fill::FillCanvas;
