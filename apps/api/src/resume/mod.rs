// Resume text acquisition and heuristic section detection.
// Produces inputs for the pipeline; no model calls here.

pub mod pdf;
pub mod sections;
