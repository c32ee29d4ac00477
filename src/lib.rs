//! Fractal engines: chaos-game ferns, escape-time sets, L-systems and
//! spirograph epicycles, plus the raster and step scheduler they draw
//! through.

pub mod error;
pub mod escape;
pub mod ifs;
pub mod lsystem;
pub mod mapping;
pub mod matrix;
pub mod raster;
pub mod scheduler;
pub mod spirograph;

pub use error::{FractalError, Result};
pub use mapping::map;
pub use raster::{Raster, Rgb, Surface};
pub use scheduler::{Generation, Job, Scheduler};
