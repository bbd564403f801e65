pub mod cls;
pub mod constants;
pub mod cosmology;
pub mod error;
pub mod power;
pub mod spline;
pub mod symbols;
pub mod tracer;

pub use cls::{angular_cl, angular_cl_spectrum};
pub use cosmology::Cosmology;
pub use error::{CosmoError, ErrorCode};
pub use power::MatterPower;
pub use symbols::ensure_loaded;
pub use tracer::{ClTracer, DndzModel, TracerKind};
