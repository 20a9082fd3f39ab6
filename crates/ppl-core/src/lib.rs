#![deny(missing_docs)]
#![doc = "Core contracts shared by the enumeration engine: errors, distributions, environment snapshots."]

pub mod canonical;
pub mod erp;
pub mod errors;
pub mod rng;
pub mod store;

pub use canonical::canonical_key;
pub use erp::{Bernoulli, Categorical, Discrete, Erp, Gaussian, RandomInteger, UniformDraw};
pub use errors::{EnumError, ErrorInfo};
pub use rng::RngHandle;
pub use store::Store;
