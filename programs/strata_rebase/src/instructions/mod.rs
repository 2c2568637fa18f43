// programs/strata_rebase/src/instructions/mod.rs

pub mod initialize;
pub mod params;
pub mod rebase;
pub mod value;

pub use initialize::*;
pub use params::*;
pub use rebase::*;
pub use value::*;
