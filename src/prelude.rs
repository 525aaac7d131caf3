//! To ease access to most frequently items
//!

pub use crate::error::EmbedError;

pub use crate::svd::params::*;
pub use crate::svd::{select_svd, SvdResult};
pub use crate::dimselect::*;

pub use crate::embedding::*;
pub use crate::graphs::GraphCollection;

pub use crate::ase::*;
pub use crate::mase::*;
pub use crate::mds::*;

pub use crate::tools::EmbedScalar;
