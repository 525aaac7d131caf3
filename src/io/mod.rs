//! Load and dump of dense matrices, singular values and embeddings.

pub mod csv;
