//! Spectral embedding of graphs.
//!
//! Latent positions of one graph (adjacency spectral embedding), of a population of graphs sharing
//! their vertex set (multiple adjacency spectral embedding, MASE) and of a dissimilarity matrix
//! (classical multidimensional scaling) are estimated from truncated, randomized or full svd.
//! When the embedding dimension is not given, it is chosen by a profile likelihood elbow search
//! on the singular values spectrum.
//!
//! All computations are done in memory on dense arrays (ndarray).

pub mod error;

pub mod tools;

pub mod svd;

pub mod dimselect;

pub mod embedding;

pub mod graphs;

pub mod ase;

pub mod mase;

pub mod mds;

pub mod io;

pub mod prelude;
