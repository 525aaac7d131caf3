//! Describes the embedded vectors and the estimator interface.
//!
//! Latent positions are stored in Array2\<F\>, each row corresponds to a vertex.
//! For a directed graph a vertex has two roles: as the source of its out edges and as the target of
//! its in edges, so two matrices are needed. For an undirected graph the right matrix is absent.
//!
//! Estimation follows a configure, fit, read attributes (or transform) sequence:
//! - a parameter struct validated at construction implements [EmbedderT]. Its fit method returns a fitted model,
//!   so a model cannot be used before it is fitted.
//! - [Estimator] wraps parameters and an optional fitted model for callers needing a mutable object
//!   that is refitted in place. It then reports [EmbedError::NotFitted] at run time.

use ndarray::{Array2, ArrayView1};
use std::marker::PhantomData;

use crate::error::EmbedError;

/// tag to specify we ask information on a node as a source in asymmetric embedding
pub const TAG_OUT: u8 = 0;

/// tag to specify we ask information on a node as a target in asymmetric embedding
pub const TAG_IN: u8 = 1;

/// Latent positions of the vertices of a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct LatentPositions<F> {
    /// (n, d) array, representation of nodes as sources (or unique representation if symmetric)
    left: Array2<F>,
    /// (n, d) array, representation of nodes as targets, only for directed graphs
    right: Option<Array2<F>>,
} // end of LatentPositions

impl<F> LatentPositions<F> {
    pub(crate) fn new(left: Array2<F>, right: Option<Array2<F>>) -> Self {
        if let Some(right) = right.as_ref() {
            assert_eq!(left.dim().0, right.dim().0);
        }
        LatentPositions { left, right }
    }

    /// returns true if there is a unique representation of nodes
    pub fn is_symmetric(&self) -> bool {
        self.right.is_none()
    }

    pub fn get_left(&self) -> &Array2<F> {
        &self.left
    }

    pub fn get_right(&self) -> Option<&Array2<F>> {
        self.right.as_ref()
    }

    /// dimension of embedded vectors
    pub fn get_dimension(&self) -> usize {
        self.left.dim().1
    }

    pub fn get_nb_nodes(&self) -> usize {
        self.left.dim().0
    }

    /// get embedding of node of rank node_rank as a source (TAG_OUT) or as a target (TAG_IN).
    /// For a symmetric embedding the tag is not taken into account.
    pub fn get_embedded_node(&self, node_rank: usize, tag: u8) -> ArrayView1<F> {
        match (&self.right, tag) {
            (Some(right), TAG_IN) => right.row(node_rank),
            _ => self.left.row(node_rank),
        }
    }

    pub fn into_parts(self) -> (Array2<F>, Option<Array2<F>>) {
        (self.left, self.right)
    }
} // end of impl LatentPositions

//=====================================================================================

/// A fitted model. F is the type contained in embedded vectors, f32 or f64.
pub trait FittedT<F> {
    /// what fit_transform returns
    type Output;
    /// the embedding dimension retained by the fit
    fn n_components(&self) -> usize;
    /// the main result of the fit
    fn fitted_output(&self) -> Self::Output;
} // end of trait FittedT

/// Something that, from its parameters, can be fitted on some input.
pub trait EmbedderT<F> {
    type Input;
    type Fitted: FittedT<F>;
    ///
    fn fit(&self, input: &Self::Input) -> Result<Self::Fitted, EmbedError>;
    /// fits and returns the main output of the fit
    fn fit_transform(&self, input: &Self::Input) -> Result<<Self::Fitted as FittedT<F>>::Output, EmbedError> {
        let fitted = self.fit(input)?;
        Ok(fitted.fitted_output())
    }
} // end of trait EmbedderT

/// A fitted model able to project new data without refitting.
pub trait TransformT<F>: FittedT<F> {
    type NewInput;
    type Projection;
    ///
    fn transform(&self, input: &Self::NewInput) -> Result<Self::Projection, EmbedError>;
} // end of trait TransformT

//=====================================================================================

/// Parameters and, once fitted, the fitted model.
///
/// A successful fit replaces the previous fitted model, a failed one leaves it untouched.
pub struct Estimator<F, E: EmbedderT<F>> {
    params: E,
    fitted: Option<E::Fitted>,
    _phantom: PhantomData<F>,
} // end of Estimator

impl<F, E> Estimator<F, E>
where
    E: EmbedderT<F>,
{
    pub fn new(params: E) -> Self {
        Estimator {
            params,
            fitted: None,
            _phantom: PhantomData,
        }
    }

    pub fn get_params(&self) -> &E {
        &self.params
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// fits on input and returns a reference to the fitted model
    pub fn fit(&mut self, input: &E::Input) -> Result<&E::Fitted, EmbedError> {
        let fitted = self.params.fit(input)?;
        Ok(self.fitted.insert(fitted))
    }

    /// fits on input and returns the main output of the fit
    pub fn fit_transform(&mut self, input: &E::Input) -> Result<<E::Fitted as FittedT<F>>::Output, EmbedError> {
        Ok(self.fit(input)?.fitted_output())
    }

    /// the fitted model, fails with NotFitted if fit was not called successfully.
    pub fn fitted(&self) -> Result<&E::Fitted, EmbedError> {
        self.fitted.as_ref().ok_or(EmbedError::NotFitted("fitted"))
    }

    /// releases the fitted model
    pub fn into_fitted(self) -> Result<E::Fitted, EmbedError> {
        self.fitted.ok_or(EmbedError::NotFitted("into_fitted"))
    }
} // end of impl Estimator

impl<F, E> Estimator<F, E>
where
    E: EmbedderT<F>,
    E::Fitted: TransformT<F>,
{
    /// projects new data with the fitted model
    pub fn transform(
        &self,
        input: &<E::Fitted as TransformT<F>>::NewInput,
    ) -> Result<<E::Fitted as TransformT<F>>::Projection, EmbedError> {
        match self.fitted.as_ref() {
            Some(fitted) => fitted.transform(input),
            None => Err(EmbedError::NotFitted("transform")),
        }
    }
} // end of impl Estimator with transform

//=====================================================================================

// end of mod tests
