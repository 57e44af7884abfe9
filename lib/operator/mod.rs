//! Sparse operators described by their nonzero matrix elements.
//!
//! Operators are never stored as matrices over the full Hilbert space.
//! Instead, for a given configuration `v`, an [`Operator`] enumerates the
//! *connections* of `v`: every configuration `v'` such that `⟨v|O|v'⟩ ≠ 0`,
//! described by the matrix element and the minimal set of site changes that
//! take `v` to `v'`.
//!
//! ```text
//! ⟨v|O|v'⟩ = mel,   v' = v with v[tochange[k]] = newconf[k] for all k
//! ```

use std::rc::Rc;
use itertools::izip;
use ndarray as nd;
use num_complex::Complex64 as C64;
use thiserror::Error;
use crate::hilbert::{ HilbertError, HilbertSpace };

pub mod local;
pub use local::LocalOperator;

pub mod pauli;

#[derive(Debug, Error)]
pub enum OperatorError {
    /// Returned when a configuration passed to an operator does not have the
    /// size of the operator's Hilbert space.
    #[error("invalid argument: expected a configuration of size {expected}, got {found}")]
    InvalidArgument { expected: usize, found: usize },

    /// Propagated from the underlying Hilbert space.
    #[error("hilbert space error: {0}")]
    Hilbert(#[from] HilbertError),

    /// Returned when building a term that acts on no sites.
    #[error("error in operator creation: term acts on no sites")]
    EmptySites,

    /// Returned when building a term that acts on a nonexistent site.
    #[error("error in operator creation: site {site} out of range for {size} sites")]
    SiteOutOfRange { site: usize, size: usize },

    /// Returned when building a term that lists a site more than once.
    #[error("error in operator creation: site {0} appears more than once")]
    DuplicateSite(usize),

    /// Returned when a term's matrix does not match the dimension of the
    /// sites it acts on.
    #[error("error in operator creation: expected a {expected}x{expected} matrix, got {rows}x{cols}")]
    MatrixShape { expected: usize, rows: usize, cols: usize },

    /// Returned when combining operators defined on different spaces.
    #[error("operators act on incompatible hilbert spaces")]
    IncompatibleHilbert,

    /// Returned when an operator requires a specific local dimension.
    #[error("operator requires local dimension {expected}, got {found}")]
    LocalDimension { expected: usize, found: usize },

    /// Returned by a consumer to stop an enumeration early.
    #[error("enumeration stopped: {0}")]
    Stopped(String),
}
use OperatorError::*;
pub type OperatorResult<T> = Result<T, OperatorError>;

/// A single nonzero matrix element in the row of an operator.
///
/// An empty `tochange` denotes the diagonal element.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConnectorRef<'a> {
    pub mel: C64,
    pub tochange: &'a [usize],
    pub newconf: &'a [f64],
}

impl<'a> ConnectorRef<'a> {
    /// Return `true` if this is a diagonal element.
    pub fn is_diagonal(&self) -> bool { self.tochange.is_empty() }
}

/// Owned, batched output of [`Operator::find_conn`], stored as three parallel
/// sequences.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Connections {
    pub mel: Vec<C64>,
    pub connectors: Vec<Vec<usize>>,
    pub newconfs: Vec<Vec<f64>>,
}

impl Connections {
    /// Create a new, empty collection.
    pub fn new() -> Self { Self::default() }

    /// Number of stored connections.
    pub fn len(&self) -> usize { self.mel.len() }

    /// Return `true` if no connections are stored.
    pub fn is_empty(&self) -> bool { self.mel.is_empty() }

    /// Remove all stored connections, keeping allocations.
    pub fn clear(&mut self) {
        self.mel.clear();
        self.connectors.clear();
        self.newconfs.clear();
    }

    /// Append a copy of a connection.
    pub fn push(&mut self, conn: ConnectorRef<'_>) {
        self.mel.push(conn.mel);
        self.connectors.push(conn.tochange.to_vec());
        self.newconfs.push(conn.newconf.to_vec());
    }

    /// Iterate over stored connections in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = ConnectorRef<'_>> + '_ {
        izip!(&self.mel, &self.connectors, &self.newconfs)
            .map(|(mel, tochange, newconf)| {
                ConnectorRef { mel: *mel, tochange, newconf }
            })
    }
}

/// Basic requirements for any sparse operator.
pub trait Operator {
    /// Space that configurations passed to the operator belong to.
    type Hilbert: HilbertSpace;

    /// Return a shared handle to the operator's space.
    fn hilbert_shared(&self) -> Rc<Self::Hilbert>;

    /// Call `f` once for every connection of `v`.
    ///
    /// Enumeration is lazy and synchronous. If `f` returns an error, no more
    /// connections are visited and the error is returned as-is.
    fn for_each_conn<F>(&self, v: &[f64], f: F) -> OperatorResult<()>
    where F: FnMut(ConnectorRef<'_>) -> OperatorResult<()>;

    /// Collect every connection of `v` into `conns`, replacing its previous
    /// contents.
    ///
    /// Produces exactly the sequence visited by [`Self::for_each_conn`].
    fn find_conn(&self, v: &[f64], conns: &mut Connections)
        -> OperatorResult<()>
    {
        conns.clear();
        self.for_each_conn(v, |conn| {
            conns.push(conn);
            Ok(())
        })
    }

    /// Materialize the operator as a dense matrix over its entire space.
    ///
    /// The `(i, j)`-th element is `⟨i|O|j⟩`, where basis states are ordered
    /// according to [`HilbertSpace::state_number`]. Only suitable for small
    /// spaces.
    fn to_dense(&self) -> OperatorResult<nd::Array2<C64>> {
        let hilbert = self.hilbert_shared();
        let n = hilbert.n_states()?;
        let mut mat: nd::Array2<C64> = nd::Array2::zeros((n, n));
        let mut vp: Vec<f64> = Vec::with_capacity(hilbert.size());
        for i in 0..n {
            let v = hilbert.number_to_state(i);
            self.for_each_conn(&v, |conn| {
                vp.clear();
                vp.extend_from_slice(&v);
                hilbert.update_conf(&mut vp, conn.tochange, conn.newconf)?;
                let j = hilbert.state_number(&vp)?;
                mat[[i, j]] += conn.mel;
                Ok(())
            })?;
        }
        Ok(mat)
    }
}

/// Check that a configuration has the size an operator expects.
pub(crate) fn check_size(v: &[f64], expected: usize) -> OperatorResult<()> {
    if v.len() == expected {
        Ok(())
    } else {
        Err(InvalidArgument { expected, found: v.len() })
    }
}
