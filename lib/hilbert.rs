//! Discrete many-body configuration spaces.
//!
//! A configuration is a plain `&[f64]` holding one local value per site. Each
//! site of a space takes values from the same finite, ordered list of local
//! states, and every configuration is identified with a basis state whose
//! index is read off in mixed radix with the first site most significant.
//!
//! The [`DoubledHilbert`] space pairs a "row" (bra) copy and a "column" (ket)
//! copy of a physical space in order to index the entries of a density matrix:
//! ```text
//!   v = [ r_0, ..., r_{N-1}, c_0, ..., c_{N-1} ]  <->  ρ[r, c]
//! ```

use std::rc::Rc;
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HilbertError {
    /// Returned when creating a space with no allowed local values.
    #[error("error in space creation: local basis is empty")]
    EmptyLocalBasis,

    /// Returned when creating a space whose local basis repeats a value.
    #[error("error in space creation: local value {0} appears more than once")]
    DuplicateLocalState(f64),

    /// Returned when a configuration does not have one value per site.
    #[error("wrong configuration size: expected {expected}, got {found}")]
    WrongSize { expected: usize, found: usize },

    /// Returned when a configuration holds a value outside the local basis.
    #[error("invalid local state {value} at site {site}")]
    InvalidLocalState { site: usize, value: f64 },

    /// Returned when a site index does not exist in the space.
    #[error("site {site} out of range for a space of {size} sites")]
    SiteOutOfRange { site: usize, size: usize },

    /// Returned when the total number of basis states overflows a `usize`.
    #[error("space of {size} sites with {local_size} local states is too large to index")]
    TooLarge { size: usize, local_size: usize },

    /// Returned when a list of changed sites and a list of new values differ
    /// in length.
    #[error("mismatched change lists: {sites} sites but {values} values")]
    ChangeMismatch { sites: usize, values: usize },
}
use HilbertError::*;
pub type HilbertResult<T> = Result<T, HilbertError>;

/// Basic requirements for a discrete configuration space with a uniform local
/// basis.
pub trait HilbertSpace {
    /// Number of sites in a configuration.
    fn size(&self) -> usize;

    /// Allowed local values, in basis order.
    fn local_states(&self) -> &[f64];

    /// Number of allowed local values.
    fn local_size(&self) -> usize { self.local_states().len() }

    /// Return the position of `value` in the local basis.
    ///
    /// `site` is only used to label the error.
    fn local_index(&self, site: usize, value: f64) -> HilbertResult<usize> {
        self.local_states().iter()
            .position(|s| *s == value)
            .ok_or(InvalidLocalState { site, value })
    }

    /// Total number of basis states.
    fn n_states(&self) -> HilbertResult<usize> {
        let size = self.size();
        let local_size = self.local_size();
        u32::try_from(size).ok()
            .and_then(|n| local_size.checked_pow(n))
            .ok_or(TooLarge { size, local_size })
    }

    /// Return the index of the basis state corresponding to a configuration.
    fn state_number(&self, v: &[f64]) -> HilbertResult<usize> {
        if v.len() != self.size() {
            return Err(WrongSize { expected: self.size(), found: v.len() });
        }
        let d = self.local_size();
        v.iter().enumerate()
            .try_fold(0_usize, |acc, (site, value)| {
                let k = self.local_index(site, *value)?;
                acc.checked_mul(d)
                    .and_then(|a| a.checked_add(k))
                    .ok_or(TooLarge { size: self.size(), local_size: d })
            })
    }

    /// Return the configuration corresponding to a basis state index.
    ///
    /// This is the inverse of [`Self::state_number`]; indices past the last
    /// basis state wrap around.
    fn number_to_state(&self, mut index: usize) -> Vec<f64> {
        let d = self.local_size();
        let mut v = vec![0.0; self.size()];
        for x in v.iter_mut().rev() {
            *x = self.local_states()[index % d];
            index /= d;
        }
        v
    }

    /// Return every configuration, ordered by [`Self::state_number`].
    fn all_states(&self) -> HilbertResult<Vec<Vec<f64>>> {
        let n = self.n_states()?;
        Ok((0..n).map(|k| self.number_to_state(k)).collect())
    }

    /// Draw a configuration uniformly at random.
    fn random_conf<R>(&self, rng: &mut R) -> Vec<f64>
    where
        R: Rng,
        Self: Sized,
    {
        let states = self.local_states();
        (0..self.size())
            .map(|_| states[rng.gen_range(0..states.len())])
            .collect()
    }

    /// Apply a set of site changes to a configuration in place.
    fn update_conf(&self, v: &mut [f64], tochange: &[usize], newconf: &[f64])
        -> HilbertResult<()>
    {
        if v.len() != self.size() {
            return Err(WrongSize { expected: self.size(), found: v.len() });
        }
        if tochange.len() != newconf.len() {
            return Err(
                ChangeMismatch { sites: tochange.len(), values: newconf.len() });
        }
        for (&site, &value) in tochange.iter().zip(newconf) {
            if site >= v.len() {
                return Err(SiteOutOfRange { site, size: v.len() });
            }
            self.local_index(site, value)?;
            v[site] = value;
        }
        Ok(())
    }
}

/// A space of `size` sites, each taking values from a shared local basis.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalHilbert {
    local_states: Vec<f64>,
    size: usize,
}

impl LocalHilbert {
    /// Create a new space.
    ///
    /// Fails if `local_states` is empty or contains a repeated value.
    pub fn new<I>(local_states: I, size: usize) -> HilbertResult<Self>
    where I: IntoIterator<Item = f64>
    {
        let local_states: Vec<f64> = local_states.into_iter().collect();
        if local_states.is_empty() { return Err(EmptyLocalBasis); }
        for (k, s) in local_states.iter().enumerate() {
            if local_states[..k].contains(s) {
                return Err(DuplicateLocalState(*s));
            }
        }
        Ok(Self { local_states, size })
    }

    /// Create a chain of qubits with local values `[0, 1]`.
    pub fn qubits(size: usize) -> Self {
        Self { local_states: vec![0.0, 1.0], size }
    }

    /// Create a chain of spin-1/2 particles with local values `[1, -1]`.
    ///
    /// The local basis is ordered by descending σ<sub>*z*</sub> eigenvalue, so
    /// the first basis state is spin-up.
    pub fn spin_half(size: usize) -> Self {
        Self { local_states: vec![1.0, -1.0], size }
    }

    /// Return `true` if two handles describe the same space.
    pub fn compatible(a: &Rc<Self>, b: &Rc<Self>) -> bool {
        Rc::ptr_eq(a, b) || a == b
    }
}

impl HilbertSpace for LocalHilbert {
    fn size(&self) -> usize { self.size }

    fn local_states(&self) -> &[f64] { &self.local_states }
}

/// Row/column doubling of a physical space, used to index density matrices.
///
/// The physical space is shared with every operator built over it.
#[derive(Clone, Debug, PartialEq)]
pub struct DoubledHilbert {
    physical: Rc<LocalHilbert>,
}

impl DoubledHilbert {
    /// Create a new doubled space over `physical`.
    pub fn new(physical: Rc<LocalHilbert>) -> Self { Self { physical } }

    /// Number of sites in the physical (undoubled) space.
    pub fn size_physical(&self) -> usize { self.physical.size() }

    /// Return a reference to the physical space.
    pub fn physical(&self) -> &LocalHilbert { &self.physical }

    /// Return a shared handle to the physical space.
    pub fn physical_shared(&self) -> Rc<LocalHilbert> {
        Rc::clone(&self.physical)
    }

    /// Split a doubled configuration into its row and column halves.
    pub fn split<'a>(&self, v: &'a [f64]) -> HilbertResult<(&'a [f64], &'a [f64])> {
        if v.len() != self.size() {
            return Err(WrongSize { expected: self.size(), found: v.len() });
        }
        Ok(v.split_at(self.size_physical()))
    }
}

impl HilbertSpace for DoubledHilbert {
    fn size(&self) -> usize { 2 * self.physical.size() }

    fn local_states(&self) -> &[f64] { self.physical.local_states() }
}
