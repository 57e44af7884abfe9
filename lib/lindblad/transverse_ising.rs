//! A dissipative transverse-field Ising chain.
//!
//! ```text
//! H = h Σ_k σx_k + J Σ_k σz_k σz_{k+1},    L_k = √γ σ⁻_k
//! ```

use std::rc::Rc;
use ndarray as nd;
use num_complex::Complex64 as C64;
use serde::Deserialize;
use crate::{
    hilbert::{ HilbertSpace, LocalHilbert },
    operator::{ LocalOperator, OperatorResult, pauli },
};
use super::LocalLindbladian;

/// Parameters of a linear spin chain with a transverse field, nearest-neighbor
/// σ<sub>*z*</sub>σ<sub>*z*</sub> coupling, and spontaneous decay on every
/// site.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub struct TransverseIsing {
    /// Transverse field strength.
    pub h: f64,
    /// Nearest-neighbor coupling strength.
    pub j: f64,
    /// Decay rate of each site.
    pub gamma: f64,
    /// Use periodic boundary conditions.
    #[serde(default)]
    pub pbc: bool,
}

impl TransverseIsing {
    // pairs of coupled sites
    fn bonds(&self, n: usize) -> Vec<(usize, usize)> {
        let mut bonds: Vec<(usize, usize)>
            = (0..n.saturating_sub(1)).map(|k| (k, k + 1)).collect();
        if self.pbc && n > 2 {
            bonds.push((n - 1, 0));
        }
        bonds
    }

    /// Build the Hamiltonian on a two-level chain.
    pub fn hamiltonian(&self, hilbert: Rc<LocalHilbert>)
        -> OperatorResult<LocalOperator>
    {
        let n = hilbert.size();
        let zz: nd::Array2<C64>
            = nd::Array2::from_diag(&nd::array![
                C64::from(self.j),
                C64::from(-self.j),
                C64::from(-self.j),
                C64::from(self.j),
            ]);
        let mut h = LocalOperator::new(Rc::clone(&hilbert));
        for k in 0..n {
            let x = pauli::sigma_x(Rc::clone(&hilbert), k)?;
            h = h.try_add(&(x * self.h))?;
        }
        for (a, b) in self.bonds(n) {
            let term
                = LocalOperator::from_term(Rc::clone(&hilbert), [a, b], zz.clone())?;
            h = h.try_add(&term)?;
        }
        Ok(h)
    }

    /// Build one jump operator `√γ σ⁻` for each site.
    pub fn jump_operators(&self, hilbert: Rc<LocalHilbert>)
        -> OperatorResult<Vec<LocalOperator>>
    {
        let amp = self.gamma.sqrt();
        (0..hilbert.size())
            .map(|k| {
                pauli::sigma_minus(Rc::clone(&hilbert), k).map(|l| l * amp)
            })
            .collect()
    }

    /// Assemble the full Lindbladian.
    pub fn lindbladian(&self, hilbert: Rc<LocalHilbert>)
        -> OperatorResult<LocalLindbladian>
    {
        let h = self.hamiltonian(Rc::clone(&hilbert))?;
        let jump_ops = self.jump_operators(hilbert)?;
        LocalLindbladian::with_jump_operators(h, jump_ops)
    }
}
