//! Non-Hermitian effective Hamiltonian of a Lindblad master equation.
//!
//! For a Hamiltonian *H* and jump operators *L*<sub>*k*</sub>,
//! ```text
//! Hnh = H - (i/2) Σ_k L_k† L_k
//! ```
//! generates the "no-jump" part of the evolution. Both `Hnh` and its adjoint
//! are kept alongside the jump operators and rebuilt from scratch whenever the
//! list of jump operators changes.

use std::rc::Rc;
use num_complex::Complex64 as C64;
use crate::{
    hilbert::LocalHilbert,
    operator::{ LocalOperator, Operator, OperatorError, OperatorResult },
};

/// Owns a Hamiltonian, a list of jump operators, and the derived pair
/// `(Hnh, Hnh†)`.
///
/// The derived pair is always consistent with the current list of jump
/// operators.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectiveHamiltonian {
    h: LocalOperator,
    jump_ops: Vec<LocalOperator>,
    hnh: LocalOperator,
    hnh_dag: LocalOperator,
}

impl EffectiveHamiltonian {
    /// Create a new `EffectiveHamiltonian` with no jump operators.
    pub fn new(h: LocalOperator) -> Self {
        let hnh = h.clone();
        let hnh_dag = hnh.adjoint();
        Self { h, jump_ops: Vec::new(), hnh, hnh_dag }
    }

    /// Create a new `EffectiveHamiltonian` with an initial list of jump
    /// operators.
    ///
    /// Fails if any jump operator acts on a different space than `h`.
    pub fn with_jump_operators<I>(h: LocalOperator, jump_ops: I)
        -> OperatorResult<Self>
    where I: IntoIterator<Item = LocalOperator>
    {
        let jump_ops: Vec<LocalOperator> = jump_ops.into_iter().collect();
        let (hnh, hnh_dag) = Self::build(&h, &jump_ops)?;
        Ok(Self { h, jump_ops, hnh, hnh_dag })
    }

    // computes the pair from scratch; never touches `self`
    fn build(h: &LocalOperator, jump_ops: &[LocalOperator])
        -> OperatorResult<(LocalOperator, LocalOperator)>
    {
        let minus_half_i = C64::new(0.0, -0.5);
        let hnh
            = jump_ops.iter()
            .try_fold(h.clone(), |acc, l| -> OperatorResult<LocalOperator> {
                let ldag_l = l.adjoint().try_mul(l)?;
                acc.try_add(&ldag_l.scaled(minus_half_i))
            })?;
        let hnh_dag = hnh.adjoint();
        tracing::debug!(
            n_jump_ops = jump_ops.len(),
            n_terms = hnh.terms().len(),
            "rebuilt effective hamiltonian"
        );
        Ok((hnh, hnh_dag))
    }

    /// Append a jump operator and rebuild the effective Hamiltonian.
    ///
    /// Fails if `op` acts on a different space than the Hamiltonian, in which
    /// case `self` is left unchanged.
    pub fn add_jump_operator(&mut self, op: LocalOperator)
        -> OperatorResult<()>
    {
        if !LocalHilbert::compatible(
            &self.h.hilbert_shared(), &op.hilbert_shared())
        {
            return Err(OperatorError::IncompatibleHilbert);
        }
        self.jump_ops.push(op);
        match Self::build(&self.h, &self.jump_ops) {
            Ok((hnh, hnh_dag)) => {
                self.hnh = hnh;
                self.hnh_dag = hnh_dag;
                Ok(())
            },
            Err(err) => {
                self.jump_ops.pop();
                Err(err)
            },
        }
    }

    /// Return a reference to the Hamiltonian.
    pub fn hamiltonian(&self) -> &LocalOperator { &self.h }

    /// Return the jump operators in insertion order.
    pub fn jump_operators(&self) -> &[LocalOperator] { &self.jump_ops }

    /// Return a reference to `Hnh`.
    pub fn hnh(&self) -> &LocalOperator { &self.hnh }

    /// Return a reference to `Hnh†`.
    pub fn hnh_dag(&self) -> &LocalOperator { &self.hnh_dag }

    /// Return a shared handle to the physical space.
    pub fn hilbert_shared(&self) -> Rc<LocalHilbert> { self.h.hilbert_shared() }
}
