//! Single-site Pauli and ladder operators for two-level local bases.
//!
//! Matrices are written in the order of the local basis, with the first local
//! state taken as the σ<sub>*z*</sub> = +1 ("up") state. See
//! [`LocalHilbert::spin_half`].

use std::rc::Rc;
use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::hilbert::{ HilbertSpace, LocalHilbert };
use super::{ LocalOperator, OperatorError, OperatorResult };

const O: C64 = C64 { re: 0.0, im: 0.0 };
const I: C64 = C64 { re: 1.0, im: 0.0 };
const J: C64 = C64 { re: 0.0, im: 1.0 };

fn single_site(hilbert: Rc<LocalHilbert>, site: usize, m: nd::Array2<C64>)
    -> OperatorResult<LocalOperator>
{
    if hilbert.local_size() != 2 {
        return Err(OperatorError::LocalDimension {
            expected: 2,
            found: hilbert.local_size(),
        });
    }
    LocalOperator::from_term(hilbert, [site], m)
}

/// σ<sub>*x*</sub> on a single site.
pub fn sigma_x(hilbert: Rc<LocalHilbert>, site: usize)
    -> OperatorResult<LocalOperator>
{
    single_site(hilbert, site, nd::array![[O, I], [I, O]])
}

/// σ<sub>*y*</sub> on a single site.
pub fn sigma_y(hilbert: Rc<LocalHilbert>, site: usize)
    -> OperatorResult<LocalOperator>
{
    single_site(hilbert, site, nd::array![[O, -J], [J, O]])
}

/// σ<sub>*z*</sub> on a single site.
pub fn sigma_z(hilbert: Rc<LocalHilbert>, site: usize)
    -> OperatorResult<LocalOperator>
{
    single_site(hilbert, site, nd::array![[I, O], [O, -I]])
}

/// Raising operator σ<sup>+</sup> = |↑⟩⟨↓| on a single site.
pub fn sigma_plus(hilbert: Rc<LocalHilbert>, site: usize)
    -> OperatorResult<LocalOperator>
{
    single_site(hilbert, site, nd::array![[O, I], [O, O]])
}

/// Lowering operator σ<sup>−</sup> = |↓⟩⟨↑| on a single site.
pub fn sigma_minus(hilbert: Rc<LocalHilbert>, site: usize)
    -> OperatorResult<LocalOperator>
{
    single_site(hilbert, site, nd::array![[O, O], [I, O]])
}
