//! Connections of the vectorized Lindbladian between pairs of row and column
//! configurations.
//!
//! Writing the master equation in terms of the effective Hamiltonian,
//! ```text
//! dρ/dt = -i Hnh ρ + i ρ Hnh† + Σ_k L_k ρ L_k†
//! ```
//! the superoperator acting on `ρ[r, c]` splits into three kinds of terms (cf.
//! arXiv:1504.05266):
//! ```text
//!   +i ⟨r|Hnh†|r'⟩                 (row side only)
//!   -i ⟨c|Hnh|c'⟩                  (column side only)
//!   conj(⟨r|L_k|r'⟩) ⟨c|L_k|c'⟩    (both sides, for each k)
//! ```
//! Each is enumerated directly from the connections of the underlying local
//! operators, so nothing larger than a single connection is ever built.

use num_complex::Complex64 as C64;
use crate::operator::{ ConnectorRef, Operator, OperatorResult };
use super::effective::EffectiveHamiltonian;

/// A connection of the superoperator, with independent row- and column-side
/// changes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct SuperopConnRef<'a> {
    pub(crate) mel: C64,
    pub(crate) tochange_row: &'a [usize],
    pub(crate) newconf_row: &'a [f64],
    pub(crate) tochange_col: &'a [usize],
    pub(crate) newconf_col: &'a [f64],
}

impl<'a> SuperopConnRef<'a> {
    fn row(mel: C64, conn: ConnectorRef<'a>) -> Self {
        Self {
            mel,
            tochange_row: conn.tochange,
            newconf_row: conn.newconf,
            tochange_col: &[],
            newconf_col: &[],
        }
    }

    fn col(mel: C64, conn: ConnectorRef<'a>) -> Self {
        Self {
            mel,
            tochange_row: &[],
            newconf_row: &[],
            tochange_col: conn.tochange,
            newconf_col: conn.newconf,
        }
    }
}

/// Call `f` once for every connection of the superoperator from `(vrow,
/// vcol)`.
///
/// Connections are visited in a fixed order: the row-side `Hnh†` term, then
/// the column-side `Hnh` term, then the cross terms of each jump operator in
/// insertion order, looping over row-side connections on the outside. Nothing
/// is merged, sorted, or dropped, so the cross terms of a single jump operator
/// with `r` row connections and `c` column connections number exactly `r * c`.
pub(crate) fn for_each_conn_superop<F>(
    heff: &EffectiveHamiltonian,
    vrow: &[f64],
    vcol: &[f64],
    mut f: F,
) -> OperatorResult<()>
where F: FnMut(SuperopConnRef<'_>) -> OperatorResult<()>
{
    let i = C64::i();

    heff.hnh_dag().for_each_conn(vrow, |conn| {
        f(SuperopConnRef::row(i * conn.mel, conn))
    })?;

    heff.hnh().for_each_conn(vcol, |conn| {
        f(SuperopConnRef::col(-i * conn.mel, conn))
    })?;

    for l in heff.jump_operators().iter() {
        l.for_each_conn(vrow, |conn_row| {
            l.for_each_conn(vcol, |conn_col| {
                f(SuperopConnRef {
                    mel: conn_row.mel.conj() * conn_col.mel,
                    tochange_row: conn_row.tochange,
                    newconf_row: conn_row.newconf,
                    tochange_col: conn_col.tochange,
                    newconf_col: conn_col.newconf,
                })
            })
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use super::*;
    use crate::{
        hilbert::LocalHilbert,
        operator::{ LocalOperator, pauli::* },
    };

    #[derive(Clone, Debug, PartialEq)]
    struct Owned {
        mel: C64,
        row: (Vec<usize>, Vec<f64>),
        col: (Vec<usize>, Vec<f64>),
    }

    fn collect(heff: &EffectiveHamiltonian, vrow: &[f64], vcol: &[f64])
        -> Vec<Owned>
    {
        let mut acc = Vec::new();
        for_each_conn_superop(heff, vrow, vcol, |conn| {
            acc.push(Owned {
                mel: conn.mel,
                row: (conn.tochange_row.to_vec(), conn.newconf_row.to_vec()),
                col: (conn.tochange_col.to_vec(), conn.newconf_col.to_vec()),
            });
            Ok(())
        }).unwrap();
        acc
    }

    fn local(op: &LocalOperator, v: &[f64]) -> Vec<(C64, Vec<usize>, Vec<f64>)> {
        let mut acc = Vec::new();
        op.for_each_conn(v, |conn| {
            acc.push((conn.mel, conn.tochange.to_vec(), conn.newconf.to_vec()));
            Ok(())
        }).unwrap();
        acc
    }

    #[test]
    fn closed_system_has_only_unitary_terms() {
        let hi = Rc::new(LocalHilbert::qubits(3));
        let h
            = sigma_x(Rc::clone(&hi), 0).unwrap()
            .try_add(&sigma_y(Rc::clone(&hi), 2).unwrap()).unwrap()
            .try_add(&sigma_z(Rc::clone(&hi), 1).unwrap()).unwrap();
        let heff = EffectiveHamiltonian::new(h);
        let vrow = [0.0, 1.0, 1.0];
        let vcol = [1.0, 0.0, 1.0];
        let conns = collect(&heff, &vrow, &vcol);

        let expected: Vec<Owned>
            = local(heff.hnh_dag(), &vrow).into_iter()
            .map(|(mel, tc, nc)| Owned {
                mel: C64::i() * mel,
                row: (tc, nc),
                col: (vec![], vec![]),
            })
            .chain(
                local(heff.hnh(), &vcol).into_iter()
                .map(|(mel, tc, nc)| Owned {
                    mel: -C64::i() * mel,
                    row: (vec![], vec![]),
                    col: (tc, nc),
                })
            )
            .collect();
        assert_eq!(conns, expected);
    }

    #[test]
    fn cross_terms_are_outer_products() {
        let hi = Rc::new(LocalHilbert::qubits(2));
        // three connections from any configuration: the diagonal and two flips
        let l
            = sigma_x(Rc::clone(&hi), 0).unwrap()
            .try_add(&sigma_y(Rc::clone(&hi), 1).unwrap()).unwrap()
            .with_constant(C64::new(0.5, 0.5));
        let heff = EffectiveHamiltonian::with_jump_operators(
            LocalOperator::new(Rc::clone(&hi)), [l.clone()]).unwrap();
        let vrow = [0.0, 1.0];
        let vcol = [1.0, 1.0];
        let rows = local(&l, &vrow);
        let cols = local(&l, &vcol);
        assert_eq!((rows.len(), cols.len()), (3, 3));

        let conns = collect(&heff, &vrow, &vcol);
        let n_unitary
            = local(heff.hnh_dag(), &vrow).len() + local(heff.hnh(), &vcol).len();
        assert_eq!(conns.len(), n_unitary + rows.len() * cols.len());

        let cross = &conns[n_unitary..];
        let mut k = 0;
        for (mr, tr, nr) in rows.iter() {
            for (mc, tc, nc) in cols.iter() {
                assert_eq!(cross[k].mel, mr.conj() * mc);
                assert_eq!(cross[k].row, (tr.clone(), nr.clone()));
                assert_eq!(cross[k].col, (tc.clone(), nc.clone()));
                k += 1;
            }
        }
    }

    #[test]
    fn jump_operators_contribute_in_insertion_order() {
        let hi = Rc::new(LocalHilbert::qubits(2));
        let mut heff = EffectiveHamiltonian::new(LocalOperator::new(Rc::clone(&hi)));
        heff.add_jump_operator(sigma_minus(Rc::clone(&hi), 1).unwrap()).unwrap();
        heff.add_jump_operator(sigma_minus(Rc::clone(&hi), 0).unwrap()).unwrap();
        // σ⁻ connects index 1 (value 1) to index 0 (value 0)
        let v = [1.0, 1.0];
        let conns = collect(&heff, &v, &v);
        let cross: Vec<&Owned>
            = conns.iter()
            .filter(|c| !c.row.0.is_empty() && !c.col.0.is_empty())
            .collect();
        assert_eq!(cross.len(), 2);
        assert_eq!(cross[0].row, (vec![1], vec![0.0]));
        assert_eq!(cross[1].row, (vec![0], vec![0.0]));
    }

    #[test]
    fn no_pruning_of_cancelling_cross_terms() {
        let hi = Rc::new(LocalHilbert::qubits(1));
        let l = sigma_x(Rc::clone(&hi), 0).unwrap();
        let heff = EffectiveHamiltonian::with_jump_operators(
            LocalOperator::new(Rc::clone(&hi)), [l.clone(), -l]).unwrap();
        let conns = collect(&heff, &[0.0], &[1.0]);
        let cross: Vec<&Owned>
            = conns.iter()
            .filter(|c| !c.row.0.is_empty() && !c.col.0.is_empty())
            .collect();
        // both jump operators give the same change; they are not combined
        assert_eq!(cross.len(), 2);
        assert_eq!(cross[0].row, cross[1].row);
        assert_eq!(cross[0].col, cross[1].col);
    }
}
