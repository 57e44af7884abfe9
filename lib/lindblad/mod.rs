//! Lindbladian superoperators acting on the doubled Hilbert space.
//!
//! A density matrix `ρ` over a physical space of `N` sites is treated as a
//! vector over the [`DoubledHilbert`] space of `2N` sites, where configuration
//! `[r, c]` indexes the element `ρ[r, c]`. [`LocalLindbladian`] then behaves
//! like any other sparse [`Operator`] over this doubled space: the row- and
//! column-side changes of each superoperator connection are folded into a
//! single change list with column sites offset by `N`.

use std::rc::Rc;
use crate::{
    hilbert::{ DoubledHilbert, HilbertSpace, LocalHilbert },
    operator::{
        check_size,
        ConnectorRef,
        Connections,
        LocalOperator,
        Operator,
        OperatorResult,
    },
};

pub mod effective;
pub use effective::EffectiveHamiltonian;

pub(crate) mod superop;
use superop::{ for_each_conn_superop, SuperopConnRef };

pub mod transverse_ising;
pub use transverse_ising::TransverseIsing;

/// The Lindbladian of a Hamiltonian and a list of jump operators, all given as
/// [`LocalOperator`]s.
#[derive(Clone, Debug)]
pub struct LocalLindbladian {
    hilbert: Rc<DoubledHilbert>,
    heff: EffectiveHamiltonian,
}

// scratch space for folding superoperator connections into flat connections
#[derive(Debug, Default)]
struct FlatBuffer {
    tochange: Vec<usize>,
    newconf: Vec<f64>,
}

impl FlatBuffer {
    fn fold(&mut self, conn: &SuperopConnRef<'_>, n: usize) -> ConnectorRef<'_> {
        self.tochange.clear();
        self.tochange.extend_from_slice(conn.tochange_row);
        self.tochange.extend(conn.tochange_col.iter().map(|k| k + n));
        self.newconf.clear();
        self.newconf.extend_from_slice(conn.newconf_row);
        self.newconf.extend_from_slice(conn.newconf_col);
        ConnectorRef {
            mel: conn.mel,
            tochange: &self.tochange,
            newconf: &self.newconf,
        }
    }
}

impl LocalLindbladian {
    /// Create a new `LocalLindbladian` with no jump operators, i.e. the
    /// generator of the von Neumann equation for `h`.
    pub fn new(h: LocalOperator) -> Self {
        let hilbert = Rc::new(DoubledHilbert::new(h.hilbert_shared()));
        Self { hilbert, heff: EffectiveHamiltonian::new(h) }
    }

    /// Create a new `LocalLindbladian` with an initial list of jump operators.
    ///
    /// Fails if any jump operator acts on a different space than `h`.
    pub fn with_jump_operators<I>(h: LocalOperator, jump_ops: I)
        -> OperatorResult<Self>
    where I: IntoIterator<Item = LocalOperator>
    {
        let hilbert = Rc::new(DoubledHilbert::new(h.hilbert_shared()));
        let heff = EffectiveHamiltonian::with_jump_operators(h, jump_ops)?;
        Ok(Self { hilbert, heff })
    }

    /// Append a jump operator.
    ///
    /// The effective Hamiltonian is rebuilt before this method returns. Fails
    /// if `op` acts on a different space, in which case `self` is left
    /// unchanged.
    pub fn add_jump_operator(&mut self, op: LocalOperator) -> OperatorResult<()> {
        self.heff.add_jump_operator(op)
    }

    /// Return the jump operators in insertion order.
    pub fn jump_operators(&self) -> &[LocalOperator] {
        self.heff.jump_operators()
    }

    /// Return a reference to the Hamiltonian.
    pub fn hamiltonian(&self) -> &LocalOperator { self.heff.hamiltonian() }

    /// Return a reference to the effective Hamiltonian pair.
    pub fn effective(&self) -> &EffectiveHamiltonian { &self.heff }

    /// Return a reference to the doubled space.
    pub fn hilbert_doubled(&self) -> &DoubledHilbert { &self.hilbert }

    /// Return a reference to the physical space.
    pub fn hilbert_physical(&self) -> &LocalHilbert { self.hilbert.physical() }

    // split a doubled configuration after checking its size and every local
    // value; enumeration of a configuration that passes never fails
    fn split_checked<'a>(&self, v: &'a [f64])
        -> OperatorResult<(&'a [f64], &'a [f64])>
    {
        check_size(v, self.hilbert.size())?;
        let (vrow, vcol) = v.split_at(self.hilbert.size_physical());
        let physical = self.hilbert.physical();
        for half in [vrow, vcol] {
            for (site, &value) in half.iter().enumerate() {
                physical.local_index(site, value)?;
            }
        }
        Ok((vrow, vcol))
    }

    pub(crate) fn for_each_conn_superop<F>(
        &self,
        vrow: &[f64],
        vcol: &[f64],
        f: F,
    ) -> OperatorResult<()>
    where F: FnMut(SuperopConnRef<'_>) -> OperatorResult<()>
    {
        for_each_conn_superop(&self.heff, vrow, vcol, f)
    }
}

impl Operator for LocalLindbladian {
    type Hilbert = DoubledHilbert;

    fn hilbert_shared(&self) -> Rc<DoubledHilbert> { Rc::clone(&self.hilbert) }

    /// Fails before visiting anything if `v` is not a doubled configuration
    /// ([`InvalidArgument`][crate::operator::OperatorError::InvalidArgument])
    /// or holds a value outside the local basis
    /// ([`Hilbert`][crate::operator::OperatorError::Hilbert]).
    fn for_each_conn<F>(&self, v: &[f64], mut f: F) -> OperatorResult<()>
    where F: FnMut(ConnectorRef<'_>) -> OperatorResult<()>
    {
        let (vrow, vcol) = self.split_checked(v)?;
        let n = self.hilbert.size_physical();
        let mut buf = FlatBuffer::default();
        self.for_each_conn_superop(vrow, vcol, |conn| f(buf.fold(&conn, n)))
    }

    /// `conns` is left empty on failure.
    fn find_conn(&self, v: &[f64], conns: &mut Connections)
        -> OperatorResult<()>
    {
        conns.clear();
        let (vrow, vcol) = self.split_checked(v)?;
        let n = self.hilbert.size_physical();
        let mut buf = FlatBuffer::default();
        self.for_each_conn_superop(vrow, vcol, |conn| {
            conns.push(buf.fold(&conn, n));
            Ok(())
        })
        .map_err(|err| {
            conns.clear();
            err
        })
    }
}
