//! Operators built as a constant plus a sum of few-site terms.
//!
//! Each term is a dense matrix acting on a short, ordered list of sites, with
//! rows and columns indexed by the local basis states of those sites (first
//! site most significant, as in [`HilbertSpace::state_number`]). The nonzero
//! off-diagonal elements of every row are found once when a term is built, so
//! that enumerating the connections of a configuration only requires looking up
//! one row per term.

use std::{
    ops::{ Mul, Neg },
    rc::Rc,
};
use indexmap::{ IndexMap, map::Entry };
use ndarray as nd;
use num_complex::Complex64 as C64;
use num_traits::{ One, Zero };
use crate::hilbert::{ HilbertError, HilbertSpace, LocalHilbert };
use super::{
    check_size,
    ConnectorRef,
    Operator,
    OperatorError::*,
    OperatorResult,
};

/// Matrix elements with magnitude at or below this value are not stored as
/// connections.
pub const DEFAULT_MEL_CUTOFF: f64 = 1e-10;

// one off-diagonal element in a term's row; only sites whose value actually
// changes are kept
#[derive(Clone, Debug, PartialEq)]
struct TermConn {
    mel: C64,
    tochange: Vec<usize>,
    newconf: Vec<f64>,
}

/// A single matrix acting on a fixed list of sites.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalTerm {
    sites: Vec<usize>,
    matrix: nd::Array2<C64>,
    diag: Vec<C64>, // indexed by row
    conns: Vec<Vec<TermConn>>, // indexed by row
}

// digits of `index` in base `d`, most significant first
fn digits(mut index: usize, d: usize, k: usize) -> Vec<usize> {
    let mut dg = vec![0; k];
    for x in dg.iter_mut().rev() {
        *x = index % d;
        index /= d;
    }
    dg
}

fn term_dim(d: usize, k: usize) -> OperatorResult<usize> {
    u32::try_from(k).ok()
        .and_then(|k| d.checked_pow(k))
        .ok_or(HilbertError::TooLarge { size: k, local_size: d }.into())
}

impl LocalTerm {
    // assumes `sites` and the shape of `matrix` have already been validated
    fn from_parts(
        hilbert: &LocalHilbert,
        sites: Vec<usize>,
        matrix: nd::Array2<C64>,
        cutoff: f64,
    ) -> Self
    {
        let d = hilbert.local_size();
        let k = sites.len();
        let local_states = hilbert.local_states();
        let diag: Vec<C64> = matrix.diag().to_vec();
        let conns: Vec<Vec<TermConn>>
            = matrix.outer_iter().enumerate()
            .map(|(row, elems)| {
                let row_digits = digits(row, d, k);
                elems.iter().enumerate()
                    .filter(|(col, mel)| *col != row && mel.norm() > cutoff)
                    .map(|(col, mel)| {
                        let col_digits = digits(col, d, k);
                        let (tochange, newconf): (Vec<usize>, Vec<f64>)
                            = sites.iter()
                            .zip(row_digits.iter().zip(&col_digits))
                            .filter(|(_, (r, c))| r != c)
                            .map(|(site, (_, c))| (*site, local_states[*c]))
                            .unzip();
                        TermConn { mel: *mel, tochange, newconf }
                    })
                    .collect()
            })
            .collect();
        Self { sites, matrix, diag, conns }
    }

    fn new(
        hilbert: &LocalHilbert,
        sites: Vec<usize>,
        matrix: nd::Array2<C64>,
        cutoff: f64,
    ) -> OperatorResult<Self>
    {
        if sites.is_empty() { return Err(EmptySites); }
        for (k, &site) in sites.iter().enumerate() {
            if site >= hilbert.size() {
                return Err(SiteOutOfRange { site, size: hilbert.size() });
            }
            if sites[..k].contains(&site) {
                return Err(DuplicateSite(site));
            }
        }
        let expected = term_dim(hilbert.local_size(), sites.len())?;
        let (rows, cols) = matrix.dim();
        if rows != expected || cols != expected {
            return Err(MatrixShape { expected, rows, cols });
        }
        let term = Self::from_parts(hilbert, sites, matrix, cutoff);
        tracing::trace!(
            sites = ?term.sites,
            n_conns = term.conns.iter().map(Vec::len).sum::<usize>(),
            "built local term"
        );
        Ok(term)
    }

    /// Return the sites acted on by the term.
    pub fn sites(&self) -> &[usize] { &self.sites }

    /// Return the term's matrix over the local states of its sites.
    pub fn matrix(&self) -> &nd::Array2<C64> { &self.matrix }

    // row of `matrix` selected by `v`; `v` must already have been size-checked
    fn row_index(&self, hilbert: &LocalHilbert, v: &[f64])
        -> OperatorResult<usize>
    {
        let d = hilbert.local_size();
        self.sites.iter()
            .try_fold(0_usize, |acc, &site| -> OperatorResult<usize> {
                Ok(acc * d + hilbert.local_index(site, v[site])?)
            })
    }
}

// ordered union of two site lists, along with the positions of `b`'s sites in
// the union; `a`'s sites always occupy the leading positions
fn site_union(a: &[usize], b: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let mut union: Vec<usize> = a.to_vec();
    let mut pos_b: Vec<usize> = Vec::with_capacity(b.len());
    for site in b.iter() {
        if let Some(p) = union.iter().position(|u| u == site) {
            pos_b.push(p);
        } else {
            pos_b.push(union.len());
            union.push(*site);
        }
    }
    (union, pos_b)
}

// extend a term matrix acting on the sites at positions `pos` of a larger,
// `k`-site list by the identity on all other positions
fn embed(m: &nd::Array2<C64>, pos: &[usize], k: usize, d: usize)
    -> OperatorResult<nd::Array2<C64>>
{
    if pos.len() == k && pos.iter().enumerate().all(|(j, p)| j == *p) {
        return Ok(m.clone());
    }
    let dim = term_dim(d, k)?;
    let dg: Vec<Vec<usize>> = (0..dim).map(|i| digits(i, d, k)).collect();
    let sub = |x: &[usize]| -> usize {
        pos.iter().fold(0, |acc, p| acc * d + x[*p])
    };
    let spectators_equal = |x: &[usize], y: &[usize]| -> bool {
        (0..k).filter(|j| !pos.contains(j)).all(|j| x[j] == y[j])
    };
    let ext = nd::Array2::from_shape_fn((dim, dim), |(i, j)| {
        if spectators_equal(&dg[i], &dg[j]) {
            m[[sub(&dg[i]), sub(&dg[j])]]
        } else {
            C64::zero()
        }
    });
    Ok(ext)
}

fn accumulate(
    acc: &mut IndexMap<Vec<usize>, nd::Array2<C64>>,
    sites: Vec<usize>,
    matrix: nd::Array2<C64>,
) {
    match acc.entry(sites) {
        Entry::Occupied(mut entry) => { *entry.get_mut() += &matrix; },
        Entry::Vacant(entry) => { entry.insert(matrix); },
    }
}

/// A sparse operator given by a constant plus a sum of [`LocalTerm`]s.
///
/// Arithmetic on `LocalOperator`s always produces a new operator; terms acting
/// on identical (ordered) site lists are merged.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalOperator {
    hilbert: Rc<LocalHilbert>,
    terms: Vec<LocalTerm>,
    constant: C64,
    mel_cutoff: f64,
}

impl LocalOperator {
    /// Create the zero operator.
    pub fn new(hilbert: Rc<LocalHilbert>) -> Self {
        Self {
            hilbert,
            terms: Vec::new(),
            constant: C64::zero(),
            mel_cutoff: DEFAULT_MEL_CUTOFF,
        }
    }

    /// Create the identity operator.
    pub fn identity(hilbert: Rc<LocalHilbert>) -> Self {
        Self::new(hilbert).with_constant(C64::one())
    }

    /// Create an operator with a single term.
    ///
    /// Fails if `sites` is empty, contains a repeated or out-of-range site, or
    /// if `matrix` is not square with dimension `local_size^sites.len()`.
    pub fn from_term<I>(
        hilbert: Rc<LocalHilbert>,
        sites: I,
        matrix: nd::Array2<C64>,
    ) -> OperatorResult<Self>
    where I: IntoIterator<Item = usize>
    {
        let term = LocalTerm::new(
            &hilbert,
            sites.into_iter().collect(),
            matrix,
            DEFAULT_MEL_CUTOFF,
        )?;
        let mut op = Self::new(hilbert);
        op.terms.push(term);
        Ok(op)
    }

    /// Set the constant (identity) part of the operator.
    pub fn with_constant(mut self, constant: C64) -> Self {
        self.constant = constant;
        self
    }

    /// Set the magnitude at or below which matrix elements are not reported as
    /// connections.
    pub fn with_cutoff(self, mel_cutoff: f64) -> Self {
        let mel_cutoff = mel_cutoff.abs();
        let terms: Vec<LocalTerm>
            = self.terms.into_iter()
            .map(|LocalTerm { sites, matrix, .. }| {
                LocalTerm::from_parts(&self.hilbert, sites, matrix, mel_cutoff)
            })
            .collect();
        Self { terms, mel_cutoff, ..self }
    }

    /// Return a reference to the operator's space.
    pub fn hilbert(&self) -> &LocalHilbert { &self.hilbert }

    /// Return the operator's terms.
    pub fn terms(&self) -> &[LocalTerm] { &self.terms }

    /// Return the constant part of the operator.
    pub fn constant(&self) -> C64 { self.constant }

    /// Return the matrix element cutoff.
    pub fn mel_cutoff(&self) -> f64 { self.mel_cutoff }

    fn map_terms<F>(&self, constant: C64, f: F) -> Self
    where F: Fn(&nd::Array2<C64>) -> nd::Array2<C64>
    {
        let terms: Vec<LocalTerm>
            = self.terms.iter()
            .map(|term| {
                LocalTerm::from_parts(
                    &self.hilbert,
                    term.sites.clone(),
                    f(&term.matrix),
                    self.mel_cutoff,
                )
            })
            .collect();
        Self {
            hilbert: Rc::clone(&self.hilbert),
            terms,
            constant,
            mel_cutoff: self.mel_cutoff,
        }
    }

    fn from_accumulated(
        hilbert: Rc<LocalHilbert>,
        acc: IndexMap<Vec<usize>, nd::Array2<C64>>,
        constant: C64,
        mel_cutoff: f64,
    ) -> Self
    {
        let terms: Vec<LocalTerm>
            = acc.into_iter()
            .map(|(sites, matrix)| {
                LocalTerm::from_parts(&hilbert, sites, matrix, mel_cutoff)
            })
            .collect();
        Self { hilbert, terms, constant, mel_cutoff }
    }

    fn check_compatible(&self, other: &Self) -> OperatorResult<()> {
        if LocalHilbert::compatible(&self.hilbert, &other.hilbert) {
            Ok(())
        } else {
            Err(IncompatibleHilbert)
        }
    }

    /// Return the element-wise complex conjugate.
    pub fn conjugate(&self) -> Self {
        self.map_terms(self.constant.conj(), |m| m.mapv(|z| z.conj()))
    }

    /// Return the transpose.
    pub fn transpose(&self) -> Self {
        self.map_terms(self.constant, |m| m.t().to_owned())
    }

    /// Return the conjugate transpose.
    pub fn adjoint(&self) -> Self {
        self.map_terms(self.constant.conj(), |m| m.t().mapv(|z| z.conj()))
    }

    /// Multiply by a scalar.
    pub fn scaled(&self, c: C64) -> Self {
        self.map_terms(self.constant * c, |m| m.mapv(|z| z * c))
    }

    /// Return the sum of two operators.
    ///
    /// The result uses the smaller of the two matrix element cutoffs. Fails if
    /// the operators act on different spaces.
    pub fn try_add(&self, other: &Self) -> OperatorResult<Self> {
        self.check_compatible(other)?;
        let mut acc: IndexMap<Vec<usize>, nd::Array2<C64>> = IndexMap::new();
        self.terms.iter().chain(other.terms.iter())
            .for_each(|term| {
                accumulate(&mut acc, term.sites.clone(), term.matrix.clone());
            });
        Ok(Self::from_accumulated(
            Rc::clone(&self.hilbert),
            acc,
            self.constant + other.constant,
            self.mel_cutoff.min(other.mel_cutoff),
        ))
    }

    /// Return the operator product `self · other`.
    ///
    /// The product of two terms acts on the union of their site lists, with
    /// `self`'s sites first, and the result uses the smaller of the two matrix
    /// element cutoffs. Fails if the operators act on different spaces.
    pub fn try_mul(&self, other: &Self) -> OperatorResult<Self> {
        self.check_compatible(other)?;
        let d = self.hilbert.local_size();
        let mut acc: IndexMap<Vec<usize>, nd::Array2<C64>> = IndexMap::new();
        for a in self.terms.iter() {
            let pos_a: Vec<usize> = (0..a.sites.len()).collect();
            for b in other.terms.iter() {
                let (union, pos_b) = site_union(&a.sites, &b.sites);
                let k = union.len();
                let prod
                    = embed(&a.matrix, &pos_a, k, d)?
                    .dot(&embed(&b.matrix, &pos_b, k, d)?);
                accumulate(&mut acc, union, prod);
            }
        }
        if !other.constant.is_zero() {
            for a in self.terms.iter() {
                accumulate(&mut acc, a.sites.clone(), &a.matrix * other.constant);
            }
        }
        if !self.constant.is_zero() {
            for b in other.terms.iter() {
                accumulate(&mut acc, b.sites.clone(), &b.matrix * self.constant);
            }
        }
        Ok(Self::from_accumulated(
            Rc::clone(&self.hilbert),
            acc,
            self.constant * other.constant,
            self.mel_cutoff.min(other.mel_cutoff),
        ))
    }
}

impl Operator for LocalOperator {
    type Hilbert = LocalHilbert;

    fn hilbert_shared(&self) -> Rc<LocalHilbert> { Rc::clone(&self.hilbert) }

    /// The diagonal element (constant plus all term diagonals) is visited
    /// first, if it is above the cutoff, followed by each term's off-diagonal
    /// elements in term order.
    fn for_each_conn<F>(&self, v: &[f64], mut f: F) -> OperatorResult<()>
    where F: FnMut(ConnectorRef<'_>) -> OperatorResult<()>
    {
        check_size(v, self.hilbert.size())?;
        let rows: Vec<usize>
            = self.terms.iter()
            .map(|term| term.row_index(&self.hilbert, v))
            .collect::<OperatorResult<_>>()?;
        let mel_diag
            = self.terms.iter().zip(&rows)
            .fold(self.constant, |acc, (term, &row)| acc + term.diag[row]);
        if mel_diag.norm() > self.mel_cutoff {
            f(ConnectorRef { mel: mel_diag, tochange: &[], newconf: &[] })?;
        }
        for (term, &row) in self.terms.iter().zip(&rows) {
            for conn in term.conns[row].iter() {
                f(ConnectorRef {
                    mel: conn.mel,
                    tochange: &conn.tochange,
                    newconf: &conn.newconf,
                })?;
            }
        }
        Ok(())
    }
}

macro_rules! impl_scalar_mul {
    ( $scalar:ty ) => {
        impl Mul<$scalar> for LocalOperator {
            type Output = LocalOperator;

            fn mul(self, c: $scalar) -> LocalOperator {
                self.scaled(C64::from(c))
            }
        }

        impl Mul<$scalar> for &LocalOperator {
            type Output = LocalOperator;

            fn mul(self, c: $scalar) -> LocalOperator {
                self.scaled(C64::from(c))
            }
        }
    }
}
impl_scalar_mul!(C64);
impl_scalar_mul!(f64);

impl Neg for LocalOperator {
    type Output = LocalOperator;

    fn neg(self) -> LocalOperator { self.scaled(-C64::one()) }
}

impl Neg for &LocalOperator {
    type Output = LocalOperator;

    fn neg(self) -> LocalOperator { self.scaled(-C64::one()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{ Connections, OperatorError };

    fn c(re: f64, im: f64) -> C64 { C64::new(re, im) }

    fn assert_close(a: &nd::Array2<C64>, b: &nd::Array2<C64>) {
        assert_eq!(a.dim(), b.dim());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).norm() < 1e-12, "{a:?}\n!=\n{b:?}");
        }
    }

    fn collect(op: &LocalOperator, v: &[f64]) -> Connections {
        let mut conns = Connections::new();
        op.find_conn(v, &mut conns).unwrap();
        conns
    }

    fn sx() -> nd::Array2<C64> {
        nd::array![[c(0.0, 0.0), c(1.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]]
    }

    fn complex_2site() -> nd::Array2<C64> {
        nd::Array2::from_shape_fn((4, 4), |(i, j)| {
            c((i + 2 * j) as f64 - 3.0, (3 * i) as f64 - j as f64)
        })
    }

    #[test]
    fn zero_operator_has_no_connections() {
        let hi = Rc::new(LocalHilbert::qubits(3));
        let op = LocalOperator::new(hi);
        assert!(collect(&op, &[0.0, 1.0, 0.0]).is_empty());
    }

    #[test]
    fn rejects_malformed_terms() {
        let hi = Rc::new(LocalHilbert::qubits(3));
        assert!(matches!(
            LocalOperator::from_term(Rc::clone(&hi), [], sx()),
            Err(OperatorError::EmptySites)
        ));
        assert!(matches!(
            LocalOperator::from_term(Rc::clone(&hi), [3], sx()),
            Err(OperatorError::SiteOutOfRange { site: 3, size: 3 })
        ));
        assert!(matches!(
            LocalOperator::from_term(Rc::clone(&hi), [1, 1], complex_2site()),
            Err(OperatorError::DuplicateSite(1))
        ));
        assert!(matches!(
            LocalOperator::from_term(Rc::clone(&hi), [0, 1], sx()),
            Err(OperatorError::MatrixShape { expected: 4, rows: 2, cols: 2 })
        ));
    }

    #[test]
    fn connections_are_minimal() {
        let hi = Rc::new(LocalHilbert::qubits(3));
        // |00⟩⟨10| + 2|00⟩⟨00|, acting on sites (2, 0)
        let mut m: nd::Array2<C64> = nd::Array2::zeros((4, 4));
        m[[0, 2]] = c(1.0, 0.0);
        m[[0, 0]] = c(2.0, 0.0);
        let op = LocalOperator::from_term(hi, [2, 0], m).unwrap();
        let conns = collect(&op, &[0.0, 1.0, 0.0]);
        assert_eq!(conns.len(), 2);
        assert_eq!(conns.mel, vec![c(2.0, 0.0), c(1.0, 0.0)]);
        assert!(conns.connectors[0].is_empty());
        // only site 2 changes; site 0 stays at 0
        assert_eq!(conns.connectors[1], vec![2]);
        assert_eq!(conns.newconfs[1], vec![1.0]);
    }

    #[test]
    fn invalid_local_state_propagates() {
        let hi = Rc::new(LocalHilbert::qubits(2));
        let op = LocalOperator::from_term(hi, [1], sx()).unwrap();
        let res = op.for_each_conn(&[0.0, 3.0], |_| Ok(()));
        assert!(matches!(
            res,
            Err(OperatorError::Hilbert(HilbertError::InvalidLocalState { site: 1, .. }))
        ));
        let res = op.for_each_conn(&[0.0], |_| Ok(()));
        assert!(matches!(
            res,
            Err(OperatorError::InvalidArgument { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn consumer_error_stops_enumeration() {
        let hi = Rc::new(LocalHilbert::qubits(2));
        let op
            = LocalOperator::from_term(Rc::clone(&hi), [0], sx()).unwrap()
            .try_add(&LocalOperator::from_term(hi, [1], sx()).unwrap())
            .unwrap();
        let mut visited = 0;
        let res = op.for_each_conn(&[0.0, 0.0], |_| {
            visited += 1;
            Err(OperatorError::Stopped("first".into()))
        });
        assert!(matches!(res, Err(OperatorError::Stopped(_))));
        assert_eq!(visited, 1);
    }

    #[test]
    fn dense_of_single_term_embeds_identity() {
        let hi = Rc::new(LocalHilbert::qubits(2));
        let op = LocalOperator::from_term(hi, [1], sx()).unwrap();
        let eye: nd::Array2<C64> = nd::Array2::eye(2);
        let expected = nd::linalg::kron(&eye, &sx());
        assert_close(&op.to_dense().unwrap(), &expected);
    }

    #[test]
    fn conjugate_transpose_adjoint() {
        let hi = Rc::new(LocalHilbert::qubits(3));
        let op
            = LocalOperator::from_term(hi, [2, 0], complex_2site()).unwrap()
            .with_constant(c(0.5, 1.5));
        let dense = op.to_dense().unwrap();
        assert_close(&op.conjugate().to_dense().unwrap(), &dense.mapv(|z| z.conj()));
        assert_close(&op.transpose().to_dense().unwrap(), &dense.t().to_owned());
        assert_close(
            &op.adjoint().to_dense().unwrap(),
            &dense.t().mapv(|z| z.conj()),
        );
        assert_close(
            &op.conjugate().transpose().to_dense().unwrap(),
            &op.adjoint().to_dense().unwrap(),
        );
    }

    #[test]
    fn sum_merges_terms_on_equal_sites() {
        let hi = Rc::new(LocalHilbert::qubits(3));
        let a = LocalOperator::from_term(Rc::clone(&hi), [0, 2], complex_2site()).unwrap();
        let b = LocalOperator::from_term(Rc::clone(&hi), [1], sx()).unwrap();
        let s = a.try_add(&b).unwrap().try_add(&a).unwrap();
        assert_eq!(s.terms().len(), 2);
        assert_eq!(s.terms()[0].sites(), &[0, 2]);
        let expected
            = a.to_dense().unwrap() * c(2.0, 0.0) + b.to_dense().unwrap();
        assert_close(&s.to_dense().unwrap(), &expected);
    }

    #[test]
    fn scalar_multiplication() {
        let hi = Rc::new(LocalHilbert::qubits(2));
        let a
            = LocalOperator::from_term(hi, [1, 0], complex_2site()).unwrap()
            .with_constant(c(1.0, 0.0));
        let dense = a.to_dense().unwrap();
        assert_close(&(&a * c(0.0, 2.0)).to_dense().unwrap(), &(&dense * c(0.0, 2.0)));
        assert_close(&(&a * 3.0).to_dense().unwrap(), &(&dense * c(3.0, 0.0)));
        assert_close(&(-a).to_dense().unwrap(), &(-dense));
    }

    #[test]
    fn product_matches_dense_product() {
        let hi = Rc::new(LocalHilbert::new([0.0, 1.0, 2.0], 3).unwrap());
        let m3 = |shift: f64| -> nd::Array2<C64> {
            nd::Array2::from_shape_fn((3, 3), |(i, j)| {
                c(i as f64 - shift * j as f64, (i * j) as f64 + shift)
            })
        };
        let m9 = nd::Array2::from_shape_fn((9, 9), |(i, j)| {
            c(((i * 7 + j * 3) % 5) as f64 - 2.0, ((i + j) % 3) as f64)
        });
        let a
            = LocalOperator::from_term(Rc::clone(&hi), [1], m3(1.0)).unwrap()
            .try_add(
                &LocalOperator::from_term(Rc::clone(&hi), [2, 0], m9.clone()).unwrap()
            )
            .unwrap()
            .with_constant(c(0.0, -1.0));
        let b
            = LocalOperator::from_term(Rc::clone(&hi), [0, 1], m9).unwrap()
            .try_add(&LocalOperator::from_term(Rc::clone(&hi), [2], m3(-0.5)).unwrap())
            .unwrap()
            .with_constant(c(2.0, 0.0));
        let ab = a.try_mul(&b).unwrap();
        let expected = a.to_dense().unwrap().dot(&b.to_dense().unwrap());
        assert_close(&ab.to_dense().unwrap(), &expected);
        let ba = b.try_mul(&a).unwrap();
        let expected = b.to_dense().unwrap().dot(&a.to_dense().unwrap());
        assert_close(&ba.to_dense().unwrap(), &expected);
    }

    #[test]
    fn incompatible_spaces_are_rejected() {
        let a = LocalOperator::identity(Rc::new(LocalHilbert::qubits(2)));
        let b = LocalOperator::identity(Rc::new(LocalHilbert::qubits(3)));
        assert!(matches!(a.try_add(&b), Err(OperatorError::IncompatibleHilbert)));
        assert!(matches!(a.try_mul(&b), Err(OperatorError::IncompatibleHilbert)));
        // equal spaces behind different handles are compatible
        let a2 = LocalOperator::identity(Rc::new(LocalHilbert::qubits(2)));
        assert!(a.try_add(&a2).is_ok());
    }

    #[test]
    fn cutoff_hides_small_elements() {
        let hi = Rc::new(LocalHilbert::qubits(1));
        let m = nd::array![[c(0.0, 0.0), c(1e-6, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]];
        let op = LocalOperator::from_term(hi, [0], m).unwrap();
        assert_eq!(collect(&op, &[0.0]).len(), 1);
        let op = op.with_cutoff(1e-3);
        assert!(collect(&op, &[0.0]).is_empty());
        assert_eq!(collect(&op, &[1.0]).len(), 1);
    }

    #[test]
    fn combined_operators_keep_smaller_cutoff() {
        let hi = Rc::new(LocalHilbert::qubits(1));
        let m = nd::array![[c(0.0, 0.0), c(1e-6, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]];
        let coarse
            = LocalOperator::from_term(Rc::clone(&hi), [0], m).unwrap()
            .with_cutoff(1e-3);
        let fine = LocalOperator::identity(Rc::clone(&hi));
        for op in [
            coarse.try_add(&fine).unwrap(),
            fine.try_add(&coarse).unwrap(),
            coarse.try_mul(&fine).unwrap(),
            fine.try_mul(&coarse).unwrap(),
        ] {
            assert_eq!(op.mel_cutoff(), DEFAULT_MEL_CUTOFF);
            // the 1e-6 element hidden by `coarse` is visible again
            let conns = collect(&op, &[0.0]);
            assert!(conns.mel.contains(&c(1e-6, 0.0)));
        }
    }
}
