//! Sparse, matrix-free Lindbladian superoperators for open many-body quantum
//! systems.
//!
//! Operators are described by the connections they generate from a single
//! configuration (see [`operator`]), and the Lindbladian of a Hamiltonian with
//! a list of jump operators is presented as one more such operator over the
//! doubled row/column space of density-matrix indices (see [`lindblad`]).

pub mod utils;
pub mod hilbert;
pub mod operator;
pub mod lindblad;

pub use hilbert::{ DoubledHilbert, HilbertSpace, LocalHilbert };
pub use operator::{ Connections, ConnectorRef, LocalOperator, Operator };
pub use lindblad::{ EffectiveHamiltonian, LocalLindbladian, TransverseIsing };
