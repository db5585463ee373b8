mod litvec;
mod var;
mod varvec;

pub(crate) use litvec::LitVec;
pub use var::{Lit, Var};
pub(crate) use varvec::VarVec;
