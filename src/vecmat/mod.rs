//! Dense integer vectors and matrices with in-place row operations.

mod mat;
mod vec_;

pub use mat::Mat;
pub use vec_::IntVec;
