//! Arithmetic backend for a PLONK proving system over the BN254 (alt-bn128)
//! curve: base and scalar prime fields in Montgomery form, the
//! Fq2/Fq6/Fq12 tower, short Weierstrass group arithmetic for G1 and G2,
//! the optimal ate pairing, Pippenger multi-scalar multiplication and a
//! radix-2 FFT layer over the scalar field.

pub mod biginteger;
#[macro_use]
pub mod fields;
pub mod curves;
pub mod fft;
pub mod msm;

pub use biginteger::BigInteger256;
pub use curves::{
    pairing, AffineCurve, G1Affine, G1Projective, G2Affine, G2Projective, ProjectiveCurve,
};
pub use fft::{EvaluationDomain, Polynomial};
pub use fields::{batch_inversion, Field, Fq, Fq12, Fq2, Fq6, Fr, PrimeField, SquareRootField};
pub use msm::MsmContext;

use rand::Rng;

/// Types that can be sampled uniformly at random from an `Rng`.
pub trait UniformRand: Sized {
    fn rand<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

/// Iterates `$e` with rayon when the `parallel` feature is enabled,
/// sequentially otherwise.
#[macro_export]
macro_rules! cfg_iter_mut {
    ($e:expr) => {{
        #[cfg(feature = "parallel")]
        let result = $e.par_iter_mut();

        #[cfg(not(feature = "parallel"))]
        let result = $e.iter_mut();

        result
    }};
}

#[macro_export]
macro_rules! cfg_chunks_mut {
    ($e:expr, $size:expr) => {{
        #[cfg(feature = "parallel")]
        let result = $e.par_chunks_mut($size);

        #[cfg(not(feature = "parallel"))]
        let result = $e.chunks_mut($size);

        result
    }};
}
