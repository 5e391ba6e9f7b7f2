use crate::fft::EvaluationDomain;
use crate::fields::{Field, Fr};
use core::ops::{Index, IndexMut};
use num_traits::Zero;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A polynomial over Fr: a coefficient buffer with an explicit logical
/// size and extra capacity for the wrap-around "Lagrange base"
/// evaluations the prover appends when it reads shifted polynomials.
///
/// Whether the buffer holds monomial coefficients, evaluations over a
/// subgroup, or evaluations over a coset is a caller-tracked convention,
/// exactly as loose as it sounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polynomial {
    coefficients: Vec<Fr>,
    size: usize,
}

impl Polynomial {
    /// A zeroed polynomial of logical length `size` with room for
    /// `capacity` coefficients.
    pub fn new(size: usize, capacity: usize) -> Self {
        debug_assert!(capacity >= size);
        Polynomial {
            coefficients: vec![Fr::zero(); capacity],
            size,
        }
    }

    pub fn from_coefficients(coefficients: Vec<Fr>) -> Self {
        let size = coefficients.len();
        Polynomial { coefficients, size }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    pub fn coefficients(&self) -> &[Fr] {
        &self.coefficients
    }

    #[inline]
    pub fn coefficients_mut(&mut self) -> &mut [Fr] {
        &mut self.coefficients
    }

    /// Appends a wrap-around evaluation past the logical size.
    pub fn add_lagrange_base_coefficient(&mut self, coefficient: Fr) {
        debug_assert!(self.size < self.coefficients.len());
        self.coefficients[self.size] = coefficient;
        self.size += 1;
    }

    /// Shrinks the logical size back to `size`, dropping wrap-around
    /// entries.
    pub fn truncate(&mut self, size: usize) {
        debug_assert!(size <= self.size);
        self.size = size;
    }

    pub fn fft(&mut self, domain: &EvaluationDomain) {
        domain.fft(&mut self.coefficients);
    }

    pub fn ifft(&mut self, domain: &EvaluationDomain) {
        domain.ifft(&mut self.coefficients);
    }

    pub fn ifft_with_constant(&mut self, domain: &EvaluationDomain, constant: Fr) {
        domain.ifft_with_constant(&mut self.coefficients, constant);
    }

    pub fn coset_fft(&mut self, domain: &EvaluationDomain) {
        domain.coset_fft(&mut self.coefficients);
    }

    pub fn coset_fft_with_constant(&mut self, domain: &EvaluationDomain, constant: Fr) {
        domain.coset_fft_with_constant(&mut self.coefficients, constant);
    }

    pub fn coset_ifft(&mut self, domain: &EvaluationDomain) {
        domain.coset_ifft(&mut self.coefficients);
    }

    /// Horner evaluation of the first `n` coefficients at `z`, sharded
    /// into chunks recombined by powers of `z^chunk`.
    pub fn evaluate(&self, z: &Fr, n: usize) -> Fr {
        evaluate(&self.coefficients[..n], z)
    }

    /// Replaces `self` by `(f(X) - f(z))/(X - z)` via synthetic division
    /// over the first `n` coefficients, returning `f(z)`.
    ///
    /// The division is exact by construction; no remainder is left behind.
    pub fn compute_kate_opening_coefficients(&mut self, z: &Fr, n: usize) -> Fr {
        let f_z = self.evaluate(z, n);

        // q_0 = (f_0 - f(z)) * (-z)^-1, q_i = (f_i - q_{i-1}) * (-z)^-1.
        let divisor = (-*z).inverse().expect("opening point must be nonzero");
        self.coefficients[0] = (self.coefficients[0] - f_z) * divisor;
        for i in 1..n {
            let t = (self.coefficients[i] - self.coefficients[i - 1]) * divisor;
            self.coefficients[i] = t;
        }
        // The quotient has one coefficient fewer; the top slot becomes
        // zero because the division is exact.
        f_z
    }
}

/// Parallel Horner evaluation of a coefficient slice.
pub fn evaluate(coeffs: &[Fr], z: &Fr) -> Fr {
    let n = coeffs.len();
    if n == 0 {
        return Fr::zero();
    }
    let num_threads = super::domain::num_threads();
    if n < num_threads * 8 {
        return horner(coeffs, z);
    }

    let chunk_size = (n + num_threads - 1) / num_threads;

    #[cfg(feature = "parallel")]
    let partials: Vec<Fr> = coeffs.par_chunks(chunk_size).map(|c| horner(c, z)).collect();
    #[cfg(not(feature = "parallel"))]
    let partials: Vec<Fr> = coeffs.chunks(chunk_size).map(|c| horner(c, z)).collect();

    let z_chunk = z.pow_small(chunk_size as u64);
    let mut acc = Fr::zero();
    for partial in partials.into_iter().rev() {
        acc = acc * z_chunk + partial;
    }
    acc
}

#[inline]
fn horner(coeffs: &[Fr], z: &Fr) -> Fr {
    let mut acc = Fr::zero();
    for c in coeffs.iter().rev() {
        acc = acc * z + c;
    }
    acc
}

impl Index<usize> for Polynomial {
    type Output = Fr;

    #[inline]
    fn index(&self, index: usize) -> &Fr {
        &self.coefficients[index]
    }
}

impl IndexMut<usize> for Polynomial {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Fr {
        &mut self.coefficients[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UniformRand;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    #[test]
    fn evaluate_matches_serial_horner() {
        let mut rng = XorShiftRng::seed_from_u64(5);
        let coeffs: Vec<Fr> = (0..200).map(|_| Fr::rand(&mut rng)).collect();
        let z = Fr::rand(&mut rng);
        assert_eq!(evaluate(&coeffs, &z), horner(&coeffs, &z));
    }

    #[test]
    fn kate_opening_coefficients() {
        let mut rng = XorShiftRng::seed_from_u64(6);
        let n = 64;
        let coeffs: Vec<Fr> = (0..n).map(|_| Fr::rand(&mut rng)).collect();
        let mut poly = Polynomial::from_coefficients(coeffs.clone());

        let z = Fr::rand(&mut rng);
        let f_z = poly.compute_kate_opening_coefficients(&z, n);
        assert_eq!(f_z, evaluate(&coeffs, &z));

        // (X - z) * q(X) + f(z) == f(X) at a random point.
        let x = Fr::rand(&mut rng);
        let q_x = poly.evaluate(&x, n);
        assert_eq!((x - z) * q_x + f_z, evaluate(&coeffs, &x));
    }
}
