use crate::fields::{batch_inversion, Field, Fr, PrimeField};
use num_traits::{One, Zero};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Minimum size at which the butterfly loops are worth sharding across
/// threads.
const MIN_PARALLEL_SIZE: usize = 1 << 6;

/// A multiplicative subgroup of Fr of power-of-two order, together with
/// the lookup table of round roots that every FFT over the domain reuses.
///
/// The table stores, for each butterfly round of half-width `h`, the `h`
/// powers of the `2h`-th root of unity, forward halves first, inverse
/// halves in the second half of the buffer. It is built once at
/// construction and shared by all transforms of this size.
#[derive(Clone, Debug)]
pub struct EvaluationDomain {
    pub size: usize,
    pub log2_size: u32,
    /// The primitive `size`-th root of unity.
    pub root: Fr,
    pub root_inverse: Fr,
    /// `size` as a field element.
    pub domain: Fr,
    pub domain_inverse: Fr,
    /// The multiplicative-coset shift generator.
    pub generator: Fr,
    pub generator_inverse: Fr,
    roots: Vec<Fr>,
}

/// O(1) evaluations of the domain polynomials at a point, per the
/// pseudo-vanishing convention `Z_H*(X) = (X^n - 1)/(X - w^{n-1})`.
#[derive(Clone, Copy, Debug)]
pub struct LagrangeEvaluations {
    pub vanishing_poly: Fr,
    pub l_1: Fr,
    pub l_n_minus_1: Fr,
}

impl EvaluationDomain {
    /// Creates a domain of the given power-of-two order and builds its
    /// round-roots table. Returns `None` when the size is not a power of
    /// two or exceeds the field's two-adicity.
    pub fn new(size: usize) -> Option<Self> {
        if size < 2 || !size.is_power_of_two() {
            return None;
        }
        let log2_size = size.trailing_zeros();
        let root = Fr::get_root_of_unity(log2_size)?;

        let mut domain = Self {
            size,
            log2_size,
            root,
            root_inverse: root.inverse().unwrap(),
            domain: Fr::from(size as u64),
            domain_inverse: Fr::from(size as u64).inverse().unwrap(),
            generator: Fr::multiplicative_generator(),
            generator_inverse: Fr::GENERATOR_INV,
            roots: Vec::new(),
        };
        domain.compute_lookup_table();
        Some(domain)
    }

    /// Table layout: for each round `i` (butterfly half-width `2^{i+1}`),
    /// a block of `2^{i+1}` ascending powers of `root^(size/2^{i+2})`,
    /// packed contiguously; the inverse-root blocks occupy the mirrored
    /// second half.
    fn compute_lookup_table(&mut self) {
        let half_table = (self.size - 1).next_power_of_two();
        let mut roots = vec![Fr::zero(); 2 * half_table];
        Self::fill_half(self.root, self.size, &mut roots[..half_table]);
        Self::fill_half(self.root_inverse, self.size, &mut roots[half_table..]);
        self.roots = roots;
    }

    fn fill_half(input_root: Fr, size: usize, out: &mut [Fr]) {
        let num_rounds = size.trailing_zeros() as usize;
        let mut offset = 0;
        for i in 0..num_rounds.saturating_sub(1) {
            let m = 1usize << (i + 1);
            let round_root = input_root.pow_small((size / (2 * m)) as u64);
            out[offset] = Fr::one();
            for j in 1..m {
                out[offset + j] = out[offset + j - 1] * round_root;
            }
            offset += m;
        }
    }

    /// The twiddle block for the butterfly round of half-width `h >= 2`.
    #[inline]
    fn round_roots(&self, h: usize, inverse: bool) -> &[Fr] {
        debug_assert!(h >= 2 && h <= self.size / 2);
        let offset = h - 2;
        let base = if inverse { self.roots.len() / 2 } else { 0 };
        &self.roots[base + offset..base + offset + h]
    }

    fn fft_inner(&self, coeffs: &mut [Fr], inverse: bool) {
        let n = self.size;
        debug_assert!(coeffs.len() >= n);
        let a = &mut coeffs[..n];

        // Bit-reversal permutation.
        for k in 0..n as u64 {
            let rk = k.reverse_bits() >> (64 - self.log2_size);
            if k < rk {
                a.swap(rk as usize, k as usize);
            }
        }

        // First round has unit twiddles.
        for k in (0..n).step_by(2) {
            let t = a[k + 1];
            a[k + 1] = a[k] - t;
            a[k] += t;
        }

        let mut h = 2usize;
        while h < n {
            let rr = self.round_roots(h, inverse);
            let butterfly = |chunk: &mut [Fr]| {
                let (lo, hi) = chunk.split_at_mut(h);
                for j in 0..h {
                    let t = rr[j].mul_with_coarse_reduction(&hi[j]);
                    hi[j] = lo[j].sub_with_coarse_reduction(&t).reduce_once();
                    lo[j] = lo[j].add_with_coarse_reduction(&t).reduce_once();
                }
            };

            #[cfg(feature = "parallel")]
            {
                if n >= MIN_PARALLEL_SIZE {
                    a.par_chunks_mut(2 * h).for_each(butterfly);
                } else {
                    a.chunks_mut(2 * h).for_each(butterfly);
                }
            }
            #[cfg(not(feature = "parallel"))]
            a.chunks_mut(2 * h).for_each(butterfly);

            h *= 2;
        }
    }

    /// In-place forward transform of the leading `size` coefficients.
    pub fn fft(&self, coeffs: &mut [Fr]) {
        self.fft_inner(coeffs, false);
    }

    /// In-place inverse transform, including the `1/n` scaling.
    pub fn ifft(&self, coeffs: &mut [Fr]) {
        self.fft_inner(coeffs, true);
        let n_inv = self.domain_inverse;
        Self::scale(&mut coeffs[..self.size], n_inv);
    }

    /// Inverse transform fused with a final multiplication by `constant`.
    pub fn ifft_with_constant(&self, coeffs: &mut [Fr], constant: Fr) {
        self.fft_inner(coeffs, true);
        let scale_by = self.domain_inverse * constant;
        Self::scale(&mut coeffs[..self.size], scale_by);
    }

    fn scale(coeffs: &mut [Fr], factor: Fr) {
        crate::cfg_iter_mut!(coeffs).for_each(|c| *c *= factor);
    }

    /// Multiplies coefficient `i` by `g^i` (times `constant`), shifting
    /// evaluation onto the coset `g * H`.
    pub fn distribute_powers(&self, coeffs: &mut [Fr], g: Fr, constant: Fr) {
        let work = |(chunk_index, chunk): (usize, &mut [Fr])| {
            let chunk_size = chunk.len();
            let mut shift = g.pow_small((chunk_index * chunk_size) as u64) * constant;
            for c in chunk.iter_mut() {
                *c *= shift;
                shift *= g;
            }
        };

        let chunk_size = core::cmp::max(1, coeffs.len() / num_threads());
        #[cfg(feature = "parallel")]
        coeffs
            .par_chunks_mut(chunk_size)
            .enumerate()
            .for_each(work);
        #[cfg(not(feature = "parallel"))]
        coeffs.chunks_mut(chunk_size).enumerate().for_each(work);
    }

    pub fn coset_fft(&self, coeffs: &mut [Fr]) {
        self.distribute_powers(&mut coeffs[..self.size], self.generator, Fr::one());
        self.fft(coeffs);
    }

    /// Coset transform with every coefficient pre-scaled by `constant`.
    pub fn coset_fft_with_constant(&self, coeffs: &mut [Fr], constant: Fr) {
        self.distribute_powers(&mut coeffs[..self.size], self.generator, constant);
        self.fft(coeffs);
    }

    pub fn coset_ifft(&self, coeffs: &mut [Fr]) {
        self.ifft(coeffs);
        self.distribute_powers(&mut coeffs[..self.size], self.generator_inverse, Fr::one());
    }

    /// `Z_H(z), L_1(z), L_{n-1}(z)` from `z^n` and the domain constants.
    pub fn get_lagrange_evaluations(&self, z: &Fr) -> LagrangeEvaluations {
        let z_pow_n = z.pow_small(self.size as u64);
        let numerator = z_pow_n - Fr::one();

        // L_1(z) = (z^n - 1)/(n(z - 1)); the bound-check polynomial is the
        // Lagrange indicator of w^{n-2}, i.e. L_1(z * w^2); and Z_H* cuts
        // the root w^{n-1} out of the vanishing polynomial.
        let w_last = self.root_inverse;
        let mut denominators = [
            self.domain * (*z - Fr::one()),
            self.domain * (*z * self.root.square() - Fr::one()),
            *z - w_last,
        ];
        batch_inversion(&mut denominators);

        LagrangeEvaluations {
            vanishing_poly: numerator * denominators[2],
            l_1: numerator * denominators[0],
            l_n_minus_1: numerator * denominators[1],
        }
    }

    /// Divides a coset-evaluation form polynomial by
    /// `Z_H*(X) = (X^n - 1)/(X - w^{n-1})`, where `H` is `small_domain`
    /// and the evaluations live on this (larger) domain's coset. The
    /// caller guarantees divisibility.
    pub fn divide_by_pseudo_vanishing_polynomial(
        &self,
        coeffs: &mut [Fr],
        small_domain: &EvaluationDomain,
    ) {
        debug_assert!(self.size >= small_domain.size);
        let ratio = self.size / small_domain.size;

        // (g w^i)^n - 1 cycles with period `ratio`.
        let zeta = self.root.pow_small(small_domain.size as u64);
        let g_pow_n = self.generator.pow_small(small_domain.size as u64);
        let mut numerators = vec![Fr::zero(); ratio];
        let mut acc = g_pow_n;
        for num in numerators.iter_mut() {
            *num = acc - Fr::one();
            acc *= zeta;
        }
        batch_inversion(&mut numerators);

        let w_last = small_domain.root_inverse;
        let work = |(chunk_index, chunk): (usize, &mut [Fr])| {
            let chunk_size = chunk.len();
            let mut work_root = self.generator * self.root.pow_small((chunk_index * chunk_size) as u64);
            for (i, c) in chunk.iter_mut().enumerate() {
                let idx = chunk_index * chunk_size + i;
                *c *= numerators[idx & (ratio - 1)];
                *c *= work_root - w_last;
                work_root *= self.root;
            }
        };

        let chunk_size = core::cmp::max(1, self.size / num_threads());
        #[cfg(feature = "parallel")]
        coeffs[..self.size]
            .par_chunks_mut(chunk_size)
            .enumerate()
            .for_each(work);
        #[cfg(not(feature = "parallel"))]
        coeffs[..self.size]
            .chunks_mut(chunk_size)
            .enumerate()
            .for_each(work);
    }

    /// Fills `out` with the evaluations of `L_1(X)` over this domain's
    /// coset, where `L_1` is the first Lagrange polynomial of
    /// `small_domain`: `L_1(X) = (X^n - 1)/(n(X - 1))`.
    pub fn compute_lagrange_polynomial_fft(
        &self,
        out: &mut [Fr],
        small_domain: &EvaluationDomain,
    ) {
        debug_assert!(out.len() >= self.size);
        let ratio = self.size / small_domain.size;

        let zeta = self.root.pow_small(small_domain.size as u64);
        let g_pow_n = self.generator.pow_small(small_domain.size as u64);
        let mut numerators = vec![Fr::zero(); ratio];
        let mut acc = g_pow_n;
        for num in numerators.iter_mut() {
            *num = acc - Fr::one();
            acc *= zeta;
        }

        // Denominators n(g w^i - 1), inverted in one batch.
        let mut denominators = vec![Fr::zero(); self.size];
        let mut work_root = self.generator;
        for d in denominators.iter_mut() {
            *d = small_domain.domain * (work_root - Fr::one());
            work_root *= self.root;
        }
        batch_inversion(&mut denominators);

        for i in 0..self.size {
            out[i] = numerators[i & (ratio - 1)] * denominators[i];
        }
    }
}

#[inline]
pub fn num_threads() -> usize {
    #[cfg(feature = "parallel")]
    {
        rayon::current_num_threads()
    }
    #[cfg(not(feature = "parallel"))]
    {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UniformRand;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    fn random_coeffs(n: usize, seed: u64) -> Vec<Fr> {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        (0..n).map(|_| Fr::rand(&mut rng)).collect()
    }

    fn naive_evaluate(coeffs: &[Fr], z: &Fr) -> Fr {
        let mut acc = Fr::zero();
        for c in coeffs.iter().rev() {
            acc = acc * z + c;
        }
        acc
    }

    #[test]
    fn fft_ifft_round_trip() {
        for log_n in [2u32, 5, 8] {
            let n = 1usize << log_n;
            let domain = EvaluationDomain::new(n).unwrap();
            let coeffs = random_coeffs(n, u64::from(log_n));
            let mut work = coeffs.clone();
            domain.fft(&mut work);
            domain.ifft(&mut work);
            assert_eq!(work, coeffs);
        }
    }

    #[test]
    fn coset_round_trip() {
        let n = 64;
        let domain = EvaluationDomain::new(n).unwrap();
        let coeffs = random_coeffs(n, 42);
        let mut work = coeffs.clone();
        domain.coset_fft(&mut work);
        domain.coset_ifft(&mut work);
        assert_eq!(work, coeffs);
    }

    #[test]
    fn fft_agrees_with_horner() {
        let n = 32;
        let domain = EvaluationDomain::new(n).unwrap();
        let coeffs = random_coeffs(n, 17);
        let mut evals = coeffs.clone();
        domain.fft(&mut evals);

        let mut x = Fr::one();
        for i in 0..n {
            assert_eq!(evals[i], naive_evaluate(&coeffs, &x), "mismatch at {}", i);
            x *= domain.root;
        }
    }

    #[test]
    fn non_power_of_two_is_rejected() {
        assert!(EvaluationDomain::new(48).is_none());
        assert!(EvaluationDomain::new(0).is_none());
    }

    #[test]
    fn lagrange_evaluations_match_definitions() {
        let n = 16;
        let domain = EvaluationDomain::new(n).unwrap();
        let mut rng = XorShiftRng::seed_from_u64(3);
        let z = Fr::rand(&mut rng);

        let evals = domain.get_lagrange_evaluations(&z);

        let z_pow_n = z.pow_small(n as u64);
        let l_1 = (z_pow_n - Fr::one())
            * (domain.domain * (z - Fr::one())).inverse().unwrap();
        assert_eq!(evals.l_1, l_1);

        // The end-boundary indicator is L_1(z * w^2).
        let zw2 = z * domain.root * domain.root;
        let l_n_minus_1 = (zw2.pow_small(n as u64) - Fr::one())
            * (domain.domain * (zw2 - Fr::one())).inverse().unwrap();
        assert_eq!(evals.l_n_minus_1, l_n_minus_1);

        let vanishing = (z_pow_n - Fr::one())
            * (z - domain.root_inverse).inverse().unwrap();
        assert_eq!(evals.vanishing_poly, vanishing);
    }

    #[test]
    fn lagrange_polynomial_fft_interpolates() {
        let n = 8;
        let small = EvaluationDomain::new(n).unwrap();
        let large = EvaluationDomain::new(4 * n).unwrap();
        let mut l1_coset = vec![Fr::zero(); 4 * n];
        large.compute_lagrange_polynomial_fft(&mut l1_coset, &small);

        // Back to coefficient form; evaluating at the subgroup should give
        // the indicator of w^0.
        large.coset_ifft(&mut l1_coset);
        let mut x = Fr::one();
        for i in 0..n {
            let v = naive_evaluate(&l1_coset, &x);
            if i == 0 {
                assert_eq!(v, Fr::one());
            } else {
                assert!(v.is_zero());
            }
            x *= small.root;
        }
    }

    #[test]
    fn pseudo_vanishing_division() {
        // Construct P(X) = (X^n - 1)/(X - w^{n-1}) * Q(X) for a random Q of
        // degree < n, evaluate on the 4n coset, divide, and compare against
        // Q * (padding)...; simpler: divide the coset evaluation of
        // Z_H*(X) * Q(X) and check we recover Q's evaluations.
        let n = 8;
        let small = EvaluationDomain::new(n).unwrap();
        let large = EvaluationDomain::new(4 * n).unwrap();

        let q = random_coeffs(n, 77);

        // Evaluations of Z_H* * Q over the large coset.
        let mut work = vec![Fr::zero(); 4 * n];
        work[..n].copy_from_slice(&q);
        large.coset_fft(&mut work);

        let mut x = large.generator;
        for w in work.iter_mut() {
            let zh_star = (x.pow_small(n as u64) - Fr::one())
                * (x - small.root_inverse).inverse().unwrap();
            *w *= zh_star;
            x *= large.root;
        }

        large.divide_by_pseudo_vanishing_polynomial(&mut work, &small);
        large.coset_ifft(&mut work);
        assert_eq!(&work[..n], &q[..]);
        for c in &work[n..] {
            assert!(c.is_zero());
        }
    }
}
