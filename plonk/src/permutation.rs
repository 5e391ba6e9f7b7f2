//! Conversion of a copy-constraint permutation into the sigma selector
//! polynomials the grand-product argument consumes.

use algebra::fft::EvaluationDomain;
use algebra::{Field, Fr, PrimeField};
use num_traits::One;

/// Bits 30..32 of a permutation entry select the wire column the slot
/// maps into; the low 30 bits are the gate index.
pub const INDEX_MASK: u32 = (1 << 30) - 1;

/// Builds one sigma polynomial in Lagrange-base form. Entry `i` encodes
/// `(gate, column)`; its evaluation is `kappa_column * w^gate`, with
/// `kappa_k = g^k` the coset shifts that keep the four wire columns in
/// disjoint cosets of the subgroup.
pub fn compute_permutation_lagrange_base(
    permutation: &[u32],
    domain: &EvaluationDomain,
) -> Vec<Fr> {
    debug_assert_eq!(permutation.len(), domain.size);

    let mut root_powers = Vec::with_capacity(domain.size);
    let mut acc = Fr::one();
    for _ in 0..domain.size {
        root_powers.push(acc);
        acc *= domain.root;
    }

    let coset_shifts = coset_generators();

    permutation
        .iter()
        .map(|&entry| {
            let gate = (entry & INDEX_MASK) as usize;
            let column = (entry >> 30) as usize;
            root_powers[gate] * coset_shifts[column]
        })
        .collect()
}

/// `kappa_1..kappa_4 = 1, g, g^2, g^3` with `g` the Fr multiplicative
/// generator.
pub fn coset_generators() -> [Fr; 4] {
    let g = Fr::multiplicative_generator();
    let g2 = g.square();
    [Fr::one(), g, g2, g2 * g]
}

/// Tags a `(gate, column)` pair into a permutation entry.
pub fn encode_epicycle(gate: u32, column: u32) -> u32 {
    debug_assert!(gate <= INDEX_MASK);
    debug_assert!(column < 4);
    gate | (column << 30)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_permutation_reproduces_wire_cosets() {
        let n = 8;
        let domain = EvaluationDomain::new(n).unwrap();
        for column in 0..3u32 {
            let mapping: Vec<u32> =
                (0..n as u32).map(|i| encode_epicycle(i, column)).collect();
            let sigma = compute_permutation_lagrange_base(&mapping, &domain);
            let shift = coset_generators()[column as usize];
            let mut root = Fr::one();
            for value in sigma {
                assert_eq!(value, shift * root);
                root *= domain.root;
            }
        }
    }
}
