//! The prover's preprocessed view of a circuit: selector and permutation
//! polynomials in every form the five rounds consume, the evaluation
//! domains, and the reference string.

use crate::error::Error;
use crate::permutation::compute_permutation_lagrange_base;
use crate::reference_string::ReferenceString;
use algebra::fft::{EvaluationDomain, Polynomial};
use algebra::Fr;
use std::collections::BTreeMap;

/// Blinding head-room: the grand product carries a two-coefficient blind,
/// so committed polynomials can reach degree `n + 1`.
pub const BLINDING_COEFFICIENTS: usize = 2;

pub struct ProvingKey {
    pub n: usize,
    pub small_domain: EvaluationDomain,
    pub mid_domain: EvaluationDomain,
    pub large_domain: EvaluationDomain,

    /// Gate selectors in coefficient form.
    pub constraint_selectors: BTreeMap<String, Polynomial>,
    /// The same selectors evaluated over the 4n coset.
    pub constraint_selector_ffts: BTreeMap<String, Polynomial>,

    /// Permutation selectors sigma_k in coefficient form.
    pub permutation_selectors: BTreeMap<String, Polynomial>,
    /// sigma_k evaluated over the subgroup (the grand product walks these).
    pub permutation_selectors_lagrange_base: BTreeMap<String, Polynomial>,
    /// sigma_k evaluated over the 4n coset.
    pub permutation_selector_ffts: BTreeMap<String, Polynomial>,

    /// 4n-coset evaluations of the first Lagrange polynomial, with eight
    /// wrapped entries so index arithmetic can read `L_1(X w^2)`.
    pub lagrange_1: Polynomial,

    pub reference_string: ReferenceString,
}

impl ProvingKey {
    /// Allocates the key for a circuit of `num_gates` gates. Fails when
    /// the gate count is not a usable FFT size or the reference string
    /// cannot commit to blinded polynomials of that degree.
    pub fn new(num_gates: usize, reference_string: ReferenceString) -> Result<Self, Error> {
        let n = num_gates;
        let small_domain =
            EvaluationDomain::new(n).ok_or(Error::InvalidDomainSize(n))?;
        let mid_domain =
            EvaluationDomain::new(2 * n).ok_or(Error::InvalidDomainSize(2 * n))?;
        let large_domain =
            EvaluationDomain::new(4 * n).ok_or(Error::InvalidDomainSize(4 * n))?;

        let required = n + BLINDING_COEFFICIENTS;
        if reference_string.degree < required {
            return Err(Error::SrsTooSmall {
                required,
                actual: reference_string.degree,
            });
        }

        let mut lagrange_1 = Polynomial::new(4 * n, 4 * n + 8);
        large_domain
            .compute_lagrange_polynomial_fft(lagrange_1.coefficients_mut(), &small_domain);
        for i in 0..8 {
            let wrap = lagrange_1[i];
            lagrange_1.add_lagrange_base_coefficient(wrap);
        }

        Ok(ProvingKey {
            n,
            small_domain,
            mid_domain,
            large_domain,
            constraint_selectors: BTreeMap::new(),
            constraint_selector_ffts: BTreeMap::new(),
            permutation_selectors: BTreeMap::new(),
            permutation_selectors_lagrange_base: BTreeMap::new(),
            permutation_selector_ffts: BTreeMap::new(),
            lagrange_1,
            reference_string,
        })
    }

    /// Registers a gate selector given its value at every gate, storing
    /// the coefficient form and the 4n-coset evaluation form.
    pub fn insert_constraint_selector(&mut self, name: &str, mut values: Vec<Fr>) {
        debug_assert_eq!(values.len(), self.n);
        self.small_domain.ifft(&mut values);

        let mut fft_form = Polynomial::new(4 * self.n, 4 * self.n + 4);
        fft_form.coefficients_mut()[..self.n].copy_from_slice(&values);
        fft_form.coset_fft(&self.large_domain);
        for i in 0..4 {
            let wrap = fft_form[i];
            fft_form.add_lagrange_base_coefficient(wrap);
        }

        self.constraint_selectors
            .insert(name.to_string(), Polynomial::from_coefficients(values));
        self.constraint_selector_ffts
            .insert(format!("{}_fft", name), fft_form);
    }

    /// Registers the sigma polynomial of one wire column from its
    /// epicycle-encoded permutation mapping.
    pub fn insert_permutation_selector(&mut self, name: &str, mapping: &[u32]) {
        let lagrange_base = compute_permutation_lagrange_base(mapping, &self.small_domain);

        let mut coefficients = lagrange_base.clone();
        self.small_domain.ifft(&mut coefficients);

        let mut fft_form = Polynomial::new(4 * self.n, 4 * self.n + 4);
        fft_form.coefficients_mut()[..self.n].copy_from_slice(&coefficients);
        fft_form.coset_fft(&self.large_domain);
        for i in 0..4 {
            let wrap = fft_form[i];
            fft_form.add_lagrange_base_coefficient(wrap);
        }

        self.permutation_selectors_lagrange_base
            .insert(name.to_string(), Polynomial::from_coefficients(lagrange_base));
        self.permutation_selectors
            .insert(name.to_string(), Polynomial::from_coefficients(coefficients));
        self.permutation_selector_ffts
            .insert(format!("{}_fft", name), fft_form);
    }

    pub fn constraint_selector(&self, name: &str) -> &Polynomial {
        self.constraint_selectors
            .get(name)
            .unwrap_or_else(|| panic!("missing constraint selector {}", name))
    }

    pub fn constraint_selector_fft(&self, name: &str) -> &Polynomial {
        self.constraint_selector_ffts
            .get(name)
            .unwrap_or_else(|| panic!("missing selector fft {}", name))
    }

    pub fn permutation_selector(&self, name: &str) -> &Polynomial {
        self.permutation_selectors
            .get(name)
            .unwrap_or_else(|| panic!("missing permutation selector {}", name))
    }
}

/// The mutable half of a proof computation: wire polynomials (taken from
/// the witness), the grand product, FFT scratch and the opening
/// polynomials. One `ProverState` is consumed per proof; the `ProvingKey`
/// stays immutable and shareable.
pub struct ProverState {
    /// Wire polynomials; subgroup evaluations on entry, coefficient form
    /// after the first round.
    pub wires: BTreeMap<String, Polynomial>,
    /// 4n-coset evaluations of the wires, with four wrapped entries for
    /// shifted reads. Holds plain subgroup evaluations between rounds one
    /// and two.
    pub wire_ffts: BTreeMap<String, Polynomial>,
    /// The grand product; `n + 2` coefficients once blinded.
    pub z: Polynomial,
    pub z_fft: Polynomial,
    pub quotient_large: Polynomial,
    pub opening_poly: Polynomial,
    pub shifted_opening_poly: Polynomial,
    pub linear_poly: Polynomial,
    pub public_inputs: Vec<Fr>,
}

impl ProverState {
    pub fn new(n: usize, witness: Witness, program_width: usize) -> Self {
        let mut wire_ffts = BTreeMap::new();
        for k in 1..=program_width {
            wire_ffts.insert(
                format!("w_{}_fft", k),
                Polynomial::new(4 * n, 4 * n + 4),
            );
        }

        ProverState {
            wires: witness.wires,
            wire_ffts,
            z: Polynomial::new(n + BLINDING_COEFFICIENTS, n + BLINDING_COEFFICIENTS),
            z_fft: Polynomial::new(4 * n, 4 * n + 4),
            quotient_large: Polynomial::new(4 * n, 4 * n),
            opening_poly: Polynomial::new(n + BLINDING_COEFFICIENTS, n + BLINDING_COEFFICIENTS),
            shifted_opening_poly: Polynomial::new(
                n + BLINDING_COEFFICIENTS,
                n + BLINDING_COEFFICIENTS,
            ),
            linear_poly: Polynomial::new(n + BLINDING_COEFFICIENTS, n + BLINDING_COEFFICIENTS),
            public_inputs: witness.public_inputs,
        }
    }

}

/// Wire assignments, one polynomial of gate values per wire column, plus
/// the public input values the transcript binds.
pub struct Witness {
    pub wires: BTreeMap<String, Polynomial>,
    pub public_inputs: Vec<Fr>,
}

impl Witness {
    pub fn new(wires: BTreeMap<String, Polynomial>, public_inputs: Vec<Fr>) -> Self {
        Witness {
            wires,
            public_inputs,
        }
    }

    pub fn wire_mut(&mut self, name: &str) -> &mut Polynomial {
        self.wires
            .get_mut(name)
            .unwrap_or_else(|| panic!("missing wire {}", name))
    }
}
