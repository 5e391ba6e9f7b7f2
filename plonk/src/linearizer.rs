//! The Maller linearisation trick: collapse every term of the quotient
//! identity that is linear in an unopened polynomial into one polynomial
//! `r(X)`, so the verifier reconstructs its commitment from commitments it
//! already holds and only one extra evaluation crosses the wire.

use crate::permutation::coset_generators;
use crate::transcript::Transcript;
use algebra::{Field, Fr};
use num_traits::One;

/// Coefficients of the two permutation-argument terms of `r(X)`:
/// `r(X) = z_1 * Z(X) + sigma_last * sigma_W(X) + (widget terms)`.
pub struct PlonkLinearTerms {
    pub z_1: Fr,
    pub sigma_last: Fr,
}

/// `z_1 = alpha * prod_k (w_k(z) + beta kappa_k z + gamma) + alpha^4 L_1(z)`
/// `sigma_last = -alpha beta z_omega * prod_{k < W-1} (w_k(z) + beta sigma_k(z) + gamma)`
pub fn compute_linear_terms(
    transcript: &Transcript,
    l_1: Fr,
    program_width: usize,
) -> PlonkLinearTerms {
    let alpha = transcript.get_challenge_fr("alpha");
    let beta = transcript.get_challenge_fr("beta");
    let gamma = transcript.get_challenge_fr("gamma");
    let z = transcript.get_challenge_fr("z");
    let z_beta = z * beta;

    let wire_evaluations: Vec<Fr> = (1..=program_width)
        .map(|k| transcript.get_field_element(&format!("w_{}", k)))
        .collect();
    let z_omega_eval = transcript.get_field_element("z_omega");

    let kappa = coset_generators();
    let mut z_contribution = Fr::one();
    for (k, w_eval) in wire_evaluations.iter().enumerate() {
        z_contribution *= z_beta * kappa[k] + w_eval + gamma;
    }

    let alpha_squared = alpha.square();
    let mut z_1 = z_contribution * alpha;
    z_1 += l_1 * alpha_squared.square();

    let mut sigma_contribution = Fr::one();
    for (k, w_eval) in wire_evaluations.iter().enumerate().take(program_width - 1) {
        let sigma_eval = transcript.get_field_element(&format!("sigma_{}", k + 1));
        sigma_contribution *= sigma_eval * beta + w_eval + gamma;
    }
    sigma_contribution *= z_omega_eval;
    let sigma_last = -(sigma_contribution * alpha * beta);

    PlonkLinearTerms { z_1, sigma_last }
}
