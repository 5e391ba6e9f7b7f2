//! The PLONK verifier: replays the Fiat-Shamir schedule from the proof
//! bytes, reconstructs the quotient evaluation from the openings, and
//! checks the batched KZG identity with one pairing product.

use crate::error::Error;
use crate::linearizer::compute_linear_terms;
use crate::program_settings::PlonkVariant;
use crate::prover::{Proof, Prover};
use crate::transcript::{write_fr, Transcript};
use crate::widgets::{ChallengeCoefficients, VerifierWidget};
use algebra::curves::pairing::{reduced_ate_pairing_batch_precomputed, MillerLines};
use algebra::msm::{pippenger, MsmContext};
use algebra::{AffineCurve, Field, Fr, G1Affine, G1Projective, PrimeField, ProjectiveCurve};
use num_traits::One;
use std::collections::BTreeMap;

/// The verifier's preprocessed view of a circuit: one commitment per
/// selector polynomial and the two pairing line sets from the reference
/// string.
pub struct VerificationKey {
    pub n: usize,
    pub constraint_selector_commitments: BTreeMap<String, G1Affine>,
    pub permutation_selector_commitments: BTreeMap<String, G1Affine>,
    pub g2_lines: Vec<MillerLines>,
}

impl VerificationKey {
    pub fn constraint_selector_commitment(&self, name: &str) -> &G1Affine {
        self.constraint_selector_commitments
            .get(name)
            .unwrap_or_else(|| panic!("verification key is missing selector {}", name))
    }
}

pub struct Verifier {
    pub n: usize,
    pub variant: PlonkVariant,
    pub key: VerificationKey,
}

/// Derives a verifier from a prover by committing to every selector and
/// permutation polynomial in its key.
pub fn preprocess(prover: &Prover) -> Verifier {
    let n = prover.n;
    let mut msm_context = MsmContext::new(n);
    let monomials = &prover.key.reference_string.monomials;

    let mut commit = |coefficients: &[Fr]| -> G1Affine {
        pippenger(&mut msm_context, &coefficients[..n], monomials, n).into_affine()
    };

    let mut constraint_selector_commitments = BTreeMap::new();
    for (name, poly) in &prover.key.constraint_selectors {
        constraint_selector_commitments.insert(name.clone(), commit(poly.coefficients()));
    }

    let mut permutation_selector_commitments = BTreeMap::new();
    for (name, poly) in &prover.key.permutation_selectors {
        permutation_selector_commitments.insert(name.clone(), commit(poly.coefficients()));
    }

    Verifier {
        n,
        variant: prover.variant,
        key: VerificationKey {
            n,
            constraint_selector_commitments,
            permutation_selector_commitments,
            g2_lines: prover.key.reference_string.g2_lines.clone(),
        },
    }
}

impl Verifier {
    /// Checks one proof against the expected public inputs. `Ok(false)`
    /// is a sound proof rejection; `Err` means the byte-string is not
    /// even a well-formed proof.
    pub fn verify_proof(&self, proof: &Proof, public_inputs: &[Fr]) -> Result<bool, Error> {
        let width = self.variant.program_width();
        let manifest = self.variant.create_manifest(public_inputs.len());
        let mut transcript = Transcript::from_proof(manifest, &proof.proof_data)?;

        // The proof must talk about this circuit and these inputs.
        let mut declared_n = [0u8; 4];
        declared_n.copy_from_slice(transcript.get_element("circuit_size"));
        if u32::from_le_bytes(declared_n) as usize != self.n {
            return Ok(false);
        }
        let mut expected_pi = Vec::new();
        for value in public_inputs {
            expected_pi.extend_from_slice(&write_fr(value));
        }
        if transcript.get_element("public_inputs") != expected_pi.as_slice() {
            return Ok(false);
        }

        // Every group element is deserialized (and curve-checked) before
        // any challenge that depends on it is used.
        let mut wire_commitments = Vec::with_capacity(width);
        for k in 1..=width {
            wire_commitments.push(transcript.get_g1_element(&format!("W_{}", k))?);
        }
        let z_commitment = transcript.get_g1_element("Z")?;
        let mut quotient_commitments = Vec::new();
        for k in 1..=self.variant.num_quotient_chunks() {
            quotient_commitments.push(transcript.get_g1_element(&format!("T_{}", k))?);
        }
        let pi_z = transcript.get_g1_element("PI_Z")?;
        let pi_z_omega = transcript.get_g1_element("PI_Z_OMEGA")?;

        transcript.apply_fiat_shamir("init");
        transcript.apply_fiat_shamir("beta");
        transcript.apply_fiat_shamir("gamma");
        transcript.apply_fiat_shamir("alpha");
        transcript.apply_fiat_shamir("z");

        let alpha = transcript.get_challenge_fr("alpha");
        let beta = transcript.get_challenge_fr("beta");
        let gamma = transcript.get_challenge_fr("gamma");
        let z_challenge = transcript.get_challenge_fr("z");

        let domain = algebra::EvaluationDomain::new(self.n)
            .ok_or(Error::InvalidDomainSize(self.n))?;
        let lagrange_evals = domain.get_lagrange_evaluations(&z_challenge);

        let wire_evals: Vec<Fr> = (1..=width)
            .map(|k| transcript.get_field_element(&format!("w_{}", k)))
            .collect();
        let z_omega_eval = transcript.get_field_element("z_omega");
        let r_eval = transcript.get_field_element("r");

        // t(z) Z_H*(z) = r(z) - alpha sigma-product (w_W + gamma) z_omega
        //   + alpha^3 (z_omega - 1) L_{n-1} - alpha^4 L_1 + widget residues.
        let mut t_eval = r_eval;
        let mut sigma_product = Fr::one();
        for k in 1..width {
            let sigma_eval = transcript.get_field_element(&format!("sigma_{}", k));
            sigma_product *= wire_evals[k - 1] + beta * sigma_eval + gamma;
        }
        t_eval -= alpha * sigma_product * (wire_evals[width - 1] + gamma) * z_omega_eval;
        t_eval += alpha.square() * alpha * (z_omega_eval - Fr::one()) * lagrange_evals.l_n_minus_1;
        t_eval -= alpha.square().square() * lagrange_evals.l_1;

        let widgets = self.variant.create_verifier_widgets();
        let mut alpha_base = alpha.pow_small(5);
        for widget in &widgets {
            alpha_base =
                widget.compute_quotient_evaluation_contribution(alpha_base, &transcript, &mut t_eval);
        }

        let vanishing_inverse = match lagrange_evals.vanishing_poly.inverse() {
            Some(inv) => inv,
            // z landed on the domain; astronomically unlikely for an
            // honest transcript, and unverifiable either way.
            None => return Ok(false),
        };
        t_eval *= vanishing_inverse;

        transcript.add_element("t", write_fr(&t_eval));
        transcript.apply_fiat_shamir("nu");
        transcript.apply_fiat_shamir("separator");

        let nu = transcript.get_challenge_fr("nu");
        let u = transcript.get_challenge_fr("separator");

        let shifted_wires = self.variant.shifted_wires();
        let num_slots = 2 * width + 2;
        let mut nu_powers = Vec::with_capacity(num_slots);
        nu_powers.push(Fr::one());
        for i in 1..num_slots {
            let prev = nu_powers[i - 1];
            nu_powers.push(prev * nu);
        }

        // Batched evaluation: the same nu schedule the prover folded its
        // opening polynomial with, shifted-point terms scaled by u.
        let mut batch_eval = t_eval + nu_powers[1] * r_eval;
        for (k, w_eval) in wire_evals.iter().enumerate() {
            batch_eval += nu_powers[2 + k] * w_eval;
        }
        for k in 1..width {
            let sigma_eval = transcript.get_field_element(&format!("sigma_{}", k));
            batch_eval += nu_powers[2 + width + k - 1] * sigma_eval;
        }
        batch_eval += u * nu_powers[2 * width + 1] * z_omega_eval;
        let mut nu_base = nu_powers[2 * width + 1] * nu;
        for k in shifted_wires.iter() {
            let shifted_eval = transcript.get_field_element(&format!("w_{}_omega", k + 1));
            batch_eval += u * nu_base * shifted_eval;
            nu_base *= nu;
        }

        // Batched commitment: quotient chunks, linearisation combination,
        // wires, opened sigmas, and the widget selectors.
        let mut points: Vec<G1Affine> = Vec::new();
        let mut scalars: Vec<Fr> = Vec::new();

        let z_pow_n = z_challenge.pow_small(self.n as u64);
        let mut chunk_scale = Fr::one();
        for commitment in &quotient_commitments {
            if !commitment.is_zero() {
                points.push(*commitment);
                scalars.push(chunk_scale);
            }
            chunk_scale *= z_pow_n;
        }

        let linear_terms = compute_linear_terms(&transcript, lagrange_evals.l_1, width);
        if !z_commitment.is_zero() {
            points.push(z_commitment);
            scalars.push(nu_powers[1] * linear_terms.z_1 + u * nu_powers[2 * width + 1]);
        }
        let sigma_last = self
            .key
            .permutation_selector_commitments
            .get(&format!("sigma_{}", width))
            .expect("verification key is missing the last sigma commitment");
        if !sigma_last.is_zero() {
            points.push(*sigma_last);
            scalars.push(nu_powers[1] * linear_terms.sigma_last);
        }

        for (k, commitment) in wire_commitments.iter().enumerate() {
            if commitment.is_zero() {
                continue;
            }
            let mut scalar = nu_powers[2 + k];
            if let Some(pos) = shifted_wires.iter().position(|&c| c == k) {
                let mut shift_nu = nu_powers[2 * width + 1] * nu;
                for _ in 0..pos {
                    shift_nu *= nu;
                }
                scalar += u * shift_nu;
            }
            points.push(*commitment);
            scalars.push(scalar);
        }

        for k in 1..width {
            let commitment = self
                .key
                .permutation_selector_commitments
                .get(&format!("sigma_{}", k))
                .expect("verification key is missing a sigma commitment");
            if !commitment.is_zero() {
                points.push(*commitment);
                scalars.push(nu_powers[2 + width + k - 1]);
            }
        }

        let mut challenge = ChallengeCoefficients {
            alpha_base: alpha.pow_small(5),
            alpha_step: alpha,
            nu_base,
            nu_step: nu,
            linear_nu: nu_powers[1],
        };
        let mut widget_nu_base = challenge.nu_base;
        for widget in &widgets {
            widget_nu_base = widget.compute_batch_evaluation_contribution(
                &self.key,
                &mut batch_eval,
                widget_nu_base,
                &transcript,
            );
            challenge = widget.append_scalar_multiplication_inputs(
                &self.key,
                challenge,
                &transcript,
                &mut points,
                &mut scalars,
            );
        }

        // F - E, then the two Kate quotients fold in with the separator.
        let mut rhs = G1Projective::zero();
        for (point, scalar) in points.iter().zip(scalars.iter()) {
            rhs.add_assign(&point.mul(scalar.into_repr()));
        }
        rhs.add_assign(
            &G1Affine::prime_subgroup_generator().mul((-batch_eval).into_repr()),
        );
        rhs.add_assign(&pi_z.mul(z_challenge.into_repr()));
        let shifted_point = z_challenge * domain.root * u;
        rhs.add_assign(&pi_z_omega.mul(shifted_point.into_repr()));

        let mut lhs = pi_z.into_projective();
        lhs.add_assign(&pi_z_omega.mul(u.into_repr()));

        // e(W_z + u W_zw, [x]_2) * e(-(z W_z + u z w W_zw + F - E), [1]_2)
        let pairing_points = [lhs.into_affine(), (-rhs).into_affine()];
        let lines = [self.key.g2_lines[1].clone(), self.key.g2_lines[0].clone()];
        let result = reduced_ate_pairing_batch_precomputed(&pairing_points, &lines);

        Ok(result.is_one())
    }
}
