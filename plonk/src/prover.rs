//! The five-round PLONK prover. Each round ends with a Fiat-Shamir
//! squeeze; the proof is the serialized transcript.

use crate::linearizer::compute_linear_terms;
use crate::program_settings::PlonkVariant;
use crate::proving_key::{ProverState, ProvingKey, Witness, BLINDING_COEFFICIENTS};
use crate::transcript::{write_fr, write_g1, Transcript};
use crate::widgets::ProverWidget;
use algebra::fields::batch_inversion;
use algebra::msm::{pippenger_unsafe, MsmContext};
use algebra::{Field, Fr, G1Affine, ProjectiveCurve, UniformRand};
use num_traits::{One, Zero};
use rand::Rng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A serialized proof: the non-derived transcript elements in manifest
/// order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proof {
    pub proof_data: Vec<u8>,
}

pub struct Prover {
    pub n: usize,
    pub variant: PlonkVariant,
    pub key: ProvingKey,
    pub state: ProverState,
    pub transcript: Transcript,
    widgets: Vec<Box<dyn ProverWidget>>,
    msm_context: MsmContext,
}

impl Prover {
    /// Builds a prover for one proof. The manifest is derived from the
    /// variant and must agree with the widget set; a mismatch is a
    /// construction bug and asserts in debug builds.
    pub fn new(key: ProvingKey, witness: Witness, variant: PlonkVariant) -> Self {
        let n = key.n;
        let manifest = variant.create_manifest(witness.public_inputs.len());

        for selector in variant.required_selectors() {
            assert!(
                key.constraint_selectors.contains_key(*selector),
                "proving key is missing selector {}",
                selector
            );
        }
        for k in variant.shifted_wires() {
            debug_assert!(
                manifest.includes_element(&format!("w_{}_omega", k + 1)),
                "manifest does not declare the shifted opening w_{}_omega",
                k + 1
            );
        }
        for name in variant.opened_selectors() {
            debug_assert!(
                manifest.includes_element(name),
                "manifest does not declare the selector opening {}",
                name
            );
        }

        let state = ProverState::new(n, witness, variant.program_width());
        let widgets = variant.create_prover_widgets();
        let msm_context = MsmContext::new(n + BLINDING_COEFFICIENTS);

        Prover {
            n,
            variant,
            key,
            state,
            transcript: Transcript::new(manifest),
            widgets,
            msm_context,
        }
    }

    fn commit(&mut self, coefficients: &[Fr], num_points: usize) -> G1Affine {
        pippenger_unsafe(
            &mut self.msm_context,
            &coefficients[..num_points],
            &self.key.reference_string.monomials,
            num_points,
        )
        .into_affine()
    }

    fn wire_names(&self) -> Vec<String> {
        (1..=self.variant.program_width())
            .map(|k| format!("w_{}", k))
            .collect()
    }

    fn execute_preamble_round(&mut self) {
        let n = self.n as u32;
        self.transcript
            .add_element("circuit_size", n.to_le_bytes().to_vec());
        self.transcript.apply_fiat_shamir("init");
    }

    /// Round 1: move the wires to coefficient form (keeping their
    /// subgroup evaluations in the fft scratch for the grand product) and
    /// commit to each.
    fn execute_first_round(&mut self) {
        let round = start_timer!(|| "wire commitments");
        let n = self.n;

        let mut public_input_bytes = Vec::new();
        for value in &self.state.public_inputs {
            public_input_bytes.extend_from_slice(&write_fr(value));
        }
        self.transcript
            .add_element("public_inputs", public_input_bytes);

        for name in self.wire_names() {
            let fft_name = format!("{}_fft", name);
            {
                let wire = &self.state.wires[&name];
                let values: Vec<Fr> = wire.coefficients()[..n].to_vec();
                let scratch = self.state.wire_ffts.get_mut(&fft_name).unwrap();
                scratch.coefficients_mut()[..n].copy_from_slice(&values);
            }
            let wire = self.state.wires.get_mut(&name).unwrap();
            wire.ifft(&self.key.small_domain);
        }

        for (k, name) in self.wire_names().iter().enumerate() {
            let coefficients: Vec<Fr> = self.state.wires[name].coefficients()[..n].to_vec();
            let commitment = self.commit(&coefficients, n);
            self.transcript
                .add_element(&format!("W_{}", k + 1), write_g1(&commitment));
        }

        self.transcript.apply_fiat_shamir("beta");
        self.transcript.apply_fiat_shamir("gamma");
        end_timer!(round);
    }

    /// Round 2: build the permutation grand product
    /// `z(w^{i+1}) = prod_{j<=i} num_j / den_j`, blind it, commit.
    fn execute_second_round<R: Rng>(&mut self, rng: &mut R) {
        let round = start_timer!(|| "grand product");
        let n = self.n;
        let width = self.variant.program_width();

        let beta = self.transcript.get_challenge_fr("beta");
        let gamma = self.transcript.get_challenge_fr("gamma");
        let kappa = crate::permutation::coset_generators();

        // Per-gate numerator and denominator factors, combined across the
        // wire columns.
        let mut numerators = vec![Fr::one(); n];
        let mut denominators = vec![Fr::one(); n];
        for k in 0..width {
            let wire_values = &self.state.wire_ffts[&format!("w_{}_fft", k + 1)];
            let sigma_values =
                &self.key.permutation_selectors_lagrange_base[&format!("sigma_{}", k + 1)];
            let beta_kappa = beta * kappa[k];

            let mut work_root = Fr::one();
            for i in 0..n {
                numerators[i] = numerators[i].mul_with_coarse_reduction(
                    &(wire_values[i]
                        .add_with_coarse_reduction(&(beta_kappa * work_root))
                        .add_with_coarse_reduction(&gamma)),
                );
                denominators[i] = denominators[i].mul_with_coarse_reduction(
                    &(wire_values[i]
                        .add_with_coarse_reduction(&(sigma_values[i] * beta))
                        .add_with_coarse_reduction(&gamma)),
                );
                work_root *= self.key.small_domain.root;
            }
        }

        // Running products, one shared inversion for the denominators.
        for i in 1..n {
            let prev = numerators[i - 1];
            numerators[i] = numerators[i].mul_with_coarse_reduction(&prev);
            let prev = denominators[i - 1];
            denominators[i] = denominators[i].mul_with_coarse_reduction(&prev);
        }
        for d in denominators.iter_mut() {
            *d = d.reduce_once();
        }
        batch_inversion(&mut denominators);

        let z = &mut self.state.z;
        z[0] = Fr::one();
        for i in 1..n {
            z[i] = (numerators[i - 1].reduce_once()) * denominators[i - 1];
        }
        self.key.small_domain.ifft(z.coefficients_mut());

        // Two blinding coefficients on (X^n - 1) keep repeated proofs of
        // the same witness distinct without disturbing the subgroup
        // values.
        let b_1 = Fr::rand(rng);
        let b_2 = Fr::rand(rng);
        z[0] -= b_1;
        z[1] -= b_2;
        z[n] += b_1;
        z[n + 1] += b_2;

        let coefficients: Vec<Fr> =
            self.state.z.coefficients()[..n + BLINDING_COEFFICIENTS].to_vec();
        let commitment = self.commit(&coefficients, n + BLINDING_COEFFICIENTS);
        self.transcript.add_element("Z", write_g1(&commitment));
        self.transcript.apply_fiat_shamir("alpha");
        end_timer!(round);
    }

    /// Round 3: evaluate the full gate-and-copy identity over the 4n
    /// coset, divide by the pseudo-vanishing polynomial and commit the
    /// quotient chunks.
    fn execute_third_round(&mut self) {
        let round = start_timer!(|| "quotient polynomial");
        let n = self.n;
        let alpha = self.transcript.get_challenge_fr("alpha");

        for name in self.wire_names() {
            let fft_name = format!("{}_fft", name);
            let values: Vec<Fr> = self.state.wires[&name].coefficients()[..n].to_vec();
            let scratch = self.state.wire_ffts.get_mut(&fft_name).unwrap();
            scratch.truncate(4 * n);
            scratch.coefficients_mut().iter_mut().for_each(|c| *c = Fr::zero());
            scratch.coefficients_mut()[..n].copy_from_slice(&values);
            scratch.coset_fft(&self.key.large_domain);
            for i in 0..4 {
                let wrap = scratch[i];
                scratch.add_lagrange_base_coefficient(wrap);
            }
        }

        {
            let z_values: Vec<Fr> =
                self.state.z.coefficients()[..n + BLINDING_COEFFICIENTS].to_vec();
            let z_fft = &mut self.state.z_fft;
            z_fft.truncate(4 * n);
            z_fft.coefficients_mut().iter_mut().for_each(|c| *c = Fr::zero());
            z_fft.coefficients_mut()[..z_values.len()].copy_from_slice(&z_values);
            // Scaling Z by alpha here makes every permutation term below
            // come out pre-multiplied by its alpha power.
            z_fft.coset_fft_with_constant(&self.key.large_domain, alpha);
            for i in 0..4 {
                let wrap = z_fft[i];
                z_fft.add_lagrange_base_coefficient(wrap);
            }
        }

        self.compute_permutation_grand_product_contribution();

        let mut alpha_base = alpha.pow_small(5);
        for widget in &self.widgets {
            alpha_base = widget.compute_quotient_contribution(
                &self.key,
                &mut self.state,
                alpha_base,
                &self.transcript,
            );
        }

        self.key.large_domain.divide_by_pseudo_vanishing_polynomial(
            self.state.quotient_large.coefficients_mut(),
            &self.key.small_domain,
        );
        self.state.quotient_large.coset_ifft(&self.key.large_domain);

        for chunk in 0..self.variant.num_quotient_chunks() {
            let coefficients: Vec<Fr> =
                self.state.quotient_large.coefficients()[chunk * n..(chunk + 1) * n].to_vec();
            let commitment = self.commit(&coefficients, n);
            self.transcript
                .add_element(&format!("T_{}", chunk + 1), write_g1(&commitment));
        }

        self.transcript.apply_fiat_shamir("z");
        end_timer!(round);
    }

    /// The copy-constraint share of the quotient:
    /// `alpha (num Z - den Z(Xw)) + alpha^3 (Z(Xw) - 1) L_{n-1}
    ///  + alpha^4 (Z - 1) L_1`, with `z_fft` already scaled by alpha.
    fn compute_permutation_grand_product_contribution(&mut self) {
        let n = self.n;
        let width = self.variant.program_width();
        let alpha = self.transcript.get_challenge_fr("alpha");
        let alpha_squared = alpha.square();
        let alpha_cubed = alpha_squared * alpha;
        let beta = self.transcript.get_challenge_fr("beta");
        let gamma = self.transcript.get_challenge_fr("gamma");
        let kappa = crate::permutation::coset_generators();

        let large_root = self.key.large_domain.root;
        let coset_shift = self.key.large_domain.generator;

        let key = &self.key;
        let state = &mut self.state;
        let (wire_fft_map, z_fft_poly, quotient) =
            (&state.wire_ffts, &state.z_fft, &mut state.quotient_large);

        let wire_ffts: Vec<&[Fr]> = (1..=width)
            .map(|k| wire_fft_map[&format!("w_{}_fft", k)].coefficients())
            .collect();
        let sigma_ffts: Vec<&[Fr]> = (1..=width)
            .map(|k| key.permutation_selector_ffts[&format!("sigma_{}_fft", k)].coefficients())
            .collect();
        let z_fft = z_fft_poly.coefficients();
        let l_1 = key.lagrange_1.coefficients();
        let work = |(chunk_index, chunk): (usize, &mut [Fr])| {
            let chunk_size = chunk.len();
            let start = chunk_index * chunk_size;
            let mut work_root =
                beta * coset_shift * large_root.pow_small(start as u64);

            for (offset, out) in chunk.iter_mut().enumerate() {
                let i = start + offset;

                let mut numerator = z_fft[i];
                let mut denominator = z_fft[i + 4];
                for k in 0..width {
                    let w_plus_gamma = wire_ffts[k][i].add_with_coarse_reduction(&gamma);
                    numerator = numerator.mul_with_coarse_reduction(
                        &w_plus_gamma.add_with_coarse_reduction(&(work_root * kappa[k])),
                    );
                    denominator = denominator.mul_with_coarse_reduction(
                        &w_plus_gamma
                            .add_with_coarse_reduction(&(sigma_ffts[k][i] * beta)),
                    );
                }

                // z_fft carries alpha Z, so these land at alpha^3 / alpha^4.
                let bound_check = z_fft[i + 4]
                    .sub_with_coarse_reduction(&alpha)
                    .mul_with_coarse_reduction(&alpha_squared)
                    .mul_with_coarse_reduction(&l_1[i + 8]);
                let start_check = z_fft[i]
                    .sub_with_coarse_reduction(&alpha)
                    .mul_with_coarse_reduction(&alpha_cubed)
                    .mul_with_coarse_reduction(&l_1[i]);

                *out = numerator
                    .sub_with_coarse_reduction(&denominator)
                    .add_with_coarse_reduction(&bound_check)
                    .add_with_coarse_reduction(&start_check)
                    .reduce_once();

                work_root *= large_root;
            }
        };

        let chunk_size = core::cmp::max(1, 4 * n / algebra::fft::domain::num_threads());
        #[cfg(feature = "parallel")]
        quotient.coefficients_mut()[..4 * n]
            .par_chunks_mut(chunk_size)
            .enumerate()
            .for_each(work);
        #[cfg(not(feature = "parallel"))]
        quotient.coefficients_mut()[..4 * n]
            .chunks_mut(chunk_size)
            .enumerate()
            .for_each(work);
    }

    /// Round 4: open everything the verifier needs at `z` (and `z w`),
    /// build the linearisation polynomial, and absorb its evaluation plus
    /// the quotient's.
    fn execute_fourth_round(&mut self) {
        let round = start_timer!(|| "linearisation");
        let n = self.n;
        let width = self.variant.program_width();
        let z_challenge = self.transcript.get_challenge_fr("z");
        let shifted_z = z_challenge * self.key.small_domain.root;

        for (k, name) in self.wire_names().iter().enumerate() {
            let eval = self.state.wires[name].evaluate(&z_challenge, n);
            self.transcript
                .add_element(&format!("w_{}", k + 1), write_fr(&eval));
        }
        for k in self.variant.shifted_wires() {
            let eval = self.state.wires[&format!("w_{}", k + 1)].evaluate(&shifted_z, n);
            self.transcript
                .add_element(&format!("w_{}_omega", k + 1), write_fr(&eval));
        }
        for k in 1..width {
            let eval = self
                .key
                .permutation_selector(&format!("sigma_{}", k))
                .evaluate(&z_challenge, n);
            self.transcript
                .add_element(&format!("sigma_{}", k), write_fr(&eval));
        }
        let z_omega_eval = self
            .state
            .z
            .evaluate(&shifted_z, n + BLINDING_COEFFICIENTS);
        self.transcript.add_element("z_omega", write_fr(&z_omega_eval));

        for widget in &self.widgets {
            widget.compute_transcript_elements(&self.key, &mut self.transcript);
        }

        let lagrange_evals = self.key.small_domain.get_lagrange_evaluations(&z_challenge);
        let linear_terms = compute_linear_terms(&self.transcript, lagrange_evals.l_1, width);

        {
            let sigma_last = &self.key.permutation_selectors[&format!("sigma_{}", width)];
            let z = &self.state.z;
            let r = &mut self.state.linear_poly;
            for i in 0..n {
                r[i] = z[i] * linear_terms.z_1 + sigma_last[i] * linear_terms.sigma_last;
            }
            for i in n..n + BLINDING_COEFFICIENTS {
                r[i] = z[i] * linear_terms.z_1;
            }
        }

        let alpha = self.transcript.get_challenge_fr("alpha");
        let mut alpha_base = alpha.pow_small(5);
        for widget in &self.widgets {
            alpha_base = widget.compute_linear_contribution(
                &self.key,
                &mut self.state,
                alpha_base,
                &self.transcript,
            );
        }

        let r_eval = self
            .state
            .linear_poly
            .evaluate(&z_challenge, n + BLINDING_COEFFICIENTS);
        self.transcript.add_element("r", write_fr(&r_eval));

        let t_eval = self.state.quotient_large.evaluate(&z_challenge, 4 * n);
        self.transcript.add_element("t", write_fr(&t_eval));

        self.transcript.apply_fiat_shamir("nu");
        end_timer!(round);
    }

    /// Round 5: fold everything opened at `z` (and at `z w`) into two
    /// combined polynomials, divide each by its vanishing linear factor
    /// and commit the Kate quotients.
    fn execute_fifth_round(&mut self) {
        let round = start_timer!(|| "kate openings");
        let n = self.n;
        let width = self.variant.program_width();
        let nu = self.transcript.get_challenge_fr("nu");
        let z_challenge = self.transcript.get_challenge_fr("z");
        let shifted_z = z_challenge * self.key.small_domain.root;

        // nu powers: t-chunk fold at nu^0, r at nu^1, wires from nu^2,
        // sigmas after, then Z on the shifted polynomial.
        let num_slots = 2 * width + 2;
        let mut nu_powers = Vec::with_capacity(num_slots);
        nu_powers.push(Fr::one());
        for i in 1..num_slots {
            let prev = nu_powers[i - 1];
            nu_powers.push(prev * nu);
        }

        let z_pow_n = z_challenge.pow_small(n as u64);
        let mut chunk_scales = Vec::with_capacity(4);
        let mut acc = Fr::one();
        for _ in 0..self.variant.num_quotient_chunks() {
            chunk_scales.push(acc);
            acc *= z_pow_n;
        }

        {
            let key = &self.key;
            let state = &mut self.state;
            let (wire_map, quotient_poly, linear_poly, z_polynomial, opening, shifted) = (
                &state.wires,
                &state.quotient_large,
                &state.linear_poly,
                &state.z,
                &mut state.opening_poly,
                &mut state.shifted_opening_poly,
            );
            let quotient = quotient_poly.coefficients();
            let r = linear_poly.coefficients();
            let z_poly = z_polynomial.coefficients();
            let wires: Vec<&[Fr]> = (1..=width)
                .map(|k| wire_map[&format!("w_{}", k)].coefficients())
                .collect();
            let sigmas: Vec<&[Fr]> = (1..width)
                .map(|k| key.permutation_selectors[&format!("sigma_{}", k)].coefficients())
                .collect();
            for i in 0..n {
                let mut acc = quotient[i];
                for (chunk, scale) in chunk_scales.iter().enumerate().skip(1) {
                    acc += quotient[i + chunk * n] * scale;
                }
                acc += r[i] * nu_powers[1];
                for (k, wire) in wires.iter().enumerate() {
                    acc += wire[i] * nu_powers[2 + k];
                }
                for (k, sigma) in sigmas.iter().enumerate() {
                    acc += sigma[i] * nu_powers[2 + width + k];
                }
                opening[i] = acc;
                shifted[i] = z_poly[i] * nu_powers[2 * width + 1];
            }
            for i in n..n + BLINDING_COEFFICIENTS {
                opening[i] = r[i] * nu_powers[1];
                shifted[i] = z_poly[i] * nu_powers[2 * width + 1];
            }

            let mut nu_base = nu_powers[2 * width + 1] * nu;
            for k in self.variant.shifted_wires() {
                let wire = wires[k];
                for i in 0..n {
                    shifted[i] += wire[i] * nu_base;
                }
                nu_base *= nu;
            }
        }

        let mut nu_base = nu_powers[2 * width + 1] * nu;
        for _ in self.variant.shifted_wires() {
            nu_base *= nu;
        }
        for widget in &self.widgets {
            nu_base = widget.compute_opening_poly_contribution(
                &self.key,
                &mut self.state,
                nu_base,
                &self.transcript,
            );
        }

        self.state
            .opening_poly
            .compute_kate_opening_coefficients(&z_challenge, n + BLINDING_COEFFICIENTS);
        self.state
            .shifted_opening_poly
            .compute_kate_opening_coefficients(&shifted_z, n + BLINDING_COEFFICIENTS);

        let opening: Vec<Fr> =
            self.state.opening_poly.coefficients()[..n + BLINDING_COEFFICIENTS].to_vec();
        let pi_z = self.commit(&opening, n + BLINDING_COEFFICIENTS);
        let shifted: Vec<Fr> =
            self.state.shifted_opening_poly.coefficients()[..n + BLINDING_COEFFICIENTS].to_vec();
        let pi_z_omega = self.commit(&shifted, n + BLINDING_COEFFICIENTS);

        self.transcript.add_element("PI_Z", write_g1(&pi_z));
        self.transcript.add_element("PI_Z_OMEGA", write_g1(&pi_z_omega));
        self.transcript.apply_fiat_shamir("separator");
        end_timer!(round);
    }

    /// Runs all five rounds and serializes the transcript.
    pub fn construct_proof<R: Rng>(&mut self, rng: &mut R) -> Proof {
        let prover_time = start_timer!(|| "construct proof");
        self.execute_preamble_round();
        self.execute_first_round();
        self.execute_second_round(rng);
        self.execute_third_round();
        self.execute_fourth_round();
        self.execute_fifth_round();
        end_timer!(prover_time);

        Proof {
            proof_data: self.transcript.export_transcript(),
        }
    }
}
