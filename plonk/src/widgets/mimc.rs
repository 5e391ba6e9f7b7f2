//! The MiMC gate: one x^7 round per gate pair. With
//! `T = w_1 + w_2 + q_mimc_coefficient` (input plus key plus round
//! constant), the gate enforces `w_3 = T^3` and `w_3(X w) = w_3^2 * T`,
//! both switched by `q_mimc_selector`.

use crate::proving_key::{ProverState, ProvingKey};
use crate::transcript::{write_fr, Transcript};
use crate::verifier::VerificationKey;
use crate::widgets::arithmetic::push_selector;
use crate::widgets::{ChallengeCoefficients, ProverWidget, VerifierWidget, WidgetDependencies};
use algebra::{Field, Fr, G1Affine};

pub struct MimcWidget;

impl ProverWidget for MimcWidget {
    fn dependencies(&self) -> WidgetDependencies {
        WidgetDependencies::shifted_wire(2)
    }

    fn compute_quotient_contribution(
        &self,
        key: &ProvingKey,
        state: &mut ProverState,
        alpha_base: Fr,
        transcript: &Transcript,
    ) -> Fr {
        let alpha = transcript.get_challenge_fr("alpha");
        let alpha_a = alpha_base;
        let alpha_b = alpha_a * alpha;

        let (wire_ffts, quotient) = (&state.wire_ffts, &mut state.quotient_large);
        let w_1 = wire_ffts["w_1_fft"].coefficients();
        let w_2 = wire_ffts["w_2_fft"].coefficients();
        let w_3 = wire_ffts["w_3_fft"].coefficients();

        let q_coeff = key
            .constraint_selector_fft("q_mimc_coefficient_fft")
            .coefficients();
        let q_sel = key
            .constraint_selector_fft("q_mimc_selector_fft")
            .coefficients();

        let n4 = key.large_domain.size;
        for i in 0..n4 {
            let t = w_1[i]
                .add_with_coarse_reduction(&w_2[i])
                .add_with_coarse_reduction(&q_coeff[i]);

            // T^3 - w_3
            let cube = t
                .sqr_with_coarse_reduction()
                .mul_with_coarse_reduction(&t);
            let cube_identity = cube
                .sub_with_coarse_reduction(&w_3[i])
                .mul_with_coarse_reduction(&alpha_a);

            // w_3^2 T - w_3(X w)
            let out_identity = w_3[i]
                .sqr_with_coarse_reduction()
                .mul_with_coarse_reduction(&t)
                .sub_with_coarse_reduction(&w_3[i + 4])
                .mul_with_coarse_reduction(&alpha_b);

            let contribution = cube_identity
                .add_with_coarse_reduction(&out_identity)
                .mul_with_coarse_reduction(&q_sel[i]);
            quotient[i] = quotient[i].add_with_coarse_reduction(&contribution).reduce_once();
        }

        alpha_base * alpha.square()
    }

    fn compute_linear_contribution(
        &self,
        key: &ProvingKey,
        state: &mut ProverState,
        alpha_base: Fr,
        transcript: &Transcript,
    ) -> Fr {
        let alpha = transcript.get_challenge_fr("alpha");
        let alpha_a = alpha_base;
        let alpha_b = alpha_a * alpha;

        let w_1_eval = transcript.get_field_element("w_1");
        let w_2_eval = transcript.get_field_element("w_2");
        let w_3_eval = transcript.get_field_element("w_3");
        let w_3_omega_eval = transcript.get_field_element("w_3_omega");
        let q_coeff_eval = transcript.get_field_element("q_mimc_coefficient");

        let t = w_1_eval + w_2_eval + q_coeff_eval;
        let cube_identity = (t.square() * t - w_3_eval) * alpha_a;
        let out_identity = (w_3_eval.square() * t - w_3_omega_eval) * alpha_b;
        let multiplicand = cube_identity + out_identity;

        let q_sel = key.constraint_selector("q_mimc_selector");
        let r = &mut state.linear_poly;
        for i in 0..key.n {
            r[i] += multiplicand * q_sel[i];
        }

        alpha_base * alpha.square()
    }

    fn compute_opening_poly_contribution(
        &self,
        key: &ProvingKey,
        state: &mut ProverState,
        nu_base: Fr,
        transcript: &Transcript,
    ) -> Fr {
        let nu = transcript.get_challenge_fr("nu");
        let q_coeff = key.constraint_selector("q_mimc_coefficient");
        let poly = &mut state.opening_poly;
        for i in 0..key.n {
            poly[i] += q_coeff[i] * nu_base;
        }
        nu_base * nu
    }

    fn compute_transcript_elements(&self, key: &ProvingKey, transcript: &mut Transcript) {
        let z = transcript.get_challenge_fr("z");
        let eval = key
            .constraint_selector("q_mimc_coefficient")
            .evaluate(&z, key.n);
        transcript.add_element("q_mimc_coefficient", write_fr(&eval));
    }
}

pub struct VerifierMimcWidget;

impl VerifierWidget for VerifierMimcWidget {
    fn dependencies(&self) -> WidgetDependencies {
        WidgetDependencies::shifted_wire(2)
    }

    fn compute_quotient_evaluation_contribution(
        &self,
        alpha_base: Fr,
        transcript: &Transcript,
        _t_eval: &mut Fr,
    ) -> Fr {
        // Both identities ride on the q_mimc_selector commitment.
        alpha_base * transcript.get_challenge_fr("alpha").square()
    }

    fn compute_batch_evaluation_contribution(
        &self,
        _key: &VerificationKey,
        batch_eval: &mut Fr,
        nu_base: Fr,
        transcript: &Transcript,
    ) -> Fr {
        let nu = transcript.get_challenge_fr("nu");
        let q_coeff_eval = transcript.get_field_element("q_mimc_coefficient");
        *batch_eval += nu_base * q_coeff_eval;
        nu_base * nu
    }

    fn append_scalar_multiplication_inputs(
        &self,
        key: &VerificationKey,
        challenge: ChallengeCoefficients,
        transcript: &Transcript,
        points: &mut Vec<G1Affine>,
        scalars: &mut Vec<Fr>,
    ) -> ChallengeCoefficients {
        let alpha = challenge.alpha_step;
        let alpha_a = challenge.alpha_base;
        let alpha_b = alpha_a * alpha;

        let w_1_eval = transcript.get_field_element("w_1");
        let w_2_eval = transcript.get_field_element("w_2");
        let w_3_eval = transcript.get_field_element("w_3");
        let w_3_omega_eval = transcript.get_field_element("w_3_omega");
        let q_coeff_eval = transcript.get_field_element("q_mimc_coefficient");

        let t = w_1_eval + w_2_eval + q_coeff_eval;
        let cube_identity = (t.square() * t - w_3_eval) * alpha_a;
        let out_identity = (w_3_eval.square() * t - w_3_omega_eval) * alpha_b;
        let multiplicand = (cube_identity + out_identity) * challenge.linear_nu;

        push_selector(key, "q_mimc_selector", multiplicand, points, scalars);
        push_selector(key, "q_mimc_coefficient", challenge.nu_base, points, scalars);

        ChallengeCoefficients {
            alpha_base: challenge.alpha_base * challenge.alpha_step.square(),
            nu_base: challenge.nu_base * challenge.nu_step,
            ..challenge
        }
    }
}
