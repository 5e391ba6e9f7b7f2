//! The width-3 arithmetic gate `q_m w_1 w_2 + q_l w_1 + q_r w_2 + q_o w_3
//! + q_c = 0`, and its extended form with an output-shift selector
//! `q_oo * w_3(X w)`.

use crate::proving_key::{ProverState, ProvingKey};
use crate::transcript::Transcript;
use crate::verifier::VerificationKey;
use crate::widgets::{ChallengeCoefficients, ProverWidget, VerifierWidget, WidgetDependencies};
use algebra::{Fr, G1Affine};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub struct ArithmeticWidget;

impl ProverWidget for ArithmeticWidget {
    fn compute_quotient_contribution(
        &self,
        key: &ProvingKey,
        state: &mut ProverState,
        alpha_base: Fr,
        transcript: &Transcript,
    ) -> Fr {
        let alpha = transcript.get_challenge_fr("alpha");
        let w_1 = state.wire_ffts["w_1_fft"].coefficients();
        let w_2 = state.wire_ffts["w_2_fft"].coefficients();
        let w_3 = state.wire_ffts["w_3_fft"].coefficients();

        let q_m = key.constraint_selector_fft("q_m_fft").coefficients();
        let q_l = key.constraint_selector_fft("q_l_fft").coefficients();
        let q_r = key.constraint_selector_fft("q_r_fft").coefficients();
        let q_o = key.constraint_selector_fft("q_o_fft").coefficients();
        let q_c = key.constraint_selector_fft("q_c_fft").coefficients();

        let n4 = key.large_domain.size;
        let work = |(i, out): (usize, &mut Fr)| {
            let mut t = w_1[i]
                .mul_with_coarse_reduction(&q_m[i])
                .mul_with_coarse_reduction(&w_2[i]);
            t = t.add_with_coarse_reduction(&w_1[i].mul_with_coarse_reduction(&q_l[i]));
            t = t.add_with_coarse_reduction(&w_2[i].mul_with_coarse_reduction(&q_r[i]));
            t = t.add_with_coarse_reduction(&w_3[i].mul_with_coarse_reduction(&q_o[i]));
            t = t.add_with_coarse_reduction(&q_c[i]);
            t = t.mul_with_coarse_reduction(&alpha_base);
            *out = (*out).add_with_coarse_reduction(&t).reduce_once();
        };

        #[cfg(feature = "parallel")]
        state.quotient_large.coefficients_mut()[..n4]
            .par_iter_mut()
            .enumerate()
            .for_each(work);
        #[cfg(not(feature = "parallel"))]
        state.quotient_large.coefficients_mut()[..n4]
            .iter_mut()
            .enumerate()
            .for_each(work);

        alpha_base * alpha
    }

    fn compute_linear_contribution(
        &self,
        key: &ProvingKey,
        state: &mut ProverState,
        alpha_base: Fr,
        transcript: &Transcript,
    ) -> Fr {
        let alpha = transcript.get_challenge_fr("alpha");
        let w_1_eval = transcript.get_field_element("w_1");
        let w_2_eval = transcript.get_field_element("w_2");
        let w_3_eval = transcript.get_field_element("w_3");
        let w_lr = w_1_eval * w_2_eval;

        let q_m = key.constraint_selector("q_m");
        let q_l = key.constraint_selector("q_l");
        let q_r = key.constraint_selector("q_r");
        let q_o = key.constraint_selector("q_o");
        let q_c = key.constraint_selector("q_c");

        let r = &mut state.linear_poly;
        for i in 0..key.n {
            let t = w_lr * q_m[i]
                + w_1_eval * q_l[i]
                + w_2_eval * q_r[i]
                + w_3_eval * q_o[i]
                + q_c[i];
            r[i] += t * alpha_base;
        }

        alpha_base * alpha
    }

    fn compute_opening_poly_contribution(
        &self,
        _key: &ProvingKey,
        _state: &mut ProverState,
        nu_base: Fr,
        _transcript: &Transcript,
    ) -> Fr {
        nu_base
    }
}

pub struct VerifierArithmeticWidget;

impl VerifierWidget for VerifierArithmeticWidget {
    fn compute_quotient_evaluation_contribution(
        &self,
        alpha_base: Fr,
        transcript: &Transcript,
        _t_eval: &mut Fr,
    ) -> Fr {
        // Fully linearised: every term rides on a selector commitment.
        alpha_base * transcript.get_challenge_fr("alpha")
    }

    fn compute_batch_evaluation_contribution(
        &self,
        _key: &VerificationKey,
        _batch_eval: &mut Fr,
        nu_base: Fr,
        _transcript: &Transcript,
    ) -> Fr {
        nu_base
    }

    fn append_scalar_multiplication_inputs(
        &self,
        key: &VerificationKey,
        challenge: ChallengeCoefficients,
        transcript: &Transcript,
        points: &mut Vec<G1Affine>,
        scalars: &mut Vec<Fr>,
    ) -> ChallengeCoefficients {
        let w_1_eval = transcript.get_field_element("w_1");
        let w_2_eval = transcript.get_field_element("w_2");
        let w_3_eval = transcript.get_field_element("w_3");

        let scale = challenge.alpha_base * challenge.linear_nu;
        push_selector(key, "q_m", w_1_eval * w_2_eval * scale, points, scalars);
        push_selector(key, "q_l", w_1_eval * scale, points, scalars);
        push_selector(key, "q_r", w_2_eval * scale, points, scalars);
        push_selector(key, "q_o", w_3_eval * scale, points, scalars);
        push_selector(key, "q_c", scale, points, scalars);

        ChallengeCoefficients {
            alpha_base: challenge.alpha_base * challenge.alpha_step,
            ..challenge
        }
    }
}

/// The extended arithmetisation folds a "next output" term into the gate:
/// `q_m w_1 w_2 + q_l w_1 + q_r w_2 + q_o w_3 + q_oo w_3(X w) + q_c = 0`.
pub struct ExtendedArithmeticWidget;

impl ProverWidget for ExtendedArithmeticWidget {
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
        let new_alpha_base =
            ArithmeticWidget.compute_quotient_contribution(key, state, alpha_base, transcript);

        let (wire_ffts, quotient) = (&state.wire_ffts, &mut state.quotient_large);
        let w_3 = wire_ffts["w_3_fft"].coefficients();
        let q_oo = key.constraint_selector_fft("q_oo_fft").coefficients();

        let n4 = key.large_domain.size;
        for i in 0..n4 {
            // w_3(X w) lives four coset steps ahead.
            let t = w_3[i + 4]
                .mul_with_coarse_reduction(&q_oo[i])
                .mul_with_coarse_reduction(&alpha_base);
            quotient[i] = quotient[i].add_with_coarse_reduction(&t).reduce_once();
        }

        new_alpha_base
    }

    fn compute_linear_contribution(
        &self,
        key: &ProvingKey,
        state: &mut ProverState,
        alpha_base: Fr,
        transcript: &Transcript,
    ) -> Fr {
        let new_alpha_base =
            ArithmeticWidget.compute_linear_contribution(key, state, alpha_base, transcript);

        let w_3_omega_eval = transcript.get_field_element("w_3_omega");
        let q_oo = key.constraint_selector("q_oo");
        let r = &mut state.linear_poly;
        for i in 0..key.n {
            r[i] += w_3_omega_eval * q_oo[i] * alpha_base;
        }

        new_alpha_base
    }

    fn compute_opening_poly_contribution(
        &self,
        _key: &ProvingKey,
        _state: &mut ProverState,
        nu_base: Fr,
        _transcript: &Transcript,
    ) -> Fr {
        nu_base
    }
}

pub struct VerifierExtendedArithmeticWidget;

impl VerifierWidget for VerifierExtendedArithmeticWidget {
    fn dependencies(&self) -> WidgetDependencies {
        WidgetDependencies::shifted_wire(2)
    }

    fn compute_quotient_evaluation_contribution(
        &self,
        alpha_base: Fr,
        transcript: &Transcript,
        _t_eval: &mut Fr,
    ) -> Fr {
        alpha_base * transcript.get_challenge_fr("alpha")
    }

    fn compute_batch_evaluation_contribution(
        &self,
        _key: &VerificationKey,
        _batch_eval: &mut Fr,
        nu_base: Fr,
        _transcript: &Transcript,
    ) -> Fr {
        nu_base
    }

    fn append_scalar_multiplication_inputs(
        &self,
        key: &VerificationKey,
        challenge: ChallengeCoefficients,
        transcript: &Transcript,
        points: &mut Vec<G1Affine>,
        scalars: &mut Vec<Fr>,
    ) -> ChallengeCoefficients {
        let next = VerifierArithmeticWidget.append_scalar_multiplication_inputs(
            key, challenge, transcript, points, scalars,
        );

        let w_3_omega_eval = transcript.get_field_element("w_3_omega");
        let scale = challenge.alpha_base * challenge.linear_nu;
        push_selector(key, "q_oo", w_3_omega_eval * scale, points, scalars);

        next
    }
}

pub(crate) fn push_selector(
    key: &VerificationKey,
    name: &str,
    scalar: Fr,
    points: &mut Vec<G1Affine>,
    scalars: &mut Vec<Fr>,
) {
    use algebra::AffineCurve;
    let commitment = key.constraint_selector_commitment(name);
    // All-zero selector polynomials commit to the identity; skip them.
    if !commitment.is_zero() {
        points.push(*commitment);
        scalars.push(scalar);
    }
}
