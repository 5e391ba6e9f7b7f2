//! The width-4 turbo arithmetic gate:
//! `q_arith * (q_m w_1 w_2 + q_1 w_1 + q_2 w_2 + q_3 w_3 + q_4 w_4
//!  + q_5 w_4 (w_4 - 1)(w_4 - 2) alpha + q_c)`
//! plus the quad-extraction term active when `q_arith = 2`, which lifts
//! the high bit of a base-4 range accumulator pair into the gate.

use crate::proving_key::{ProverState, ProvingKey};
use crate::transcript::{write_fr, Transcript};
use crate::verifier::VerificationKey;
use crate::widgets::arithmetic::push_selector;
use crate::widgets::{ChallengeCoefficients, ProverWidget, VerifierWidget};
use algebra::{Field, Fr, G1Affine};

pub struct TurboArithmeticWidget;

fn minus_two() -> Fr {
    -Fr::from(2)
}

fn minus_seven() -> Fr {
    -Fr::from(7)
}

/// `(q_arith^2 - q_arith) * delta * (9 delta - 2 delta^2 - 7)` with
/// `delta = w_3 - 4 w_4`: zero when delta encodes a low quad bit, six
/// times the selector excess otherwise.
fn quad_extraction_term(q_arith: Fr, w_3: Fr, w_4: Fr) -> Fr {
    let t1 = q_arith.square() - q_arith;

    let mut delta = w_4.double();
    delta.double_in_place();
    delta = w_3 - delta;

    let two_delta_squared = delta.square().double();
    let three_delta = delta.double() + delta;
    let nine_delta = three_delta.double() + three_delta;

    let t4 = nine_delta - two_delta_squared + minus_seven();
    t1 * delta * t4
}

impl ProverWidget for TurboArithmeticWidget {
    fn compute_quotient_contribution(
        &self,
        key: &ProvingKey,
        state: &mut ProverState,
        alpha_base: Fr,
        transcript: &Transcript,
    ) -> Fr {
        let alpha = transcript.get_challenge_fr("alpha");

        let (wire_ffts, quotient) = (&state.wire_ffts, &mut state.quotient_large);
        let w_1 = wire_ffts["w_1_fft"].coefficients();
        let w_2 = wire_ffts["w_2_fft"].coefficients();
        let w_3 = wire_ffts["w_3_fft"].coefficients();
        let w_4 = wire_ffts["w_4_fft"].coefficients();

        let q_1 = key.constraint_selector_fft("q_1_fft").coefficients();
        let q_2 = key.constraint_selector_fft("q_2_fft").coefficients();
        let q_3 = key.constraint_selector_fft("q_3_fft").coefficients();
        let q_4 = key.constraint_selector_fft("q_4_fft").coefficients();
        let q_5 = key.constraint_selector_fft("q_5_fft").coefficients();
        let q_m = key.constraint_selector_fft("q_m_fft").coefficients();
        let q_c = key.constraint_selector_fft("q_c_fft").coefficients();
        let q_arith = key.constraint_selector_fft("q_arith_fft").coefficients();

        let neg_two = minus_two();
        let n4 = key.large_domain.size;
        for i in 0..n4 {
            let mut t0 = w_1[i]
                .mul_with_coarse_reduction(&q_m[i])
                .mul_with_coarse_reduction(&w_2[i]);
            t0 = t0.add_with_coarse_reduction(&w_1[i].mul_with_coarse_reduction(&q_1[i]));
            t0 = t0.add_with_coarse_reduction(&w_2[i].mul_with_coarse_reduction(&q_2[i]));
            t0 = t0.add_with_coarse_reduction(&w_3[i].mul_with_coarse_reduction(&q_3[i]));
            t0 = t0.add_with_coarse_reduction(&w_4[i].mul_with_coarse_reduction(&q_4[i]));

            // q_5 switches a w_4-is-quad check: w_4(w_4 - 1)(w_4 - 2).
            let mut t5 = w_4[i]
                .sqr_with_coarse_reduction()
                .sub_with_coarse_reduction(&w_4[i]);
            t5 = t5.mul_with_coarse_reduction(&w_4[i].add_with_coarse_reduction(&neg_two));
            t5 = t5
                .mul_with_coarse_reduction(&q_5[i])
                .mul_with_coarse_reduction(&alpha);
            t0 = t0.add_with_coarse_reduction(&t5);

            t0 = t0.add_with_coarse_reduction(&q_c[i]);
            t0 = t0.mul_with_coarse_reduction(&q_arith[i]);

            let quad = quad_extraction_term(
                q_arith[i].reduce_once(),
                w_3[i].reduce_once(),
                w_4[i].reduce_once(),
            );
            t0 = t0.add_with_coarse_reduction(&quad);
            t0 = t0.mul_with_coarse_reduction(&alpha_base);

            quotient[i] = quotient[i].add_with_coarse_reduction(&t0).reduce_once();
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
        let w_1_eval = transcript.get_field_element("w_1");
        let w_2_eval = transcript.get_field_element("w_2");
        let w_3_eval = transcript.get_field_element("w_3");
        let w_4_eval = transcript.get_field_element("w_4");
        let q_arith_eval = transcript.get_field_element("q_arith");

        let w_lr = w_1_eval * w_2_eval;
        let is_w_4_quad =
            (w_4_eval.square() - w_4_eval) * (w_4_eval + minus_two()) * alpha;

        let q_1 = key.constraint_selector("q_1");
        let q_2 = key.constraint_selector("q_2");
        let q_3 = key.constraint_selector("q_3");
        let q_4 = key.constraint_selector("q_4");
        let q_5 = key.constraint_selector("q_5");
        let q_m = key.constraint_selector("q_m");
        let q_c = key.constraint_selector("q_c");

        let scale = q_arith_eval * alpha_base;
        let r = &mut state.linear_poly;
        for i in 0..key.n {
            let t = w_lr * q_m[i]
                + w_1_eval * q_1[i]
                + w_2_eval * q_2[i]
                + w_3_eval * q_3[i]
                + w_4_eval * q_4[i]
                + is_w_4_quad * q_5[i]
                + q_c[i];
            r[i] += t * scale;
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
        let q_arith = key.constraint_selector("q_arith");
        let poly = &mut state.opening_poly;
        for i in 0..key.n {
            poly[i] += q_arith[i] * nu_base;
        }
        nu_base * nu
    }

    fn compute_transcript_elements(&self, key: &ProvingKey, transcript: &mut Transcript) {
        let z = transcript.get_challenge_fr("z");
        let eval = key.constraint_selector("q_arith").evaluate(&z, key.n);
        transcript.add_element("q_arith", write_fr(&eval));
    }
}

pub struct VerifierTurboArithmeticWidget;

impl VerifierWidget for VerifierTurboArithmeticWidget {
    fn compute_quotient_evaluation_contribution(
        &self,
        alpha_base: Fr,
        transcript: &Transcript,
        t_eval: &mut Fr,
    ) -> Fr {
        let alpha = transcript.get_challenge_fr("alpha");
        let q_arith_eval = transcript.get_field_element("q_arith");
        let w_3_eval = transcript.get_field_element("w_3");
        let w_4_eval = transcript.get_field_element("w_4");

        // The quad-extraction term is quadratic in q_arith, so it cannot
        // ride on the selector commitment and is evaluated directly.
        *t_eval += quad_extraction_term(q_arith_eval, w_3_eval, w_4_eval) * alpha_base;

        alpha_base * alpha.square()
    }

    fn compute_batch_evaluation_contribution(
        &self,
        _key: &VerificationKey,
        batch_eval: &mut Fr,
        nu_base: Fr,
        transcript: &Transcript,
    ) -> Fr {
        let nu = transcript.get_challenge_fr("nu");
        let q_arith_eval = transcript.get_field_element("q_arith");
        *batch_eval += nu_base * q_arith_eval;
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
        let w_1_eval = transcript.get_field_element("w_1");
        let w_2_eval = transcript.get_field_element("w_2");
        let w_3_eval = transcript.get_field_element("w_3");
        let w_4_eval = transcript.get_field_element("w_4");
        let q_arith_eval = transcript.get_field_element("q_arith");

        let scale = q_arith_eval * challenge.alpha_base * challenge.linear_nu;
        push_selector(key, "q_m", w_1_eval * w_2_eval * scale, points, scalars);
        push_selector(key, "q_1", w_1_eval * scale, points, scalars);
        push_selector(key, "q_2", w_2_eval * scale, points, scalars);
        push_selector(key, "q_3", w_3_eval * scale, points, scalars);
        push_selector(key, "q_4", w_4_eval * scale, points, scalars);

        let is_w_4_quad = (w_4_eval.square() - w_4_eval)
            * (w_4_eval + minus_two())
            * challenge.alpha_step;
        push_selector(key, "q_5", is_w_4_quad * scale, points, scalars);
        push_selector(key, "q_c", scale, points, scalars);
        push_selector(key, "q_arith", challenge.nu_base, points, scalars);

        ChallengeCoefficients {
            alpha_base: challenge.alpha_base * challenge.alpha_step.square(),
            nu_base: challenge.nu_base * challenge.nu_step,
            ..challenge
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::{One, Zero};

    #[test]
    fn quad_extraction_vanishes_on_plain_gates() {
        // q_arith in {0, 1} kills the term regardless of the wires.
        for q in [Fr::zero(), Fr::one()] {
            assert!(quad_extraction_term(q, Fr::from(123), Fr::from(9)).is_zero());
        }
    }

    #[test]
    fn quad_extraction_extracts_high_bit() {
        // With q_arith = 2: delta(9 delta - 2 delta^2 - 7) is 0 at delta
        // in {0, 1} and 6 at delta in {2, 3}, scaled by
        // q_arith^2 - q_arith = 2.
        let q = Fr::from(2);
        for (delta, expected) in [(0u64, 0u64), (1, 0), (2, 12), (3, 12)] {
            let w_4 = Fr::from(5);
            let w_3 = Fr::from(4 * 5 + delta);
            assert_eq!(quad_extraction_term(q, w_3, w_4), Fr::from(expected));
        }
    }
}
