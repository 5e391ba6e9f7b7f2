//! The base-4 range gate: four accumulator deltas per gate, each
//! constrained to a quad via `D(D - 1)(D - 2)(D - 3)`, switched by
//! `q_range`. A chain of these gates range-checks a scalar two bits per
//! accumulator step.

use crate::proving_key::{ProverState, ProvingKey};
use crate::transcript::Transcript;
use crate::verifier::VerificationKey;
use crate::widgets::arithmetic::push_selector;
use crate::widgets::{ChallengeCoefficients, ProverWidget, VerifierWidget, WidgetDependencies};
use algebra::{Field, Fr, G1Affine};

pub struct TurboRangeWidget;

fn quad_constraint(delta: Fr) -> Fr {
    (delta.square() - delta) * (delta - Fr::from(2)) * (delta - Fr::from(3))
}

/// `w_next - 4 * w`.
fn accumulator_delta(w: Fr, w_next: Fr) -> Fr {
    let mut four_w = w.double();
    four_w.double_in_place();
    w_next - four_w
}

/// The four deltas of one gate, most significant first:
/// `(w_4, w_3, w_2, w_1, w_4(X w))` form five consecutive accumulator
/// values.
fn range_identity(
    w_1: Fr,
    w_2: Fr,
    w_3: Fr,
    w_4: Fr,
    w_4_omega: Fr,
    alpha_base: Fr,
    alpha: Fr,
) -> Fr {
    let alpha_a = alpha_base;
    let alpha_b = alpha_a * alpha;
    let alpha_c = alpha_b * alpha;
    let alpha_d = alpha_c * alpha;

    let delta_1 = accumulator_delta(w_4, w_3);
    let delta_2 = accumulator_delta(w_3, w_2);
    let delta_3 = accumulator_delta(w_2, w_1);
    let delta_4 = accumulator_delta(w_1, w_4_omega);

    quad_constraint(delta_1) * alpha_a
        + quad_constraint(delta_2) * alpha_b
        + quad_constraint(delta_3) * alpha_c
        + quad_constraint(delta_4) * alpha_d
}

impl ProverWidget for TurboRangeWidget {
    fn dependencies(&self) -> WidgetDependencies {
        WidgetDependencies::shifted_wire(3)
    }

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
        let q_range = key.constraint_selector_fft("q_range_fft").coefficients();

        let n4 = key.large_domain.size;
        for i in 0..n4 {
            let accumulator = range_identity(
                w_1[i].reduce_once(),
                w_2[i].reduce_once(),
                w_3[i].reduce_once(),
                w_4[i].reduce_once(),
                w_4[i + 4].reduce_once(),
                alpha_base,
                alpha,
            );
            quotient[i] = (quotient[i]
                .add_with_coarse_reduction(&accumulator.mul_with_coarse_reduction(&q_range[i])))
            .reduce_once();
        }

        alpha_base * alpha.square().square()
    }

    fn compute_linear_contribution(
        &self,
        key: &ProvingKey,
        state: &mut ProverState,
        alpha_base: Fr,
        transcript: &Transcript,
    ) -> Fr {
        let alpha = transcript.get_challenge_fr("alpha");
        let accumulator = range_identity(
            transcript.get_field_element("w_1"),
            transcript.get_field_element("w_2"),
            transcript.get_field_element("w_3"),
            transcript.get_field_element("w_4"),
            transcript.get_field_element("w_4_omega"),
            alpha_base,
            alpha,
        );

        let q_range = key.constraint_selector("q_range");
        let r = &mut state.linear_poly;
        for i in 0..key.n {
            r[i] += accumulator * q_range[i];
        }

        alpha_base * alpha.square().square()
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

pub struct VerifierTurboRangeWidget;

impl VerifierWidget for VerifierTurboRangeWidget {
    fn dependencies(&self) -> WidgetDependencies {
        WidgetDependencies::shifted_wire(3)
    }

    fn compute_quotient_evaluation_contribution(
        &self,
        alpha_base: Fr,
        transcript: &Transcript,
        _t_eval: &mut Fr,
    ) -> Fr {
        alpha_base * transcript.get_challenge_fr("alpha").square().square()
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
        let accumulator = range_identity(
            transcript.get_field_element("w_1"),
            transcript.get_field_element("w_2"),
            transcript.get_field_element("w_3"),
            transcript.get_field_element("w_4"),
            transcript.get_field_element("w_4_omega"),
            challenge.alpha_base,
            challenge.alpha_step,
        );
        push_selector(
            key,
            "q_range",
            accumulator * challenge.linear_nu,
            points,
            scalars,
        );

        ChallengeCoefficients {
            alpha_base: challenge.alpha_base * challenge.alpha_step.square().square(),
            ..challenge
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    #[test]
    fn quad_constraint_vanishes_on_quads() {
        for v in 0u64..4 {
            assert!(quad_constraint(Fr::from(v)).is_zero());
        }
        assert!(!quad_constraint(Fr::from(4)).is_zero());
    }
}
