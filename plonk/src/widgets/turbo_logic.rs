//! The base-4 logic gate. Wires 1 and 2 hold accumulating inputs, wire 4
//! an accumulating output, and wire 3 the quad product of the current
//! input slices; `q_c = 1` selects AND, `q_c = -1` selects XOR. The
//! identity simultaneously range-checks both input quads and pins the
//! output quad to the chosen operation.

use crate::proving_key::{ProverState, ProvingKey};
use crate::transcript::Transcript;
use crate::verifier::VerificationKey;
use crate::widgets::arithmetic::push_selector;
use crate::widgets::{ChallengeCoefficients, ProverWidget, VerifierWidget, WidgetDependencies};
use algebra::{Field, Fr, G1Affine};

pub struct TurboLogicWidget;

/// The full gate identity for one evaluation point, already scaled by
/// `alpha_base`. Inputs are the current and shifted accumulator values of
/// wires 1, 2 and 4, the quad product `w` on wire 3, and the opened
/// `q_c`.
#[allow(clippy::too_many_arguments)]
fn logic_identity(
    w_1: Fr,
    w_2: Fr,
    w_3: Fr,
    w_4: Fr,
    w_1_omega: Fr,
    w_2_omega: Fr,
    w_4_omega: Fr,
    q_c: Fr,
    alpha_base: Fr,
    alpha: Fr,
) -> Fr {
    let six = Fr::from(6);
    let eighty_one = Fr::from(81);
    let eighty_three = Fr::from(83);

    // a, b, c: the current input and output quads.
    let four = |x: Fr| {
        let mut t = x.double();
        t.double_in_place();
        t
    };
    let a = w_1_omega - four(w_1);
    let b = w_2_omega - four(w_2);
    let c = w_4_omega - four(w_4);

    let delta_sum = a + b;
    let a_squared = a.square();
    let b_squared = b.square();
    let delta_squared_sum = a_squared + b_squared;

    // 2(ab - w)
    let mut identity = delta_sum.square() - delta_squared_sum - w_3.double();
    identity *= alpha;

    // a(a - 1)(a - 2)(a - 3), rewritten as (a^2 - a)(a^2 - 5a + 6).
    let t2 = a_squared - a;
    let t0 = t2 - four(a) + six;
    identity += t0 * t2;
    identity *= alpha;

    let t3 = b_squared - b;
    let t1 = t3 - four(b) + six;
    identity += t1 * t3;
    identity *= alpha;

    // w(w(4w - 18(a + b) + 81) + 18(a^2 + b^2) - 81(a + b) + 83)
    let three_sum = delta_sum.double() + delta_sum;
    let nine_sum = three_sum.double() + three_sum;
    let eighteen_sum = nine_sum.double();
    let eighty_one_sum = nine_sum * Fr::from(9);

    let nine_sq = delta_squared_sum * Fr::from(9);
    let eighteen_sq = nine_sq.double();

    let mut w_poly = four(w_3) - eighteen_sum + eighty_one;
    w_poly *= w_3;
    w_poly += eighteen_sq - eighty_one_sum + eighty_three;
    w_poly *= w_3;

    let three_c = c.double() + c;
    let nine_c = three_c.double() + three_c;

    // q_c(9c - 3(a + b)) + (3c + 3(a + b) - 2 * w_poly)
    let t3 = (nine_c - three_sum) * q_c;
    let t2 = three_c + three_sum - w_poly.double();

    identity += t2 + t3;
    identity * alpha_base
}

impl ProverWidget for TurboLogicWidget {
    fn dependencies(&self) -> WidgetDependencies {
        WidgetDependencies::shifted_wire(0)
            .union(WidgetDependencies::shifted_wire(1))
            .union(WidgetDependencies::shifted_wire(3))
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
        let q_c = key.constraint_selector_fft("q_c_fft").coefficients();
        let q_logic = key.constraint_selector_fft("q_logic_fft").coefficients();

        let n4 = key.large_domain.size;
        for i in 0..n4 {
            let identity = logic_identity(
                w_1[i].reduce_once(),
                w_2[i].reduce_once(),
                w_3[i].reduce_once(),
                w_4[i].reduce_once(),
                w_1[i + 4].reduce_once(),
                w_2[i + 4].reduce_once(),
                w_4[i + 4].reduce_once(),
                q_c[i].reduce_once(),
                alpha_base,
                alpha,
            );
            quotient[i] = (quotient[i]
                .add_with_coarse_reduction(&identity.mul_with_coarse_reduction(&q_logic[i])))
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
        let identity = logic_identity(
            transcript.get_field_element("w_1"),
            transcript.get_field_element("w_2"),
            transcript.get_field_element("w_3"),
            transcript.get_field_element("w_4"),
            transcript.get_field_element("w_1_omega"),
            transcript.get_field_element("w_2_omega"),
            transcript.get_field_element("w_4_omega"),
            transcript.get_field_element("q_c"),
            alpha_base,
            alpha,
        );

        let q_logic = key.constraint_selector("q_logic");
        let r = &mut state.linear_poly;
        for i in 0..key.n {
            r[i] += identity * q_logic[i];
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

pub struct VerifierTurboLogicWidget;

impl VerifierWidget for VerifierTurboLogicWidget {
    fn dependencies(&self) -> WidgetDependencies {
        WidgetDependencies::shifted_wire(0)
            .union(WidgetDependencies::shifted_wire(1))
            .union(WidgetDependencies::shifted_wire(3))
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
        let identity = logic_identity(
            transcript.get_field_element("w_1"),
            transcript.get_field_element("w_2"),
            transcript.get_field_element("w_3"),
            transcript.get_field_element("w_4"),
            transcript.get_field_element("w_1_omega"),
            transcript.get_field_element("w_2_omega"),
            transcript.get_field_element("w_4_omega"),
            transcript.get_field_element("q_c"),
            challenge.alpha_base,
            challenge.alpha_step,
        );
        push_selector(
            key,
            "q_logic",
            identity * challenge.linear_nu,
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
    use num_traits::{One, Zero};

    /// Drives the identity with a single quad step and checks it vanishes
    /// exactly when `c = op(a, b)`.
    fn gate_holds(a: u64, b: u64, c: u64, is_and: bool) -> bool {
        let q_c = if is_and { Fr::one() } else { -Fr::one() };
        let identity = logic_identity(
            Fr::zero(),
            Fr::zero(),
            Fr::from(a * b),
            Fr::zero(),
            Fr::from(a),
            Fr::from(b),
            Fr::from(c),
            q_c,
            Fr::one(),
            Fr::one(),
        );
        identity.is_zero()
    }

    #[test]
    fn and_xor_truth_tables() {
        for a in 0u64..4 {
            for b in 0u64..4 {
                for c in 0u64..4 {
                    assert_eq!(gate_holds(a, b, c, true), c == (a & b), "{} & {}", a, b);
                    assert_eq!(gate_holds(a, b, c, false), c == (a ^ b), "{} ^ {}", a, b);
                }
            }
        }
    }
}
