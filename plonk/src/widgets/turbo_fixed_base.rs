//! The fixed-base scalar multiplication gate: one signed-quad ladder step
//! of a grumpkin point per row. Under `q_ecc_1`, the turbo selectors are
//! repurposed as the ladder lookup coefficients:
//! `q_1 = q_x_1`, `q_2 = q_x_2`, `q_3 = q_y_1`, `q_ecc_1 = q_y_2`,
//! `q_4 = q_x_init_1`, `q_4_next = q_x_init_2`, `q_m = q_y_init_1`,
//! `q_c = q_y_init_2`. Wires track the accumulator point (w_1, w_2), the
//! ladder x-coordinate (w_3, next row) and the scalar accumulator (w_4).
//! The widget extends the turbo arithmetic widget the way the composer
//! emits it.

use crate::proving_key::{ProverState, ProvingKey};
use crate::transcript::{write_fr, Transcript};
use crate::verifier::VerificationKey;
use crate::widgets::arithmetic::push_selector;
use crate::widgets::turbo_arithmetic::{TurboArithmeticWidget, VerifierTurboArithmeticWidget};
use crate::widgets::{ChallengeCoefficients, ProverWidget, VerifierWidget, WidgetDependencies};
use algebra::biginteger::BigInteger256;
use algebra::{Field, Fr, G1Affine};
use num_traits::One;

/// The grumpkin curve constant b = -17 (Montgomery form); the ladder
/// points satisfy `y^2 = x^3 - 17` over Fr.
#[rustfmt::skip]
pub const GRUMPKIN_CURVE_B: Fr = Fr::new(BigInteger256::new([
    0xdd7056026000005a,
    0x223fa97acb319311,
    0xcc388229877910c0,
    0x034394632b724eaa,
]));

pub struct TurboFixedBaseWidget;

fn all_shifted_wires() -> WidgetDependencies {
    WidgetDependencies::shifted_wire(0)
        .union(WidgetDependencies::shifted_wire(1))
        .union(WidgetDependencies::shifted_wire(2))
        .union(WidgetDependencies::shifted_wire(3))
}

impl ProverWidget for TurboFixedBaseWidget {
    fn dependencies(&self) -> WidgetDependencies {
        all_shifted_wires()
    }

    fn compute_quotient_contribution(
        &self,
        key: &ProvingKey,
        state: &mut ProverState,
        alpha_base: Fr,
        transcript: &Transcript,
    ) -> Fr {
        let new_alpha_base =
            TurboArithmeticWidget.compute_quotient_contribution(key, state, alpha_base, transcript);
        let alpha = transcript.get_challenge_fr("alpha");

        let alpha_a = new_alpha_base;
        let alpha_b = alpha_a * alpha;
        let alpha_c = alpha_b * alpha;
        let alpha_d = alpha_c * alpha;
        let alpha_e = alpha_d * alpha;
        let alpha_f = alpha_e * alpha;
        let alpha_g = alpha_f * alpha;

        let (wire_ffts, quotient) = (&state.wire_ffts, &mut state.quotient_large);
        let w_1 = wire_ffts["w_1_fft"].coefficients();
        let w_2 = wire_ffts["w_2_fft"].coefficients();
        let w_3 = wire_ffts["w_3_fft"].coefficients();
        let w_4 = wire_ffts["w_4_fft"].coefficients();

        let q_1 = key.constraint_selector_fft("q_1_fft").coefficients();
        let q_2 = key.constraint_selector_fft("q_2_fft").coefficients();
        let q_3 = key.constraint_selector_fft("q_3_fft").coefficients();
        let q_4 = key.constraint_selector_fft("q_4_fft").coefficients();
        let q_4_next = key.constraint_selector_fft("q_4_next_fft").coefficients();
        let q_m = key.constraint_selector_fft("q_m_fft").coefficients();
        let q_c = key.constraint_selector_fft("q_c_fft").coefficients();
        let q_ecc_1 = key.constraint_selector_fft("q_ecc_1_fft").coefficients();

        let one = Fr::one();
        let three = Fr::from(3);

        let n4 = key.large_domain.size;
        for i in 0..n4 {
            let x_1 = w_1[i].reduce_once();
            let y_1 = w_2[i].reduce_once();
            let x_init = w_3[i].reduce_once();
            let a = w_4[i].reduce_once();
            let x_2 = w_1[i + 4].reduce_once();
            let y_2 = w_2[i + 4].reduce_once();
            let x_alpha = w_3[i + 4].reduce_once();
            let a_next = w_4[i + 4].reduce_once();

            // The ladder consumes one signed quad per row:
            // delta = a(Xw) - 4a in {-3, -1, 1, 3}.
            let mut delta = a.double();
            delta.double_in_place();
            delta = a_next - delta;
            let delta_squared = delta.square();

            let y_alpha =
                (x_alpha * q_3[i].reduce_once() + q_ecc_1[i].reduce_once()) * delta;

            let scalar_accumulator_identity = (delta - one)
                * (delta - three)
                * (delta + one)
                * (delta + three)
                * alpha_a;

            let x_alpha_identity = (delta_squared * q_1[i].reduce_once()
                + q_2[i].reduce_once()
                - x_alpha)
                * alpha_b;

            // (x_2 + x_1 + x_alpha)(x_alpha - x_1)^2 = (y_alpha - y_1)^2,
            // with y_alpha^2 folded through the curve equation.
            let x_accumulator_identity = ((y_alpha * y_1).double()
                + (x_2 + x_1 + x_alpha) * (x_alpha - x_1).square()
                - (y_1.square() + GRUMPKIN_CURVE_B)
                - x_alpha.square() * x_alpha)
                * alpha_c;

            let y_accumulator_identity = ((y_2 + y_1) * (x_alpha - x_1)
                - (y_alpha - y_1) * (x_1 - x_2))
                * alpha_d;

            // Initialisation rows: the scalar accumulator starts at 0 or
            // the ladder offset, and (x_1, y_1) at one of the two seed
            // points.
            let accumulator_init = a - x_init;
            let accumulator_init_identity =
                accumulator_init * (accumulator_init - one) * alpha_e;

            let x_init_identity = ((x_init - a) * q_4[i].reduce_once()
                + q_4_next[i].reduce_once()
                - x_1)
                * alpha_f;

            let y_init_identity = ((x_init - a) * q_m[i].reduce_once()
                + q_c[i].reduce_once()
                - y_1)
                * alpha_g;

            let mut gate_identity = accumulator_init_identity + x_init_identity + y_init_identity;
            gate_identity *= q_c[i].reduce_once();
            gate_identity += scalar_accumulator_identity
                + x_alpha_identity
                + x_accumulator_identity
                + y_accumulator_identity;
            gate_identity *= q_ecc_1[i].reduce_once();

            quotient[i] = (quotient[i].add_with_coarse_reduction(&gate_identity)).reduce_once();
        }

        alpha_g * alpha
    }

    fn compute_linear_contribution(
        &self,
        key: &ProvingKey,
        state: &mut ProverState,
        alpha_base: Fr,
        transcript: &Transcript,
    ) -> Fr {
        let new_alpha_base =
            TurboArithmeticWidget.compute_linear_contribution(key, state, alpha_base, transcript);
        let alpha = transcript.get_challenge_fr("alpha");

        let w_1_eval = transcript.get_field_element("w_1");
        let w_2_eval = transcript.get_field_element("w_2");
        let w_3_eval = transcript.get_field_element("w_3");
        let w_4_eval = transcript.get_field_element("w_4");
        let w_1_omega_eval = transcript.get_field_element("w_1_omega");
        let w_3_omega_eval = transcript.get_field_element("w_3_omega");
        let w_4_omega_eval = transcript.get_field_element("w_4_omega");
        let q_ecc_1_eval = transcript.get_field_element("q_ecc_1");
        let q_c_eval = transcript.get_field_element("q_c");

        let alpha_b = new_alpha_base * alpha;
        let alpha_c = alpha_b * alpha;
        let alpha_d = alpha_c * alpha;
        let alpha_e = alpha_d * alpha;
        let alpha_f = alpha_e * alpha;
        let alpha_g = alpha_f * alpha;

        let mut delta = w_4_eval.double();
        delta.double_in_place();
        delta = w_4_omega_eval - delta;
        let delta_squared = delta.square();

        let q_1_multiplicand = delta_squared * q_ecc_1_eval * alpha_b;
        let q_2_multiplicand = q_ecc_1_eval * alpha_b;

        let q_3_multiplicand = ((w_1_omega_eval - w_1_eval) * delta * w_3_omega_eval * alpha_d
            + (delta * w_3_omega_eval * w_2_eval).double() * alpha_c)
            * q_ecc_1_eval;

        let q_4_multiplicand = (w_3_eval - w_4_eval) * q_ecc_1_eval * q_c_eval * alpha_f;
        let q_4_next_multiplicand = q_ecc_1_eval * q_c_eval * alpha_f;
        let q_m_multiplicand = (w_3_eval - w_4_eval) * q_ecc_1_eval * q_c_eval * alpha_g;

        let q_1 = key.constraint_selector("q_1");
        let q_2 = key.constraint_selector("q_2");
        let q_3 = key.constraint_selector("q_3");
        let q_4 = key.constraint_selector("q_4");
        let q_4_next = key.constraint_selector("q_4_next");
        let q_m = key.constraint_selector("q_m");

        let r = &mut state.linear_poly;
        for i in 0..key.n {
            r[i] += q_1_multiplicand * q_1[i]
                + q_2_multiplicand * q_2[i]
                + q_3_multiplicand * q_3[i]
                + q_4_multiplicand * q_4[i]
                + q_4_next_multiplicand * q_4_next[i]
                + q_m_multiplicand * q_m[i];
        }

        alpha_g * alpha
    }

    fn compute_opening_poly_contribution(
        &self,
        key: &ProvingKey,
        state: &mut ProverState,
        nu_base: Fr,
        transcript: &Transcript,
    ) -> Fr {
        let nu = transcript.get_challenge_fr("nu");
        let new_nu_base = TurboArithmeticWidget
            .compute_opening_poly_contribution(key, state, nu_base, transcript);
        let nu_b = new_nu_base * nu;

        let q_ecc_1 = key.constraint_selector("q_ecc_1");
        let q_c = key.constraint_selector("q_c");
        let poly = &mut state.opening_poly;
        for i in 0..key.n {
            poly[i] += q_ecc_1[i] * new_nu_base + q_c[i] * nu_b;
        }

        nu_b * nu
    }

    fn compute_transcript_elements(&self, key: &ProvingKey, transcript: &mut Transcript) {
        TurboArithmeticWidget.compute_transcript_elements(key, transcript);
        let z = transcript.get_challenge_fr("z");
        transcript.add_element(
            "q_ecc_1",
            write_fr(&key.constraint_selector("q_ecc_1").evaluate(&z, key.n)),
        );
        transcript.add_element(
            "q_c",
            write_fr(&key.constraint_selector("q_c").evaluate(&z, key.n)),
        );
    }
}

pub struct VerifierTurboFixedBaseWidget;

impl VerifierWidget for VerifierTurboFixedBaseWidget {
    fn dependencies(&self) -> WidgetDependencies {
        all_shifted_wires()
    }

    fn compute_quotient_evaluation_contribution(
        &self,
        alpha_base: Fr,
        transcript: &Transcript,
        t_eval: &mut Fr,
    ) -> Fr {
        let new_alpha_base = VerifierTurboArithmeticWidget
            .compute_quotient_evaluation_contribution(alpha_base, transcript, t_eval);
        let alpha = transcript.get_challenge_fr("alpha");

        let w_1_eval = transcript.get_field_element("w_1");
        let w_2_eval = transcript.get_field_element("w_2");
        let w_3_eval = transcript.get_field_element("w_3");
        let w_4_eval = transcript.get_field_element("w_4");
        let w_1_omega_eval = transcript.get_field_element("w_1_omega");
        let w_2_omega_eval = transcript.get_field_element("w_2_omega");
        let w_3_omega_eval = transcript.get_field_element("w_3_omega");
        let w_4_omega_eval = transcript.get_field_element("w_4_omega");
        let q_ecc_1_eval = transcript.get_field_element("q_ecc_1");
        let q_c_eval = transcript.get_field_element("q_c");

        let alpha_a = new_alpha_base;
        let alpha_b = alpha_a * alpha;
        let alpha_c = alpha_b * alpha;
        let alpha_d = alpha_c * alpha;
        let alpha_e = alpha_d * alpha;
        let alpha_f = alpha_e * alpha;
        let alpha_g = alpha_f * alpha;

        let one = Fr::one();
        let three = Fr::from(3);

        let mut delta = w_4_eval.double();
        delta.double_in_place();
        delta = w_4_omega_eval - delta;

        let accumulator_identity = (delta + one)
            * (delta + three)
            * (delta - one)
            * (delta - three)
            * alpha_a;

        // The q_1/q_2 ladder terms ride their commitments; only the
        // opened x_alpha residue remains.
        let x_alpha_identity = -(w_3_omega_eval * alpha_b);

        let mut x_accumulator_identity = (w_1_omega_eval + w_1_eval + w_3_omega_eval)
            * (w_3_omega_eval - w_1_eval).square();
        let x_alpha_cubed = w_3_omega_eval.square() * w_3_omega_eval;
        x_accumulator_identity -= x_alpha_cubed + w_2_eval.square() + GRUMPKIN_CURVE_B;
        x_accumulator_identity += (delta * w_2_eval * q_ecc_1_eval).double();
        x_accumulator_identity *= alpha_c;

        let mut y_accumulator_identity =
            (w_2_omega_eval + w_2_eval) * (w_3_omega_eval - w_1_eval);
        y_accumulator_identity +=
            (w_1_eval - w_1_omega_eval) * (w_2_eval - q_ecc_1_eval * delta);
        y_accumulator_identity *= alpha_d;

        let accumulator_init = w_4_eval - w_3_eval;
        let accumulator_init_identity = accumulator_init * (accumulator_init - one) * alpha_e;

        let x_init_identity = -(w_1_eval * alpha_f);
        let y_init_identity = (q_c_eval - w_2_eval) * alpha_g;

        let mut gate_identity = accumulator_init_identity + x_init_identity + y_init_identity;
        gate_identity *= q_c_eval;
        gate_identity += accumulator_identity
            + x_alpha_identity
            + x_accumulator_identity
            + y_accumulator_identity;
        gate_identity *= q_ecc_1_eval;

        *t_eval += gate_identity;

        alpha_g * alpha
    }

    fn compute_batch_evaluation_contribution(
        &self,
        key: &VerificationKey,
        batch_eval: &mut Fr,
        nu_base: Fr,
        transcript: &Transcript,
    ) -> Fr {
        let nu = transcript.get_challenge_fr("nu");
        let new_nu_base = VerifierTurboArithmeticWidget.compute_batch_evaluation_contribution(
            key, batch_eval, nu_base, transcript,
        );
        let nu_b = new_nu_base * nu;

        let q_ecc_1_eval = transcript.get_field_element("q_ecc_1");
        let q_c_eval = transcript.get_field_element("q_c");
        *batch_eval += new_nu_base * q_ecc_1_eval + nu_b * q_c_eval;

        nu_b * nu
    }

    fn append_scalar_multiplication_inputs(
        &self,
        key: &VerificationKey,
        challenge: ChallengeCoefficients,
        transcript: &Transcript,
        points: &mut Vec<G1Affine>,
        scalars: &mut Vec<Fr>,
    ) -> ChallengeCoefficients {
        // The shared selectors (q_m, q_1..q_5, q_c, q_arith) are pushed by
        // the arithmetic half with its own scalars; the ladder terms then
        // add further scalars onto the same commitments.
        let after_arithmetic = VerifierTurboArithmeticWidget.append_scalar_multiplication_inputs(
            key, challenge, transcript, points, scalars,
        );
        let alpha = challenge.alpha_step;

        let w_1_eval = transcript.get_field_element("w_1");
        let w_2_eval = transcript.get_field_element("w_2");
        let w_3_eval = transcript.get_field_element("w_3");
        let w_4_eval = transcript.get_field_element("w_4");
        let w_1_omega_eval = transcript.get_field_element("w_1_omega");
        let w_3_omega_eval = transcript.get_field_element("w_3_omega");
        let w_4_omega_eval = transcript.get_field_element("w_4_omega");
        let q_ecc_1_eval = transcript.get_field_element("q_ecc_1");
        let q_c_eval = transcript.get_field_element("q_c");

        // alpha_a for the ladder starts where the arithmetic chain ended.
        let alpha_a = challenge.alpha_base * alpha.square();
        let alpha_b = alpha_a * alpha;
        let alpha_c = alpha_b * alpha;
        let alpha_d = alpha_c * alpha;
        let alpha_e = alpha_d * alpha;
        let alpha_f = alpha_e * alpha;
        let alpha_g = alpha_f * alpha;

        let mut delta = w_4_eval.double();
        delta.double_in_place();
        delta = w_4_omega_eval - delta;
        let delta_squared = delta.square();

        let linear = challenge.linear_nu;
        let q_1_term = delta_squared * q_ecc_1_eval * alpha_b * linear;
        push_selector(key, "q_1", q_1_term, points, scalars);

        let q_2_term = q_ecc_1_eval * alpha_b * linear;
        push_selector(key, "q_2", q_2_term, points, scalars);

        let q_3_term = ((w_1_omega_eval - w_1_eval) * delta * w_3_omega_eval * alpha_d
            + (delta * w_3_omega_eval * w_2_eval).double() * alpha_c)
            * q_ecc_1_eval
            * linear;
        push_selector(key, "q_3", q_3_term, points, scalars);

        let q_4_term = (w_3_eval - w_4_eval) * q_ecc_1_eval * q_c_eval * alpha_f * linear;
        push_selector(key, "q_4", q_4_term, points, scalars);

        let q_4_next_term = q_ecc_1_eval * q_c_eval * alpha_f * linear;
        push_selector(key, "q_4_next", q_4_next_term, points, scalars);

        let q_m_term = (w_3_eval - w_4_eval) * q_ecc_1_eval * q_c_eval * alpha_g * linear;
        push_selector(key, "q_m", q_m_term, points, scalars);

        // Opened ladder selectors join the batched opening.
        push_selector(key, "q_ecc_1", after_arithmetic.nu_base, points, scalars);
        push_selector(
            key,
            "q_c",
            after_arithmetic.nu_base * challenge.nu_step,
            points,
            scalars,
        );

        ChallengeCoefficients {
            alpha_base: alpha_g * alpha,
            nu_base: after_arithmetic.nu_base * challenge.nu_step.square(),
            ..challenge
        }
    }
}
