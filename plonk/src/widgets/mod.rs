//! Gate "widgets": each arithmetisation variant contributes its gate
//! identities to the quotient polynomial, the linearisation polynomial
//! and the batched opening through one of these.

use crate::proving_key::{ProverState, ProvingKey};
use crate::transcript::Transcript;
use crate::verifier::VerificationKey;
use algebra::{Fr, G1Affine};

pub mod arithmetic;
pub mod mimc;
pub mod turbo_arithmetic;
pub mod turbo_fixed_base;
pub mod turbo_logic;
pub mod turbo_range;

pub use arithmetic::{
    ArithmeticWidget, ExtendedArithmeticWidget, VerifierArithmeticWidget,
    VerifierExtendedArithmeticWidget,
};
pub use mimc::{MimcWidget, VerifierMimcWidget};
pub use turbo_arithmetic::{TurboArithmeticWidget, VerifierTurboArithmeticWidget};
pub use turbo_fixed_base::{TurboFixedBaseWidget, VerifierTurboFixedBaseWidget};
pub use turbo_logic::{TurboLogicWidget, VerifierTurboLogicWidget};
pub use turbo_range::{TurboRangeWidget, VerifierTurboRangeWidget};

/// Which shifted wire openings a widget's identity consumes. The prover
/// derives the `w_k_omega` transcript entries and the tail of the
/// nu-schedule from the union over its widget set, so the manifest and
/// the widget list can never drift apart silently.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct WidgetDependencies {
    bits: u8,
}

impl WidgetDependencies {
    pub const NONE: Self = WidgetDependencies { bits: 0 };

    pub const fn shifted_wire(column: usize) -> Self {
        WidgetDependencies {
            bits: 1 << column,
        }
    }

    pub const fn union(self, other: Self) -> Self {
        WidgetDependencies {
            bits: self.bits | other.bits,
        }
    }

    pub fn requires_shifted_wire(&self, column: usize) -> bool {
        self.bits & (1 << column) != 0
    }
}

/// The prover half of a widget. Methods thread an `alpha_base` / `nu_base`
/// through the widget chain and return the next base, so the power
/// schedule is fixed by the widget order alone.
pub trait ProverWidget: Send + Sync {
    fn dependencies(&self) -> WidgetDependencies {
        WidgetDependencies::NONE
    }

    /// Adds the widget's gate identities (times `alpha_base` and its
    /// internal alpha powers) onto the 4n-coset quotient evaluations.
    fn compute_quotient_contribution(
        &self,
        key: &ProvingKey,
        state: &mut ProverState,
        alpha_base: Fr,
        transcript: &Transcript,
    ) -> Fr;

    /// Adds the widget's linearised selector terms onto `linear_poly`.
    fn compute_linear_contribution(
        &self,
        key: &ProvingKey,
        state: &mut ProverState,
        alpha_base: Fr,
        transcript: &Transcript,
    ) -> Fr;

    /// Adds any selector polynomials the widget opens at `z` onto the
    /// batched opening polynomial.
    fn compute_opening_poly_contribution(
        &self,
        key: &ProvingKey,
        state: &mut ProverState,
        nu_base: Fr,
        transcript: &Transcript,
    ) -> Fr;

    /// Absorbs the widget's selector evaluations into the transcript.
    fn compute_transcript_elements(
        &self,
        _key: &ProvingKey,
        _transcript: &mut Transcript,
    ) {
    }
}

/// The running challenge state the verifier threads through its widgets.
#[derive(Clone, Copy)]
pub struct ChallengeCoefficients {
    pub alpha_base: Fr,
    pub alpha_step: Fr,
    pub nu_base: Fr,
    pub nu_step: Fr,
    /// The nu power multiplying the linearisation commitment combination.
    pub linear_nu: Fr,
}

/// The verifier half: reconstructs the widget's share of `t(z)`, of the
/// batched evaluation, and of the commitment MSM.
pub trait VerifierWidget: Send + Sync {
    fn dependencies(&self) -> WidgetDependencies {
        WidgetDependencies::NONE
    }

    /// Adds the widget terms that were not folded into the linearisation
    /// polynomial.
    fn compute_quotient_evaluation_contribution(
        &self,
        alpha_base: Fr,
        transcript: &Transcript,
        t_eval: &mut Fr,
    ) -> Fr;

    /// Adds the widget's opened-selector evaluations to the batch
    /// evaluation.
    fn compute_batch_evaluation_contribution(
        &self,
        key: &VerificationKey,
        batch_eval: &mut Fr,
        nu_base: Fr,
        transcript: &Transcript,
    ) -> Fr;

    /// Pushes the widget's selector commitments and scalars onto the
    /// batch MSM.
    fn append_scalar_multiplication_inputs(
        &self,
        key: &VerificationKey,
        challenge: ChallengeCoefficients,
        transcript: &Transcript,
        points: &mut Vec<G1Affine>,
        scalars: &mut Vec<Fr>,
    ) -> ChallengeCoefficients;
}
