//! The four arithmetisation variants and their transcript manifests. The
//! manifest is the single source of truth for what a proof contains; the
//! widget sets here must stay consistent with it, which the prover
//! asserts at construction.

use crate::transcript::{
    Manifest, ManifestEntry, RoundManifest, FR_SERIALIZED_SIZE, G1_SERIALIZED_SIZE,
};
use crate::widgets::{
    ArithmeticWidget, ExtendedArithmeticWidget, MimcWidget, ProverWidget, TurboFixedBaseWidget,
    TurboLogicWidget, TurboRangeWidget, VerifierArithmeticWidget,
    VerifierExtendedArithmeticWidget, VerifierMimcWidget, VerifierTurboFixedBaseWidget,
    VerifierTurboLogicWidget, VerifierTurboRangeWidget, VerifierWidget,
};

/// Which arithmetisation a proving key was preprocessed for.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlonkVariant {
    Standard,
    Extended,
    Mimc,
    Turbo,
}

impl PlonkVariant {
    pub fn program_width(&self) -> usize {
        match self {
            PlonkVariant::Turbo => 4,
            _ => 3,
        }
    }

    /// The quotient polynomial splits into one commitment chunk per wire
    /// column.
    pub fn num_quotient_chunks(&self) -> usize {
        self.program_width()
    }

    /// Selector evaluations the widget set opens at `z`, in transcript
    /// order.
    pub fn opened_selectors(&self) -> &'static [&'static str] {
        match self {
            PlonkVariant::Standard | PlonkVariant::Extended => &[],
            PlonkVariant::Mimc => &["q_mimc_coefficient"],
            PlonkVariant::Turbo => &["q_arith", "q_ecc_1", "q_c"],
        }
    }

    pub fn create_prover_widgets(&self) -> Vec<Box<dyn ProverWidget>> {
        match self {
            PlonkVariant::Standard => vec![Box::new(ArithmeticWidget)],
            PlonkVariant::Extended => vec![Box::new(ExtendedArithmeticWidget)],
            PlonkVariant::Mimc => vec![Box::new(ArithmeticWidget), Box::new(MimcWidget)],
            PlonkVariant::Turbo => vec![
                Box::new(TurboFixedBaseWidget),
                Box::new(TurboRangeWidget),
                Box::new(TurboLogicWidget),
            ],
        }
    }

    pub fn create_verifier_widgets(&self) -> Vec<Box<dyn VerifierWidget>> {
        match self {
            PlonkVariant::Standard => vec![Box::new(VerifierArithmeticWidget)],
            PlonkVariant::Extended => vec![Box::new(VerifierExtendedArithmeticWidget)],
            PlonkVariant::Mimc => {
                vec![Box::new(VerifierArithmeticWidget), Box::new(VerifierMimcWidget)]
            },
            PlonkVariant::Turbo => vec![
                Box::new(VerifierTurboFixedBaseWidget),
                Box::new(VerifierTurboRangeWidget),
                Box::new(VerifierTurboLogicWidget),
            ],
        }
    }

    /// Shifted wire openings, as the union over the widget set.
    pub fn shifted_wires(&self) -> Vec<usize> {
        let widgets = self.create_prover_widgets();
        let deps = widgets
            .iter()
            .fold(crate::widgets::WidgetDependencies::NONE, |acc, w| {
                acc.union(w.dependencies())
            });
        (0..self.program_width())
            .filter(|&k| deps.requires_shifted_wire(k))
            .collect()
    }

    /// The transcript manifest for this variant, parameterised by the
    /// public input count.
    pub fn create_manifest(&self, num_public_inputs: usize) -> Manifest {
        let width = self.program_width();
        let public_input_size = FR_SERIALIZED_SIZE * num_public_inputs;

        let mut round_1 = vec![ManifestEntry::new("public_inputs", public_input_size, false)];
        for k in 1..=width {
            round_1.push(ManifestEntry::new(
                &format!("W_{}", k),
                G1_SERIALIZED_SIZE,
                false,
            ));
        }

        let quotient_round: Vec<ManifestEntry> = (1..=self.num_quotient_chunks())
            .map(|k| ManifestEntry::new(&format!("T_{}", k), G1_SERIALIZED_SIZE, false))
            .collect();

        let mut evaluation_round = Vec::new();
        for k in 1..=width {
            evaluation_round.push(ManifestEntry::new(
                &format!("w_{}", k),
                FR_SERIALIZED_SIZE,
                false,
            ));
        }
        for k in self.shifted_wires() {
            evaluation_round.push(ManifestEntry::new(
                &format!("w_{}_omega", k + 1),
                FR_SERIALIZED_SIZE,
                false,
            ));
        }
        evaluation_round.push(ManifestEntry::new("z_omega", FR_SERIALIZED_SIZE, false));
        for k in 1..width {
            evaluation_round.push(ManifestEntry::new(
                &format!("sigma_{}", k),
                FR_SERIALIZED_SIZE,
                false,
            ));
        }
        for name in self.opened_selectors() {
            evaluation_round.push(ManifestEntry::new(name, FR_SERIALIZED_SIZE, false));
        }
        evaluation_round.push(ManifestEntry::new("r", FR_SERIALIZED_SIZE, false));
        evaluation_round.push(ManifestEntry::new("t", FR_SERIALIZED_SIZE, true));

        Manifest::new(vec![
            RoundManifest::new(vec![ManifestEntry::new("circuit_size", 4, false)], "init"),
            RoundManifest::new(round_1, "beta"),
            RoundManifest::new(vec![], "gamma"),
            RoundManifest::new(vec![ManifestEntry::new("Z", G1_SERIALIZED_SIZE, false)], "alpha"),
            RoundManifest::new(quotient_round, "z"),
            RoundManifest::new(evaluation_round, "nu"),
            RoundManifest::new(
                vec![
                    ManifestEntry::new("PI_Z", G1_SERIALIZED_SIZE, false),
                    ManifestEntry::new("PI_Z_OMEGA", G1_SERIALIZED_SIZE, false),
                ],
                "separator",
            ),
        ])
    }

    /// The selectors a proving key for this variant must carry.
    pub fn required_selectors(&self) -> &'static [&'static str] {
        match self {
            PlonkVariant::Standard => &["q_m", "q_l", "q_r", "q_o", "q_c"],
            PlonkVariant::Extended => &["q_m", "q_l", "q_r", "q_o", "q_oo", "q_c"],
            PlonkVariant::Mimc => &[
                "q_m",
                "q_l",
                "q_r",
                "q_o",
                "q_c",
                "q_mimc_coefficient",
                "q_mimc_selector",
            ],
            PlonkVariant::Turbo => &[
                "q_m",
                "q_1",
                "q_2",
                "q_3",
                "q_4",
                "q_5",
                "q_arith",
                "q_c",
                "q_range",
                "q_logic",
                "q_ecc_1",
                "q_4_next",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_sizes() {
        // standard: 4 + 3*64 + 64 + 3*64 + (3 + 1 + 2 + 1) * 32 + 2*64
        let standard = PlonkVariant::Standard.create_manifest(0);
        assert_eq!(standard.proof_size(), 4 + 64 * 9 + 32 * 7);

        // turbo adds a wire, a chunk, four shifted wires, an extra sigma
        // and three selector openings.
        let turbo = PlonkVariant::Turbo.create_manifest(0);
        assert_eq!(turbo.proof_size(), 4 + 64 * 11 + 32 * 16);
    }

    #[test]
    fn shifted_wires_per_variant() {
        assert!(PlonkVariant::Standard.shifted_wires().is_empty());
        assert_eq!(PlonkVariant::Extended.shifted_wires(), vec![2]);
        assert_eq!(PlonkVariant::Mimc.shifted_wires(), vec![2]);
        assert_eq!(PlonkVariant::Turbo.shifted_wires(), vec![0, 1, 2, 3]);
    }
}
