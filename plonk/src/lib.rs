//! A PLONK-style zkSNARK over BN254: transcript machinery, proving key and
//! witness containers, the widget set for the standard, extended, MiMC and
//! turbo arithmetisations, the five-round prover, and the KZG-based
//! verifier.
//!
//! Circuit construction (composers and gadgets) lives upstream; this crate
//! consumes finished selector polynomials, permutation mappings and wire
//! assignments.

#[macro_use]
extern crate bench_utils;

pub mod error;
pub mod linearizer;
pub mod permutation;
pub mod program_settings;
pub mod prover;
pub mod proving_key;
pub mod reference_string;
pub mod transcript;
pub mod verifier;
pub mod widgets;

pub use error::Error;
pub use program_settings::PlonkVariant;
pub use prover::{Proof, Prover};
pub use proving_key::{ProvingKey, Witness};
pub use reference_string::ReferenceString;
pub use transcript::{Manifest, Transcript};
pub use verifier::{preprocess, VerificationKey, Verifier};
