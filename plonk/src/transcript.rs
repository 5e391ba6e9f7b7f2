//! The Fiat-Shamir transcript: an append-only keyed store whose challenge
//! schedule is dictated by a per-program manifest.

use crate::error::Error;
use algebra::biginteger::BigInteger256;
use algebra::fields::{FpParameters, FrParameters};
use algebra::{Fq, Fr, G1Affine, PrimeField};
use blake2::{Blake2s, Digest};
use num_traits::Zero;
use std::collections::BTreeMap;

pub const FR_SERIALIZED_SIZE: usize = 32;
pub const G1_SERIALIZED_SIZE: usize = 64;

/// One absorbed element of a transcript round. `derived_by_verifier`
/// entries are hashed into the next challenge but never serialized into
/// the proof, because the verifier recomputes them itself.
#[derive(Clone, Debug)]
pub struct ManifestEntry {
    pub name: String,
    pub num_bytes: usize,
    pub derived_by_verifier: bool,
}

impl ManifestEntry {
    pub fn new(name: &str, num_bytes: usize, derived_by_verifier: bool) -> Self {
        ManifestEntry {
            name: name.to_string(),
            num_bytes,
            derived_by_verifier,
        }
    }
}

/// One Fiat-Shamir round: the elements absorbed, then the challenge
/// squeezed.
#[derive(Clone, Debug)]
pub struct RoundManifest {
    pub elements: Vec<ManifestEntry>,
    pub challenge: String,
}

impl RoundManifest {
    pub fn new(elements: Vec<ManifestEntry>, challenge: &str) -> Self {
        RoundManifest {
            elements,
            challenge: challenge.to_string(),
        }
    }

    pub fn includes_element(&self, name: &str) -> bool {
        self.elements.iter().any(|e| e.name == name)
    }
}

/// The ground truth of what a proof for a given program contains, in
/// order. The prover and verifier both drive their transcripts off the
/// same manifest; widgets whose openings are missing from it are a
/// construction error.
#[derive(Clone, Debug)]
pub struct Manifest {
    pub rounds: Vec<RoundManifest>,
}

impl Manifest {
    pub fn new(rounds: Vec<RoundManifest>) -> Self {
        Manifest { rounds }
    }

    pub fn num_rounds(&self) -> usize {
        self.rounds.len()
    }

    pub fn includes_element(&self, name: &str) -> bool {
        self.rounds.iter().any(|r| r.includes_element(name))
    }

    /// Total byte length of the serialized proof this manifest describes.
    pub fn proof_size(&self) -> usize {
        self.rounds
            .iter()
            .flat_map(|r| r.elements.iter())
            .filter(|e| !e.derived_by_verifier)
            .map(|e| e.num_bytes)
            .sum()
    }
}

/// The transcript itself. Challenges are Blake2s digests of the previous
/// challenge concatenated with every element the current round absorbed,
/// reduced into Fr on demand.
#[derive(Clone)]
pub struct Transcript {
    manifest: Manifest,
    elements: BTreeMap<String, Vec<u8>>,
    challenges: BTreeMap<String, [u8; 32]>,
    current_round: usize,
    previous_challenge: Vec<u8>,
}

impl Transcript {
    pub fn new(manifest: Manifest) -> Self {
        Transcript {
            manifest,
            elements: BTreeMap::new(),
            challenges: BTreeMap::new(),
            current_round: 0,
            previous_challenge: Vec::new(),
        }
    }

    /// Rebuilds a prover transcript from proof bytes, splitting them by
    /// the manifest's declared element sizes.
    pub fn from_proof(manifest: Manifest, proof_data: &[u8]) -> Result<Self, Error> {
        let expected = manifest.proof_size();
        if proof_data.len() != expected {
            return Err(Error::MalformedProof(format!(
                "expected {} bytes, got {}",
                expected,
                proof_data.len()
            )));
        }

        let mut transcript = Transcript::new(manifest.clone());
        let mut offset = 0;
        for round in &manifest.rounds {
            for entry in &round.elements {
                if entry.derived_by_verifier {
                    continue;
                }
                transcript.elements.insert(
                    entry.name.clone(),
                    proof_data[offset..offset + entry.num_bytes].to_vec(),
                );
                offset += entry.num_bytes;
            }
        }
        Ok(transcript)
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn add_element(&mut self, name: &str, bytes: Vec<u8>) {
        debug_assert!(
            self.manifest.includes_element(name),
            "element {} is not in the transcript manifest",
            name
        );
        self.elements.insert(name.to_string(), bytes);
    }

    /// Hashes the current round closed: absorbs the previous challenge
    /// and every element the manifest declares for this round, stores the
    /// digest under `challenge_name`.
    pub fn apply_fiat_shamir(&mut self, challenge_name: &str) {
        let round = &self.manifest.rounds[self.current_round];
        debug_assert_eq!(
            round.challenge, challenge_name,
            "challenge schedule mismatch"
        );

        let mut hasher = Blake2s::new();
        hasher.input(&self.previous_challenge);
        for entry in &round.elements {
            if entry.num_bytes == 0 {
                continue;
            }
            let data = self
                .elements
                .get(&entry.name)
                .unwrap_or_else(|| panic!("transcript element {} missing", entry.name));
            hasher.input(data);
        }
        let digest = hasher.result();
        let mut challenge = [0u8; 32];
        challenge.copy_from_slice(&digest);

        self.challenges.insert(challenge_name.to_string(), challenge);
        self.previous_challenge = challenge.to_vec();
        self.current_round += 1;
    }

    pub fn get_challenge(&self, name: &str) -> &[u8; 32] {
        self.challenges
            .get(name)
            .unwrap_or_else(|| panic!("challenge {} has not been generated", name))
    }

    /// A challenge as a scalar field element.
    pub fn get_challenge_fr(&self, name: &str) -> Fr {
        fr_from_wide_bytes(self.get_challenge(name))
    }

    pub fn get_element(&self, name: &str) -> &[u8] {
        self.elements
            .get(name)
            .unwrap_or_else(|| panic!("transcript element {} missing", name))
    }

    pub fn has_element(&self, name: &str) -> bool {
        self.elements.contains_key(name)
    }

    pub fn get_field_element(&self, name: &str) -> Fr {
        read_fr(self.get_element(name))
    }

    pub fn get_g1_element(&self, name: &str) -> Result<G1Affine, Error> {
        read_g1(self.get_element(name)).ok_or_else(|| Error::PointNotOnCurve(name.to_string()))
    }

    /// Serializes every non-derived element in manifest order: the proof
    /// wire format.
    pub fn export_transcript(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.manifest.proof_size());
        for round in &self.manifest.rounds {
            for entry in &round.elements {
                if entry.derived_by_verifier {
                    continue;
                }
                let data = self
                    .elements
                    .get(&entry.name)
                    .unwrap_or_else(|| panic!("transcript element {} missing", entry.name));
                debug_assert_eq!(data.len(), entry.num_bytes);
                out.extend_from_slice(data);
            }
        }
        out
    }
}

/// Reduces 32 uniform bytes into Fr: big-endian interpretation followed by
/// subtraction of the modulus (at most a handful of times, since
/// `2^256 / r` is small).
fn fr_from_wide_bytes(bytes: &[u8; 32]) -> Fr {
    let mut repr = BigInteger256::from_bytes_be(bytes);
    while repr >= FrParameters::MODULUS {
        repr.sub_noborrow(&FrParameters::MODULUS);
    }
    Fr::from_repr(repr)
}

/// Fr on the wire: canonical form, big-endian.
pub fn write_fr(element: &Fr) -> Vec<u8> {
    element.into_repr().to_bytes_be().to_vec()
}

pub fn read_fr(bytes: &[u8]) -> Fr {
    debug_assert_eq!(bytes.len(), FR_SERIALIZED_SIZE);
    let mut buf = [0u8; 32];
    buf.copy_from_slice(bytes);
    Fr::from_repr(BigInteger256::from_bytes_be(&buf))
}

/// G1 on the wire: affine `(x, y)` in canonical big-endian form, with the
/// point at infinity flagged by the top bit of y's first byte.
pub fn write_g1(point: &G1Affine) -> Vec<u8> {
    let mut out = Vec::with_capacity(G1_SERIALIZED_SIZE);
    if point.infinity {
        out.extend_from_slice(&[0u8; 32]);
        let mut y = [0u8; 32];
        y[0] = 0x80;
        out.extend_from_slice(&y);
    } else {
        out.extend_from_slice(&point.x.into_repr().to_bytes_be());
        out.extend_from_slice(&point.y.into_repr().to_bytes_be());
    }
    out
}

pub fn read_g1(bytes: &[u8]) -> Option<G1Affine> {
    use algebra::AffineCurve;
    debug_assert_eq!(bytes.len(), G1_SERIALIZED_SIZE);
    let mut y_bytes = [0u8; 32];
    y_bytes.copy_from_slice(&bytes[32..]);

    if y_bytes[0] & 0x80 != 0 {
        return Some(G1Affine::zero());
    }

    let mut x_bytes = [0u8; 32];
    x_bytes.copy_from_slice(&bytes[..32]);
    let x_repr = BigInteger256::from_bytes_be(&x_bytes);
    let y_repr = BigInteger256::from_bytes_be(&y_bytes);
    if x_repr >= <Fq as PrimeField>::Params::MODULUS || y_repr >= <Fq as PrimeField>::Params::MODULUS
    {
        return None;
    }

    let x = Fq::from_repr(x_repr);
    let y = Fq::from_repr(y_repr);
    if x.is_zero() && y.is_zero() {
        return Some(G1Affine::zero());
    }
    let point = G1Affine::new(x, y, false);
    if point.is_on_curve() {
        Some(point)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algebra::{AffineCurve, ProjectiveCurve, UniformRand};
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    fn tiny_manifest() -> Manifest {
        Manifest::new(vec![
            RoundManifest::new(vec![ManifestEntry::new("a", 4, false)], "first"),
            RoundManifest::new(
                vec![
                    ManifestEntry::new("b", FR_SERIALIZED_SIZE, false),
                    ManifestEntry::new("c", FR_SERIALIZED_SIZE, true),
                ],
                "second",
            ),
        ])
    }

    #[test]
    fn challenges_are_deterministic() {
        let make = || {
            let mut t = Transcript::new(tiny_manifest());
            t.add_element("a", vec![1, 2, 3, 4]);
            t.apply_fiat_shamir("first");
            t.add_element("b", write_fr(&Fr::from(7)));
            t.add_element("c", write_fr(&Fr::from(9)));
            t.apply_fiat_shamir("second");
            (*t.get_challenge("first"), *t.get_challenge("second"))
        };
        assert_eq!(make(), make());
    }

    #[test]
    fn challenges_depend_on_elements() {
        let mut t1 = Transcript::new(tiny_manifest());
        t1.add_element("a", vec![1, 2, 3, 4]);
        t1.apply_fiat_shamir("first");

        let mut t2 = Transcript::new(tiny_manifest());
        t2.add_element("a", vec![1, 2, 3, 5]);
        t2.apply_fiat_shamir("first");

        assert_ne!(t1.get_challenge("first"), t2.get_challenge("first"));
    }

    #[test]
    fn export_skips_derived_elements() {
        let mut t = Transcript::new(tiny_manifest());
        t.add_element("a", vec![1, 2, 3, 4]);
        t.apply_fiat_shamir("first");
        t.add_element("b", write_fr(&Fr::from(7)));
        t.add_element("c", write_fr(&Fr::from(9)));
        t.apply_fiat_shamir("second");

        let exported = t.export_transcript();
        assert_eq!(exported.len(), 4 + FR_SERIALIZED_SIZE);

        let recovered = Transcript::from_proof(tiny_manifest(), &exported).unwrap();
        assert_eq!(recovered.get_element("a"), &[1, 2, 3, 4][..]);
        assert_eq!(recovered.get_field_element("b"), Fr::from(7));
    }

    #[test]
    fn g1_round_trip() {
        let mut rng = XorShiftRng::seed_from_u64(55);
        for _ in 0..10 {
            let p = algebra::G1Projective::rand(&mut rng).into_affine();
            assert_eq!(read_g1(&write_g1(&p)).unwrap(), p);
        }
        let inf = G1Affine::zero();
        assert!(read_g1(&write_g1(&inf)).unwrap().is_zero());
    }

    #[test]
    fn off_curve_point_is_rejected() {
        let mut rng = XorShiftRng::seed_from_u64(56);
        let p = algebra::G1Projective::rand(&mut rng).into_affine();
        let mut bytes = write_g1(&p);
        bytes[63] ^= 1;
        assert!(read_g1(&bytes).is_none());
    }
}
