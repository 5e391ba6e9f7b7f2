//! Loader for the structured reference string: a trusted-setup transcript
//! file holding G1 monomials and the single G2 element the verifier pairs
//! against.

use crate::error::Error;
use algebra::biginteger::BigInteger256;
use algebra::curves::pairing::{precompute_miller_lines, MillerLines};
use algebra::fields::FpParameters;
use algebra::msm::generate_pippenger_point_table;
use algebra::{AffineCurve, Fq, Fq2, Fr, G1Affine, G2Affine, PrimeField, ProjectiveCurve};
use byteorder::{BigEndian, ReadBytesExt};
use num_traits::{One, Zero};
use std::path::Path;

const MANIFEST_SIZE: usize = 7 * 4;
const G1_POINT_SIZE: usize = 64;
const G2_POINT_SIZE: usize = 128;
const BLAKE2B_CHECKSUM_LENGTH: usize = 64;

/// The big-endian header at the front of every setup transcript file.
#[derive(Debug, Clone, Copy)]
pub struct SrsManifest {
    pub transcript_number: u32,
    pub total_transcripts: u32,
    pub total_g1_points: u32,
    pub total_g2_points: u32,
    pub num_g1_points: u32,
    pub num_g2_points: u32,
    pub start_from: u32,
}

/// The prover/verifier view of the trusted setup: `degree` G1 monomials
/// expanded into the 2x Pippenger endomorphism table, plus `[x]_2` and the
/// Miller lines for both pairing arguments of the KZG check.
pub struct ReferenceString {
    pub degree: usize,
    /// `2 * degree` entries: `{ [x^i]_1, -lambda * [x^i]_1 }`.
    pub monomials: Vec<G1Affine>,
    pub g2_x: G2Affine,
    /// Line precomputations for `[1]_2` and `[x]_2`, in that order.
    pub g2_lines: Vec<MillerLines>,
}

impl ReferenceString {
    /// Reads the first `degree` G1 monomials (the generator plus
    /// `degree - 1` points from the file) and the second G2 point. The
    /// Blake2b checksum trailer is validated by external tooling and
    /// skipped here; every size mismatch fails before any commitment can
    /// be attempted.
    pub fn read_from_path<P: AsRef<Path>>(degree: usize, path: P) -> Result<Self, Error> {
        let data = std::fs::read(path)?;
        Self::read_from_buffer(degree, &data)
    }

    pub fn read_from_buffer(degree: usize, data: &[u8]) -> Result<Self, Error> {
        if data.len() < MANIFEST_SIZE {
            return Err(Error::InvalidSrs("file shorter than manifest".into()));
        }
        let manifest = read_manifest(&data[..MANIFEST_SIZE])?;

        if (manifest.num_g1_points as usize) < degree.saturating_sub(1) {
            return Err(Error::SrsTooSmall {
                required: degree - 1,
                actual: manifest.num_g1_points as usize,
            });
        }
        if manifest.num_g2_points < 2 {
            return Err(Error::InvalidSrs("transcript holds fewer than 2 G2 points".into()));
        }

        let g1_section = manifest.num_g1_points as usize * G1_POINT_SIZE;
        let g2_section = manifest.num_g2_points as usize * G2_POINT_SIZE;
        let expected_len = MANIFEST_SIZE + g1_section + g2_section + BLAKE2B_CHECKSUM_LENGTH;
        if data.len() < expected_len {
            return Err(Error::InvalidSrs(format!(
                "file is {} bytes, manifest declares {}",
                data.len(),
                expected_len
            )));
        }

        // First monomial is the plain generator; the file stores x^1
        // onwards.
        let mut monomials = vec![G1Affine::zero(); 2 * degree];
        monomials[0] = G1Affine::prime_subgroup_generator();
        let g1_bytes = &data[MANIFEST_SIZE..MANIFEST_SIZE + g1_section];
        for i in 1..degree {
            let offset = (i - 1) * G1_POINT_SIZE;
            monomials[i] = read_g1_element(&g1_bytes[offset..offset + G1_POINT_SIZE])?;
        }

        let g2_bytes = &data[MANIFEST_SIZE + g1_section..MANIFEST_SIZE + g1_section + g2_section];
        let g2_x = read_g2_element(&g2_bytes[G2_POINT_SIZE..2 * G2_POINT_SIZE])?;

        generate_pippenger_point_table(&mut monomials, degree);

        Ok(Self::from_parts(degree, monomials, g2_x))
    }

    /// Deterministic reference string from an explicit secret, for tests
    /// and local experimentation only: a real deployment loads a
    /// ceremony transcript.
    pub fn new_from_secret(degree: usize, x: Fr) -> Self {
        let g1 = G1Affine::prime_subgroup_generator();
        let mut accumulators = Vec::with_capacity(degree);
        let mut acc = Fr::one();
        for _ in 0..degree {
            accumulators.push(acc);
            acc *= x;
        }

        let projective: Vec<_> = accumulators
            .iter()
            .map(|s| g1.mul(s.into_repr()))
            .collect();
        let mut monomials = vec![G1Affine::zero(); 2 * degree];
        let affine = algebra::G1Projective::batch_normalization(&projective);
        monomials[..degree].copy_from_slice(&affine);
        generate_pippenger_point_table(&mut monomials, degree);

        let g2_x = G2Affine::prime_subgroup_generator()
            .mul(x.into_repr())
            .into_affine();

        Self::from_parts(degree, monomials, g2_x)
    }

    fn from_parts(degree: usize, monomials: Vec<G1Affine>, g2_x: G2Affine) -> Self {
        let mut lines_one = MillerLines::default();
        precompute_miller_lines(&G2Affine::prime_subgroup_generator(), &mut lines_one);
        let mut lines_x = MillerLines::default();
        precompute_miller_lines(&g2_x, &mut lines_x);

        ReferenceString {
            degree,
            monomials,
            g2_x,
            g2_lines: vec![lines_one, lines_x],
        }
    }
}

fn read_manifest(bytes: &[u8]) -> Result<SrsManifest, Error> {
    let mut rdr = bytes;
    Ok(SrsManifest {
        transcript_number: rdr.read_u32::<BigEndian>()?,
        total_transcripts: rdr.read_u32::<BigEndian>()?,
        total_g1_points: rdr.read_u32::<BigEndian>()?,
        total_g2_points: rdr.read_u32::<BigEndian>()?,
        num_g1_points: rdr.read_u32::<BigEndian>()?,
        num_g2_points: rdr.read_u32::<BigEndian>()?,
        start_from: rdr.read_u32::<BigEndian>()?,
    })
}

/// One Fq coordinate: four big-endian u64 limbs, most significant first,
/// in non-Montgomery form.
fn read_fq(bytes: &mut &[u8]) -> Result<Fq, Error> {
    let mut limbs = [0u64; 4];
    for limb in limbs.iter_mut().rev() {
        *limb = bytes.read_u64::<BigEndian>()?;
    }
    let repr = BigInteger256::new(limbs);
    if repr >= <Fq as PrimeField>::Params::MODULUS {
        return Err(Error::InvalidSrs("coordinate exceeds field modulus".into()));
    }
    Ok(Fq::from_repr(repr))
}

fn read_g1_element(bytes: &[u8]) -> Result<G1Affine, Error> {
    let mut rdr = bytes;
    let x = read_fq(&mut rdr)?;
    let y = read_fq(&mut rdr)?;
    let point = G1Affine::new(x, y, false);
    if !point.is_on_curve() {
        return Err(Error::InvalidSrs("G1 monomial is not on the curve".into()));
    }
    Ok(point)
}

fn read_g2_element(bytes: &[u8]) -> Result<G2Affine, Error> {
    let mut rdr = bytes;
    let x_c0 = read_fq(&mut rdr)?;
    let x_c1 = read_fq(&mut rdr)?;
    let y_c0 = read_fq(&mut rdr)?;
    let y_c1 = read_fq(&mut rdr)?;
    let point = G2Affine::new(Fq2::new(x_c0, x_c1), Fq2::new(y_c0, y_c1), false);
    if !point.is_on_curve() {
        return Err(Error::InvalidSrs("G2 element is not on the curve".into()));
    }
    Ok(point)
}

/// Serializes a reference string into the on-disk transcript format; the
/// inverse of `read_from_buffer`, used by tests and local tooling.
pub fn write_transcript_buffer(srs: &ReferenceString) -> Vec<u8> {
    let num_g1 = (srs.degree - 1) as u32;
    let mut out = Vec::new();
    for word in [1u32, 1, num_g1, 2, num_g1, 2, 0] {
        out.extend_from_slice(&word.to_be_bytes());
    }
    let write_fq = |out: &mut Vec<u8>, c: &Fq| {
        for limb in c.into_repr().0.iter().rev() {
            out.extend_from_slice(&limb.to_be_bytes());
        }
    };
    for i in 1..srs.degree {
        let p = &srs.monomials[2 * i];
        write_fq(&mut out, &p.x);
        write_fq(&mut out, &p.y);
    }
    // Two G2 points: the generator, then [x]_2.
    for p in [&G2Affine::prime_subgroup_generator(), &srs.g2_x] {
        write_fq(&mut out, &p.x.c0);
        write_fq(&mut out, &p.x.c1);
        write_fq(&mut out, &p.y.c0);
        write_fq(&mut out, &p.y.c1);
    }
    out.extend_from_slice(&[0u8; BLAKE2B_CHECKSUM_LENGTH]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use algebra::UniformRand;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    #[test]
    fn transcript_file_round_trip() {
        let mut rng = XorShiftRng::seed_from_u64(21);
        let srs = ReferenceString::new_from_secret(8, Fr::rand(&mut rng));
        let buffer = write_transcript_buffer(&srs);
        let loaded = ReferenceString::read_from_buffer(8, &buffer).unwrap();

        assert_eq!(loaded.monomials, srs.monomials);
        assert_eq!(loaded.g2_x, srs.g2_x);
    }

    #[test]
    fn short_file_is_rejected() {
        let mut rng = XorShiftRng::seed_from_u64(22);
        let srs = ReferenceString::new_from_secret(8, Fr::rand(&mut rng));
        let buffer = write_transcript_buffer(&srs);
        assert!(ReferenceString::read_from_buffer(8, &buffer[..buffer.len() - 80]).is_err());
        // Asking for a higher degree than the manifest provides also
        // fails before any parsing.
        assert!(ReferenceString::read_from_buffer(64, &buffer).is_err());
    }

    #[test]
    fn monomials_are_consistent_powers() {
        let mut rng = XorShiftRng::seed_from_u64(23);
        let x = Fr::rand(&mut rng);
        let srs = ReferenceString::new_from_secret(4, x);
        let g = G1Affine::prime_subgroup_generator();
        assert_eq!(srs.monomials[0], g);
        assert_eq!(srs.monomials[2], g.mul(x.into_repr()).into_affine());
        assert_eq!(
            srs.monomials[4],
            g.mul((x * x).into_repr()).into_affine()
        );
    }

    #[test]
    fn file_io_round_trip() {
        let mut rng = XorShiftRng::seed_from_u64(24);
        let srs = ReferenceString::new_from_secret(8, Fr::rand(&mut rng));
        let buffer = write_transcript_buffer(&srs);

        let mut path = std::env::temp_dir();
        path.push(format!("plonk_srs_test_{}.transcript", std::process::id()));
        std::fs::write(&path, &buffer).unwrap();
        let loaded = ReferenceString::read_from_path(8, &path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.monomials, srs.monomials);
    }
}
