use crate::biginteger::{arithmetic as fa, BigInteger256};
use crate::fields::{Field, FpParameters, LegendreSymbol, PrimeField, SquareRootField};
use crate::UniformRand;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use num_traits::{One, Zero};
use rand::Rng;
use unroll::unroll_for_loops;

/// Parameters of the BN254 scalar field,
/// r = 21888242871839275222246405745257275088548364400416034343698204186575808495617.
pub struct FrParameters;

impl FpParameters for FrParameters {
    #[rustfmt::skip]
    const MODULUS: BigInteger256 = BigInteger256::new([
        0x43e1f593f0000001,
        0x2833e84879b97091,
        0xb85045b68181585d,
        0x30644e72e131a029,
    ]);

    #[rustfmt::skip]
    const MODULUS_TIMES_TWO: BigInteger256 = BigInteger256::new([
        0x87c3eb27e0000002,
        0x5067d090f372e122,
        0x70a08b6d0302b0ba,
        0x60c89ce5c2634053,
    ]);

    const MODULUS_BITS: u32 = 254;

    const REPR_SHAVE_BITS: u32 = 2;

    #[rustfmt::skip]
    const R: BigInteger256 = BigInteger256::new([
        0xac96341c4ffffffb,
        0x36fc76959f60cd29,
        0x666ea36f7879462e,
        0x0e0a77c19a07df2f,
    ]);

    #[rustfmt::skip]
    const R2: BigInteger256 = BigInteger256::new([
        0x1bb8e645ae216da7,
        0x53fe3ab1e35c59e3,
        0x8c49833d53bb8085,
        0x0216d0b17f4e44a5,
    ]);

    const INV: u64 = 0xc2e1f593efffffff;

    /// GENERATOR = 5, the smallest quadratic non-residue (Montgomery form).
    #[rustfmt::skip]
    const GENERATOR: BigInteger256 = BigInteger256::new([
        0x1b0d0ef99fffffe6,
        0xeaba68a3a32a913f,
        0x47d8eb76d8dd0689,
        0x15d0085520f5bbc3,
    ]);

    const TWO_ADICITY: u32 = 28;

    /// A primitive 2^28-th root of unity, GENERATOR^T (Montgomery form).
    #[rustfmt::skip]
    const ROOT_OF_UNITY: BigInteger256 = BigInteger256::new([
        0x636e735580d13d9c,
        0xa22bf3742445ffd6,
        0x56452ac01eb203d8,
        0x1860ef942963f9e7,
    ]);

    #[rustfmt::skip]
    const T: BigInteger256 = BigInteger256::new([
        0x9b9709143e1f593f,
        0x181585d2833e8487,
        0x131a029b85045b68,
        0x000000030644e72e,
    ]);

    #[rustfmt::skip]
    const T_MINUS_ONE_DIV_TWO: BigInteger256 = BigInteger256::new([
        0xcdcb848a1f0fac9f,
        0x0c0ac2e9419f4243,
        0x098d014dc2822db4,
        0x0000000183227397,
    ]);

    #[rustfmt::skip]
    const MODULUS_MINUS_ONE_DIV_TWO: BigInteger256 = BigInteger256::new([
        0xa1f0fac9f8000000,
        0x9419f4243cdcb848,
        0xdc2822db40c0ac2e,
        0x183227397098d014,
    ]);
}

impl_prime_field!(Fr, FrParameters);

/// Babai-rounding constants for the GLV scalar split. `ENDO_G1` and
/// `ENDO_G2` are `floor(2^256 * b / r)` for the two short lattice-basis
/// coordinates; `ENDO_MINUS_B1` and `ENDO_B2` are the coordinates
/// themselves.
#[rustfmt::skip]
const ENDO_G1: [u64; 4] = [0x7a7bd9d4391eb18d, 0x4ccef014a773d2cf, 0x0000000000000002, 0];
#[rustfmt::skip]
const ENDO_G2: [u64; 4] = [0xd91d232ec7e0b3d7, 0x0000000000000002, 0, 0];
#[rustfmt::skip]
const ENDO_MINUS_B1: [u64; 4] = [0x8211bbeb7d4f1128, 0x6f4d8248eeb859fc, 0, 0];
#[rustfmt::skip]
const ENDO_B2: [u64; 4] = [0x89d3256894d213e3, 0, 0, 0];

impl Fr {
    /// The cube root of unity lambda satisfying `lambda * P = (beta * P.x,
    /// P.y)` on G1 (Montgomery form).
    #[rustfmt::skip]
    pub const CUBE_ROOT: Fr = Fr::new(BigInteger256::new([
        0x93e7cede4a0329b3,
        0x7d4fdca77a96c167,
        0x8be4ba08b19a750a,
        0x1cbd5653a5661c25,
    ]));

    /// The inverse of the multiplicative generator (Montgomery form),
    /// used to undo coset shifts after an inverse FFT.
    #[rustfmt::skip]
    pub const GENERATOR_INV: Fr = Fr::new(BigInteger256::new([
        0xd745397409999999,
        0xb4ada7d483c3efa8,
        0xc49ca2f8e57f3161,
        0x162a3754ac156cb3,
    ]));

    /// Splits `k` into `(k1, k2)` with `k = k1 - k2 * lambda (mod r)` and
    /// both halves below 2^128, so that a scalar multiplication can run
    /// over the endomorphism-expanded point table at half the bit width.
    pub fn split_into_endomorphism_scalars(&self) -> (BigInteger256, BigInteger256) {
        let input = self.into_repr();

        let wide_c1 = fa::mul_512(&ENDO_G2, &input.0);
        let wide_c2 = fa::mul_512(&ENDO_G1, &input.0);

        let c1 = [wide_c1[4], wide_c1[5], wide_c1[6], wide_c1[7]];
        let c2 = [wide_c2[4], wide_c2[5], wide_c2[6], wide_c2[7]];

        let wide_q1 = fa::mul_512(&c1, &ENDO_MINUS_B1);
        let wide_q2 = fa::mul_512(&c2, &ENDO_B2);

        let q1 = BigInteger256::new([wide_q1[0], wide_q1[1], wide_q1[2], wide_q1[3]]);
        let mut t1 = BigInteger256::new([wide_q2[0], wide_q2[1], wide_q2[2], wide_q2[3]]);
        // Wrapping subtraction mod 2^256; the Babai bound keeps the true
        // value below 2^128.
        t1.sub_noborrow(&q1);

        let k2 = t1;
        let k1 = (*self + Fr::from_repr(t1) * Fr::CUBE_ROOT).into_repr();

        debug_assert!(k1.0[2] == 0 && k1.0[3] == 0);
        debug_assert!(k2.0[2] == 0 && k2.0[3] == 0);
        (k1, k2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    #[test]
    fn lambda_is_a_cube_root_of_unity() {
        let l = Fr::CUBE_ROOT;
        assert!(!l.is_one());
        assert!((l * l * l).is_one());
    }

    #[test]
    fn endomorphism_split_recomposes() {
        let mut rng = XorShiftRng::seed_from_u64(1234);
        for _ in 0..200 {
            let k = Fr::rand(&mut rng);
            let (k1, k2) = k.split_into_endomorphism_scalars();
            let recomposed = Fr::from_repr(k1) - Fr::from_repr(k2) * Fr::CUBE_ROOT;
            assert_eq!(recomposed, k);
        }
    }

    #[test]
    fn root_of_unity_has_exact_order() {
        let omega = Fr::root_of_unity();
        let mut acc = omega;
        for _ in 0..27 {
            acc.square_in_place();
        }
        // omega^(2^27) = -1, omega^(2^28) = 1
        assert!(!acc.is_one());
        acc.square_in_place();
        assert!(acc.is_one());
    }

    #[test]
    fn generator_inverse() {
        assert_eq!(
            Fr::multiplicative_generator() * Fr::GENERATOR_INV,
            Fr::one()
        );
    }
}
