use crate::biginteger::{arithmetic as fa, BigInteger256};
use crate::fields::{Field, FpParameters, LegendreSymbol, PrimeField, SquareRootField};
use crate::UniformRand;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use num_traits::{One, Zero};
use rand::Rng;
use unroll::unroll_for_loops;

/// Parameters of the BN254 base field,
/// p = 21888242871839275222246405745257275088696311157297823662689037894645226208583.
pub struct FqParameters;

impl FpParameters for FqParameters {
    #[rustfmt::skip]
    const MODULUS: BigInteger256 = BigInteger256::new([
        0x3c208c16d87cfd47,
        0x97816a916871ca8d,
        0xb85045b68181585d,
        0x30644e72e131a029,
    ]);

    #[rustfmt::skip]
    const MODULUS_TIMES_TWO: BigInteger256 = BigInteger256::new([
        0x7841182db0f9fa8e,
        0x2f02d522d0e3951a,
        0x70a08b6d0302b0bb,
        0x60c89ce5c2634053,
    ]);

    const MODULUS_BITS: u32 = 254;

    const REPR_SHAVE_BITS: u32 = 2;

    #[rustfmt::skip]
    const R: BigInteger256 = BigInteger256::new([
        0xd35d438dc58f0d9d,
        0x0a78eb28f5c70b3d,
        0x666ea36f7879462c,
        0x0e0a77c19a07df2f,
    ]);

    #[rustfmt::skip]
    const R2: BigInteger256 = BigInteger256::new([
        0xf32cfc5b538afa89,
        0xb5e71911d44501fb,
        0x47ab1eff0a417ff6,
        0x06d89f71cab8351f,
    ]);

    const INV: u64 = 0x87d20782e4866389;

    /// GENERATOR = 3 (in Montgomery form).
    #[rustfmt::skip]
    const GENERATOR: BigInteger256 = BigInteger256::new([
        0x7a17caa950ad28d7,
        0x1f6ac17ae15521b9,
        0x334bea4e696bd284,
        0x2a1f6744ce179d8e,
    ]);

    /// p = 2t + 1 with t odd; there is no usable FFT domain over Fq.
    const TWO_ADICITY: u32 = 1;

    /// The 2nd root of unity, i.e. -1 (in Montgomery form).
    #[rustfmt::skip]
    const ROOT_OF_UNITY: BigInteger256 = BigInteger256::new([
        0x68c3488912edefaa,
        0x8d087f6872aabf4f,
        0x51e1a24709081231,
        0x2259d6b14729c0fa,
    ]);

    #[rustfmt::skip]
    const T: BigInteger256 = BigInteger256::new([
        0x9e10460b6c3e7ea3,
        0xcbc0b548b438e546,
        0xdc2822db40c0ac2e,
        0x183227397098d014,
    ]);

    #[rustfmt::skip]
    const T_MINUS_ONE_DIV_TWO: BigInteger256 = BigInteger256::new([
        0x4f082305b61f3f51,
        0x65e05aa45a1c72a3,
        0x6e14116da0605617,
        0x0c19139cb84c680a,
    ]);

    #[rustfmt::skip]
    const MODULUS_MINUS_ONE_DIV_TWO: BigInteger256 = BigInteger256::new([
        0x9e10460b6c3e7ea3,
        0xcbc0b548b438e546,
        0xdc2822db40c0ac2e,
        0x183227397098d014,
    ]);
}

impl_prime_field!(Fq, FqParameters);

impl Fq {
    /// A primitive cube root of unity (in Montgomery form): the
    /// x-coordinate scaling of the curve endomorphism used to expand the
    /// Pippenger point table.
    #[rustfmt::skip]
    pub const CUBE_ROOT: Fq = Fq::new(BigInteger256::new([
        0x71930c11d782e155,
        0xa6bb947cffbe3323,
        0xaa303344d4741444,
        0x2c3b3f0d26594943,
    ]));

    /// 2^{-1} (in Montgomery form); used by the pairing's doubling step.
    #[rustfmt::skip]
    pub const TWO_INV: Fq = Fq::new(BigInteger256::new([
        0x87bee7d24f060572,
        0xd0fd2add2f1c6ae5,
        0x8f5f7492fcfd4f44,
        0x1f37631a3d9cbfac,
    ]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    #[test]
    fn constants() {
        assert_eq!(Fq::TWO_INV, Fq::from(2).inverse().unwrap());
        let mut beta = Fq::CUBE_ROOT;
        assert!(!beta.is_one());
        beta = beta * Fq::CUBE_ROOT * Fq::CUBE_ROOT;
        assert!(beta.is_one());
    }

    #[test]
    fn montgomery_round_trip() {
        let mut rng = XorShiftRng::seed_from_u64(0);
        for _ in 0..100 {
            let a = Fq::rand(&mut rng);
            assert_eq!(Fq::from_repr(a.into_repr()), a);
        }
    }
}
