use crate::biginteger::BigInteger256;
use crate::fields::{Field, Fq, Fq2};
use crate::UniformRand;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use num_traits::{One, Zero};
use rand::Rng;

/// The cubic extension Fq2[v]/(v^3 - xi), xi = 9 + i.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug)]
pub struct Fq6 {
    pub c0: Fq2,
    pub c1: Fq2,
    pub c2: Fq2,
}

const fn fq2_const(c0: [u64; 4], c1: [u64; 4]) -> Fq2 {
    Fq2::new(
        Fq::new(BigInteger256::new(c0)),
        Fq::new(BigInteger256::new(c1)),
    )
}

/// xi^((p^k - 1)/3) for k = 1, 2, 3: the coefficients multiplying c1 under
/// the k-th Frobenius map.
#[rustfmt::skip]
pub const FROBENIUS_COEFF_C1: [Fq2; 3] = [
    fq2_const(
        [0xb5773b104563ab30, 0x347f91c8a9aa6454, 0x7a007127242e0991, 0x1956bcd8118214ec],
        [0x6e849f1ea0aa4757, 0xaa1c7b6d89f89141, 0xb6e713cdfae0ca3a, 0x26694fbb4e82ebc3],
    ),
    fq2_const(
        [0x3350c88e13e80b9c, 0x7dce557cdb5e56b9, 0x6001b4b8b615564a, 0x2682e617020217e0],
        [0, 0, 0, 0],
    ),
    fq2_const(
        [0xc9af22f716ad6bad, 0xb311782a4aa662b2, 0x19eeaf64e248c7f4, 0x20273e77e3439f82],
        [0xacc02860f7ce93ac, 0x3933d5817ba76b4c, 0x69e6188b446c8467, 0x0a46036d4417cc55],
    ),
];

/// xi^((2p^k - 2)/3) for k = 1, 2, 3: the coefficients multiplying c2.
#[rustfmt::skip]
pub const FROBENIUS_COEFF_C2: [Fq2; 3] = [
    fq2_const(
        [0x7361d77f843abe92, 0xa5bb2bd3273411fb, 0x9c941f314b3e2399, 0x15df9cddbb9fd3ec],
        [0x5dddfd154bd8c949, 0x62cb29a5a4445b60, 0x37bc870a0c7dd2b9, 0x24830a9d3171f0fd],
    ),
    fq2_const(
        [0x71930c11d782e155, 0xa6bb947cffbe3323, 0xaa303344d4741444, 0x2c3b3f0d26594943],
        [0, 0, 0, 0],
    ),
    fq2_const(
        [0x448a93a57b6762df, 0xbfd62df528fdeadf, 0xd858f5d00e9bd47a, 0x06b03d4d3476ec58],
        [0x2b19daf4bcc936d1, 0xa1a54e7a56f4299f, 0xb533eee05adeaef1, 0x170c812b84dda0b2],
    ),
];

impl Fq6 {
    #[inline]
    pub const fn new(c0: Fq2, c1: Fq2, c2: Fq2) -> Self {
        Fq6 { c0, c1, c2 }
    }

    /// Multiplication by v: `(c0, c1, c2) -> (xi * c2, c0, c1)`.
    #[inline]
    pub fn mul_by_nonresidue(&self) -> Self {
        Fq6 {
            c0: self.c2.mul_by_non_residue(),
            c1: self.c0,
            c2: self.c1,
        }
    }

    #[inline]
    pub fn mul_by_fq2(&self, other: &Fq2) -> Self {
        Fq6 {
            c0: self.c0 * other,
            c1: self.c1 * other,
            c2: self.c2 * other,
        }
    }
}

impl Zero for Fq6 {
    #[inline]
    fn zero() -> Self {
        Fq6::new(Fq2::zero(), Fq2::zero(), Fq2::zero())
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.c0.is_zero() && self.c1.is_zero() && self.c2.is_zero()
    }
}

impl One for Fq6 {
    #[inline]
    fn one() -> Self {
        Fq6::new(Fq2::one(), Fq2::zero(), Fq2::zero())
    }

    #[inline]
    fn is_one(&self) -> bool {
        self.c0.is_one() && self.c1.is_zero() && self.c2.is_zero()
    }
}

impl Field for Fq6 {
    #[inline]
    fn double(&self) -> Self {
        Fq6 {
            c0: self.c0.double(),
            c1: self.c1.double(),
            c2: self.c2.double(),
        }
    }

    #[inline]
    fn double_in_place(&mut self) -> &mut Self {
        self.c0.double_in_place();
        self.c1.double_in_place();
        self.c2.double_in_place();
        self
    }

    #[inline]
    fn square(&self) -> Self {
        // Devegili-OhEigeartaigh-Scott-Dahab, CH-SQR2.
        let s0 = self.c0.square();
        let ab = self.c0 * self.c1;
        let s1 = ab.double();
        let s2 = (self.c0 + self.c2 - self.c1).square();
        let bc = self.c1 * self.c2;
        let s3 = bc.double();
        let s4 = self.c2.square();

        Fq6 {
            c0: s3.mul_by_non_residue() + s0,
            c1: s4.mul_by_non_residue() + s1,
            c2: s1 + s2 + s3 - s0 - s4,
        }
    }

    #[inline]
    fn square_in_place(&mut self) -> &mut Self {
        *self = self.square();
        self
    }

    #[inline]
    fn inverse(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        // Devegili et al., Algorithm 17.
        let t0 = self.c0.square();
        let t1 = self.c1.square();
        let t2 = self.c2.square();
        let t3 = self.c0 * self.c1;
        let t4 = self.c0 * self.c2;
        let t5 = self.c1 * self.c2;

        let n0 = t0 - t5.mul_by_non_residue();
        let n1 = t2.mul_by_non_residue() - t3;
        let n2 = t1 - t4;

        let mut den = (self.c2 * n1 + self.c1 * n2).mul_by_non_residue();
        den += &(self.c0 * n0);

        den.inverse().map(|t| Fq6 {
            c0: n0 * t,
            c1: n1 * t,
            c2: n2 * t,
        })
    }

    #[inline]
    fn inverse_in_place(&mut self) -> Option<&mut Self> {
        if let Some(inv) = self.inverse() {
            *self = inv;
            Some(self)
        } else {
            None
        }
    }

    fn frobenius_map(&mut self, power: usize) {
        match power {
            0 => (),
            1 | 2 | 3 => {
                self.c0.frobenius_map(power);
                self.c1.frobenius_map(power);
                self.c2.frobenius_map(power);
                self.c1 *= &FROBENIUS_COEFF_C1[power - 1];
                self.c2 *= &FROBENIUS_COEFF_C2[power - 1];
            },
            _ => {
                for _ in 0..(power % 6) {
                    self.frobenius_map(1);
                }
            },
        }
    }
}

impl Neg for Fq6 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Fq6 {
            c0: -self.c0,
            c1: -self.c1,
            c2: -self.c2,
        }
    }
}

impl<'a> AddAssign<&'a Self> for Fq6 {
    #[inline]
    fn add_assign(&mut self, other: &Self) {
        self.c0 += &other.c0;
        self.c1 += &other.c1;
        self.c2 += &other.c2;
    }
}

impl<'a> SubAssign<&'a Self> for Fq6 {
    #[inline]
    fn sub_assign(&mut self, other: &Self) {
        self.c0 -= &other.c0;
        self.c1 -= &other.c1;
        self.c2 -= &other.c2;
    }
}

impl<'a> MulAssign<&'a Self> for Fq6 {
    #[inline]
    fn mul_assign(&mut self, other: &Self) {
        // Karatsuba over Fq2: 6 Fq2 multiplications.
        let t0 = self.c0 * other.c0;
        let t1 = self.c1 * other.c1;
        let t2 = self.c2 * other.c2;

        let t3 = (self.c0 + self.c2) * (other.c0 + other.c2);
        let t4 = (self.c0 + self.c1) * (other.c0 + other.c1);
        let t5 = (self.c1 + self.c2) * (other.c1 + other.c2);

        self.c0 = (t5 - t1 - t2).mul_by_non_residue() + t0;
        self.c1 = t4 - t0 - t1 + t2.mul_by_non_residue();
        self.c2 = t3 - (t0 + t2 - t1);
    }
}

impl_ops_from_ref!(Fq6);

impl UniformRand for Fq6 {
    #[inline]
    fn rand<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Fq6::new(Fq2::rand(rng), Fq2::rand(rng), Fq2::rand(rng))
    }
}

impl core::fmt::Display for Fq6 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Fq6({}, {}, {})", self.c0, self.c1, self.c2)
    }
}
