use crate::biginteger::BigInteger256;
use crate::fields::{Field, Fq, Fq2, Fq6};
use crate::UniformRand;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use num_traits::{One, Zero};
use rand::Rng;

/// The quadratic extension Fq6[w]/(w^2 - v), the pairing target group's
/// ambient field.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug)]
pub struct Fq12 {
    pub c0: Fq6,
    pub c1: Fq6,
}

/// One precomputed line of the Miller loop, in the sparse form
/// `(o, 0, vv) + w * (0, vw, 0)`.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct EllCoeffs {
    pub o: Fq2,
    pub vw: Fq2,
    pub vv: Fq2,
}

const fn fq2_const(c0: [u64; 4], c1: [u64; 4]) -> Fq2 {
    Fq2::new(
        Fq::new(BigInteger256::new(c0)),
        Fq::new(BigInteger256::new(c1)),
    )
}

/// xi^((p^k - 1)/6) for k = 1, 2, 3.
#[rustfmt::skip]
pub const FROBENIUS_COEFF: [Fq2; 3] = [
    fq2_const(
        [0xaf9ba69633144907, 0xca6b1d7387afb78a, 0x11bded5ef08a2087, 0x02f34d751a1f3a7c],
        [0xa222ae234c492d72, 0xd00f02a4565de15b, 0xdc2ff3a253dfc926, 0x10a75716b3899551],
    ),
    fq2_const(
        [0xca8d800500fa1bf2, 0xf0c5d61468b39769, 0x0e201271ad0d4418, 0x04290f65bad856e6],
        [0, 0, 0, 0],
    ),
    fq2_const(
        [0x365316184e46d97d, 0x0af7129ed4c96d9f, 0x659da72fca1009b5, 0x08116d8983a20d23],
        [0xb1df4af7c39c1939, 0x3d9f02878a73bf7f, 0x9b2220928caf0ae0, 0x26684515eff054a6],
    ),
];

impl Fq12 {
    #[inline]
    pub const fn new(c0: Fq6, c1: Fq6) -> Self {
        Fq12 { c0, c1 }
    }

    /// Multiplies by a sparse line element, saving roughly half of a full
    /// Fq12 multiplication.
    pub fn sparse_mul(&self, ell: &EllCoeffs) -> Self {
        let d0 = self.c0.c0 * ell.o;
        let d2 = self.c0.c2 * ell.vv;
        let d4 = self.c1.c1 * ell.vw;
        let t2 = self.c0.c0 + self.c1.c1;
        let t1 = self.c0.c0 + self.c0.c2;
        let s0 = self.c0.c1 + self.c1.c0 + self.c1.c2;

        let mut s1 = self.c0.c1 * ell.vv;
        let t3 = s1 + d4;
        let t4 = t3.mul_by_non_residue();
        let out_c0_c0 = t4 + d0;

        let mut t3 = self.c1.c2 * ell.vw;
        s1 += &t3;
        t3 += &d2;
        let t4 = t3.mul_by_non_residue();
        let t3 = self.c0.c1 * ell.o;
        s1 += &t3;
        let out_c0_c1 = t4 + t3;

        let t0 = ell.o + ell.vv;
        let mut t3 = t1 * t0;
        t3 -= &d0;
        t3 -= &d2;
        let t4 = self.c1.c0 * ell.vw;
        s1 += &t4;

        let t0 = self.c0.c2 + self.c1.c1;
        let out_c0_c2 = t3 + t4;

        let t1 = ell.vv + ell.vw;
        let mut t3 = t0 * t1;
        t3 -= &d2;
        t3 -= &d4;
        let t4 = t3.mul_by_non_residue();
        let t3 = self.c1.c0 * ell.o;
        s1 += &t3;
        let out_c1_c0 = t4 + t3;

        let t3 = self.c1.c2 * ell.vv;
        s1 += &t3;
        let t4 = t3.mul_by_non_residue();
        let t0 = ell.o + ell.vw;
        let mut t3 = t2 * t0;
        t3 -= &d0;
        t3 -= &d4;
        let out_c1_c1 = t4 + t3;

        let t0 = ell.o + ell.vv + ell.vw;
        let t3 = s0 * t0;
        let out_c1_c2 = t3 - s1;

        Fq12 {
            c0: Fq6::new(out_c0_c0, out_c0_c1, out_c0_c2),
            c1: Fq6::new(out_c1_c0, out_c1_c1, out_c1_c2),
        }
    }

    /// Squaring restricted to the cyclotomic subgroup, used by the final
    /// exponentiation's square-and-multiply chains.
    #[inline]
    pub fn cyclotomic_squared(&self) -> Self {
        self.square()
    }

    /// Conjugation over Fq6. Equals inversion for elements of the
    /// cyclotomic subgroup (where the norm is one).
    #[inline]
    pub fn unitary_inverse(&self) -> Self {
        Fq12 {
            c0: self.c0,
            c1: -self.c1,
        }
    }
}

impl Zero for Fq12 {
    #[inline]
    fn zero() -> Self {
        Fq12::new(Fq6::zero(), Fq6::zero())
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.c0.is_zero() && self.c1.is_zero()
    }
}

impl One for Fq12 {
    #[inline]
    fn one() -> Self {
        Fq12::new(Fq6::one(), Fq6::zero())
    }

    #[inline]
    fn is_one(&self) -> bool {
        self.c0.is_one() && self.c1.is_zero()
    }
}

impl Field for Fq12 {
    #[inline]
    fn double(&self) -> Self {
        Fq12 {
            c0: self.c0.double(),
            c1: self.c1.double(),
        }
    }

    #[inline]
    fn double_in_place(&mut self) -> &mut Self {
        self.c0.double_in_place();
        self.c1.double_in_place();
        self
    }

    #[inline]
    fn square(&self) -> Self {
        // (a + bw)^2 = (a + b)(a + vb) - ab - v(ab) + 2abw
        let t0 = self.c0 + self.c1;
        let t1 = self.c1.mul_by_nonresidue() + self.c0;
        let t2 = self.c0 * self.c1;

        let t3 = t0 * t1;
        let c1 = t2.double();
        let c0 = t3 - t2 - t2.mul_by_nonresidue();
        Fq12 { c0, c1 }
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
        // Aranha et al., Algorithm 8.
        let t0 = self.c0.square();
        let t1 = self.c1.square();
        let den = t0 - t1.mul_by_nonresidue();
        den.inverse().map(|t| Fq12 {
            c0: self.c0 * t,
            c1: -(self.c1 * t),
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
                self.c1 = self.c1.mul_by_fq2(&FROBENIUS_COEFF[power - 1]);
            },
            _ => {
                for _ in 0..(power % 12) {
                    self.frobenius_map(1);
                }
            },
        }
    }
}

impl Neg for Fq12 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Fq12 {
            c0: -self.c0,
            c1: -self.c1,
        }
    }
}

impl<'a> AddAssign<&'a Self> for Fq12 {
    #[inline]
    fn add_assign(&mut self, other: &Self) {
        self.c0 += &other.c0;
        self.c1 += &other.c1;
    }
}

impl<'a> SubAssign<&'a Self> for Fq12 {
    #[inline]
    fn sub_assign(&mut self, other: &Self) {
        self.c0 -= &other.c0;
        self.c1 -= &other.c1;
    }
}

impl<'a> MulAssign<&'a Self> for Fq12 {
    #[inline]
    fn mul_assign(&mut self, other: &Self) {
        let t0 = self.c0 * other.c0;
        let t1 = self.c1 * other.c1;
        let t2 = self.c0 + self.c1;
        let t3 = other.c0 + other.c1;

        self.c0 = t1.mul_by_nonresidue() + t0;
        self.c1 = t2 * t3 - (t0 + t1);
    }
}

impl_ops_from_ref!(Fq12);

impl UniformRand for Fq12 {
    #[inline]
    fn rand<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Fq12::new(Fq6::rand(rng), Fq6::rand(rng))
    }
}

impl core::fmt::Display for Fq12 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Fq12({}, {})", self.c0, self.c1)
    }
}
