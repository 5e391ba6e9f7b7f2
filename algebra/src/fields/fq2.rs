use crate::fields::{Field, Fq};
use crate::UniformRand;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use num_traits::{One, Zero};
use rand::Rng;

/// The quadratic extension Fq[i]/(i^2 + 1).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug)]
pub struct Fq2 {
    pub c0: Fq,
    pub c1: Fq,
}

impl Fq2 {
    #[inline]
    pub const fn new(c0: Fq, c1: Fq) -> Self {
        Fq2 { c0, c1 }
    }

    /// Scales both components by an Fq element.
    #[inline]
    pub fn mul_by_fq(&self, other: &Fq) -> Self {
        Fq2 {
            c0: self.c0 * other,
            c1: self.c1 * other,
        }
    }

    /// Multiplication by the Fq6 non-residue xi = 9 + i:
    /// `xi * (a + bi) = (9a - b) + (9b + a)i`.
    #[inline]
    pub fn mul_by_non_residue(&self) -> Self {
        let mut t0 = self.c0.double();
        t0.double_in_place();
        t0.double_in_place();
        t0 += &self.c0; // 9 a0

        let mut t1 = self.c1.double();
        t1.double_in_place();
        t1.double_in_place();
        t1 += &self.c1; // 9 a1

        Fq2 {
            c0: t0 - self.c1,
            c1: t1 + self.c0,
        }
    }

    /// Conjugation, i.e. the Frobenius endomorphism x -> x^p.
    #[inline]
    pub fn conjugate(&self) -> Self {
        Fq2 {
            c0: self.c0,
            c1: -self.c1,
        }
    }
}

impl Zero for Fq2 {
    #[inline]
    fn zero() -> Self {
        Fq2::new(Fq::zero(), Fq::zero())
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.c0.is_zero() && self.c1.is_zero()
    }
}

impl One for Fq2 {
    #[inline]
    fn one() -> Self {
        Fq2::new(Fq::one(), Fq::zero())
    }

    #[inline]
    fn is_one(&self) -> bool {
        self.c0.is_one() && self.c1.is_zero()
    }
}

impl Field for Fq2 {
    #[inline]
    fn double(&self) -> Self {
        Fq2 {
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
        // (a + bi)^2 = (a + b)(a - b) + 2abi
        let t1 = self.c0 + self.c1;
        let t2 = self.c0 - self.c1;
        let c1 = (self.c0 * self.c1).double();
        Fq2 {
            c0: t1 * t2,
            c1,
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
        // 1/(a + bi) = (a - bi)/(a^2 + b^2)
        let norm = self.c0.square() + self.c1.square();
        norm.inverse().map(|t| Fq2 {
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

    #[inline]
    fn frobenius_map(&mut self, power: usize) {
        if power % 2 == 1 {
            self.c1 = -self.c1;
        }
    }
}

impl Neg for Fq2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Fq2 {
            c0: -self.c0,
            c1: -self.c1,
        }
    }
}

impl<'a> AddAssign<&'a Self> for Fq2 {
    #[inline]
    fn add_assign(&mut self, other: &Self) {
        self.c0 += &other.c0;
        self.c1 += &other.c1;
    }
}

impl<'a> SubAssign<&'a Self> for Fq2 {
    #[inline]
    fn sub_assign(&mut self, other: &Self) {
        self.c0 -= &other.c0;
        self.c1 -= &other.c1;
    }
}

impl<'a> MulAssign<&'a Self> for Fq2 {
    #[inline]
    fn mul_assign(&mut self, other: &Self) {
        // Karatsuba: 3 Fq multiplications.
        let t1 = self.c0 * other.c0;
        let t2 = self.c1 * other.c1;
        let t3 = self.c0 + self.c1;
        let t4 = other.c0 + other.c1;

        self.c0 = t1 - t2;
        self.c1 = t3 * t4 - t1 - t2;
    }
}

impl_ops_from_ref!(Fq2);

impl UniformRand for Fq2 {
    #[inline]
    fn rand<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Fq2::new(Fq::rand(rng), Fq::rand(rng))
    }
}

impl core::fmt::Display for Fq2 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Fq2({} + {} * i)", self.c0, self.c1)
    }
}
