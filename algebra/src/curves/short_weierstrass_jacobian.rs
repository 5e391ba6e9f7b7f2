use crate::curves::{AffineCurve, ProjectiveCurve, SWModelParameters as Parameters};
use crate::fields::{batch_inversion, Field};
use crate::UniformRand;
use core::fmt;
use core::marker::PhantomData;
use core::ops::Neg;
use num_traits::{One, Zero};
use rand::Rng;

#[must_use]
pub struct GroupAffine<P: Parameters> {
    pub x: P::BaseField,
    pub y: P::BaseField,
    pub infinity: bool,
    _params: PhantomData<P>,
}

#[must_use]
pub struct GroupProjective<P: Parameters> {
    pub x: P::BaseField,
    pub y: P::BaseField,
    pub z: P::BaseField,
    _params: PhantomData<P>,
}

impl<P: Parameters> Copy for GroupAffine<P> {}
impl<P: Parameters> Clone for GroupAffine<P> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}
impl<P: Parameters> Copy for GroupProjective<P> {}
impl<P: Parameters> Clone for GroupProjective<P> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Parameters> PartialEq for GroupAffine<P> {
    fn eq(&self, other: &Self) -> bool {
        if self.infinity || other.infinity {
            self.infinity == other.infinity
        } else {
            self.x == other.x && self.y == other.y
        }
    }
}
impl<P: Parameters> Eq for GroupAffine<P> {}

impl<P: Parameters> PartialEq for GroupProjective<P> {
    fn eq(&self, other: &Self) -> bool {
        if self.is_zero() || other.is_zero() {
            return self.is_zero() == other.is_zero();
        }
        // x1/z1^2 == x2/z2^2 and y1/z1^3 == y2/z2^3, cleared of
        // denominators.
        let z1z1 = self.z.square();
        let z2z2 = other.z.square();
        self.x * z2z2 == other.x * z1z1
            && self.y * (z2z2 * other.z) == other.y * (z1z1 * self.z)
    }
}
impl<P: Parameters> Eq for GroupProjective<P> {}

impl<P: Parameters> fmt::Debug for GroupAffine<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.infinity {
            write!(f, "GroupAffine(Infinity)")
        } else {
            write!(f, "GroupAffine(x={:?}, y={:?})", self.x, self.y)
        }
    }
}

impl<P: Parameters> fmt::Debug for GroupProjective<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.into_affine())
    }
}

impl<P: Parameters> GroupAffine<P> {
    #[inline]
    pub const fn new(x: P::BaseField, y: P::BaseField, infinity: bool) -> Self {
        Self {
            x,
            y,
            infinity,
            _params: PhantomData,
        }
    }

    /// Multiplies by the scalar represented by a big-endian bit iterator.
    pub(crate) fn mul_bits(&self, bits: impl Iterator<Item = bool>) -> GroupProjective<P> {
        let mut res = GroupProjective::zero();
        for i in bits.skip_while(|b| !b) {
            res.double_in_place();
            if i {
                res.add_assign_mixed(self)
            }
        }
        res
    }
}

impl<P: Parameters> GroupProjective<P> {
    #[inline]
    pub const fn new(x: P::BaseField, y: P::BaseField, z: P::BaseField) -> Self {
        Self {
            x,
            y,
            z,
            _params: PhantomData,
        }
    }
}

impl<P: Parameters> AffineCurve for GroupAffine<P> {
    type BaseField = P::BaseField;
    type Projective = GroupProjective<P>;

    #[inline]
    fn zero() -> Self {
        Self::new(P::BaseField::zero(), P::BaseField::one(), true)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.infinity
    }

    #[inline]
    fn prime_subgroup_generator() -> Self {
        Self::new(
            P::AFFINE_GENERATOR_COEFFS.0,
            P::AFFINE_GENERATOR_COEFFS.1,
            false,
        )
    }

    #[inline]
    fn into_projective(&self) -> GroupProjective<P> {
        if self.infinity {
            GroupProjective::zero()
        } else {
            GroupProjective::new(self.x, self.y, P::BaseField::one())
        }
    }

    fn is_on_curve(&self) -> bool {
        if self.is_zero() {
            true
        } else {
            let y2 = self.y.square();
            let x3b = self.x.square() * self.x + P::COEFF_B;
            y2 == x3b
        }
    }

    fn mul<S: AsRef<[u64]>>(&self, scalar: S) -> GroupProjective<P> {
        self.mul_bits(crate::fields::BitIterator::new(scalar))
    }
}

impl<P: Parameters> Neg for GroupAffine<P> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        if !self.is_zero() {
            Self::new(self.x, -self.y, false)
        } else {
            self
        }
    }
}

impl<P: Parameters> UniformRand for GroupAffine<P> {
    fn rand<R: Rng + ?Sized>(rng: &mut R) -> Self {
        GroupProjective::rand(rng).into_affine()
    }
}

impl<P: Parameters> Default for GroupAffine<P> {
    #[inline]
    fn default() -> Self {
        Self::zero()
    }
}

impl<P: Parameters> ProjectiveCurve for GroupProjective<P> {
    type BaseField = P::BaseField;
    type Affine = GroupAffine<P>;

    #[inline]
    fn zero() -> Self {
        Self::new(P::BaseField::one(), P::BaseField::one(), P::BaseField::zero())
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.z.is_zero()
    }

    #[inline]
    fn prime_subgroup_generator() -> Self {
        GroupAffine::prime_subgroup_generator().into_projective()
    }

    /// dbl-2009-l.
    fn double_in_place(&mut self) -> &mut Self {
        if self.is_zero() {
            return self;
        }

        let a = self.x.square();
        let b = self.y.square();
        let mut c = b.square();

        let mut d = (self.x + b).square() - a - c;
        d.double_in_place();

        let e = a.double() + a;
        let f = e.square();

        self.z *= &self.y;
        self.z.double_in_place();

        self.x = f - d.double();

        c.double_in_place();
        c.double_in_place();
        c.double_in_place();
        self.y = e * (d - self.x) - c;
        self
    }

    /// add-2007-bl, falling through to doubling on equal inputs and to
    /// infinity on exact inverses.
    fn add_assign(&mut self, other: &Self) {
        if self.is_zero() {
            *self = *other;
            return;
        }
        if other.is_zero() {
            return;
        }

        let z1z1 = self.z.square();
        let z2z2 = other.z.square();
        let u1 = self.x * z2z2;
        let u2 = other.x * z1z1;
        let s1 = self.y * other.z * z2z2;
        let s2 = other.y * self.z * z1z1;

        if u1 == u2 {
            if s1 == s2 {
                self.double_in_place();
            } else {
                *self = Self::zero();
            }
            return;
        }

        let h = u2 - u1;
        let i = h.double().square();
        let j = h * i;
        let r = (s2 - s1).double();
        let v = u1 * i;

        self.x = r.square() - j - v.double();
        self.y = r * (v - self.x) - (s1 * j).double();
        self.z = ((self.z + other.z).square() - z1z1 - z2z2) * h;
    }

    /// madd-2007-bl.
    fn add_assign_mixed(&mut self, other: &Self::Affine) {
        if other.is_zero() {
            return;
        }
        if self.is_zero() {
            self.x = other.x;
            self.y = other.y;
            self.z = P::BaseField::one();
            return;
        }

        let z1z1 = self.z.square();
        let u2 = other.x * z1z1;
        let s2 = other.y * self.z * z1z1;

        if self.x == u2 {
            if self.y == s2 {
                self.double_in_place();
            } else {
                *self = Self::zero();
            }
            return;
        }

        let h = u2 - self.x;
        let hh = h.square();
        let mut i = hh;
        i.double_in_place();
        i.double_in_place();
        let j = h * i;
        let r = (s2 - self.y).double();
        let v = self.x * i;

        let x3 = r.square() - j - v.double();
        self.y = r * (v - x3) - (self.y * j).double();
        self.z = (self.z + h).square() - z1z1 - hh;
        self.x = x3;
    }

    fn into_affine(&self) -> Self::Affine {
        if self.is_zero() {
            GroupAffine::zero()
        } else {
            let zinv = self.z.inverse().unwrap();
            let zinv2 = zinv.square();
            GroupAffine::new(self.x * zinv2, self.y * (zinv2 * zinv), false)
        }
    }

    fn batch_normalization(points: &[Self]) -> Vec<Self::Affine> {
        // Infinity points take part in the shared inversion with z = 1 and
        // are re-marked afterwards.
        let mut z_coords: Vec<P::BaseField> = points
            .iter()
            .map(|p| if p.is_zero() { P::BaseField::one() } else { p.z })
            .collect();
        batch_inversion(&mut z_coords);

        points
            .iter()
            .zip(z_coords)
            .map(|(p, zinv)| {
                if p.is_zero() {
                    GroupAffine::zero()
                } else {
                    let zinv2 = zinv.square();
                    GroupAffine::new(p.x * zinv2, p.y * (zinv2 * zinv), false)
                }
            })
            .collect()
    }
}

impl<P: Parameters> Neg for GroupProjective<P> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        if !self.is_zero() {
            Self::new(self.x, -self.y, self.z)
        } else {
            self
        }
    }
}

impl<P: Parameters> UniformRand for GroupProjective<P> {
    fn rand<R: Rng + ?Sized>(rng: &mut R) -> Self {
        use crate::fields::PrimeField;
        let scalar = crate::fields::Fr::rand(rng);
        Self::prime_subgroup_generator()
            .into_affine()
            .mul(scalar.into_repr())
    }
}

impl<P: Parameters> Default for GroupProjective<P> {
    #[inline]
    fn default() -> Self {
        Self::zero()
    }
}
