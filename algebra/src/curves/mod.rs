use crate::fields::{Field, Fr};
use crate::UniformRand;
use core::fmt::Debug;
use core::ops::Neg;

pub mod g1;
pub mod g2;
pub mod pairing;
pub mod short_weierstrass_jacobian;

pub use g1::{G1Affine, G1Parameters, G1Projective};
pub use g2::{G2Affine, G2Parameters, G2Projective};

/// Model parameters of a short Weierstrass curve `y^2 = x^3 + b` (the
/// `a = 0` family both BN254 groups live on).
pub trait SWModelParameters: 'static + Send + Sync + Sized {
    type BaseField: Field;

    const COEFF_B: Self::BaseField;
    const AFFINE_GENERATOR_COEFFS: (Self::BaseField, Self::BaseField);
}

/// Curve points in affine coordinates.
pub trait AffineCurve:
    'static + Copy + Clone + Debug + PartialEq + Eq + Send + Sync + Neg<Output = Self> + UniformRand
{
    type BaseField: Field;
    type Projective: ProjectiveCurve<Affine = Self, BaseField = Self::BaseField>;

    fn zero() -> Self;
    fn is_zero(&self) -> bool;
    fn prime_subgroup_generator() -> Self;
    fn into_projective(&self) -> Self::Projective;
    fn is_on_curve(&self) -> bool;

    /// Double-and-add ladder over the big-endian bit expansion of a
    /// canonical (non-Montgomery) scalar representation.
    fn mul<S: AsRef<[u64]>>(&self, scalar: S) -> Self::Projective;

    /// Scalar multiplication by a field element.
    fn mul_by_fr(&self, scalar: &Fr) -> Self::Projective {
        use crate::fields::PrimeField;
        self.mul(scalar.into_repr())
    }
}

/// Curve points in Jacobian coordinates: `(X, Y, Z)` maps to the affine
/// point `(X/Z^2, Y/Z^3)`; `Z = 0` is the point at infinity.
pub trait ProjectiveCurve:
    'static + Copy + Clone + Debug + PartialEq + Eq + Send + Sync + Neg<Output = Self> + UniformRand
{
    type BaseField: Field;
    type Affine: AffineCurve<Projective = Self, BaseField = Self::BaseField>;

    fn zero() -> Self;
    fn is_zero(&self) -> bool;
    fn prime_subgroup_generator() -> Self;
    fn double_in_place(&mut self) -> &mut Self;
    fn add_assign(&mut self, other: &Self);
    fn add_assign_mixed(&mut self, other: &Self::Affine);
    fn into_affine(&self) -> Self::Affine;

    #[must_use]
    fn double(&self) -> Self {
        let mut tmp = *self;
        tmp.double_in_place();
        tmp
    }

    /// Adds or subtracts an affine point depending on `negate`.
    fn add_assign_mixed_or_sub(&mut self, other: &Self::Affine, negate: bool) {
        if negate {
            self.add_assign_mixed(&-*other);
        } else {
            self.add_assign_mixed(other);
        }
    }

    /// Normalizes a slice of Jacobian points with a single inversion
    /// (Montgomery's trick). Infinity entries come back as the affine
    /// identity.
    fn batch_normalization(points: &[Self]) -> Vec<Self::Affine>;
}
