use crate::biginteger::BigInteger256;
use crate::UniformRand;
use core::fmt::{Debug, Display};
use core::hash::Hash;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use num_traits::{One, Zero};

#[macro_use]
pub mod macros;

pub mod fq;
pub mod fq12;
pub mod fq2;
pub mod fq6;
pub mod fr;

pub use fq::{Fq, FqParameters};
pub use fq12::{EllCoeffs, Fq12};
pub use fq2::Fq2;
pub use fq6::Fq6;
pub use fr::{Fr, FrParameters};

/// The interface shared by the base field, the scalar field and the
/// extension tower.
pub trait Field:
    'static
    + Copy
    + Clone
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + Eq
    + Hash
    + Zero
    + One
    + UniformRand
    + Neg<Output = Self>
    + Add<Self, Output = Self>
    + Sub<Self, Output = Self>
    + Mul<Self, Output = Self>
    + AddAssign<Self>
    + SubAssign<Self>
    + MulAssign<Self>
    + for<'a> Add<&'a Self, Output = Self>
    + for<'a> Sub<&'a Self, Output = Self>
    + for<'a> Mul<&'a Self, Output = Self>
    + for<'a> AddAssign<&'a Self>
    + for<'a> SubAssign<&'a Self>
    + for<'a> MulAssign<&'a Self>
{
    /// Returns `self + self`.
    #[must_use]
    fn double(&self) -> Self;

    /// Doubles `self` in place.
    fn double_in_place(&mut self) -> &mut Self;

    /// Returns `self * self`.
    #[must_use]
    fn square(&self) -> Self;

    /// Squares `self` in place.
    fn square_in_place(&mut self) -> &mut Self;

    /// Computes the multiplicative inverse, if it exists.
    #[must_use]
    fn inverse(&self) -> Option<Self>;

    /// Sets `self` to its inverse if it exists; no-op otherwise.
    fn inverse_in_place(&mut self) -> Option<&mut Self>;

    /// Applies the Frobenius automorphism `x -> x^(p^power)`.
    fn frobenius_map(&mut self, power: usize);

    /// Exponentiation by a little-endian limb-encoded exponent.
    #[must_use]
    fn pow<S: AsRef<[u64]>>(&self, exp: S) -> Self {
        let mut res = Self::one();
        let mut found_one = false;
        for i in BitIterator::new(exp) {
            if !found_one {
                if i {
                    found_one = true;
                } else {
                    continue;
                }
            }
            res.square_in_place();
            if i {
                res *= self;
            }
        }
        res
    }
}

/// Parameters defining a 254-bit prime field in Montgomery form.
pub trait FpParameters: 'static + Send + Sync + Sized {
    /// The modulus of the field.
    const MODULUS: BigInteger256;

    /// Twice the modulus; the upper bound of the coarse representation.
    const MODULUS_TIMES_TWO: BigInteger256;

    /// The number of bits needed to represent the modulus.
    const MODULUS_BITS: u32;

    /// Bits shaved from the top limb when sampling uniformly.
    const REPR_SHAVE_BITS: u32;

    /// `R = 2^256 mod MODULUS`, the Montgomery radix (also `one`).
    const R: BigInteger256;

    /// `R^2 mod MODULUS`.
    const R2: BigInteger256;

    /// `-MODULUS^{-1} mod 2^64`.
    const INV: u64;

    /// A multiplicative generator of the field.
    const GENERATOR: BigInteger256;

    /// `2^s` with `2^s * t = MODULUS - 1`, `t` odd.
    const TWO_ADICITY: u32;

    /// A `2^TWO_ADICITY`-th primitive root of unity, in Montgomery form.
    /// All-zero when the field carries no usable root of unity.
    const ROOT_OF_UNITY: BigInteger256;

    /// `t` for `2^s * t = MODULUS - 1`.
    const T: BigInteger256;

    /// `(t - 1) / 2`.
    const T_MINUS_ONE_DIV_TWO: BigInteger256;

    /// `(MODULUS - 1) / 2`.
    const MODULUS_MINUS_ONE_DIV_TWO: BigInteger256;
}

/// The interface for the two prime fields.
pub trait PrimeField: Field + From<u64> + Ord {
    type Params: FpParameters;

    /// Builds an element from its canonical (non-Montgomery)
    /// representation. Values `>= MODULUS` yield zero.
    fn from_repr(repr: BigInteger256) -> Self;

    /// Returns the canonical (non-Montgomery) representation.
    fn into_repr(&self) -> BigInteger256;

    /// The raw Montgomery-form limbs.
    fn into_repr_raw(&self) -> BigInteger256;

    /// The multiplicative generator.
    fn multiplicative_generator() -> Self;

    /// The `2^TWO_ADICITY`-th root of unity.
    fn root_of_unity() -> Self;

    /// The `2^log2_size`-th root of unity, obtained by squaring down from
    /// `ROOT_OF_UNITY`. Returns `None` when the field's two-adicity is
    /// insufficient.
    fn get_root_of_unity(log2_size: u32) -> Option<Self> {
        if log2_size > Self::Params::TWO_ADICITY {
            return None;
        }
        let mut omega = Self::root_of_unity();
        for _ in log2_size..Self::Params::TWO_ADICITY {
            omega.square_in_place();
        }
        Some(omega)
    }

    /// The `i`-th bit of the canonical representation.
    fn get_bit(&self, i: usize) -> bool {
        self.into_repr().get_bit(i)
    }

    fn size_in_bits() -> usize {
        Self::Params::MODULUS_BITS as usize
    }
}

/// Fields supporting an efficient square-root operation.
pub trait SquareRootField: Field {
    /// Returns the Legendre symbol of `self`.
    fn legendre(&self) -> LegendreSymbol;

    /// Returns a square root of `self`, if one exists.
    #[must_use]
    fn sqrt(&self) -> Option<Self>;
}

#[derive(Debug, PartialEq)]
pub enum LegendreSymbol {
    Zero = 0,
    QuadraticResidue = 1,
    QuadraticNonResidue = -1,
}

impl LegendreSymbol {
    pub fn is_zero(&self) -> bool {
        *self == LegendreSymbol::Zero
    }

    pub fn is_qnr(&self) -> bool {
        *self == LegendreSymbol::QuadraticNonResidue
    }

    pub fn is_qr(&self) -> bool {
        *self == LegendreSymbol::QuadraticResidue
    }
}

/// Big-endian bit iterator over limb-encoded integers.
#[derive(Debug)]
pub struct BitIterator<E> {
    t: E,
    n: usize,
}

impl<E: AsRef<[u64]>> BitIterator<E> {
    pub fn new(t: E) -> Self {
        let n = t.as_ref().len() * 64;
        BitIterator { t, n }
    }
}

impl<E: AsRef<[u64]>> Iterator for BitIterator<E> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.n == 0 {
            None
        } else {
            self.n -= 1;
            let part = self.n / 64;
            let bit = self.n - (64 * part);
            Some(self.t.as_ref()[part] & (1 << bit) > 0)
        }
    }
}

/// Inverts every nonzero element of `v` with a single field inversion and
/// `3n` multiplications (Montgomery's trick). Zero entries are left
/// untouched so callers can handle them explicitly.
pub fn batch_inversion<F: Field>(v: &mut [F]) {
    let mut prod = Vec::with_capacity(v.len());
    let mut tmp = F::one();
    for f in v.iter().filter(|f| !f.is_zero()) {
        tmp.mul_assign(f);
        prod.push(tmp);
    }

    if prod.is_empty() {
        return;
    }

    // Invert the total product, then walk backwards peeling one factor off
    // per element.
    tmp = tmp.inverse().unwrap();

    for (f, s) in v
        .iter_mut()
        .rev()
        .filter(|f| !f.is_zero())
        .zip(prod.into_iter().rev().skip(1).chain(Some(F::one())))
    {
        let new_tmp = tmp * *f;
        *f = tmp * s;
        tmp = new_tmp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UniformRand;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    fn ring_laws<F: Field>(seed: u64) {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        for _ in 0..50 {
            let a = F::rand(&mut rng);
            let b = F::rand(&mut rng);
            let c = F::rand(&mut rng);

            assert_eq!((a + b) + c, a + (b + c));
            assert_eq!(a + b, b + a);
            assert_eq!((a * b) * c, a * (b * c));
            assert_eq!(a * b, b * a);
            assert_eq!(a * (b + c), a * b + a * c);
            assert_eq!(a - a, F::zero());
            assert_eq!(a * F::one(), a);
            assert_eq!(a.square(), a * a);
            assert_eq!(a.double(), a + a);
        }
    }

    fn inverse_laws<F: Field>(seed: u64) {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        for _ in 0..50 {
            let a = F::rand(&mut rng);
            if a.is_zero() {
                continue;
            }
            assert_eq!(a * a.inverse().unwrap(), F::one());
        }
        assert!(F::zero().inverse().is_none());
    }

    #[test]
    fn fq_laws() {
        ring_laws::<Fq>(101);
        inverse_laws::<Fq>(102);
    }

    #[test]
    fn fr_laws() {
        ring_laws::<Fr>(103);
        inverse_laws::<Fr>(104);
    }

    #[test]
    fn fq2_laws() {
        ring_laws::<Fq2>(105);
        inverse_laws::<Fq2>(106);
    }

    #[test]
    fn fq6_laws() {
        ring_laws::<Fq6>(107);
        inverse_laws::<Fq6>(108);
    }

    #[test]
    fn fq12_laws() {
        ring_laws::<Fq12>(109);
        inverse_laws::<Fq12>(110);
    }

    #[test]
    fn batch_inversion_skips_zeros() {
        let mut rng = XorShiftRng::seed_from_u64(111);
        let mut v: Vec<Fr> = (0..32).map(|_| Fr::rand(&mut rng)).collect();
        v[3] = Fr::zero();
        v[17] = Fr::zero();
        let expected: Vec<Fr> = v
            .iter()
            .map(|x| x.inverse().unwrap_or_else(Fr::zero))
            .collect();
        batch_inversion(&mut v);
        assert_eq!(v, expected);
    }

    #[test]
    fn sqrt_round_trip() {
        let mut rng = XorShiftRng::seed_from_u64(112);
        for _ in 0..20 {
            let a = Fq::rand(&mut rng);
            let sq = a.square();
            let root = sq.sqrt().unwrap();
            assert!(root == a || root == -a);

            let b = Fr::rand(&mut rng);
            let sq = b.square();
            let root = sq.sqrt().unwrap();
            assert!(root == b || root == -b);
        }
    }

    #[test]
    fn sqrt_of_non_residue_fails() {
        // The multiplicative generators were chosen as non-residues.
        assert!(Fq::multiplicative_generator().sqrt().is_none());
        assert!(Fr::multiplicative_generator().sqrt().is_none());
    }

    #[test]
    fn frobenius_is_p_th_power() {
        let mut rng = XorShiftRng::seed_from_u64(113);
        let modulus = FqParameters::MODULUS;
        for _ in 0..5 {
            let a = Fq2::rand(&mut rng);
            let mut frob = a;
            frob.frobenius_map(1);
            assert_eq!(frob, a.pow(modulus.0));

            let b = Fq6::rand(&mut rng);
            let mut frob = b;
            frob.frobenius_map(1);
            assert_eq!(frob, b.pow(modulus.0));

            let c = Fq12::rand(&mut rng);
            let mut frob = c;
            frob.frobenius_map(1);
            assert_eq!(frob, c.pow(modulus.0));

            let mut frob2 = c;
            frob2.frobenius_map(2);
            let mut twice = c;
            twice.frobenius_map(1);
            twice.frobenius_map(1);
            assert_eq!(frob2, twice);

            let mut frob3 = c;
            frob3.frobenius_map(3);
            let mut thrice = twice;
            thrice.frobenius_map(1);
            assert_eq!(frob3, thrice);
        }
    }
}

