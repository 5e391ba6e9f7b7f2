/// Implements the owned/borrowed operator matrix on top of the by-reference
/// `*_assign` implementations.
macro_rules! impl_ops_from_ref {
    ($type:ty) => {
        impl Add<Self> for $type {
            type Output = Self;
            #[inline]
            fn add(mut self, other: Self) -> Self {
                self.add_assign(&other);
                self
            }
        }

        impl<'a> Add<&'a $type> for $type {
            type Output = Self;
            #[inline]
            fn add(mut self, other: &Self) -> Self {
                self.add_assign(other);
                self
            }
        }

        impl Sub<Self> for $type {
            type Output = Self;
            #[inline]
            fn sub(mut self, other: Self) -> Self {
                self.sub_assign(&other);
                self
            }
        }

        impl<'a> Sub<&'a $type> for $type {
            type Output = Self;
            #[inline]
            fn sub(mut self, other: &Self) -> Self {
                self.sub_assign(other);
                self
            }
        }

        impl Mul<Self> for $type {
            type Output = Self;
            #[inline]
            fn mul(mut self, other: Self) -> Self {
                self.mul_assign(&other);
                self
            }
        }

        impl<'a> Mul<&'a $type> for $type {
            type Output = Self;
            #[inline]
            fn mul(mut self, other: &Self) -> Self {
                self.mul_assign(other);
                self
            }
        }

        impl AddAssign<Self> for $type {
            #[inline]
            fn add_assign(&mut self, other: Self) {
                self.add_assign(&other)
            }
        }

        impl SubAssign<Self> for $type {
            #[inline]
            fn sub_assign(&mut self, other: Self) {
                self.sub_assign(&other)
            }
        }

        impl MulAssign<Self> for $type {
            #[inline]
            fn mul_assign(&mut self, other: Self) {
                self.mul_assign(&other)
            }
        }

        impl core::iter::Sum<Self> for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self::zero(), |acc, x| acc + x)
            }
        }
    };
}

/// Generates a 4-limb prime field in Montgomery form from a parameter
/// struct implementing `FpParameters`.
///
/// Two representations coexist. The canonical one satisfies `x < p` and is
/// what every operator impl produces. The coarse one satisfies `x < 2p`
/// and is produced/consumed by the `*_with_coarse_reduction` family, which
/// skips the trailing conditional subtraction; callers must `reduce_once`
/// before comparing, serializing or absorbing into a transcript. The CIOS
/// no-carry multiplication keeps coarse inputs closed under coarse outputs
/// because `4p < 2^256` for both BN254 moduli.
macro_rules! impl_prime_field {
    ($Fp:ident, $FpParams:ty) => {
        #[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
        pub struct $Fp(pub BigInteger256);

        impl $Fp {
            #[inline]
            pub const fn new(repr: BigInteger256) -> Self {
                $Fp(repr)
            }

            /// True iff the representation is canonical.
            #[inline]
            pub fn is_valid(&self) -> bool {
                self.0 < <$FpParams>::MODULUS
            }

            #[inline]
            fn reduce(&mut self) {
                if !self.is_valid() {
                    self.0.sub_noborrow(&<$FpParams>::MODULUS);
                }
            }

            /// Conditionally subtracts the modulus, taking a coarse value
            /// back to canonical form.
            #[inline]
            pub fn reduce_once(mut self) -> Self {
                self.reduce();
                self
            }

            /// `self + other` without any reduction. Safe while operands
            /// stay below `2p`.
            #[inline]
            pub fn add_without_reduction(mut self, other: &Self) -> Self {
                self.0.add_nocarry(&other.0);
                self
            }

            /// `self + other`, reduced only into the coarse range.
            #[inline]
            pub fn add_with_coarse_reduction(mut self, other: &Self) -> Self {
                self.0.add_nocarry(&other.0);
                if self.0 >= <$FpParams>::MODULUS_TIMES_TWO {
                    self.0.sub_noborrow(&<$FpParams>::MODULUS_TIMES_TWO);
                }
                self
            }

            /// `self - other` in the coarse range.
            #[inline]
            pub fn sub_with_coarse_reduction(mut self, other: &Self) -> Self {
                if other.0 > self.0 {
                    self.0.add_nocarry(&<$FpParams>::MODULUS_TIMES_TWO);
                }
                self.0.sub_noborrow(&other.0);
                self
            }

            /// Montgomery product without the trailing canonicalising
            /// subtraction; output stays below `2p`.
            #[inline]
            pub fn mul_with_coarse_reduction(mut self, other: &Self) -> Self {
                self.mont_mul_assign(&other.0);
                self
            }

            /// Montgomery square in the coarse range.
            #[inline]
            pub fn sqr_with_coarse_reduction(self) -> Self {
                let rhs = self.0;
                let mut out = self;
                out.mont_mul_assign(&rhs);
                out
            }

            /// CIOS Montgomery multiplication with the no-carry
            /// optimisation. Accepts operands `< 2p`, emits `< 2p`.
            #[inline]
            #[unroll_for_loops]
            fn mont_mul_assign(&mut self, other: &BigInteger256) {
                let mut r = [0u64; 4];
                let mut carry1 = 0u64;
                let mut carry2 = 0u64;
                for i in 0..4 {
                    r[0] = fa::mac(r[0], (self.0).0[0], other.0[i], &mut carry1);
                    let k = r[0].wrapping_mul(<$FpParams>::INV);
                    fa::mac_discard(r[0], k, <$FpParams>::MODULUS.0[0], &mut carry2);
                    for j in 1..4 {
                        r[j] = fa::mac_with_carry(r[j], (self.0).0[j], other.0[i], &mut carry1);
                        r[j - 1] = fa::mac_with_carry(r[j], k, <$FpParams>::MODULUS.0[j], &mut carry2);
                    }
                    r[3] = carry1 + carry2;
                }
                (self.0).0 = r;
            }

            /// Exponentiation by a 64-bit exponent.
            #[inline]
            pub fn pow_small(&self, exp: u64) -> Self {
                let mut res = Self::one();
                let mut found_one = false;
                for i in (0..64).rev() {
                    if found_one {
                        res.square_in_place();
                    }
                    if (exp >> i) & 1 == 1 {
                        found_one = true;
                        res *= self;
                    }
                }
                res
            }
        }

        impl Zero for $Fp {
            #[inline]
            fn zero() -> Self {
                $Fp(BigInteger256::default())
            }

            #[inline]
            fn is_zero(&self) -> bool {
                self.0.is_zero()
            }
        }

        impl One for $Fp {
            #[inline]
            fn one() -> Self {
                $Fp(<$FpParams>::R)
            }

            #[inline]
            fn is_one(&self) -> bool {
                self.0 == <$FpParams>::R
            }
        }

        impl Field for $Fp {
            #[inline]
            fn double(&self) -> Self {
                let mut tmp = *self;
                tmp.double_in_place();
                tmp
            }

            #[inline]
            fn double_in_place(&mut self) -> &mut Self {
                // Doubling cannot overflow the backing integer.
                self.0.mul2();
                self.reduce();
                self
            }

            #[inline]
            fn square(&self) -> Self {
                let mut tmp = *self;
                tmp.square_in_place();
                tmp
            }

            #[inline]
            fn square_in_place(&mut self) -> &mut Self {
                let rhs = self.0;
                self.mont_mul_assign(&rhs);
                self.reduce();
                self
            }

            #[inline]
            fn inverse(&self) -> Option<Self> {
                if self.is_zero() {
                    None
                } else {
                    // Guajardo-Kumar-Paar-Pelzl binary Euclidean inversion
                    // (Algorithm 16).
                    let one = BigInteger256::from(1);

                    let mut u = self.0;
                    let mut v = <$FpParams>::MODULUS;
                    let mut b = $Fp(<$FpParams>::R2);
                    let mut c = Self::zero();

                    while u != one && v != one {
                        while u.is_even() {
                            u.div2();
                            if b.0.is_even() {
                                b.0.div2();
                            } else {
                                b.0.add_nocarry(&<$FpParams>::MODULUS);
                                b.0.div2();
                            }
                        }

                        while v.is_even() {
                            v.div2();
                            if c.0.is_even() {
                                c.0.div2();
                            } else {
                                c.0.add_nocarry(&<$FpParams>::MODULUS);
                                c.0.div2();
                            }
                        }

                        if v < u {
                            u.sub_noborrow(&v);
                            b.sub_assign(&c);
                        } else {
                            v.sub_noborrow(&u);
                            c.sub_assign(&b);
                        }
                    }

                    if u == one {
                        Some(b)
                    } else {
                        Some(c)
                    }
                }
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
            fn frobenius_map(&mut self, _: usize) {
                // No effect in a prime field.
            }
        }

        impl PrimeField for $Fp {
            type Params = $FpParams;

            #[inline]
            fn from_repr(repr: BigInteger256) -> Self {
                let mut r = $Fp(repr);
                if r.is_valid() {
                    r.mul_assign(&$Fp(<$FpParams>::R2));
                    r
                } else {
                    Self::zero()
                }
            }

            #[inline]
            #[unroll_for_loops]
            fn into_repr(&self) -> BigInteger256 {
                // Montgomery reduction of the bare limbs.
                let mut r = (self.0).0;
                for i in 0..4 {
                    let k = r[i].wrapping_mul(<$FpParams>::INV);
                    let mut carry = 0;
                    fa::mac_with_carry(r[i], k, <$FpParams>::MODULUS.0[0], &mut carry);
                    for j in 1..4 {
                        r[(j + i) % 4] =
                            fa::mac_with_carry(r[(j + i) % 4], k, <$FpParams>::MODULUS.0[j], &mut carry);
                    }
                    r[i % 4] = carry;
                }
                BigInteger256(r)
            }

            #[inline]
            fn into_repr_raw(&self) -> BigInteger256 {
                self.0
            }

            #[inline]
            fn multiplicative_generator() -> Self {
                $Fp(<$FpParams>::GENERATOR)
            }

            #[inline]
            fn root_of_unity() -> Self {
                $Fp(<$FpParams>::ROOT_OF_UNITY)
            }
        }

        impl SquareRootField for $Fp {
            #[inline]
            fn legendre(&self) -> LegendreSymbol {
                if self.is_zero() {
                    return LegendreSymbol::Zero;
                }
                let s = self.pow(<$FpParams>::MODULUS_MINUS_ONE_DIV_TWO);
                if s.is_one() {
                    LegendreSymbol::QuadraticResidue
                } else {
                    LegendreSymbol::QuadraticNonResidue
                }
            }

            fn sqrt(&self) -> Option<Self> {
                // Tonelli-Shanks, seeded by self^((t-1)/2).
                match self.legendre() {
                    LegendreSymbol::Zero => Some(*self),
                    LegendreSymbol::QuadraticNonResidue => None,
                    LegendreSymbol::QuadraticResidue => {
                        let mut z = Self::root_of_unity();
                        let mut w = self.pow(<$FpParams>::T_MINUS_ONE_DIV_TWO);
                        let mut x = w * self;
                        let mut b = x * &w;
                        let mut v = <$FpParams>::TWO_ADICITY as usize;

                        while !b.is_one() {
                            let mut k = 0usize;
                            let mut b2k = b;
                            while !b2k.is_one() {
                                b2k.square_in_place();
                                k += 1;
                            }

                            let j = v - k - 1;
                            w = z;
                            for _ in 0..j {
                                w.square_in_place();
                            }

                            z = w.square();
                            b *= &z;
                            x *= &w;
                            v = k;
                        }
                        Some(x)
                    },
                }
            }
        }

        impl UniformRand for $Fp {
            #[inline]
            fn rand<R: Rng + ?Sized>(rng: &mut R) -> Self {
                loop {
                    let mut repr = BigInteger256([rng.gen(), rng.gen(), rng.gen(), rng.gen()]);
                    repr.0[3] &= u64::MAX >> <$FpParams>::REPR_SHAVE_BITS;
                    if repr < <$FpParams>::MODULUS {
                        return Self::from_repr(repr);
                    }
                }
            }
        }

        impl From<u64> for $Fp {
            #[inline]
            fn from(val: u64) -> Self {
                Self::from_repr(BigInteger256::from(val))
            }
        }

        impl Ord for $Fp {
            #[inline]
            fn cmp(&self, other: &Self) -> core::cmp::Ordering {
                self.into_repr().cmp(&other.into_repr())
            }
        }

        impl PartialOrd for $Fp {
            #[inline]
            fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Neg for $Fp {
            type Output = Self;
            #[inline]
            fn neg(self) -> Self {
                if !self.is_zero() {
                    let mut tmp = <$FpParams>::MODULUS;
                    tmp.sub_noborrow(&self.0);
                    $Fp(tmp)
                } else {
                    self
                }
            }
        }

        impl<'a> AddAssign<&'a Self> for $Fp {
            #[inline]
            fn add_assign(&mut self, other: &Self) {
                self.0.add_nocarry(&other.0);
                self.reduce();
            }
        }

        impl<'a> SubAssign<&'a Self> for $Fp {
            #[inline]
            fn sub_assign(&mut self, other: &Self) {
                if other.0 > self.0 {
                    self.0.add_nocarry(&<$FpParams>::MODULUS);
                }
                self.0.sub_noborrow(&other.0);
            }
        }

        impl<'a> MulAssign<&'a Self> for $Fp {
            #[inline]
            fn mul_assign(&mut self, other: &Self) {
                self.mont_mul_assign(&other.0);
                self.reduce();
            }
        }

        impl_ops_from_ref!($Fp);

        impl core::fmt::Debug for $Fp {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, concat!(stringify!($Fp), "({:?})"), self.into_repr())
            }
        }

        impl core::fmt::Display for $Fp {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.into_repr())
            }
        }
    };
}
