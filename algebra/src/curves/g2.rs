use crate::biginteger::BigInteger256;
use crate::curves::short_weierstrass_jacobian::{GroupAffine, GroupProjective};
use crate::curves::SWModelParameters;
use crate::fields::{Field, Fq, Fq2};

const fn fq2_const(c0: [u64; 4], c1: [u64; 4]) -> Fq2 {
    Fq2::new(
        Fq::new(BigInteger256::new(c0)),
        Fq::new(BigInteger256::new(c1)),
    )
}

/// BN254 G2: the sextic twist `y^2 = x^3 + 3/(9 + i)` over Fq2.
pub struct G2Parameters;

impl SWModelParameters for G2Parameters {
    type BaseField = Fq2;

    /// b' = 3 / (9 + i) (Montgomery form).
    #[rustfmt::skip]
    const COEFF_B: Fq2 = fq2_const(
        [0x3bf938e377b802a8, 0x020b1b273633535d, 0x26b7edf049755260, 0x2514c6324384a86d],
        [0x38e7ecccd1dcff67, 0x65f0b37d93ce0d3e, 0xd749d0dd22ac00aa, 0x0141b9ce4a688d4d],
    );

    /// The standard G2 generator (Montgomery form).
    #[rustfmt::skip]
    const AFFINE_GENERATOR_COEFFS: (Fq2, Fq2) = (
        fq2_const(
            [0x8e83b5d102bc2026, 0xdceb1935497b0172, 0xfbb8264797811adf, 0x19573841af96503b],
            [0xafb4737da84c6140, 0x6043dd5a5802d8c4, 0x09e950fc52a02f86, 0x14fef0833aea7b6b],
        ),
        fq2_const(
            [0x619dfa9d886be9f6, 0xfe7fd297f59e9b78, 0xff9e1a62231b7dfe, 0x28fd7eebae9e4206],
            [0x64095b56c71856ee, 0xdc57f922327d3cbb, 0x55f935be33351076, 0x0da4a0e693fd6482],
        ),
    );
}

pub type G2Affine = GroupAffine<G2Parameters>;
pub type G2Projective = GroupProjective<G2Parameters>;

/// `xi^((p - 1)/3)`: the x-coordinate factor of the untwist-Frobenius-twist
/// endomorphism (Montgomery form).
#[rustfmt::skip]
pub const TWIST_MUL_BY_Q_X: Fq2 = fq2_const(
    [0xb5773b104563ab30, 0x347f91c8a9aa6454, 0x7a007127242e0991, 0x1956bcd8118214ec],
    [0x6e849f1ea0aa4757, 0xaa1c7b6d89f89141, 0xb6e713cdfae0ca3a, 0x26694fbb4e82ebc3],
);

/// `xi^((p - 1)/2)`: the matching y-coordinate factor (Montgomery form).
#[rustfmt::skip]
pub const TWIST_MUL_BY_Q_Y: Fq2 = fq2_const(
    [0xe4bbdd0c2936b629, 0xbb30f162e133bacb, 0x31a9d1b6f9645366, 0x253570bea500f8dd],
    [0xa1d77ce45ffe77c7, 0x07affd117826d1db, 0x6d16bd27bb7edc6b, 0x2c87200285defecc],
);

impl G2Projective {
    /// The Frobenius endomorphism composed with the twist isomorphisms:
    /// `(x, y, z) -> (xi_x * x^p, xi_y * y^p, z^p)`.
    pub fn mul_by_q(&self) -> Self {
        let mut x = self.x;
        x.frobenius_map(1);
        let mut y = self.y;
        y.frobenius_map(1);
        let mut z = self.z;
        z.frobenius_map(1);
        G2Projective::new(TWIST_MUL_BY_Q_X * x, TWIST_MUL_BY_Q_Y * y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::{AffineCurve, ProjectiveCurve};
    use crate::fields::{Fr, PrimeField};
    use crate::UniformRand;
    use num_traits::Zero;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    #[test]
    fn generator_is_on_curve() {
        assert!(G2Affine::prime_subgroup_generator().is_on_curve());
    }

    #[test]
    fn group_laws() {
        let mut rng = XorShiftRng::seed_from_u64(11);
        for _ in 0..10 {
            let p = G2Projective::rand(&mut rng);
            let q = G2Projective::rand(&mut rng);

            let mut sum = p;
            sum.add_assign(&q);
            assert!(sum.into_affine().is_on_curve());

            let mut cancel = p;
            cancel.add_assign(&(-p));
            assert!(cancel.is_zero());

            let mut dbl = p;
            dbl.double_in_place();
            let mut add_self = p;
            add_self.add_assign(&p);
            assert_eq!(dbl, add_self);
        }
    }

    #[test]
    fn ladder_exponentiation_matches_naive() {
        let mut rng = XorShiftRng::seed_from_u64(12);
        let g = G2Affine::prime_subgroup_generator();
        let k = Fr::from(113);
        let mut naive = G2Projective::zero();
        for _ in 0..113 {
            naive.add_assign_mixed(&g);
        }
        assert_eq!(g.mul(k.into_repr()), naive);
        let _ = rng;
    }
}
