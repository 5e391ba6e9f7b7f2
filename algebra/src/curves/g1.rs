use crate::biginteger::BigInteger256;
use crate::curves::short_weierstrass_jacobian::{GroupAffine, GroupProjective};
use crate::curves::SWModelParameters;
use crate::fields::Fq;

/// BN254 G1: `y^2 = x^3 + 3` over Fq, generated by (1, 2).
pub struct G1Parameters;

impl SWModelParameters for G1Parameters {
    type BaseField = Fq;

    /// b = 3 (Montgomery form).
    #[rustfmt::skip]
    const COEFF_B: Fq = Fq::new(BigInteger256::new([
        0x7a17caa950ad28d7,
        0x1f6ac17ae15521b9,
        0x334bea4e696bd284,
        0x2a1f6744ce179d8e,
    ]));

    /// (1, 2) (Montgomery form).
    #[rustfmt::skip]
    const AFFINE_GENERATOR_COEFFS: (Fq, Fq) = (
        Fq::new(BigInteger256::new([
            0xd35d438dc58f0d9d,
            0x0a78eb28f5c70b3d,
            0x666ea36f7879462c,
            0x0e0a77c19a07df2f,
        ])),
        Fq::new(BigInteger256::new([
            0xa6ba871b8b1e1b3a,
            0x14f1d651eb8e167b,
            0xccdd46def0f28c58,
            0x1c14ef83340fbe5e,
        ])),
    );
}

pub type G1Affine = GroupAffine<G1Parameters>;
pub type G1Projective = GroupProjective<G1Parameters>;

impl G1Affine {
    /// Applies the curve endomorphism `(x, y) -> (beta * x, y)`, which
    /// acts as multiplication by the scalar-field cube root of unity.
    #[inline]
    pub fn glv_endomorphism(&self) -> Self {
        G1Affine::new(self.x * Fq::CUBE_ROOT, self.y, self.infinity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::{AffineCurve, ProjectiveCurve};
    use crate::fields::{Field, Fr, PrimeField};
    use crate::UniformRand;
    use num_traits::Zero;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    #[test]
    fn generator_is_on_curve() {
        assert!(G1Affine::prime_subgroup_generator().is_on_curve());
    }

    #[test]
    fn group_laws() {
        let mut rng = XorShiftRng::seed_from_u64(7);
        for _ in 0..20 {
            let p = G1Projective::rand(&mut rng);
            let q = G1Projective::rand(&mut rng);

            // closure
            let mut sum = p;
            sum.add_assign(&q);
            assert!(sum.into_affine().is_on_curve());

            // commutativity
            let mut sum2 = q;
            sum2.add_assign(&p);
            assert_eq!(sum, sum2);

            // identity
            let mut with_zero = p;
            with_zero.add_assign(&G1Projective::zero());
            assert_eq!(with_zero, p);

            // inverse
            let mut cancel = p;
            cancel.add_assign(&(-p));
            assert!(cancel.is_zero());

            // doubling matches addition
            let mut dbl = p;
            dbl.double_in_place();
            let mut add_self = p;
            add_self.add_assign(&p);
            assert_eq!(dbl, add_self);

            // mixed addition matches projective addition
            let mut mixed = p;
            mixed.add_assign_mixed(&q.into_affine());
            assert_eq!(mixed, sum);
        }
    }

    #[test]
    fn scalar_mul_distributes() {
        let mut rng = XorShiftRng::seed_from_u64(8);
        for _ in 0..10 {
            let p = G1Projective::rand(&mut rng);
            let q = G1Projective::rand(&mut rng);
            let k = Fr::rand(&mut rng);

            let mut sum = p;
            sum.add_assign(&q);
            let lhs = sum.into_affine().mul(k.into_repr());

            let mut rhs = p.into_affine().mul(k.into_repr());
            rhs.add_assign(&q.into_affine().mul(k.into_repr()));
            assert_eq!(lhs, rhs);
        }
    }

    #[test]
    fn endomorphism_is_lambda() {
        let mut rng = XorShiftRng::seed_from_u64(9);
        let p = G1Projective::rand(&mut rng).into_affine();
        let mapped = p.glv_endomorphism();
        let expected = p.mul(Fr::CUBE_ROOT.into_repr()).into_affine();
        assert_eq!(mapped, expected);
    }

    #[test]
    fn batch_normalization_handles_infinity() {
        let mut rng = XorShiftRng::seed_from_u64(10);
        let mut points: Vec<G1Projective> = (0..9).map(|_| G1Projective::rand(&mut rng)).collect();
        points[4] = G1Projective::zero();
        let affine = G1Projective::batch_normalization(&points);
        for (p, a) in points.iter().zip(&affine) {
            assert_eq!(p.into_affine(), *a);
        }
        assert!(affine[4].is_zero());
    }
}
