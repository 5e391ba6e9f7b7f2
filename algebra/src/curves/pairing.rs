//! The optimal ate pairing over BN254: precomputed Miller lines, the
//! Miller loop itself, and the final exponentiation.

use crate::curves::g2::{TWIST_MUL_BY_Q_X, TWIST_MUL_BY_Q_Y};
use crate::curves::{AffineCurve, G1Affine, G2Affine, G2Parameters, SWModelParameters};
use crate::fields::{EllCoeffs, Field, Fq, Fq12, Fq2};
use num_traits::One;

/// Number of doubling iterations of the ate loop (`6u + 2` in NAF form).
pub const LOOP_LENGTH: usize = 64;
/// Length of the `exp_by_neg_z` addition chain.
pub const NEG_Z_LOOP_LENGTH: usize = 62;
/// Total line count: one per doubling, one per addition, plus the two
/// Frobenius correction steps.
pub const PRECOMPUTED_COEFFICIENTS_LENGTH: usize = 87;

/// The ate loop encoded as ternary digits: 0 = double only, 1 = add `Q`,
/// 3 = add `-Q`.
#[rustfmt::skip]
pub const LOOP_BITS: [u8; LOOP_LENGTH] = [
    1, 0, 1, 0, 0, 0, 3, 0, 3, 0, 0, 0, 3, 0, 1, 0, 3, 0, 0, 3, 0, 0, 0, 0, 0, 1, 0, 0, 3, 0, 1, 0,
    0, 3, 0, 0, 0, 0, 3, 0, 1, 0, 0, 0, 3, 0, 3, 0, 0, 1, 0, 0, 0, 3, 0, 0, 3, 0, 1, 0, 1, 0, 0, 0,
];

/// Square-and-multiply schedule for exponentiation by `-z`.
#[rustfmt::skip]
pub const NEG_Z_LOOP_BITS: [bool; NEG_Z_LOOP_LENGTH] = [
    false, false, false, true, false, false, true, true, true, false, true, false, false, true,
    true, false, false, true, false, false, true, false, true, false, true, true, false, true,
    false, false, false, true, false, false, true, false, true, false, false, true, true, false,
    true, false, false, true, false, false, false, false, true, false, false, true, true, true,
    true, true, false, false, false, true,
];

/// The precomputed line evaluations for one G2 point.
#[derive(Clone)]
pub struct MillerLines {
    pub lines: [EllCoeffs; PRECOMPUTED_COEFFICIENTS_LENGTH],
}

impl Default for MillerLines {
    fn default() -> Self {
        MillerLines {
            lines: [EllCoeffs::default(); PRECOMPUTED_COEFFICIENTS_LENGTH],
        }
    }
}

/// G2 in homogeneous projective coordinates, the form the flipped Miller
/// loop formulas operate on.
#[derive(Copy, Clone)]
struct G2Hom {
    x: Fq2,
    y: Fq2,
    z: Fq2,
}

impl G2Hom {
    fn from_affine(p: &G2Affine) -> Self {
        G2Hom {
            x: p.x,
            y: p.y,
            z: Fq2::one(),
        }
    }
}

fn doubling_step(current: &mut G2Hom, ell: &mut EllCoeffs) {
    let mut a = current.x.mul_by_fq(&Fq::TWO_INV);
    a *= &current.y;

    let b = current.y.square();
    let c = current.z.square();
    let d = c.double() + c;
    let e = d * G2Parameters::COEFF_B;
    let f = e.double() + e;

    let g = (b + f).mul_by_fq(&Fq::TWO_INV);
    let h = (current.y + current.z).square() - (b + c);
    let i = e - b;
    let j = current.x.square();
    let ee = e.square();

    current.x = a * (b - f);
    current.y = g.square() - (ee.double() + ee);
    current.z = b * h;

    ell.o = i.mul_by_non_residue();
    ell.vw = -h;
    ell.vv = j.double() + j;
}

fn mixed_addition_step(base: &G2Affine, q: &mut G2Hom, line: &mut EllCoeffs) {
    let d = q.x - base.x * q.z;
    let e = q.y - base.y * q.z;
    let f = d.square();
    let g = e.square();
    let h = d * f;
    let i = q.x * f;

    let j = q.z * g + h - i.double();

    q.x = d * j;
    let t = (i - j) * e;
    let u = q.y * h;
    q.y = t - u;
    q.z *= &h;

    let l = e * base.x - d * base.y;
    line.o = l.mul_by_non_residue();
    line.vv = -e;
    line.vw = d;
}

/// Walks the ate loop once for `q`, emitting the 87 line coefficients that
/// every subsequent Miller loop against `q` will consume.
pub fn precompute_miller_lines(q: &G2Affine, lines: &mut MillerLines) {
    let q_neg = -*q;
    let mut work_point = G2Hom::from_affine(q);

    let mut it = 0;
    for i in 0..LOOP_LENGTH {
        doubling_step(&mut work_point, &mut lines.lines[it]);
        it += 1;
        if LOOP_BITS[i] == 1 {
            mixed_addition_step(q, &mut work_point, &mut lines.lines[it]);
            it += 1;
        } else if LOOP_BITS[i] == 3 {
            mixed_addition_step(&q_neg, &mut work_point, &mut lines.lines[it]);
            it += 1;
        }
    }

    // Two closing additions against pi(Q) and -pi^2(Q).
    let frob = |p: &G2Affine| -> G2Affine {
        let mut x = p.x;
        x.frobenius_map(1);
        let mut y = p.y;
        y.frobenius_map(1);
        G2Affine::new(TWIST_MUL_BY_Q_X * x, TWIST_MUL_BY_Q_Y * y, false)
    };
    let q1 = frob(q);
    let q2 = -frob(&q1);

    mixed_addition_step(&q1, &mut work_point, &mut lines.lines[it]);
    it += 1;
    mixed_addition_step(&q2, &mut work_point, &mut lines.lines[it]);
}

#[inline]
fn accumulate_line(f: &mut Fq12, line: &EllCoeffs, p: &G1Affine) {
    let work_line = EllCoeffs {
        o: line.o,
        vw: line.vw.mul_by_fq(&p.y),
        vv: line.vv.mul_by_fq(&p.x),
    };
    *f = f.sparse_mul(&work_line);
}

/// Evaluates the Miller loop for one pairing from precomputed lines.
pub fn miller_loop(p: &G1Affine, lines: &MillerLines) -> Fq12 {
    let mut work_scalar = Fq12::one();
    let mut it = 0;

    for i in 0..LOOP_LENGTH {
        work_scalar.square_in_place();
        accumulate_line(&mut work_scalar, &lines.lines[it], p);
        it += 1;

        if LOOP_BITS[i] != 0 {
            accumulate_line(&mut work_scalar, &lines.lines[it], p);
            it += 1;
        }
    }

    accumulate_line(&mut work_scalar, &lines.lines[it], p);
    it += 1;
    accumulate_line(&mut work_scalar, &lines.lines[it], p);

    work_scalar
}

/// Shared-skeleton Miller loop over `k` pairs: all line evaluations for a
/// given iteration are multiplied in before the next squaring.
pub fn miller_loop_batch(points: &[G1Affine], lines: &[MillerLines]) -> Fq12 {
    debug_assert_eq!(points.len(), lines.len());
    let mut work_scalar = Fq12::one();
    let mut it = 0;

    for i in 0..LOOP_LENGTH {
        work_scalar.square_in_place();
        for (p, l) in points.iter().zip(lines.iter()) {
            accumulate_line(&mut work_scalar, &l.lines[it], p);
        }
        it += 1;

        if LOOP_BITS[i] != 0 {
            for (p, l) in points.iter().zip(lines.iter()) {
                accumulate_line(&mut work_scalar, &l.lines[it], p);
            }
            it += 1;
        }
    }

    for (p, l) in points.iter().zip(lines.iter()) {
        accumulate_line(&mut work_scalar, &l.lines[it], p);
    }
    it += 1;
    for (p, l) in points.iter().zip(lines.iter()) {
        accumulate_line(&mut work_scalar, &l.lines[it], p);
    }

    work_scalar
}

/// Raises to `(p^6 - 1)(p^2 + 1)`, landing in the cyclotomic subgroup.
pub fn final_exponentiation_easy_part(elt: &Fq12) -> Fq12 {
    let a = elt.unitary_inverse() * elt.inverse().expect("miller output is nonzero");
    let mut b = a;
    b.frobenius_map(2);
    a * b
}

fn exp_by_neg_z(elt: &Fq12) -> Fq12 {
    let mut r = *elt;
    for i in 0..NEG_Z_LOOP_LENGTH {
        r = r.cyclotomic_squared();
        if NEG_Z_LOOP_BITS[i] {
            r *= elt;
        }
    }
    r.unitary_inverse()
}

/// The hard part of the final exponentiation
/// (Scott-Benger-Charlemagne-Perez-Dahab-Kachisa).
pub fn final_exponentiation_hard_part(elt: &Fq12) -> Fq12 {
    let a = exp_by_neg_z(elt);
    let b = a.cyclotomic_squared();
    let c = b.cyclotomic_squared();
    let d = b * c;
    let e = exp_by_neg_z(&d);
    let f = e.cyclotomic_squared();
    let g = exp_by_neg_z(&f);
    let h = d.unitary_inverse();
    let i = g.unitary_inverse();
    let j = i * e;
    let k = j * h;
    let l = b * k;
    let m = e * k;
    let n = m * elt;
    let mut o = l;
    o.frobenius_map(1);
    let p = o * n;
    let mut q = k;
    q.frobenius_map(2);
    let r = p * q;
    let s = elt.unitary_inverse();
    let t = l * s;
    let mut u = t;
    u.frobenius_map(3);

    r * u
}

/// `e(P, Q)` with the full final exponentiation applied. Identity inputs
/// short-circuit to one; inputs outside the prime-order subgroups produce
/// garbage the caller must guard against.
pub fn reduced_ate_pairing(p: &G1Affine, q: &G2Affine) -> Fq12 {
    if p.is_zero() || q.is_zero() {
        return Fq12::one();
    }

    let mut lines = MillerLines::default();
    precompute_miller_lines(q, &mut lines);

    let result = miller_loop(p, &lines);
    let result = final_exponentiation_easy_part(&result);
    final_exponentiation_hard_part(&result)
}

/// `prod_i e(P_i, Q_i)` sharing one Miller accumulator and one final
/// exponentiation.
pub fn reduced_ate_pairing_batch(ps: &[G1Affine], qs: &[G2Affine]) -> Fq12 {
    debug_assert_eq!(ps.len(), qs.len());
    let mut points = Vec::with_capacity(ps.len());
    let mut lines = Vec::with_capacity(ps.len());
    for (p, q) in ps.iter().zip(qs.iter()) {
        if p.is_zero() || q.is_zero() {
            continue;
        }
        let mut l = MillerLines::default();
        precompute_miller_lines(q, &mut l);
        points.push(*p);
        lines.push(l);
    }
    if points.is_empty() {
        return Fq12::one();
    }

    let result = miller_loop_batch(&points, &lines);
    let result = final_exponentiation_easy_part(&result);
    final_exponentiation_hard_part(&result)
}

/// Batch pairing against line sets prepared once (the verifier's case: the
/// two G2 points come from the SRS and never change).
pub fn reduced_ate_pairing_batch_precomputed(ps: &[G1Affine], lines: &[MillerLines]) -> Fq12 {
    let result = miller_loop_batch(ps, lines);
    let result = final_exponentiation_easy_part(&result);
    final_exponentiation_hard_part(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::{G1Projective, G2Projective, ProjectiveCurve};
    use crate::fields::{Fr, PrimeField};
    use crate::UniformRand;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    #[test]
    fn non_degeneracy() {
        let g1 = G1Affine::prime_subgroup_generator();
        let g2 = G2Affine::prime_subgroup_generator();
        let e = reduced_ate_pairing(&g1, &g2);
        assert!(!e.is_one());
    }

    #[test]
    fn identity_inputs_map_to_one() {
        let g1 = G1Affine::prime_subgroup_generator();
        let g2 = G2Affine::prime_subgroup_generator();
        assert!(reduced_ate_pairing(&G1Affine::zero(), &g2).is_one());
        assert!(reduced_ate_pairing(&g1, &G2Affine::zero()).is_one());
    }

    #[test]
    fn bilinearity() {
        let mut rng = XorShiftRng::seed_from_u64(99);
        let a = Fr::rand(&mut rng);
        let b = Fr::rand(&mut rng);

        let g1 = G1Affine::prime_subgroup_generator();
        let g2 = G2Affine::prime_subgroup_generator();

        let a_g1 = g1.mul(a.into_repr()).into_affine();
        let b_g2 = g2.mul(b.into_repr()).into_affine();

        let lhs = reduced_ate_pairing(&a_g1, &b_g2);
        let rhs = reduced_ate_pairing(&g1, &g2).pow((a * b).into_repr());
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn batch_matches_product() {
        let mut rng = XorShiftRng::seed_from_u64(100);
        let p1 = G1Projective::rand(&mut rng).into_affine();
        let p2 = G1Projective::rand(&mut rng).into_affine();
        let q1 = G2Projective::rand(&mut rng).into_affine();
        let q2 = G2Projective::rand(&mut rng).into_affine();

        let batched = reduced_ate_pairing_batch(&[p1, p2], &[q1, q2]);
        let separate = reduced_ate_pairing(&p1, &q1) * reduced_ate_pairing(&p2, &q2);
        assert_eq!(batched, separate);
    }
}
