//! Pippenger multi-scalar multiplication over G1, with endomorphism-split
//! scalars, signed-window recoding, per-round bucket sorting and a
//! batch-affine fast path.

use crate::curves::{AffineCurve, G1Affine, G1Projective, ProjectiveCurve};
use crate::fields::{batch_inversion, Field, Fq, Fr};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Scalars are split into 127-bit halves before recoding.
const SPLIT_SCALAR_BITS: usize = 127;

/// Window bit-width per point count; the wNAF consumes `c + 1`-bit
/// signed-odd windows and each round keeps `2^c` buckets.
pub fn optimal_bucket_width(num_points: usize) -> usize {
    const WIDTHS: [usize; 18] = [2, 3, 3, 4, 5, 6, 6, 7, 8, 9, 10, 10, 11, 12, 13, 14, 14, 15];
    let log2 = log2_floor(num_points.max(8));
    WIDTHS[(log2.min(20) - 3) as usize]
}

#[inline]
fn log2_floor(num: usize) -> usize {
    debug_assert!(num > 0);
    (usize::BITS - 1 - num.leading_zeros()) as usize
}

#[inline]
fn num_rounds(num_initial_points: usize) -> usize {
    let wnaf_bits = optimal_bucket_width(num_initial_points) + 1;
    (SPLIT_SCALAR_BITS + wnaf_bits - 1) / wnaf_bits
}

/// Owned scratch buffers for Pippenger. The original design kept these in
/// process-wide statics touched once at startup; owning them per context
/// keeps the first-touch page faults off the proving path while making
/// each prover instance independently reentrant.
pub struct MsmContext {
    max_num_points: usize,
    point_schedule: Vec<u64>,
    sort_scratch: Vec<u64>,
    skew_table: Vec<bool>,
    buckets: Vec<G1Projective>,
}

impl MsmContext {
    /// Sizes every buffer for multiplications of up to `max_num_points`
    /// point/scalar pairs.
    pub fn new(max_num_points: usize) -> Self {
        let max_pow2 = max_num_points.next_power_of_two();
        let mut schedule_capacity = 0;
        let mut log2 = 3;
        while (1usize << log2) <= max_pow2 {
            let n = 1usize << log2;
            schedule_capacity = schedule_capacity.max(num_rounds(n) * 2 * n);
            log2 += 1;
        }

        let bucket_capacity = max_accumulation_threads() << optimal_bucket_width(max_pow2);

        MsmContext {
            max_num_points,
            point_schedule: vec![0u64; schedule_capacity],
            sort_scratch: vec![0u64; schedule_capacity],
            skew_table: vec![false; 2 * max_pow2],
            buckets: vec![G1Projective::zero(); bucket_capacity],
        }
    }

    pub fn max_num_points(&self) -> usize {
        self.max_num_points
    }
}

#[inline]
fn max_accumulation_threads() -> usize {
    crate::fft::domain::num_threads().next_power_of_two()
}

/// Expands `num_points` affine points (stored in the front of `table`)
/// into the 2x endomorphism table `{P_i, -lambda * P_i}` in place, so the
/// split halves of each scalar address adjacent entries. Walks backwards
/// so source and destination ranges may overlap.
pub fn generate_pippenger_point_table(table: &mut [G1Affine], num_points: usize) {
    debug_assert!(table.len() >= 2 * num_points);
    for i in (0..num_points).rev() {
        let p = table[i];
        table[2 * i] = p;
        table[2 * i + 1] = G1Affine::new(p.x * Fq::CUBE_ROOT, -p.y, p.infinity);
    }
}

/// Signed-odd fixed-window recoding of a 128-bit scalar into the
/// round-major schedule.
///
/// Each window is `wnaf_bits` wide with odd digits in
/// `[-2^wnaf_bits + 1, 2^wnaf_bits - 1]`; even scalars are made odd by
/// adding one and raising the skew flag, which the accumulation loop
/// repays by subtracting the point after the final round. Entries are
/// written most-significant window first, `stride` apart, packed as
/// `point_index << 32 | sign << 31 | (|digit| - 1)/2`.
fn fixed_wnaf(
    scalar: u128,
    wnaf: &mut [u64],
    stride: usize,
    rounds: usize,
    skew: &mut bool,
    point_index: u64,
    wnaf_bits: usize,
) {
    *skew = scalar & 1 == 0;
    let mut s = scalar + (*skew as u128);

    let window_mask = (1u128 << wnaf_bits) - 1;
    let encode = |digit: i64| -> u64 {
        let negative = digit < 0;
        let mag = digit.unsigned_abs();
        (point_index << 32) | ((negative as u64) << 31) | ((mag - 1) >> 1)
    };

    for round in 0..rounds - 1 {
        // Keep the quotient odd so the next digit stays odd; exactly one
        // of {q, q + 1} is.
        let t = (s & window_mask) as i64;
        let q = s >> wnaf_bits;
        let digit = if q & 1 == 1 {
            s = q;
            t
        } else {
            s = q + 1;
            t - (1i64 << wnaf_bits)
        };
        wnaf[(rounds - 1 - round) * stride] = encode(digit);
    }
    debug_assert!(s < (1u128 << wnaf_bits));
    wnaf[0] = encode(s as i64);
}

/// Recodes every scalar into the per-round schedule. Each initial scalar
/// produces two 127-bit halves addressing table entries `2i` and `2i + 1`.
/// The split-and-recode work runs across threads; the strided scatter into
/// the round-major schedule stays sequential and memory-bound.
fn compute_wnaf_states(ctx: &mut MsmContext, scalars: &[Fr], num_initial_points: usize) {
    let num_points = num_initial_points * 2;
    let rounds = num_rounds(num_initial_points);
    let wnaf_bits = optimal_bucket_width(num_initial_points) + 1;

    let recode = |(i, scalar): (usize, &Fr)| -> (Vec<u64>, bool, Vec<u64>, bool) {
        let (k1, k2) = scalar.split_into_endomorphism_scalars();
        let k1 = k1.0[0] as u128 | ((k1.0[1] as u128) << 64);
        let k2 = k2.0[0] as u128 | ((k2.0[1] as u128) << 64);

        let mut column_1 = vec![0u64; rounds];
        let mut column_2 = vec![0u64; rounds];
        let mut skew_1 = false;
        let mut skew_2 = false;
        fixed_wnaf(k1, &mut column_1, 1, rounds, &mut skew_1, (2 * i) as u64, wnaf_bits);
        fixed_wnaf(
            k2,
            &mut column_2,
            1,
            rounds,
            &mut skew_2,
            (2 * i + 1) as u64,
            wnaf_bits,
        );
        (column_1, skew_1, column_2, skew_2)
    };

    #[cfg(feature = "parallel")]
    let recoded: Vec<_> = scalars[..num_initial_points]
        .par_iter()
        .enumerate()
        .map(recode)
        .collect();
    #[cfg(not(feature = "parallel"))]
    let recoded: Vec<_> = scalars[..num_initial_points]
        .iter()
        .enumerate()
        .map(recode)
        .collect();

    let schedule = &mut ctx.point_schedule[..rounds * num_points];
    let skews = &mut ctx.skew_table[..num_points];
    for (i, (column_1, skew_1, column_2, skew_2)) in recoded.into_iter().enumerate() {
        for (round, (&e1, &e2)) in column_1.iter().zip(column_2.iter()).enumerate() {
            schedule[round * num_points + 2 * i] = e1;
            schedule[round * num_points + 2 * i + 1] = e2;
        }
        skews[2 * i] = skew_1;
        skews[2 * i + 1] = skew_2;
    }
}

fn radix_pass(src: &[u64], dst: &mut [u64], shift: usize, mask: usize) {
    let mut offsets = [0usize; 256];
    for &e in src.iter() {
        offsets[((e >> shift) as usize) & mask] += 1;
    }
    let mut acc = 0;
    for o in offsets.iter_mut() {
        let count = *o;
        *o = acc;
        acc += count;
    }
    for &e in src.iter() {
        let d = ((e >> shift) as usize) & mask;
        dst[offsets[d]] = e;
        offsets[d] += 1;
    }
}

/// Sorts each round's schedule by bucket index so that accumulation walks
/// buckets contiguously. LSD radix over the low 31 bits; an even number
/// of passes lands the result back in the schedule buffer. Output order
/// on equal keys is irrelevant.
fn organize_buckets(ctx: &mut MsmContext, num_points: usize, rounds: usize) {
    let schedule = &mut ctx.point_schedule[..rounds * num_points];
    let scratch = &mut ctx.sort_scratch[..rounds * num_points];

    let sort_round = |(chunk, tmp): (&mut [u64], &mut [u64])| {
        radix_pass(chunk, tmp, 0, 0xff);
        radix_pass(tmp, chunk, 8, 0xff);
        radix_pass(chunk, tmp, 16, 0xff);
        radix_pass(tmp, chunk, 24, 0x7f);
    };

    #[cfg(feature = "parallel")]
    schedule
        .par_chunks_mut(num_points)
        .zip(scratch.par_chunks_mut(num_points))
        .for_each(sort_round);
    #[cfg(not(feature = "parallel"))]
    schedule
        .chunks_mut(num_points)
        .zip(scratch.chunks_mut(num_points))
        .for_each(sort_round);
}

#[derive(Clone, Copy)]
struct ScheduleEntry {
    bucket: usize,
    negative: bool,
    point_index: usize,
}

#[inline]
fn decode(entry: u64) -> ScheduleEntry {
    ScheduleEntry {
        bucket: (entry & 0x7fffffff) as usize,
        negative: (entry >> 31) & 1 == 1,
        point_index: (entry >> 32) as usize,
    }
}

/// Folds one thread's bucket span into a single point:
/// `sum_k (2(b_k - first) + 1) * bucket_k` via the running-sum trick,
/// then lifts by `2 * first_bucket` running sums when the span does not
/// start at bucket zero.
fn concatenate_buckets(buckets: &[G1Projective], first_bucket: usize) -> G1Projective {
    let num_buckets = buckets.len();
    let mut running_sum = G1Projective::zero();
    let mut accumulator = G1Projective::zero();

    for k in (1..num_buckets).rev() {
        running_sum.add_assign(&buckets[k]);
        accumulator.add_assign(&running_sum);
    }
    running_sum.add_assign(&buckets[0]);
    accumulator.double_in_place();
    accumulator.add_assign(&running_sum);

    if first_bucket > 0 {
        let multiplier = (first_bucket as u64) << 1;
        let mut rolling = G1Projective::zero();
        for shift in (0..64 - multiplier.leading_zeros()).rev() {
            rolling.double_in_place();
            if (multiplier >> shift) & 1 == 1 {
                rolling.add_assign(&running_sum);
            }
        }
        accumulator.add_assign(&rolling);
    }
    accumulator
}

#[allow(clippy::too_many_arguments)]
fn accumulate_thread(
    schedule: &[u64],
    rounds: usize,
    num_points: usize,
    points_per_thread: usize,
    thread_index: usize,
    points: &[G1Affine],
    skews: &[bool],
    buckets: &mut [G1Projective],
    wnaf_bits: usize,
) -> G1Projective {
    let mut thread_accumulator = G1Projective::zero();

    for round in 0..rounds {
        let entries =
            &schedule[round * num_points + thread_index * points_per_thread..][..points_per_thread];
        let first_bucket = decode(entries[0]).bucket;
        let last_bucket = decode(entries[points_per_thread - 1]).bucket;
        let num_thread_buckets = last_bucket - first_bucket + 1;

        let span = &mut buckets[..num_thread_buckets];
        for b in span.iter_mut() {
            *b = G1Projective::zero();
        }

        for &raw in entries.iter() {
            let e = decode(raw);
            span[e.bucket - first_bucket]
                .add_assign_mixed_or_sub(&points[e.point_index], e.negative);
        }

        let mut accumulator = concatenate_buckets(span, first_bucket);

        if round == rounds - 1 {
            let base = thread_index * points_per_thread;
            for (k, &skewed) in skews[base..base + points_per_thread].iter().enumerate() {
                if skewed {
                    accumulator.add_assign_mixed(&(-points[base + k]));
                }
            }
        }

        if round > 0 {
            for _ in 0..wnaf_bits {
                thread_accumulator.double_in_place();
            }
        }
        thread_accumulator.add_assign(&accumulator);
    }

    thread_accumulator
}

/// Affine-pipeline bucket accumulation: repeatedly pair up points landing
/// in the same bucket and resolve every pair of a pass with one shared
/// batch inversion, until each bucket holds at most one point.
#[allow(clippy::too_many_arguments)]
fn accumulate_thread_affine(
    schedule: &[u64],
    rounds: usize,
    num_points: usize,
    points_per_thread: usize,
    thread_index: usize,
    points: &[G1Affine],
    skews: &[bool],
    wnaf_bits: usize,
) -> G1Projective {
    let mut thread_accumulator = G1Projective::zero();

    for round in 0..rounds {
        let entries =
            &schedule[round * num_points + thread_index * points_per_thread..][..points_per_thread];
        let first_bucket = decode(entries[0]).bucket;
        let last_bucket = decode(entries[points_per_thread - 1]).bucket;
        let num_thread_buckets = last_bucket - first_bucket + 1;

        // Bucket-sorted work list of affine points, signs applied.
        let mut work: Vec<(u32, G1Affine)> = entries
            .iter()
            .map(|&raw| {
                let e = decode(raw);
                let p = points[e.point_index];
                ((e.bucket - first_bucket) as u32, if e.negative { -p } else { p })
            })
            .collect();

        let mut denominators: Vec<Fq> = Vec::with_capacity(work.len() / 2);
        let mut pairs: Vec<(usize, usize)> = Vec::with_capacity(work.len() / 2);
        loop {
            pairs.clear();
            let mut i = 0;
            while i + 1 < work.len() {
                if work[i].0 == work[i + 1].0 {
                    pairs.push((i, i + 1));
                    i += 2;
                } else {
                    i += 1;
                }
            }
            if pairs.is_empty() {
                break;
            }

            // One inversion for every collision in this pass. The
            // incomplete formula's x1 == x2 exception is not checked;
            // reaching it requires breaking the linear-independence
            // assumption on the bases.
            denominators.clear();
            for &(a, b) in &pairs {
                denominators.push(work[b].1.x - work[a].1.x);
            }
            batch_inversion(&mut denominators);

            let mut consumed = vec![false; work.len()];
            for (&(a, b), inv) in pairs.iter().zip(denominators.iter()) {
                let (p, q) = (work[a].1, work[b].1);
                let lambda = (q.y - p.y) * inv;
                let x3 = lambda.square() - p.x - q.x;
                let y3 = lambda * (p.x - x3) - p.y;
                work[a].1 = G1Affine::new(x3, y3, false);
                consumed[b] = true;
            }
            let mut next: Vec<(u32, G1Affine)> = Vec::with_capacity(work.len() - pairs.len());
            for (i, item) in work.iter().enumerate() {
                if !consumed[i] {
                    next.push(*item);
                }
            }
            work = next;
        }

        // Each bucket now holds at most one point; concatenate with mixed
        // additions.
        let mut span = vec![G1Projective::zero(); num_thread_buckets];
        for (b, p) in &work {
            span[*b as usize].add_assign_mixed(p);
        }
        let mut accumulator = concatenate_buckets(&span, first_bucket);

        if round == rounds - 1 {
            let base = thread_index * points_per_thread;
            for (k, &skewed) in skews[base..base + points_per_thread].iter().enumerate() {
                if skewed {
                    accumulator.add_assign_mixed(&(-points[base + k]));
                }
            }
        }

        if round > 0 {
            for _ in 0..wnaf_bits {
                thread_accumulator.double_in_place();
            }
        }
        thread_accumulator.add_assign(&accumulator);
    }

    thread_accumulator
}

fn pippenger_power_of_two(
    ctx: &mut MsmContext,
    scalars: &[Fr],
    points: &[G1Affine],
    num_initial_points: usize,
    unsafe_affine: bool,
) -> G1Projective {
    let num_points = num_initial_points * 2;
    let rounds = num_rounds(num_initial_points);
    let wnaf_bits = optimal_bucket_width(num_initial_points) + 1;

    compute_wnaf_states(ctx, scalars, num_initial_points);
    organize_buckets(ctx, num_points, rounds);

    let num_threads = max_accumulation_threads().min(num_points / 8).max(1);
    let points_per_thread = num_points / num_threads;
    let bucket_span = ctx.buckets.len() / max_accumulation_threads();

    let schedule = &ctx.point_schedule[..rounds * num_points];
    let skews = &ctx.skew_table[..num_points];

    let run = |(thread_index, buckets): (usize, &mut [G1Projective])| -> G1Projective {
        if thread_index >= num_threads {
            return G1Projective::zero();
        }
        if unsafe_affine {
            accumulate_thread_affine(
                schedule,
                rounds,
                num_points,
                points_per_thread,
                thread_index,
                points,
                skews,
                wnaf_bits,
            )
        } else {
            accumulate_thread(
                schedule,
                rounds,
                num_points,
                points_per_thread,
                thread_index,
                points,
                skews,
                buckets,
                wnaf_bits,
            )
        }
    };

    #[cfg(feature = "parallel")]
    let partials: Vec<G1Projective> = ctx
        .buckets
        .par_chunks_mut(bucket_span)
        .enumerate()
        .map(run)
        .collect();
    #[cfg(not(feature = "parallel"))]
    let partials: Vec<G1Projective> = ctx
        .buckets
        .chunks_mut(bucket_span)
        .enumerate()
        .map(run)
        .collect();

    let mut result = G1Projective::zero();
    for p in partials {
        result.add_assign(&p);
    }
    result
}

fn pippenger_inner(
    ctx: &mut MsmContext,
    scalars: &[Fr],
    points: &[G1Affine],
    num_initial_points: usize,
    unsafe_affine: bool,
) -> G1Projective {
    assert!(
        num_initial_points <= ctx.max_num_points,
        "msm context sized for {} points, given {}",
        ctx.max_num_points,
        num_initial_points
    );

    if num_initial_points == 0 {
        return G1Projective::zero();
    }

    // Below this threshold the recoding overhead dominates; fall back to
    // per-point ladders.
    let threshold = core::cmp::max(8, 8 * crate::fft::domain::num_threads());
    if num_initial_points <= threshold {
        use crate::fields::PrimeField;
        let work = |(i, scalar): (usize, &Fr)| points[2 * i].mul(scalar.into_repr());

        #[cfg(feature = "parallel")]
        let results: Vec<G1Projective> = scalars[..num_initial_points]
            .par_iter()
            .enumerate()
            .map(work)
            .collect();
        #[cfg(not(feature = "parallel"))]
        let results: Vec<G1Projective> = scalars[..num_initial_points]
            .iter()
            .enumerate()
            .map(work)
            .collect();

        let mut acc = G1Projective::zero();
        for r in results {
            acc.add_assign(&r);
        }
        return acc;
    }

    let chunk = 1usize << log2_floor(num_initial_points);
    let mut result = pippenger_power_of_two(ctx, scalars, points, chunk, unsafe_affine);

    if chunk != num_initial_points {
        let tail = pippenger_inner(
            ctx,
            &scalars[chunk..],
            &points[2 * chunk..],
            num_initial_points - chunk,
            unsafe_affine,
        );
        result.add_assign(&tail);
    }
    result
}

/// `sum_i scalars[i] * P_i` over an endomorphism-expanded point table
/// (two entries per initial point; see `generate_pippenger_point_table`).
/// An all-cancelling input is a legitimate case and returns the identity.
pub fn pippenger(
    ctx: &mut MsmContext,
    scalars: &[Fr],
    points: &[G1Affine],
    num_initial_points: usize,
) -> G1Projective {
    pippenger_inner(ctx, scalars, points, num_initial_points, false)
}

/// Pippenger over the batch-affine addition pipeline.
///
/// The incomplete affine formula is used unchecked: if two accumulated
/// points in a pass share an x-coordinate with distinct y-coordinates the
/// result is garbage. That event is as hard to reach as a discrete log
/// when the bases are linearly independent (polynomial-commitment
/// openings), which is the only setting this entry point is meant for.
/// Never use it to verify untrusted data.
pub fn pippenger_unsafe(
    ctx: &mut MsmContext,
    scalars: &[Fr],
    points: &[G1Affine],
    num_initial_points: usize,
) -> G1Projective {
    pippenger_inner(ctx, scalars, points, num_initial_points, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::PrimeField;
    use crate::UniformRand;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    fn naive_msm(points: &[G1Affine], scalars: &[Fr]) -> G1Projective {
        let mut acc = G1Projective::zero();
        for (p, s) in points.iter().zip(scalars.iter()) {
            acc.add_assign(&p.mul(s.into_repr()));
        }
        acc
    }

    fn random_inputs(n: usize, seed: u64) -> (Vec<G1Affine>, Vec<Fr>) {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let points: Vec<G1Affine> = (0..n)
            .map(|_| G1Projective::rand(&mut rng).into_affine())
            .collect();
        let scalars: Vec<Fr> = (0..n).map(|_| Fr::rand(&mut rng)).collect();
        (points, scalars)
    }

    fn expanded_table(points: &[G1Affine]) -> Vec<G1Affine> {
        let mut table = vec![G1Affine::zero(); 2 * points.len()];
        table[..points.len()].copy_from_slice(points);
        generate_pippenger_point_table(&mut table, points.len());
        table
    }

    #[test]
    fn point_table_entries_are_endomorphism_images() {
        let (points, _) = random_inputs(4, 1);
        let table = expanded_table(&points);
        for (i, p) in points.iter().enumerate() {
            assert_eq!(table[2 * i], *p);
            let lambda_p = p.mul(Fr::CUBE_ROOT.into_repr()).into_affine();
            assert_eq!(table[2 * i + 1], -lambda_p);
        }
    }

    #[test]
    fn matches_naive_sum() {
        for &n in &[1usize, 2, 8, 32, 100, 1024] {
            let (points, scalars) = random_inputs(n, n as u64);
            let table = expanded_table(&points);
            let mut ctx = MsmContext::new(1024);
            let fast = pippenger(&mut ctx, &scalars, &table, n);
            assert_eq!(fast, naive_msm(&points, &scalars), "n = {}", n);
        }
    }

    #[test]
    fn unsafe_path_matches_safe_path() {
        for &n in &[64usize, 257, 1024] {
            let (points, scalars) = random_inputs(n, 1000 + n as u64);
            let table = expanded_table(&points);
            let mut ctx = MsmContext::new(1024);
            let safe = pippenger(&mut ctx, &scalars, &table, n);
            let fast = pippenger_unsafe(&mut ctx, &scalars, &table, n);
            assert_eq!(safe, fast, "n = {}", n);
        }
    }

    #[test]
    #[ignore]
    fn matches_naive_sum_large() {
        let n = 1 << 16;
        let (points, scalars) = random_inputs(n, 65536);
        let table = expanded_table(&points);
        let mut ctx = MsmContext::new(n);
        let fast = pippenger(&mut ctx, &scalars, &table, n);
        assert_eq!(fast, naive_msm(&points, &scalars));
        let unsafe_fast = pippenger_unsafe(&mut ctx, &scalars, &table, n);
        assert_eq!(fast, unsafe_fast);
    }

    #[test]
    fn zero_points_yield_identity() {
        let mut ctx = MsmContext::new(16);
        let out = pippenger(&mut ctx, &[], &[], 0);
        assert!(out.is_zero());
    }

    #[test]
    fn context_is_reusable() {
        let (points, scalars) = random_inputs(128, 9);
        let table = expanded_table(&points);
        let mut ctx = MsmContext::new(128);
        let first = pippenger(&mut ctx, &scalars, &table, 128);
        let second = pippenger(&mut ctx, &scalars, &table, 128);
        assert_eq!(first, second);
        assert_eq!(first, naive_msm(&points, &scalars));
    }
}
