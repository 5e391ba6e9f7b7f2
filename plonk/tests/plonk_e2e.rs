//! End-to-end proving and verification across the four arithmetisation
//! variants.

mod common;

use algebra::{Field, Fr, UniformRand};
use common::{test_srs, CircuitBuilder};
use num_traits::{One, Zero};
use plonk::{preprocess, PlonkVariant, Prover};
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;

/// `1 * 1 - 1 = 0`: the smallest satisfiable circuit.
fn single_mul_circuit() -> CircuitBuilder {
    let mut builder = CircuitBuilder::new(PlonkVariant::Standard);
    let one = builder.add_variable(Fr::one());
    builder.add_gate(
        &[("q_m", Fr::one()), ("q_o", -Fr::one())],
        &[one, one, one],
    );
    builder
}

#[test]
fn standard_single_gate_accepts() {
    let builder = single_mul_circuit();
    let (key, witness) = builder.finalize(test_srs(64, 1));
    let mut prover = Prover::new(key, witness, PlonkVariant::Standard);
    let verifier = preprocess(&prover);

    let mut rng = XorShiftRng::seed_from_u64(100);
    let proof = prover.construct_proof(&mut rng);
    assert!(verifier.verify_proof(&proof, &[]).unwrap());
}

#[test]
fn standard_proof_rejects_any_byte_flip() {
    let builder = single_mul_circuit();
    let (key, witness) = builder.finalize(test_srs(64, 2));
    let mut prover = Prover::new(key, witness, PlonkVariant::Standard);
    let verifier = preprocess(&prover);

    let mut rng = XorShiftRng::seed_from_u64(101);
    let proof = prover.construct_proof(&mut rng);
    assert!(verifier.verify_proof(&proof, &[]).unwrap());

    for position in (0..proof.proof_data.len()).step_by(37) {
        let mut tampered = proof.clone();
        tampered.proof_data[position] ^= 1;
        let accepted = matches!(verifier.verify_proof(&tampered, &[]), Ok(true));
        assert!(!accepted, "flipped byte {} still verified", position);
    }
}

#[test]
fn standard_addition_circuit_accepts() {
    let mut rng = XorShiftRng::seed_from_u64(102);
    let mut builder = CircuitBuilder::new(PlonkVariant::Standard);
    // 2^10 domain: leave room for the terminal gate.
    for _ in 0..(1 << 10) - 1 {
        let a = Fr::rand(&mut rng);
        let b = Fr::rand(&mut rng);
        let a_idx = builder.add_variable(a);
        let b_idx = builder.add_variable(b);
        let c_idx = builder.add_variable(a + b);
        builder.add_gate(
            &[
                ("q_l", Fr::one()),
                ("q_r", Fr::one()),
                ("q_o", -Fr::one()),
            ],
            &[a_idx, b_idx, c_idx],
        );
    }

    let (key, witness) = builder.finalize(test_srs(1 << 11, 3));
    assert_eq!(key.n, 1 << 10);
    let mut prover = Prover::new(key, witness, PlonkVariant::Standard);
    let verifier = preprocess(&prover);
    let proof = prover.construct_proof(&mut rng);
    assert!(verifier.verify_proof(&proof, &[]).unwrap());
}

#[test]
fn standard_inconsistent_witness_rejects() {
    let mut builder = CircuitBuilder::new(PlonkVariant::Standard);
    let one = builder.add_variable(Fr::one());
    let out = builder.add_variable(Fr::one());
    builder.add_gate(
        &[("q_m", Fr::one()), ("q_o", -Fr::one())],
        &[one, one, out],
    );
    // Output off by one: 1 * 1 - 2 != 0.
    builder.corrupt_variable(out, Fr::from(2));

    let (key, witness) = builder.finalize(test_srs(64, 4));
    let mut prover = Prover::new(key, witness, PlonkVariant::Standard);
    let verifier = preprocess(&prover);
    let mut rng = XorShiftRng::seed_from_u64(103);
    let proof = prover.construct_proof(&mut rng);
    assert!(!verifier.verify_proof(&proof, &[]).unwrap());
}

#[test]
fn standard_broken_copy_constraint_rejects() {
    let mut builder = CircuitBuilder::new(PlonkVariant::Standard);
    // Gate 0: 3 * 3 = 9. Gate 1 reuses the output as its left input:
    // c * 9 = 90, which only holds for c = 10.
    let a = builder.add_variable(Fr::from(3));
    let b = builder.add_variable(Fr::from(3));
    let c = builder.add_variable(Fr::from(9));
    builder.add_gate(
        &[("q_m", Fr::one()), ("q_o", -Fr::one())],
        &[a, b, c],
    );
    let d = builder.add_variable(Fr::from(9));
    let e = builder.add_variable(Fr::from(90));
    builder.add_gate(
        &[("q_m", Fr::one()), ("q_o", -Fr::one())],
        &[c, d, e],
    );

    let (key, mut witness) = builder.finalize(test_srs(64, 5));
    // Lie about the shared wire's second use so both gates hold
    // arithmetically but the copy constraint does not: the sigma cycle
    // still ties gate 1's left input to gate 0's output.
    witness.wire_mut("w_1")[1] = Fr::from(10);

    let mut prover = Prover::new(key, witness, PlonkVariant::Standard);
    let verifier = preprocess(&prover);
    let mut rng = XorShiftRng::seed_from_u64(104);
    let proof = prover.construct_proof(&mut rng);
    assert!(!verifier.verify_proof(&proof, &[]).unwrap());
}

#[test]
fn standard_public_input_binds_proof() {
    let mut builder = CircuitBuilder::new(PlonkVariant::Standard);
    let pi_value = Fr::from(42);
    builder.add_public_input(pi_value);

    let (key, witness) = builder.finalize(test_srs(64, 6));
    let mut prover = Prover::new(key, witness, PlonkVariant::Standard);
    let verifier = preprocess(&prover);
    let mut rng = XorShiftRng::seed_from_u64(105);
    let proof = prover.construct_proof(&mut rng);

    assert!(verifier.verify_proof(&proof, &[pi_value]).unwrap());
    assert!(!verifier.verify_proof(&proof, &[Fr::from(43)]).unwrap());
}

#[test]
fn verification_is_deterministic_and_repeatable() {
    let builder = single_mul_circuit();
    let (key, witness) = builder.finalize(test_srs(64, 7));
    let mut prover = Prover::new(key, witness, PlonkVariant::Standard);
    let verifier = preprocess(&prover);
    let mut rng = XorShiftRng::seed_from_u64(106);
    let proof = prover.construct_proof(&mut rng);

    for _ in 0..3 {
        assert!(verifier.verify_proof(&proof, &[]).unwrap());
    }
}

#[test]
fn independent_provers_produce_distinct_valid_proofs() {
    let make_prover = |seed: u64| {
        let builder = single_mul_circuit();
        let (key, witness) = builder.finalize(test_srs(64, 8));
        let _ = seed;
        Prover::new(key, witness, PlonkVariant::Standard)
    };

    let mut prover_a = make_prover(0);
    let verifier = preprocess(&prover_a);
    let mut rng_a = XorShiftRng::seed_from_u64(107);
    let proof_a = prover_a.construct_proof(&mut rng_a);

    let mut prover_b = make_prover(1);
    let mut rng_b = XorShiftRng::seed_from_u64(108);
    let proof_b = prover_b.construct_proof(&mut rng_b);

    assert!(verifier.verify_proof(&proof_a, &[]).unwrap());
    assert!(verifier.verify_proof(&proof_b, &[]).unwrap());
    // Distinct blinding makes the transcripts diverge.
    assert_ne!(proof_a, proof_b);
}

#[test]
fn extended_output_shift_gate_accepts() {
    let mut builder = CircuitBuilder::new(PlonkVariant::Extended);
    let a = builder.add_variable(Fr::from(2));
    let b = builder.add_variable(Fr::from(3));
    let zero = builder.add_variable(Fr::zero());
    let sum = builder.add_variable(Fr::from(5));
    // Gate 0 consumes gate 1's output slot: a + b - w_3(X w) = 0.
    builder.add_gate(
        &[
            ("q_l", Fr::one()),
            ("q_r", Fr::one()),
            ("q_oo", -Fr::one()),
        ],
        &[a, b, zero],
    );
    builder.add_gate(&[], &[zero, zero, sum]);

    let (key, witness) = builder.finalize(test_srs(64, 9));
    let mut prover = Prover::new(key, witness, PlonkVariant::Extended);
    let verifier = preprocess(&prover);
    let mut rng = XorShiftRng::seed_from_u64(109);
    let proof = prover.construct_proof(&mut rng);
    assert!(verifier.verify_proof(&proof, &[]).unwrap());
}

#[test]
fn extended_wrong_shifted_output_rejects() {
    let mut builder = CircuitBuilder::new(PlonkVariant::Extended);
    let a = builder.add_variable(Fr::from(2));
    let b = builder.add_variable(Fr::from(3));
    let zero = builder.add_variable(Fr::zero());
    let sum = builder.add_variable(Fr::from(6));
    builder.add_gate(
        &[
            ("q_l", Fr::one()),
            ("q_r", Fr::one()),
            ("q_oo", -Fr::one()),
        ],
        &[a, b, zero],
    );
    builder.add_gate(&[], &[zero, zero, sum]);

    let (key, witness) = builder.finalize(test_srs(64, 10));
    let mut prover = Prover::new(key, witness, PlonkVariant::Extended);
    let verifier = preprocess(&prover);
    let mut rng = XorShiftRng::seed_from_u64(110);
    let proof = prover.construct_proof(&mut rng);
    assert!(!verifier.verify_proof(&proof, &[]).unwrap());
}

/// One x^7 MiMC round: w_3 = T^3 on the gate, T^7 on the next gate's
/// output column.
#[test]
fn mimc_round_gate_accepts() {
    let mut rng = XorShiftRng::seed_from_u64(111);
    let mut builder = CircuitBuilder::new(PlonkVariant::Mimc);

    let x_value = Fr::rand(&mut rng);
    let k_value = Fr::rand(&mut rng);
    let constant = Fr::rand(&mut rng);
    let t = x_value + k_value + constant;
    let cubed = t.square() * t;
    let out = cubed.square() * t;

    let x = builder.add_variable(x_value);
    let k = builder.add_variable(k_value);
    let x_cubed = builder.add_variable(cubed);
    let zero = builder.add_variable(Fr::zero());
    let x_out = builder.add_variable(out);

    builder.add_gate(
        &[
            ("q_mimc_selector", Fr::one()),
            ("q_mimc_coefficient", constant),
        ],
        &[x, k, x_cubed],
    );
    builder.add_gate(&[], &[zero, zero, x_out]);

    let (key, witness) = builder.finalize(test_srs(64, 12));
    let mut prover = Prover::new(key, witness, PlonkVariant::Mimc);
    let verifier = preprocess(&prover);
    let proof = prover.construct_proof(&mut rng);
    assert!(verifier.verify_proof(&proof, &[]).unwrap());
}

#[test]
fn mimc_wrong_cube_rejects() {
    let mut rng = XorShiftRng::seed_from_u64(113);
    let mut builder = CircuitBuilder::new(PlonkVariant::Mimc);

    let x = builder.add_variable(Fr::from(3));
    let k = builder.add_variable(Fr::zero());
    let constant = Fr::zero();
    let bad_cube = builder.add_variable(Fr::from(26));
    let zero = builder.add_variable(Fr::zero());
    // T = 3, T^7 = 2187.
    let x_out = builder.add_variable(Fr::from(2187));

    builder.add_gate(
        &[
            ("q_mimc_selector", Fr::one()),
            ("q_mimc_coefficient", constant),
        ],
        &[x, k, bad_cube],
    );
    builder.add_gate(&[], &[zero, zero, x_out]);

    let (key, witness) = builder.finalize(test_srs(64, 14));
    let mut prover = Prover::new(key, witness, PlonkVariant::Mimc);
    let verifier = preprocess(&prover);
    let proof = prover.construct_proof(&mut rng);
    assert!(!verifier.verify_proof(&proof, &[]).unwrap());
}

#[test]
fn turbo_addition_gate_accepts() {
    let mut rng = XorShiftRng::seed_from_u64(115);
    let mut builder = CircuitBuilder::new(PlonkVariant::Turbo);

    let a = Fr::rand(&mut rng);
    let b = Fr::rand(&mut rng);
    let a_idx = builder.add_variable(a);
    let b_idx = builder.add_variable(b);
    let c_idx = builder.add_variable(a + b);
    let zero = builder.add_variable(Fr::zero());
    builder.add_gate(
        &[
            ("q_1", Fr::one()),
            ("q_2", Fr::one()),
            ("q_3", -Fr::one()),
            ("q_arith", Fr::one()),
        ],
        &[a_idx, b_idx, c_idx, zero],
    );

    let (key, witness) = builder.finalize(test_srs(64, 16));
    let mut prover = Prover::new(key, witness, PlonkVariant::Turbo);
    let verifier = preprocess(&prover);
    let proof = prover.construct_proof(&mut rng);
    assert!(verifier.verify_proof(&proof, &[]).unwrap());
}

/// Builds the range-check accumulator chain for `value` over
/// `num_quads` base-4 digits. Returns the builder positioned after the
/// chain.
fn range_check_circuit(value: u64, num_quads: usize) -> CircuitBuilder {
    let mut builder = CircuitBuilder::new(PlonkVariant::Turbo);

    // a_0 = 0, a_j = 4 a_{j-1} + quad_j, a_{num_quads} = value.
    let mut accumulators = Vec::with_capacity(num_quads + 1);
    accumulators.push(0u64);
    for j in 1..=num_quads {
        let shift = 2 * (num_quads - j);
        accumulators.push(value >> shift);
    }

    let variables: Vec<usize> = accumulators
        .iter()
        .map(|&a| builder.add_variable(Fr::from(a)))
        .collect();

    // Each gate holds four accumulator values; the fifth comes from the
    // next gate's fourth wire.
    let num_range_gates = num_quads / 4;
    for gate in 0..num_range_gates {
        builder.add_gate(
            &[("q_range", Fr::one())],
            &[
                variables[4 * gate + 3],
                variables[4 * gate + 2],
                variables[4 * gate + 1],
                variables[4 * gate],
            ],
        );
    }
    let zero = builder.add_variable(Fr::zero());
    builder.add_gate(
        &[],
        &[zero, zero, zero, variables[num_quads]],
    );

    builder
}

#[test]
fn turbo_range_check_accepts_in_range_value() {
    let builder = range_check_circuit((1u64 << 32) - 1, 16);
    let (key, witness) = builder.finalize(test_srs(64, 17));
    let mut prover = Prover::new(key, witness, PlonkVariant::Turbo);
    let verifier = preprocess(&prover);
    let mut rng = XorShiftRng::seed_from_u64(117);
    let proof = prover.construct_proof(&mut rng);
    assert!(verifier.verify_proof(&proof, &[]).unwrap());
}

#[test]
fn turbo_range_check_rejects_out_of_range_value() {
    let builder = range_check_circuit(1u64 << 32, 16);
    let (key, witness) = builder.finalize(test_srs(64, 18));
    let mut prover = Prover::new(key, witness, PlonkVariant::Turbo);
    let verifier = preprocess(&prover);
    let mut rng = XorShiftRng::seed_from_u64(118);
    let proof = prover.construct_proof(&mut rng);
    assert!(!verifier.verify_proof(&proof, &[]).unwrap());
}

/// A single XOR quad through the logic gate: inputs a, b, product a*b,
/// output a ^ b, with zeroed accumulators behind them.
#[test]
fn turbo_logic_gate_accepts() {
    let (a, b) = (3u64, 1u64);
    let mut builder = CircuitBuilder::new(PlonkVariant::Turbo);

    let zero = builder.add_variable(Fr::zero());
    let a_acc = builder.add_variable(Fr::from(a));
    let b_acc = builder.add_variable(Fr::from(b));
    let product = builder.add_variable(Fr::from(a * b));
    let out_acc = builder.add_variable(Fr::from(a ^ b));

    // Gate 0: zero accumulators, the quad product on wire 3, q_c = -1
    // for XOR. Gate 1 carries the next accumulator values.
    builder.add_gate(
        &[("q_logic", Fr::one()), ("q_c", -Fr::one())],
        &[zero, zero, product, zero],
    );
    builder.add_gate(&[], &[a_acc, b_acc, zero, out_acc]);

    let (key, witness) = builder.finalize(test_srs(64, 19));
    let mut prover = Prover::new(key, witness, PlonkVariant::Turbo);
    let verifier = preprocess(&prover);
    let mut rng = XorShiftRng::seed_from_u64(119);
    let proof = prover.construct_proof(&mut rng);
    assert!(verifier.verify_proof(&proof, &[]).unwrap());
}
