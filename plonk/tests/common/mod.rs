//! Test fixtures: a minimal gate-list builder that reduces hand-written
//! circuits to the proving key and witness the prover consumes. Circuit
//! construction proper lives in the upstream composer layer; this is just
//! enough plumbing to drive end-to-end proofs.

use algebra::fft::Polynomial;
use algebra::Fr;
use num_traits::Zero;
use plonk::permutation::encode_epicycle;
use plonk::{PlonkVariant, ProvingKey, ReferenceString, Witness};
use std::collections::BTreeMap;

pub struct CircuitBuilder {
    variant: PlonkVariant,
    selectors: BTreeMap<String, Vec<Fr>>,
    wire_variables: Vec<Vec<usize>>,
    variables: Vec<Fr>,
    public_inputs: Vec<Fr>,
    num_gates: usize,
}

impl CircuitBuilder {
    pub fn new(variant: PlonkVariant) -> Self {
        let selectors = variant
            .required_selectors()
            .iter()
            .map(|name| (name.to_string(), Vec::new()))
            .collect();
        CircuitBuilder {
            variant,
            selectors,
            wire_variables: vec![Vec::new(); variant.program_width()],
            variables: Vec::new(),
            public_inputs: Vec::new(),
            num_gates: 0,
        }
    }

    pub fn add_variable(&mut self, value: Fr) -> usize {
        self.variables.push(value);
        self.variables.len() - 1
    }

    /// Appends one gate: named selector values (unnamed ones default to
    /// zero) and one variable per wire column.
    pub fn add_gate(&mut self, selector_values: &[(&str, Fr)], wires: &[usize]) {
        assert_eq!(wires.len(), self.variant.program_width());
        for (name, column) in self.selectors.iter_mut() {
            let value = selector_values
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| *v)
                .unwrap_or_else(Fr::zero);
            column.push(value);
        }
        for (column, &var) in self.wire_variables.iter_mut().zip(wires.iter()) {
            assert!(var < self.variables.len());
            column.push(var);
        }
        self.num_gates += 1;
    }

    /// Declares a public input: pins a fresh variable to `value` with a
    /// constant gate and records the value for the transcript.
    pub fn add_public_input(&mut self, value: Fr) -> usize {
        let var = self.add_variable(value);
        let zero = self.add_variable(Fr::zero());
        let (q_left, q_const) = match self.variant {
            PlonkVariant::Turbo => ("q_1", "q_c"),
            _ => ("q_l", "q_c"),
        };
        let mut wires = vec![zero; self.variant.program_width()];
        wires[0] = var;
        self.add_gate(
            &[(q_left, Fr::from(1)), (q_const, -value)],
            &wires,
        );
        self.public_inputs.push(value);
        var
    }

    /// Pads to a power-of-two gate count (always leaving at least one
    /// copy-free terminal gate so the grand product closes one root
    /// early), builds the sigma cycles, and assembles the key and
    /// witness.
    pub fn finalize(mut self, srs: ReferenceString) -> (ProvingKey, Witness) {
        let width = self.variant.program_width();
        let n = (self.num_gates + 1).next_power_of_two().max(4);

        for column in self.selectors.values_mut() {
            column.resize(n, Fr::zero());
        }

        // Epicycle lists per variable.
        let mut occurrences: Vec<Vec<(u32, u32)>> = vec![Vec::new(); self.variables.len()];
        for (column, gates) in self.wire_variables.iter().enumerate() {
            for (gate, &var) in gates.iter().enumerate() {
                occurrences[var].push((gate as u32, column as u32));
            }
        }

        // Identity everywhere, then close each variable's cycle.
        let mut mappings: Vec<Vec<u32>> = (0..width)
            .map(|column| {
                (0..n)
                    .map(|gate| encode_epicycle(gate as u32, column as u32))
                    .collect()
            })
            .collect();
        for cycle in &occurrences {
            for (i, &(gate, column)) in cycle.iter().enumerate() {
                let (next_gate, next_column) = cycle[(i + 1) % cycle.len()];
                mappings[column as usize][gate as usize] =
                    encode_epicycle(next_gate, next_column);
            }
        }

        let mut key = ProvingKey::new(n, srs).unwrap();
        for (name, values) in self.selectors.iter() {
            key.insert_constraint_selector(name, values.clone());
        }
        for (column, mapping) in mappings.iter().enumerate() {
            key.insert_permutation_selector(&format!("sigma_{}", column + 1), mapping);
        }

        let mut wires = BTreeMap::new();
        for (column, gates) in self.wire_variables.iter().enumerate() {
            let mut values: Vec<Fr> =
                gates.iter().map(|&var| self.variables[var]).collect();
            values.resize(n, Fr::zero());
            wires.insert(
                format!("w_{}", column + 1),
                Polynomial::from_coefficients(values),
            );
        }

        (key, Witness::new(wires, self.public_inputs))
    }

    /// Overwrites a variable after gates were recorded, to fabricate
    /// inconsistent witnesses.
    pub fn corrupt_variable(&mut self, var: usize, value: Fr) {
        self.variables[var] = value;
    }
}

pub fn test_srs(degree: usize, seed: u64) -> ReferenceString {
    use algebra::UniformRand;
    use rand::SeedableRng;
    let mut rng = rand_xorshift::XorShiftRng::seed_from_u64(seed);
    ReferenceString::new_from_secret(degree, Fr::rand(&mut rng))
}
