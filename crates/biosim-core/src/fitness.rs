//! Fitness and the probabilities derived from it.
//!
//! Every function here is pure: inputs are the animal's state and the
//! species table, no randomness involved.

use crate::config::SpeciesParams;

/// Logistic factor falling with age
pub fn q_plus(age: f64, a_half: f64, phi_age: f64) -> f64 {
    1.0 / (1.0 + (phi_age * (age - a_half)).exp())
}

/// Logistic factor rising with weight
pub fn q_minus(weight: f64, w_half: f64, phi_weight: f64) -> f64 {
    1.0 / (1.0 + (-phi_weight * (weight - w_half)).exp())
}

/// Fitness in `[0, 1]`; zero for animals without weight
pub fn fitness(age: u32, weight: f64, params: &SpeciesParams) -> f64 {
    if weight <= 0.0 {
        return 0.0;
    }
    q_plus(f64::from(age), params.a_half, params.phi_age)
        * q_minus(weight, params.w_half, params.phi_weight)
}

/// Yearly death probability
pub fn death_probability(fitness: f64, params: &SpeciesParams) -> f64 {
    params.omega * (1.0 - fitness)
}

/// Probability of giving birth with `n` animals of the species in the cell
pub fn birth_probability(fitness: f64, n: usize, params: &SpeciesParams) -> f64 {
    (params.gamma * fitness * (n as f64 - 1.0)).min(1.0)
}

/// Probability that a predator with fitness `predator` kills prey with
/// fitness `prey`
pub fn kill_probability(predator: f64, prey: f64, delta_phi_max: f64) -> f64 {
    let difference = predator - prey;
    if difference <= 0.0 {
        0.0
    } else if difference < delta_phi_max {
        difference / delta_phi_max
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fitness_reference_value() {
        // weight == w_half and age far below a_half
        let params = SpeciesParams::herbivore();
        let phi = fitness(10, 10.0, &params);
        assert!((phi - 0.5).abs() < 1e-6);
        assert!(phi < 0.5);

        let expected = q_plus(10.0, 40.0, 0.6) * q_minus(10.0, 10.0, 0.1);
        assert_eq!(phi, expected);
    }

    #[test]
    fn test_fitness_zero_weight() {
        let params = SpeciesParams::carnivore();
        assert_eq!(fitness(3, 0.0, &params), 0.0);
        assert_eq!(fitness(3, -1.0, &params), 0.0);
    }

    #[test]
    fn test_birth_probability_capped() {
        let params = SpeciesParams::carnivore();
        assert_eq!(birth_probability(1.0, 100, &params), 1.0);
        assert_eq!(birth_probability(1.0, 1, &params), 0.0);
    }

    #[test]
    fn test_kill_probability_branches() {
        assert_eq!(kill_probability(0.3, 0.5, 10.0), 0.0);
        assert_eq!(kill_probability(0.5, 0.5, 10.0), 0.0);
        assert!((kill_probability(0.8, 0.3, 1.0) - 0.5).abs() < 1e-12);
        assert_eq!(kill_probability(0.9, 0.1, 0.5), 1.0);
    }

    proptest! {
        #[test]
        fn proptest_fitness_bounded(age in 0u32..200, weight in 0.0f64..500.0) {
            for params in [SpeciesParams::herbivore(), SpeciesParams::carnivore()] {
                let phi = fitness(age, weight, &params);
                prop_assert!((0.0..=1.0).contains(&phi));
                if weight == 0.0 {
                    prop_assert_eq!(phi, 0.0);
                }
            }
        }

        #[test]
        fn proptest_kill_probability_bounded(
            predator in 0.0f64..1.0,
            prey in 0.0f64..1.0,
            delta in 0.01f64..20.0,
        ) {
            let p = kill_probability(predator, prey, delta);
            prop_assert!((0.0..=1.0).contains(&p));
        }
    }
}
