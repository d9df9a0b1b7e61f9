use proptest::prelude::*;
use strategy::{CrossoverSignal, SmaCrossover};

proptest! {
    /// The indicator must be total over arbitrary finite price vectors:
    /// either `None` (too little history) or one of the three variants,
    /// never a panic.
    #[test]
    fn crossover_never_panics(prices in prop::collection::vec(0.0001f64..1_000_000.0f64, 0..200)) {
        let cross = SmaCrossover::default();
        match cross.compute(&prices) {
            None => prop_assert!(prices.len() < 61),
            Some(_) => prop_assert!(prices.len() >= 61),
        }
    }

    /// Appending a bar equal to the previous close onto a flat window can
    /// never produce a cross.
    #[test]
    fn flat_extension_is_neutral(price in 0.01f64..100_000.0f64, len in 61usize..120) {
        let cross = SmaCrossover::default();
        let prices = vec![price; len];
        prop_assert_eq!(cross.compute(&prices), Some(CrossoverSignal::Neutral));
    }
}
