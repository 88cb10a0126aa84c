//! A pair of six-sided dice.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Outcome of rolling two dice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    first: u8,
    second: u8,
}

impl DiceRoll {
    /// Build a roll from known faces. Returns `None` for faces outside 1-6.
    pub fn new(first: u8, second: u8) -> Option<Self> {
        let roll = Self { first, second };
        roll.is_valid().then_some(roll)
    }

    /// Both faces within 1-6. Deserialized rolls are not checked on the way in.
    pub fn is_valid(&self) -> bool {
        let faces = 1..=6;
        faces.contains(&self.first) && faces.contains(&self.second)
    }

    pub fn first(&self) -> u8 {
        self.first
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    /// Roll both dice independently
    pub fn roll<R: Rng>(rng: &mut R) -> Self {
        Self {
            first: rng.gen_range(1..=6),
            second: rng.gen_range(1..=6),
        }
    }

    pub fn total(&self) -> u8 {
        self.first + self.second
    }

    pub fn is_doubles(&self) -> bool {
        self.first == self.second
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rolls_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let roll = DiceRoll::roll(&mut rng);
            assert!((1..=6).contains(&roll.first));
            assert!((1..=6).contains(&roll.second));
            assert!((2..=12).contains(&roll.total()));
        }
    }

    #[test]
    fn test_rejects_bad_faces() {
        assert!(DiceRoll::new(0, 3).is_none());
        assert!(DiceRoll::new(3, 7).is_none());
        assert_eq!(DiceRoll::new(4, 4).map(|r| r.is_doubles()), Some(true));
    }

    #[test]
    fn test_deserialized_faces_are_checked() {
        let roll: DiceRoll = serde_json::from_str(r#"{"first":200,"second":100}"#).unwrap();
        assert!(!roll.is_valid());

        let roll: DiceRoll = serde_json::from_str(r#"{"first":6,"second":1}"#).unwrap();
        assert!(roll.is_valid());
        assert_eq!(roll.total(), 7);
    }
}
