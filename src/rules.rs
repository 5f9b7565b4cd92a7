//! Rule table for B3/S23.
//!
//! `decide` is the only place the automaton rule lives. Every evolver,
//! whether it walks single cells or whole rows, ends up here.

/// Next state indexed by `[alive][neighbors]`.
const RULE_TABLE: [[bool; 9]; 2] = {
    let mut table = [[false; 9]; 2];
    table[0][3] = true;
    table[1][2] = true;
    table[1][3] = true;
    table
};

/// Next state of a cell given its state and its live neighbor count.
///
/// A live cell survives with 2 or 3 neighbors; a dead cell is born with
/// exactly 3. Counts above 8 cannot occur on a torus and yield dead.
#[inline(always)]
pub fn decide(alive: bool, neighbors: u8) -> bool {
    match RULE_TABLE[alive as usize].get(neighbors as usize) {
        Some(&next) => next,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::decide;

    fn expected(alive: bool, neighbors: u8) -> bool {
        if alive {
            neighbors == 2 || neighbors == 3
        } else {
            neighbors == 3
        }
    }

    #[test]
    fn rule_table_matches_reference() {
        for alive in [false, true] {
            for neighbors in 0u8..=8 {
                assert_eq!(
                    decide(alive, neighbors),
                    expected(alive, neighbors),
                    "alive={alive} neighbors={neighbors}"
                );
            }
        }
    }

    #[test]
    fn births_and_survivals() {
        assert!(decide(false, 3));
        assert!(!decide(false, 2));
        assert!(decide(true, 2));
        assert!(decide(true, 3));
        assert!(!decide(true, 1));
        assert!(!decide(true, 4));
        assert!(!decide(true, 9));
    }
}
