use tsearch_stress::{KeySource, SeededSource, TreeExercise};

/// Key source replaying a fixed list of draws, wrapping around.
#[allow(dead_code)]
pub struct ScriptedSource {
    draws: Vec<u16>,
    next: usize,
}

#[allow(dead_code)]
impl ScriptedSource {
    pub fn new(draws: Vec<u16>) -> Self {
        assert!(!draws.is_empty(), "need at least one draw");
        Self { draws, next: 0 }
    }
}

impl KeySource for ScriptedSource {
    fn next_u16(&mut self) -> u16 {
        let value = self.draws[self.next % self.draws.len()];
        self.next += 1;
        value
    }
}

/// Engine whose dataset holds exactly `keys`.
#[allow(dead_code)]
pub fn engine_with_keys(keys: Vec<i32>, verify: bool) -> TreeExercise {
    let mut engine = TreeExercise::with_source(keys.len(), verify, SeededSource::new(0), 0)
        .expect("dataset allocates");
    engine.keys_mut().copy_from_slice(&keys);
    engine
}

/// Engine over a freshly generated dataset of `size` keys.
#[allow(dead_code)]
pub fn seeded_engine(size: usize, verify: bool, seed: u64) -> TreeExercise {
    let mut engine = TreeExercise::with_source(size, verify, SeededSource::new(seed), 0)
        .expect("dataset allocates");
    engine.regenerate();
    engine
}
