//! Selection operators: choosing parents from the current rank order.
//!
//! Selection runs as a sequence of calls within one generation. Each
//! call returns the selected parent(s) plus a `done` flag; once `done`
//! is `true` the cycle is over and any parents returned alongside it
//! are not used. Several algorithms carry state between calls — the
//! roulette wheel's per-generation statistics, stochastic universal
//! sampling's cumulative offsets — so every cycle threads a fresh
//! [`SelectionState`] through its calls. Selection always indexes the
//! rank order below [`Population::orig_size`]: the population grows
//! while selection runs, and offspring must not be re-selected as
//! parents.
//!
//! One-parent cycles are sized by the population's mutation ratio,
//! two-parent cycles by its crossover ratio. Returning `None` parents
//! mid-cycle is legal and simply means "no selection this call".

use crate::chromosome::Representation;
use crate::error::{GeneticError, Result};
use crate::population::{EntityId, Population};
use crate::rng::RandomNumberGenerator;

/// Per-generation selection scratch state. Construct a fresh value at
/// the start of every selection cycle; sharing one across concurrent
/// cycles is not meaningful.
#[derive(Clone, Debug, Default)]
pub struct SelectionState {
    calls: usize,
    algo: AlgoState,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of selection calls made so far this cycle.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

#[derive(Clone, Debug, Default)]
enum AlgoState {
    #[default]
    None,
    Roulette(RouletteState),
    Sus(SusState),
    SusPair(SusPairState),
}

#[derive(Clone, Debug)]
struct RouletteState {
    mean: f64,
    expval: f64,
    marker: usize,
    minval: f64,
}

#[derive(Clone, Debug)]
struct SusState {
    step: f64,
    offset: f64,
    cursor: usize,
    num_to_select: usize,
    squared: bool,
}

#[derive(Clone, Debug)]
struct SusPairState {
    step: f64,
    offset1: f64,
    offset2: f64,
    cursor1: usize,
    cursor2: usize,
    permutation: Vec<usize>,
    num_to_select: usize,
}

fn fitness_sum<R: Representation>(pop: &Population<R>, squared: bool) -> Result<f64> {
    let mut sum = 0.0;
    for rank in 0..pop.orig_size() {
        let fitness = pop.fitness_by_rank(rank)?;
        sum += if squared { fitness * fitness } else { fitness };
    }
    Ok(sum)
}

fn linear_rank_index<R: Representation>(
    pop: &Population<R>,
    rng: &mut RandomNumberGenerator,
) -> usize {
    let orig = pop.orig_size();
    let index = ((1.0 - rng.random_unit_uniform().sqrt()) * orig as f64) as usize;
    index.min(orig - 1)
}

/// Picks the fitter of `count` uniformly drawn candidates.
fn tournament<R: Representation>(
    pop: &Population<R>,
    count: usize,
    rng: &mut RandomNumberGenerator,
) -> Result<EntityId> {
    let orig = pop.orig_size();
    let mut winner = pop.id_by_rank(rng.random_int(orig))?;
    for _ in 1..count {
        let challenger = pop.id_by_rank(rng.random_int(orig))?;
        if pop.entity(challenger)?.fitness() > pop.entity(winner)?.fitness() {
            winner = challenger;
        }
    }
    Ok(winner)
}

/// Spins a roulette wheel once from the state's marker.
fn roulette_spin<R: Representation>(
    pop: &Population<R>,
    state: &mut RouletteState,
    rebased: bool,
    rng: &mut RandomNumberGenerator,
) -> Result<EntityId> {
    let orig = pop.orig_size();
    let mut selectval = if rebased {
        rng.random_double(state.expval)
    } else {
        rng.random_double(state.expval) * state.mean
    };
    loop {
        state.marker += 1;
        if state.marker >= orig {
            state.marker = 0;
        }
        let fitness = pop.fitness_by_rank(state.marker)?;
        selectval -= if rebased {
            (fitness - state.minval) / state.mean
        } else {
            fitness
        };
        if selectval <= 0.0 {
            break;
        }
    }
    pop.id_by_rank(state.marker)
}

fn roulette_init<R: Representation>(
    pop: &Population<R>,
    rebased: bool,
    rng: &mut RandomNumberGenerator,
) -> Result<RouletteState> {
    let orig = pop.orig_size();
    let sum = fitness_sum(pop, false)?;
    let mut mean = sum / orig as f64;
    let marker = rng.random_int(orig);
    let minval;
    let expval;
    if rebased {
        // The lowest-ranked entity's fitness becomes the wheel's zero
        // point, which copes with mixed-sign scores.
        minval = pop.fitness_by_rank(orig - 1)?;
        mean -= minval;
        if mean.abs() < f64::EPSILON {
            return Err(GeneticError::Configuration(
                "roulette selection on a degenerate population: all fitness values equal"
                    .to_string(),
            ));
        }
        expval = (sum - minval * orig as f64) / mean;
    } else {
        if sum <= 0.0 || mean <= 0.0 {
            return Err(GeneticError::Configuration(
                "roulette selection requires a positive fitness sum; use the rebased \
                 variant for mixed-sign scores"
                    .to_string(),
            ));
        }
        minval = 0.0;
        expval = sum / mean;
    }
    Ok(RouletteState {
        mean,
        expval,
        marker,
        minval,
    })
}

/// Advances a stochastic-universal-sampling cursor to the entity under
/// the current offset.
fn sus_advance<R: Representation>(
    pop: &Population<R>,
    offset: &mut f64,
    cursor: &mut usize,
    squared: bool,
    via_permutation: Option<&[usize]>,
) -> Result<EntityId> {
    let orig = pop.orig_size();
    loop {
        let rank = match via_permutation {
            Some(perm) => perm[*cursor],
            None => *cursor,
        };
        let fitness = pop.fitness_by_rank(rank)?;
        let weight = if squared { fitness * fitness } else { fitness };
        if *offset <= weight {
            return pop.id_by_rank(rank);
        }
        *offset -= weight;
        *cursor += 1;
        if *cursor >= orig {
            *cursor -= orig;
        }
    }
}

/// Built-in one-parent (asexual) selection algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectOne {
    /// Every entity in rank order, once.
    Every,
    /// Uniformly random entities.
    Random,
    /// Rank-biased: the i-th call may select a random entity ranked
    /// above i.
    RandomRank,
    /// Tournament of two.
    BestOfTwo,
    /// Tournament of three.
    BestOfThree,
    /// Fitness-proportionate roulette wheel. Requires positive scores.
    Roulette,
    /// Roulette rebased against the worst score; copes with mixed-sign
    /// scores.
    RouletteRebased,
    /// Stochastic universal sampling.
    Sus,
    /// Stochastic universal sampling over squared fitness.
    SusSquared,
    /// Strongly top-biased random selection.
    Aggressive,
    /// The best entity, repeatedly.
    Best,
    /// Linear probability over rank.
    LinearRank,
    /// Entities in rank order, wrapping around.
    RoundRobin,
}

impl SelectOne {
    pub fn id(self) -> i32 {
        match self {
            SelectOne::Every => 1,
            SelectOne::Random => 2,
            SelectOne::RandomRank => 3,
            SelectOne::BestOfTwo => 4,
            SelectOne::BestOfThree => 5,
            SelectOne::Roulette => 6,
            SelectOne::RouletteRebased => 7,
            SelectOne::Sus => 8,
            SelectOne::SusSquared => 9,
            SelectOne::Aggressive => 10,
            SelectOne::Best => 11,
            SelectOne::LinearRank => 12,
            SelectOne::RoundRobin => 13,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(SelectOne::Every),
            2 => Some(SelectOne::Random),
            3 => Some(SelectOne::RandomRank),
            4 => Some(SelectOne::BestOfTwo),
            5 => Some(SelectOne::BestOfThree),
            6 => Some(SelectOne::Roulette),
            7 => Some(SelectOne::RouletteRebased),
            8 => Some(SelectOne::Sus),
            9 => Some(SelectOne::SusSquared),
            10 => Some(SelectOne::Aggressive),
            11 => Some(SelectOne::Best),
            12 => Some(SelectOne::LinearRank),
            13 => Some(SelectOne::RoundRobin),
            _ => None,
        }
    }

    /// Performs one selection call. Returns the selected parent (or
    /// `None` for "no selection this call") and whether the cycle is
    /// complete. Parents returned together with `done == true` must not
    /// be used.
    pub fn select<R: Representation>(
        self,
        pop: &Population<R>,
        state: &mut SelectionState,
        rng: &mut RandomNumberGenerator,
    ) -> Result<(Option<EntityId>, bool)> {
        let orig = pop.orig_size();
        if orig == 0 {
            return Ok((None, true));
        }
        let budget = orig as f64 * pop.mutation_ratio();
        match self {
            SelectOne::Every => {
                if state.calls >= orig {
                    return Ok((None, true));
                }
                let id = pop.id_by_rank(state.calls)?;
                state.calls += 1;
                Ok((Some(id), false))
            }
            SelectOne::Random => {
                let id = pop.id_by_rank(rng.random_int(orig))?;
                state.calls += 1;
                Ok((Some(id), state.calls as f64 > budget))
            }
            SelectOne::RandomRank => {
                state.calls += 1;
                if orig < state.calls {
                    return Ok((None, true));
                }
                let selected = if rng.random_boolean_prob(pop.mutation_ratio()) {
                    Some(pop.id_by_rank(rng.random_int(state.calls))?)
                } else {
                    None
                };
                Ok((selected, false))
            }
            SelectOne::BestOfTwo => {
                let id = tournament(pop, 2, rng)?;
                state.calls += 1;
                Ok((Some(id), state.calls as f64 > budget))
            }
            SelectOne::BestOfThree => {
                let id = tournament(pop, 3, rng)?;
                state.calls += 1;
                Ok((Some(id), state.calls as f64 > budget))
            }
            SelectOne::Roulette | SelectOne::RouletteRebased => {
                let rebased = self == SelectOne::RouletteRebased;
                if state.calls == 0 {
                    state.algo = AlgoState::Roulette(roulette_init(pop, rebased, rng)?);
                }
                let AlgoState::Roulette(roulette) = &mut state.algo else {
                    return Err(GeneticError::Configuration(
                        "selection state reused across different algorithms".to_string(),
                    ));
                };
                let id = roulette_spin(pop, roulette, rebased, rng)?;
                state.calls += 1;
                Ok((Some(id), state.calls as f64 > budget))
            }
            SelectOne::Sus | SelectOne::SusSquared => {
                let squared = self == SelectOne::SusSquared;
                if budget <= 0.0 {
                    return Ok((None, true));
                }
                if state.calls == 0 {
                    let sum = fitness_sum(pop, squared)?;
                    if sum <= 0.0 {
                        return Err(GeneticError::Configuration(
                            "stochastic universal sampling requires a positive fitness sum"
                                .to_string(),
                        ));
                    }
                    let step = sum / budget;
                    state.algo = AlgoState::Sus(SusState {
                        step,
                        offset: rng.random_double(step),
                        cursor: 0,
                        num_to_select: budget as usize,
                        squared,
                    });
                } else {
                    let AlgoState::Sus(sus) = &state.algo else {
                        return Err(GeneticError::Configuration(
                            "selection state reused across different algorithms".to_string(),
                        ));
                    };
                    if state.calls >= sus.num_to_select {
                        return Ok((None, true));
                    }
                }
                let AlgoState::Sus(sus) = &mut state.algo else {
                    unreachable!("established above");
                };
                if state.calls > 0 {
                    sus.offset += sus.step;
                }
                let id = sus_advance(pop, &mut sus.offset, &mut sus.cursor, sus.squared, None)?;
                state.calls += 1;
                Ok((Some(id), false))
            }
            SelectOne::Aggressive => {
                state.calls += 1;
                let span = if orig < 2 {
                    1
                } else {
                    1 + state.calls % (orig - 1)
                };
                let id = pop.id_by_rank(rng.random_int(span))?;
                Ok((Some(id), state.calls as f64 > budget))
            }
            SelectOne::Best => {
                state.calls += 1;
                let id = pop.id_by_rank(0)?;
                Ok((Some(id), state.calls as f64 > budget))
            }
            SelectOne::LinearRank => {
                state.calls += 1;
                let id = pop.id_by_rank(linear_rank_index(pop, rng))?;
                Ok((Some(id), state.calls as f64 > budget))
            }
            SelectOne::RoundRobin => {
                let id = pop.id_by_rank(state.calls % orig)?;
                state.calls += 1;
                Ok((Some(id), state.calls as f64 >= budget))
            }
        }
    }
}

/// Built-in two-parent (sexual) selection algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectTwo {
    /// Every ordered pair of entities.
    Every,
    /// Uniformly random distinct pairs.
    Random,
    /// Rank-biased pairing: each entity mates a random fitter partner.
    RandomRank,
    /// Tournament of two per parent; parents are distinct.
    BestOfTwo,
    /// Tournament of three per parent; parents are distinct.
    BestOfThree,
    /// Two roulette spins; parents may coincide.
    Roulette,
    /// Two rebased roulette spins; parents may coincide.
    RouletteRebased,
    /// Stochastic universal sampling paired against a random
    /// permutation.
    Sus,
    /// Strongly top-biased random pairs; parents may coincide.
    Aggressive,
    /// A random entity paired with the best entity.
    Best,
    /// Linear rank probability for both parents; parents are distinct.
    LinearRank,
}

impl SelectTwo {
    pub fn id(self) -> i32 {
        match self {
            SelectTwo::Every => 1,
            SelectTwo::Random => 2,
            SelectTwo::RandomRank => 3,
            SelectTwo::BestOfTwo => 4,
            SelectTwo::BestOfThree => 5,
            SelectTwo::Roulette => 6,
            SelectTwo::RouletteRebased => 7,
            SelectTwo::Sus => 8,
            SelectTwo::Aggressive => 9,
            SelectTwo::Best => 10,
            SelectTwo::LinearRank => 11,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(SelectTwo::Every),
            2 => Some(SelectTwo::Random),
            3 => Some(SelectTwo::RandomRank),
            4 => Some(SelectTwo::BestOfTwo),
            5 => Some(SelectTwo::BestOfThree),
            6 => Some(SelectTwo::Roulette),
            7 => Some(SelectTwo::RouletteRebased),
            8 => Some(SelectTwo::Sus),
            9 => Some(SelectTwo::Aggressive),
            10 => Some(SelectTwo::Best),
            11 => Some(SelectTwo::LinearRank),
            _ => None,
        }
    }

    /// Performs one pair selection call; the tuple is `(mother,
    /// father)`. Semantics otherwise match [`SelectOne::select`].
    pub fn select<R: Representation>(
        self,
        pop: &Population<R>,
        state: &mut SelectionState,
        rng: &mut RandomNumberGenerator,
    ) -> Result<(Option<(EntityId, EntityId)>, bool)> {
        let orig = pop.orig_size();
        let budget = orig as f64 * pop.crossover_ratio();
        match self {
            SelectTwo::Every => {
                if orig == 0 || state.calls >= orig * orig {
                    return Ok((None, true));
                }
                let mother = pop.id_by_rank(state.calls % orig)?;
                let father = pop.id_by_rank(state.calls / orig)?;
                state.calls += 1;
                Ok((Some((mother, father)), false))
            }
            SelectTwo::Random => {
                if orig < 2 {
                    return Ok((None, true));
                }
                let mother = pop.id_by_rank(rng.random_int(orig))?;
                let mut father = mother;
                while father == mother {
                    father = pop.id_by_rank(rng.random_int(orig))?;
                }
                state.calls += 1;
                Ok((Some((mother, father)), state.calls as f64 > budget))
            }
            SelectTwo::RandomRank => {
                state.calls += 1;
                if orig < state.calls {
                    return Ok((None, true));
                }
                // The final call has no strictly-lower-ranked partner
                // index to pair with, so it never selects.
                if state.calls < orig && rng.random_boolean_prob(pop.crossover_ratio()) {
                    let mother = pop.id_by_rank(rng.random_int(state.calls))?;
                    let father = pop.id_by_rank(state.calls)?;
                    Ok((Some((mother, father)), false))
                } else {
                    Ok((None, false))
                }
            }
            SelectTwo::BestOfTwo | SelectTwo::BestOfThree => {
                if orig < 2 {
                    return Ok((None, true));
                }
                let count = if self == SelectTwo::BestOfThree { 3 } else { 2 };
                let mother = tournament(pop, count, rng)?;
                let mut father = mother;
                while father == mother {
                    father = pop.id_by_rank(rng.random_int(orig))?;
                }
                for _ in 1..count {
                    let challenger = pop.id_by_rank(rng.random_int(orig))?;
                    if challenger != mother
                        && pop.entity(challenger)?.fitness() > pop.entity(father)?.fitness()
                    {
                        father = challenger;
                    }
                }
                state.calls += 1;
                Ok((Some((mother, father)), state.calls as f64 > budget))
            }
            SelectTwo::Roulette | SelectTwo::RouletteRebased => {
                if orig == 0 {
                    return Ok((None, true));
                }
                let rebased = self == SelectTwo::RouletteRebased;
                if state.calls == 0 {
                    state.algo = AlgoState::Roulette(roulette_init(pop, rebased, rng)?);
                }
                let AlgoState::Roulette(roulette) = &mut state.algo else {
                    return Err(GeneticError::Configuration(
                        "selection state reused across different algorithms".to_string(),
                    ));
                };
                state.calls += 1;
                let mother = roulette_spin(pop, roulette, rebased, rng)?;
                let father = roulette_spin(pop, roulette, rebased, rng)?;
                Ok((Some((mother, father)), state.calls as f64 > budget))
            }
            SelectTwo::Sus => {
                if orig == 0 || budget <= 0.0 {
                    return Ok((None, true));
                }
                if state.calls == 0 {
                    let sum = fitness_sum(pop, false)?;
                    if sum <= 0.0 {
                        return Err(GeneticError::Configuration(
                            "stochastic universal sampling requires a positive fitness sum"
                                .to_string(),
                        ));
                    }
                    let num_to_select = budget as usize;
                    let step = sum / budget;
                    let offset = rng.random_double(step);
                    state.algo = AlgoState::SusPair(SusPairState {
                        step,
                        offset1: offset,
                        offset2: offset,
                        cursor1: 0,
                        cursor2: 0,
                        permutation: rng.permutation(orig),
                        num_to_select,
                    });
                } else {
                    let AlgoState::SusPair(sus) = &state.algo else {
                        return Err(GeneticError::Configuration(
                            "selection state reused across different algorithms".to_string(),
                        ));
                    };
                    if state.calls >= sus.num_to_select {
                        return Ok((None, true));
                    }
                }
                let AlgoState::SusPair(sus) = &mut state.algo else {
                    unreachable!("established above");
                };
                if state.calls > 0 {
                    sus.offset1 += sus.step;
                    sus.offset2 += sus.step;
                }
                let mother =
                    sus_advance(pop, &mut sus.offset1, &mut sus.cursor1, false, None)?;
                let permutation = sus.permutation.clone();
                let father = sus_advance(
                    pop,
                    &mut sus.offset2,
                    &mut sus.cursor2,
                    false,
                    Some(&permutation),
                )?;
                state.calls += 1;
                Ok((Some((mother, father)), false))
            }
            SelectTwo::Aggressive => {
                if orig == 0 {
                    return Ok((None, true));
                }
                state.calls += 1;
                let span = if orig < 2 {
                    1
                } else {
                    1 + state.calls % (orig - 1)
                };
                let father = pop.id_by_rank(rng.random_int(span))?;
                let mother = pop.id_by_rank(rng.random_int(span))?;
                Ok((Some((mother, father)), state.calls as f64 > budget))
            }
            SelectTwo::Best => {
                if orig == 0 {
                    return Ok((None, true));
                }
                state.calls += 1;
                let mother = pop.id_by_rank(rng.random_int(orig))?;
                let father = pop.id_by_rank(0)?;
                Ok((Some((mother, father)), state.calls as f64 > budget))
            }
            SelectTwo::LinearRank => {
                if orig < 2 {
                    return Ok((None, true));
                }
                state.calls += 1;
                let mother = pop.id_by_rank(linear_rank_index(pop, rng))?;
                let mut father = mother;
                while father == mother {
                    father = pop.id_by_rank(linear_rank_index(pop, rng))?;
                }
                Ok((Some((mother, father)), state.calls as f64 > budget))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::RealArray;
    use crate::population::Population;

    fn scored_pop(fitness: &[f64]) -> Population<RealArray> {
        let mut pop = Population::builder(RealArray)
            .stable_size(fitness.len())
            .shape(1, 2)
            .mutation_ratio(0.5)
            .crossover_ratio(0.5)
            .build()
            .unwrap();
        for &f in fitness {
            let id = pop.acquire();
            pop.entity_mut(id).unwrap().set_fitness(f);
        }
        pop.sort();
        pop.begin_generation();
        pop
    }

    fn run_one_cycle(
        pop: &Population<RealArray>,
        op: SelectOne,
        seed: u64,
    ) -> Vec<EntityId> {
        let mut rng = RandomNumberGenerator::from_seed(seed);
        let mut state = SelectionState::new();
        let mut selected = Vec::new();
        loop {
            let (parent, done) = op.select(pop, &mut state, &mut rng).unwrap();
            if done {
                break;
            }
            if let Some(id) = parent {
                selected.push(id);
            }
            assert!(selected.len() <= 1000, "selection cycle failed to terminate");
        }
        selected
    }

    #[test]
    fn test_every_selects_each_entity_once() {
        let pop = scored_pop(&[4.0, 3.0, 2.0, 1.0]);
        let selected = run_one_cycle(&pop, SelectOne::Every, 1);
        assert_eq!(selected.len(), 4);
        let mut unique = selected.clone();
        unique.sort_by_key(|id| id.index());
        unique.dedup();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn test_random_selection_count_follows_mutation_ratio() {
        let pop = scored_pop(&[4.0, 3.0, 2.0, 1.0]);
        // budget = 4 * 0.5 = 2.0; done when calls > 2.0 -> 2 usable calls.
        let selected = run_one_cycle(&pop, SelectOne::Random, 2);
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_sus_selects_exactly_the_budgeted_count() {
        let pop = scored_pop(&[4.0, 3.0, 2.0, 1.0, 5.0, 6.0]);
        // budget = 6 * 0.5 = 3.
        let selected = run_one_cycle(&pop, SelectOne::Sus, 3);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_sus_rejects_non_positive_fitness_sum() {
        let pop = scored_pop(&[1.0, -1.0, 0.0, 0.0]);
        let mut rng = RandomNumberGenerator::from_seed(4);
        let mut state = SelectionState::new();
        assert!(SelectOne::Sus.select(&pop, &mut state, &mut rng).is_err());
    }

    #[test]
    fn test_roulette_prefers_fitter_entities() {
        let pop = scored_pop(&[100.0, 1.0]);
        let mut rng = RandomNumberGenerator::from_seed(5);
        let mut best_count = 0usize;
        let mut total = 0usize;
        for _ in 0..50 {
            let mut state = SelectionState::new();
            loop {
                let (parent, done) =
                    SelectOne::Roulette.select(&pop, &mut state, &mut rng).unwrap();
                if done {
                    break;
                }
                if let Some(id) = parent {
                    total += 1;
                    if pop.rank_of(id).unwrap() == 0 {
                        best_count += 1;
                    }
                }
            }
        }
        assert!(total > 0);
        assert!(
            best_count * 10 > total * 8,
            "roulette selected the dominant entity only {}/{} times",
            best_count,
            total
        );
    }

    #[test]
    fn test_roulette_rejects_non_positive_sum() {
        let pop = scored_pop(&[-1.0, -2.0, -3.0]);
        let mut rng = RandomNumberGenerator::from_seed(6);
        let mut state = SelectionState::new();
        assert!(SelectOne::Roulette
            .select(&pop, &mut state, &mut rng)
            .is_err());
    }

    #[test]
    fn test_rebased_roulette_accepts_mixed_sign_scores() {
        let pop = scored_pop(&[5.0, -1.0, -3.0]);
        let mut rng = RandomNumberGenerator::from_seed(7);
        let mut state = SelectionState::new();
        let (parent, _) = SelectOne::RouletteRebased
            .select(&pop, &mut state, &mut rng)
            .unwrap();
        assert!(parent.is_some());
    }

    #[test]
    fn test_best_always_selects_rank_zero() {
        let pop = scored_pop(&[4.0, 3.0, 2.0, 1.0]);
        for id in run_one_cycle(&pop, SelectOne::Best, 8) {
            assert_eq!(pop.rank_of(id).unwrap(), 0);
        }
    }

    #[test]
    fn test_round_robin_walks_rank_order() {
        let pop = scored_pop(&[4.0, 3.0, 2.0, 1.0]);
        let selected = run_one_cycle(&pop, SelectOne::RoundRobin, 9);
        // budget = 2.0, done when calls >= 2 -> one usable call.
        assert_eq!(selected.len(), 1);
        assert_eq!(pop.rank_of(selected[0]).unwrap(), 0);
    }

    #[test]
    fn test_two_random_parents_are_distinct() {
        let pop = scored_pop(&[4.0, 3.0, 2.0, 1.0]);
        let mut rng = RandomNumberGenerator::from_seed(10);
        let mut state = SelectionState::new();
        loop {
            let (pair, done) = SelectTwo::Random.select(&pop, &mut state, &mut rng).unwrap();
            if done {
                break;
            }
            if let Some((mother, father)) = pair {
                assert_ne!(mother, father);
            }
        }
    }

    #[test]
    fn test_two_every_enumerates_all_pairs() {
        let pop = scored_pop(&[3.0, 2.0, 1.0]);
        let mut rng = RandomNumberGenerator::from_seed(11);
        let mut state = SelectionState::new();
        let mut pairs = Vec::new();
        loop {
            let (pair, done) = SelectTwo::Every.select(&pop, &mut state, &mut rng).unwrap();
            if done {
                break;
            }
            if let Some(p) = pair {
                pairs.push(p);
            }
        }
        assert_eq!(pairs.len(), 9);
    }

    #[test]
    fn test_two_sus_pairs_draw_from_permutation() {
        let pop = scored_pop(&[4.0, 3.0, 2.0, 1.0, 5.0, 6.0]);
        let mut rng = RandomNumberGenerator::from_seed(12);
        let mut state = SelectionState::new();
        let mut count = 0;
        loop {
            let (pair, done) = SelectTwo::Sus.select(&pop, &mut state, &mut rng).unwrap();
            if done {
                break;
            }
            if pair.is_some() {
                count += 1;
            }
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn test_selection_on_empty_population_terminates() {
        let pop = scored_pop(&[]);
        let mut rng = RandomNumberGenerator::from_seed(13);
        let mut state = SelectionState::new();
        let (parent, done) = SelectOne::Random.select(&pop, &mut state, &mut rng).unwrap();
        assert!(parent.is_none());
        assert!(done);
    }
}
