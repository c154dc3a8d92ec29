//! Rule induction by iterative box peeling and pasting.
//!
//! Starting from the full domain of every input dimension, peeling
//! repeatedly removes the single edge slice (or category) whose removal
//! buys the most density per unit of mass lost, until no trim improves
//! density or the minimum-mass floor would be crossed. Pasting then
//! re-expands bounds one quantile step at a time wherever that recovers
//! coverage without dropping density below the configured floor. Captured
//! points are removed and the search restarts for further, non-overlapping
//! boxes.
//!
//! Peel and paste are pure transitions over an explicit box state, applied
//! by the driver loop in [`discover`].

use serde::{Deserialize, Serialize};

use crate::discovery::data::{ColumnData, DiscoveryData};
use crate::error::DiscoveryError;
use crate::store::{OutcomeRowView, ResultsStore};

/// Objective used to rank candidate trims during peeling. Exposed as
/// configuration because reasonable studies weigh the density/mass
/// trade-off differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PeelObjective {
    /// Density gain divided by the share of all candidate points lost.
    #[default]
    DensityGainPerMass,
    /// Raw density gain, ignoring how much mass the trim costs.
    DensityGain,
}

/// Scenario-discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimConfig {
    /// Fraction of contained points a single peel removes.
    pub peel_alpha: f64,
    /// Fraction of contained points a single paste step reaches for.
    pub paste_alpha: f64,
    /// Peeling never shrinks a box below this fraction of all points.
    pub mass_min: f64,
    /// Pasting keeps density at or above this floor.
    pub paste_density_floor: f64,
    /// A finished box below this density is discarded and the search stops.
    pub min_density: f64,
    /// Stop searching for further boxes once fewer interesting points
    /// than this remain uncaptured.
    pub stop_interesting: usize,
    /// Minimum number of successful experiments required to run at all.
    pub min_cases: usize,
    /// Upper bound on the number of boxes returned.
    pub max_boxes: usize,
    pub objective: PeelObjective,
}

impl Default for PrimConfig {
    fn default() -> Self {
        Self {
            peel_alpha: 0.05,
            paste_alpha: 0.05,
            mass_min: 0.05,
            paste_density_floor: 0.8,
            min_density: 0.5,
            stop_interesting: 10,
            min_cases: 20,
            max_boxes: 8,
            objective: PeelObjective::default(),
        }
    }
}

/// Restriction a box places on one input dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoxLimit {
    /// Closed numeric sub-interval of the sampled range.
    Range { lower: f64, upper: f64 },
    /// Retained categories of a categorical dimension.
    Categories { allowed: Vec<String> },
}

/// A discovered box: restrictions on the dimensions it constrains
/// (unrestricted dimensions are omitted) plus its statistics relative to
/// the candidate set it was induced from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimBox {
    pub limits: Vec<(String, BoxLimit)>,
    /// Fraction of contained points classified interesting.
    pub density: f64,
    /// Fraction of all interesting points contained.
    pub coverage: f64,
    /// Fraction of all points contained.
    pub mass: f64,
    /// Peel steps applied before the box settled.
    pub peels: usize,
    /// Paste steps applied after peeling.
    pub pastes: usize,
}

/// Find boxes enriched for the rows the classifier marks interesting.
///
/// The classifier is applied once per successful experiment. Boxes are
/// returned in discovery order: each later box is induced from the points
/// the earlier ones did not capture.
pub fn discover<'s, F>(
    store: &'s ResultsStore,
    classifier: F,
    config: &PrimConfig,
) -> Result<Vec<PrimBox>, DiscoveryError>
where
    F: FnMut(OutcomeRowView<'s>) -> bool,
{
    let data = DiscoveryData::from_store(store, classifier, config.min_cases)?;

    let mut alive: Vec<usize> = (0..data.len()).collect();
    let mut boxes = Vec::new();

    loop {
        let interesting_alive = alive.iter().filter(|&&row| data.labels[row]).count();
        if interesting_alive == 0 {
            break;
        }
        if !boxes.is_empty() && interesting_alive < config.stop_interesting {
            break;
        }

        let search = BoxSearch {
            data: &data,
            config,
            alive: &alive,
            interesting_alive,
        };
        let mut state = search.full_box();
        while let Some(next) = search.peel(&state) {
            state = next;
        }
        while let Some(next) = search.paste(&state) {
            state = next;
        }

        let stats = search.stats(&state);
        if stats.density < config.min_density {
            break;
        }
        tracing::debug!(
            density = stats.density,
            coverage = stats.coverage,
            mass = stats.mass,
            peels = state.peels,
            pastes = state.pastes,
            "box found"
        );
        boxes.push(build_box(&data, &state, stats));
        if boxes.len() >= config.max_boxes {
            break;
        }
        alive.retain(|row| state.members.binary_search(row).is_err());
    }

    Ok(boxes)
}

/// Bounds a box places on one coded dimension.
#[derive(Debug, Clone, PartialEq)]
enum DimBounds {
    Numeric { lower: f64, upper: f64 },
    Categorical { allowed: Vec<bool> },
}

/// Explicit box state: bounds per dimension plus the sorted rows inside.
#[derive(Debug, Clone)]
struct BoxState {
    dims: Vec<DimBounds>,
    members: Vec<usize>,
    peels: usize,
    pastes: usize,
}

#[derive(Debug, Clone, Copy)]
struct BoxStats {
    density: f64,
    coverage: f64,
    mass: f64,
}

/// One box induction over a fixed candidate set.
struct BoxSearch<'a> {
    data: &'a DiscoveryData,
    config: &'a PrimConfig,
    alive: &'a [usize],
    interesting_alive: usize,
}

/// A ranked trim or paste move, with the membership it would produce.
struct Move {
    dim: usize,
    bounds: DimBounds,
    members: Vec<usize>,
    score: f64,
    tiebreak: f64,
}

impl<'a> BoxSearch<'a> {
    /// The starting box: the full observed domain of every dimension over
    /// the current candidate set.
    fn full_box(&self) -> BoxState {
        let dims = self
            .data
            .columns
            .iter()
            .map(|(_, column)| match column {
                ColumnData::Numeric(values) => {
                    let mut lower = f64::INFINITY;
                    let mut upper = f64::NEG_INFINITY;
                    for &row in self.alive {
                        lower = lower.min(values[row]);
                        upper = upper.max(values[row]);
                    }
                    DimBounds::Numeric { lower, upper }
                }
                ColumnData::Categorical { levels, .. } => DimBounds::Categorical {
                    allowed: vec![true; levels.len()],
                },
            })
            .collect();
        BoxState {
            dims,
            members: self.alive.to_vec(),
            peels: 0,
            pastes: 0,
        }
    }

    fn interesting_in(&self, rows: &[usize]) -> usize {
        rows.iter().filter(|&&row| self.data.labels[row]).count()
    }

    fn stats(&self, state: &BoxState) -> BoxStats {
        let contained = state.members.len();
        let interesting = self.interesting_in(&state.members);
        BoxStats {
            density: ratio(interesting, contained),
            coverage: ratio(interesting, self.interesting_alive),
            mass: ratio(contained, self.alive.len()),
        }
    }

    /// Whether `row` satisfies every dimension's bounds except `skip`.
    fn inside_except(&self, state: &BoxState, row: usize, skip: usize) -> bool {
        state.dims.iter().enumerate().all(|(d, bounds)| {
            if d == skip {
                return true;
            }
            match (bounds, &self.data.columns[d].1) {
                (DimBounds::Numeric { lower, upper }, ColumnData::Numeric(values)) => {
                    values[row] >= *lower && values[row] <= *upper
                }
                (DimBounds::Categorical { allowed }, ColumnData::Categorical { codes, .. }) => {
                    allowed[codes[row]]
                }
                _ => false,
            }
        })
    }

    /// The single best trim, if any trim still increases density while
    /// respecting the minimum-mass floor. Ties on the objective prefer the
    /// trim losing the least mass, then the earliest candidate in
    /// (dimension, lower-edge-first, category) order.
    fn peel(&self, state: &BoxState) -> Option<BoxState> {
        let n = state.members.len();
        if n == 0 {
            return None;
        }
        let current_density = ratio(self.interesting_in(&state.members), n);
        let k = quantile_count(n, self.config.peel_alpha);
        let mut best: Option<Move> = None;

        for (d, bounds) in state.dims.iter().enumerate() {
            match (bounds, &self.data.columns[d].1) {
                (DimBounds::Numeric { lower, upper }, ColumnData::Numeric(values)) => {
                    if k >= n {
                        continue;
                    }
                    let mut sorted: Vec<f64> =
                        state.members.iter().map(|&row| values[row]).collect();
                    sorted.sort_by(f64::total_cmp);

                    let new_lower = sorted[k];
                    if new_lower > *lower {
                        let members: Vec<usize> = state
                            .members
                            .iter()
                            .copied()
                            .filter(|&row| values[row] >= new_lower)
                            .collect();
                        self.consider_peel(
                            &mut best,
                            current_density,
                            n,
                            Move {
                                dim: d,
                                bounds: DimBounds::Numeric {
                                    lower: new_lower,
                                    upper: *upper,
                                },
                                members,
                                score: 0.0,
                                tiebreak: 0.0,
                            },
                        );
                    }

                    let new_upper = sorted[n - 1 - k];
                    if new_upper < *upper {
                        let members: Vec<usize> = state
                            .members
                            .iter()
                            .copied()
                            .filter(|&row| values[row] <= new_upper)
                            .collect();
                        self.consider_peel(
                            &mut best,
                            current_density,
                            n,
                            Move {
                                dim: d,
                                bounds: DimBounds::Numeric {
                                    lower: *lower,
                                    upper: new_upper,
                                },
                                members,
                                score: 0.0,
                                tiebreak: 0.0,
                            },
                        );
                    }
                }
                (DimBounds::Categorical { allowed }, ColumnData::Categorical { codes, .. }) => {
                    for level in 0..allowed.len() {
                        if !allowed[level] {
                            continue;
                        }
                        let members: Vec<usize> = state
                            .members
                            .iter()
                            .copied()
                            .filter(|&row| codes[row] != level)
                            .collect();
                        if members.len() == n {
                            continue;
                        }
                        let mut bounds = allowed.clone();
                        bounds[level] = false;
                        self.consider_peel(
                            &mut best,
                            current_density,
                            n,
                            Move {
                                dim: d,
                                bounds: DimBounds::Categorical { allowed: bounds },
                                members,
                                score: 0.0,
                                tiebreak: 0.0,
                            },
                        );
                    }
                }
                _ => {}
            }
        }

        best.map(|chosen| self.apply(state, chosen, true))
    }

    fn consider_peel(
        &self,
        best: &mut Option<Move>,
        current_density: f64,
        n: usize,
        mut candidate: Move,
    ) {
        let retained = candidate.members.len();
        let removed = n - retained;
        if removed == 0 || retained == 0 {
            return;
        }
        if ratio(retained, self.alive.len()) < self.config.mass_min {
            return;
        }
        let density = ratio(self.interesting_in(&candidate.members), retained);
        let gain = density - current_density;
        if gain <= 0.0 {
            return;
        }
        let mass_lost = ratio(removed, self.alive.len());
        candidate.score = match self.config.objective {
            PeelObjective::DensityGainPerMass => gain / mass_lost,
            PeelObjective::DensityGain => gain,
        };
        candidate.tiebreak = mass_lost;
        let better = match best {
            None => true,
            Some(current) => {
                candidate.score > current.score
                    || (candidate.score == current.score && candidate.tiebreak < current.tiebreak)
            }
        };
        if better {
            *best = Some(candidate);
        }
    }

    /// The single best re-expansion, if any strictly increases coverage
    /// while keeping density at or above the configured floor.
    fn paste(&self, state: &BoxState) -> Option<BoxState> {
        let n = state.members.len();
        if n == 0 {
            return None;
        }
        let current = self.stats(state);
        let k = quantile_count(n, self.config.paste_alpha);
        let mut best: Option<Move> = None;

        for (d, bounds) in state.dims.iter().enumerate() {
            match (bounds, &self.data.columns[d].1) {
                (DimBounds::Numeric { lower, upper }, ColumnData::Numeric(values)) => {
                    let outside = |row: usize| state.members.binary_search(&row).is_err();

                    // One quantile step below the lower bound.
                    let mut below: Vec<usize> = self
                        .alive
                        .iter()
                        .copied()
                        .filter(|&row| {
                            outside(row)
                                && values[row] < *lower
                                && self.inside_except(state, row, d)
                        })
                        .collect();
                    below.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
                    if !below.is_empty() {
                        let step = below.len().min(k);
                        let new_lower = values[below[step - 1]];
                        let added: Vec<usize> = below
                            .iter()
                            .copied()
                            .filter(|&row| values[row] >= new_lower)
                            .collect();
                        self.consider_paste(
                            &mut best,
                            &current,
                            state,
                            d,
                            DimBounds::Numeric {
                                lower: new_lower,
                                upper: *upper,
                            },
                            added,
                        );
                    }

                    // One quantile step above the upper bound.
                    let mut above: Vec<usize> = self
                        .alive
                        .iter()
                        .copied()
                        .filter(|&row| {
                            outside(row)
                                && values[row] > *upper
                                && self.inside_except(state, row, d)
                        })
                        .collect();
                    above.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
                    if !above.is_empty() {
                        let step = above.len().min(k);
                        let new_upper = values[above[step - 1]];
                        let added: Vec<usize> = above
                            .iter()
                            .copied()
                            .filter(|&row| values[row] <= new_upper)
                            .collect();
                        self.consider_paste(
                            &mut best,
                            &current,
                            state,
                            d,
                            DimBounds::Numeric {
                                lower: *lower,
                                upper: new_upper,
                            },
                            added,
                        );
                    }
                }
                (DimBounds::Categorical { allowed }, ColumnData::Categorical { codes, .. }) => {
                    for level in 0..allowed.len() {
                        if allowed[level] {
                            continue;
                        }
                        let added: Vec<usize> = self
                            .alive
                            .iter()
                            .copied()
                            .filter(|&row| {
                                codes[row] == level
                                    && state.members.binary_search(&row).is_err()
                                    && self.inside_except(state, row, d)
                            })
                            .collect();
                        if added.is_empty() {
                            continue;
                        }
                        let mut bounds = allowed.clone();
                        bounds[level] = true;
                        self.consider_paste(
                            &mut best,
                            &current,
                            state,
                            d,
                            DimBounds::Categorical { allowed: bounds },
                            added,
                        );
                    }
                }
                _ => {}
            }
        }

        best.map(|chosen| self.apply(state, chosen, false))
    }

    fn consider_paste(
        &self,
        best: &mut Option<Move>,
        current: &BoxStats,
        state: &BoxState,
        dim: usize,
        bounds: DimBounds,
        added: Vec<usize>,
    ) {
        if added.is_empty() {
            return;
        }
        let mut members = state.members.clone();
        members.extend(added);
        members.sort_unstable();

        let interesting = self.interesting_in(&members);
        let density = ratio(interesting, members.len());
        if density < self.config.paste_density_floor {
            return;
        }
        let coverage = ratio(interesting, self.interesting_alive);
        if coverage <= current.coverage {
            return;
        }
        let candidate = Move {
            dim,
            bounds,
            members,
            score: coverage - current.coverage,
            tiebreak: density,
        };
        let better = match best {
            None => true,
            Some(current_best) => {
                candidate.score > current_best.score
                    || (candidate.score == current_best.score
                        && candidate.tiebreak > current_best.tiebreak)
            }
        };
        if better {
            *best = Some(candidate);
        }
    }

    fn apply(&self, state: &BoxState, chosen: Move, is_peel: bool) -> BoxState {
        let mut dims = state.dims.clone();
        dims[chosen.dim] = chosen.bounds;
        BoxState {
            dims,
            members: chosen.members,
            peels: state.peels + usize::from(is_peel),
            pastes: state.pastes + usize::from(!is_peel),
        }
    }
}

/// Number of points one quantile step covers: at least one, otherwise the
/// floor of `alpha * n`.
fn quantile_count(n: usize, alpha: f64) -> usize {
    ((alpha * n as f64).floor() as usize).max(1)
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Project the final state onto the dimensions it actually restricts,
/// compared against the full observed domain of the data.
fn build_box(data: &DiscoveryData, state: &BoxState, stats: BoxStats) -> PrimBox {
    let mut limits = Vec::new();
    for (d, (name, column)) in data.columns.iter().enumerate() {
        match (&state.dims[d], column) {
            (DimBounds::Numeric { lower, upper }, ColumnData::Numeric(values)) => {
                let mut observed_lower = f64::INFINITY;
                let mut observed_upper = f64::NEG_INFINITY;
                for value in values {
                    observed_lower = observed_lower.min(*value);
                    observed_upper = observed_upper.max(*value);
                }
                if *lower > observed_lower || *upper < observed_upper {
                    limits.push((
                        name.clone(),
                        BoxLimit::Range {
                            lower: *lower,
                            upper: *upper,
                        },
                    ));
                }
            }
            (DimBounds::Categorical { allowed }, ColumnData::Categorical { levels, .. }) => {
                if allowed.iter().any(|kept| !kept) {
                    limits.push((
                        name.clone(),
                        BoxLimit::Categories {
                            allowed: levels
                                .iter()
                                .zip(allowed)
                                .filter_map(|(level, kept)| kept.then(|| level.clone()))
                                .collect(),
                        },
                    ));
                }
            }
            _ => {}
        }
    }
    PrimBox {
        limits,
        density: stats.density,
        coverage: stats.coverage,
        mass: stats.mass,
        peels: state.peels,
        pastes: state.pastes,
    }
}
