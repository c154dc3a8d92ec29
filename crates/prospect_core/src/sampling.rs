//! Deterministic sampling over parameter spaces.
//!
//! Both samplers are pure functions of `(space, n, seed)`: a single
//! `SmallRng` seeded from the caller's seed drives the whole call, and
//! dimensions are visited in declaration order, so identical arguments
//! reproduce identical sequences. Uniform sampling draws each dimension
//! independently; the Latin hypercube partitions every numeric dimension
//! into `n` equal-probability strata, draws once inside each stratum, and
//! permutes each dimension's column independently, so every stratum of
//! every numeric dimension is hit exactly once in `n` draws.
//!
//! Categorical and boolean dimensions draw uniformly (or by their explicit
//! weights) independent of the stratification; constants pass through.

use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::SamplingError;
use crate::model::{Domain, Parameter, ParameterSpace, ParameterValue, Policy, Scenario};

/// Which design the sampler produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SampleKind {
    /// Stratified Latin-hypercube design over numeric dimensions.
    #[default]
    LatinHypercube,
    /// Independent uniform draws for every dimension.
    Uniform,
}

/// Sample `n` scenarios over the space's uncertainties.
pub fn sample_scenarios(
    space: &ParameterSpace,
    n: usize,
    seed: u64,
    kind: SampleKind,
) -> Result<Vec<Scenario>, SamplingError> {
    let rows = sample_rows(space.uncertainties(), n, seed, kind)?;
    Ok(rows.into_iter().map(Scenario::from_values).collect())
}

/// Sample `n` policies over the space's levers. Policies are named by their
/// draw index.
pub fn sample_policies(
    space: &ParameterSpace,
    n: usize,
    seed: u64,
    kind: SampleKind,
) -> Result<Vec<Policy>, SamplingError> {
    let rows = sample_rows(space.levers(), n, seed, kind)?;
    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(i, values)| Policy::new(format!("policy_{i}"), values))
        .collect())
}

fn sample_rows(
    parameters: &[Parameter],
    n: usize,
    seed: u64,
    kind: SampleKind,
) -> Result<Vec<Vec<(String, ParameterValue)>>, SamplingError> {
    if n == 0 {
        return Err(SamplingError::EmptySample);
    }

    let mut rng = SmallRng::seed_from_u64(seed);
    let mut columns = Vec::with_capacity(parameters.len());
    for parameter in parameters {
        columns.push(sample_column(parameter, n, kind, &mut rng)?);
    }

    let mut rows = Vec::with_capacity(n);
    for i in 0..n {
        let row = parameters
            .iter()
            .zip(&columns)
            .map(|(parameter, column)| (parameter.name.clone(), column[i].clone()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn sample_column<R: Rng + ?Sized>(
    parameter: &Parameter,
    n: usize,
    kind: SampleKind,
    rng: &mut R,
) -> Result<Vec<ParameterValue>, SamplingError> {
    let column = match &parameter.domain {
        Domain::Constant { value } => vec![value.clone(); n],

        Domain::Real { lower, upper } => match kind {
            SampleKind::Uniform => (0..n)
                .map(|_| ParameterValue::Real(rng.random_range(*lower..=*upper)))
                .collect(),
            SampleKind::LatinHypercube => stratified_unit(n, rng)
                .into_iter()
                .map(|u| ParameterValue::Real(lower + u * (upper - lower)))
                .collect(),
        },

        Domain::Integer { lower, upper } => match kind {
            SampleKind::Uniform => (0..n)
                .map(|_| ParameterValue::Integer(rng.random_range(*lower..=*upper)))
                .collect(),
            SampleKind::LatinHypercube => {
                // Stratify over [lower, upper + 1) and floor, so each
                // integer gets probability mass proportional to its share
                // of the strata.
                let span = (upper - lower + 1) as f64;
                stratified_unit(n, rng)
                    .into_iter()
                    .map(|u| {
                        let value = lower + (u * span).floor() as i64;
                        ParameterValue::Integer(value.min(*upper))
                    })
                    .collect()
            }
        },

        Domain::Categorical {
            categories,
            weights,
        } => match weights {
            Some(weights) => {
                let dist = WeightedIndex::new(weights.iter().copied()).map_err(|_| {
                    SamplingError::InvalidWeights {
                        name: parameter.name.clone(),
                    }
                })?;
                (0..n)
                    .map(|_| ParameterValue::Category(categories[dist.sample(rng)].clone()))
                    .collect()
            }
            None => (0..n)
                .map(|_| {
                    let i = rng.random_range(0..categories.len());
                    ParameterValue::Category(categories[i].clone())
                })
                .collect(),
        },

        Domain::Boolean => (0..n).map(|_| ParameterValue::Bool(rng.random())).collect(),
    };
    Ok(column)
}

/// `n` stratified draws on the unit interval: one uniform draw inside each
/// of `n` equal strata, returned in independently permuted order.
fn stratified_unit<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<f64> {
    let mut points: Vec<f64> = (0..n)
        .map(|i| (i as f64 + rng.random::<f64>()) / n as f64)
        .collect();
    points.shuffle(rng);
    points
}
