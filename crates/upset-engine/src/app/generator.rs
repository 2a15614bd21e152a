//! Combination generation workflow
//!
//! validate → estimate → enumerate → materialize → filter → order → limit.

use crate::constants::{PARALLEL_THRESHOLD, PROGRESS_INTERVAL};
use crate::domain::combination::{
    Combination, CombinationRequest, Materializer, SortBy, SortDirection, compare_by_keys,
};
use crate::domain::powerset::{DegreeOrder, PowerSetOptions, estimated_count, power_set};
use crate::domain::set::SetList;
use crate::error::{Result, UpSetError};
use rayon::prelude::*;

/// Number of subsets the request enumerates, without materializing anything
///
/// # Errors
///
/// `InvalidRequest` if the degree bounds are inconsistent with `sets`.
pub fn estimate_combinations(sets: &SetList, request: &CombinationRequest) -> Result<u128> {
    let (min, max) = request.degree_bounds(sets.len())?;
    Ok(estimated_count(sets.len(), min, max))
}

/// Generate the combinations described by `request`
///
/// The result is deterministic: ordered by `request.order`, ties in enumeration
/// order (degree ascending, then lexicographic by set position).
pub fn generate_combinations(
    sets: &SetList,
    request: &CombinationRequest,
) -> Result<Vec<Combination>> {
    generate_combinations_with_progress(sets, request, |_, _| {})
}

/// Generate combinations with a progress callback `(enumerated, total)`
pub fn generate_combinations_with_progress<F>(
    sets: &SetList,
    request: &CombinationRequest,
    mut on_progress: F,
) -> Result<Vec<Combination>>
where
    F: FnMut(usize, usize),
{
    let (min, max) = request.degree_bounds(sets.len())?;
    let estimated = estimated_count(sets.len(), min, max);
    if let Some(ceiling) = request.max_enumeration
        && estimated > ceiling
    {
        return Err(UpSetError::Overflow { estimated, ceiling });
    }
    let total = usize::try_from(estimated).unwrap_or(usize::MAX);

    let materializer = Materializer::new(sets);
    let base = PowerSetOptions::default()
        .with_degree(min, Some(max))
        .with_strategy(request.strategy);

    if let (Some(limit), Some(degree_order)) = (request.limit, degree_short_circuit(request)) {
        let combinations = generate_until_limit(
            sets,
            request,
            &materializer,
            base.with_degree_order(degree_order),
            limit,
            total,
            &mut on_progress,
        );
        return Ok(combinations);
    }

    let mut subsets = power_set(sets.as_slice(), base).indices();
    let mut combinations = Vec::new();
    let mut done = 0;

    loop {
        let chunk: Vec<Vec<usize>> = subsets.by_ref().take(PROGRESS_INTERVAL).collect();
        if chunk.is_empty() {
            break;
        }

        let materialized: Vec<Combination> = if chunk.len() >= PARALLEL_THRESHOLD {
            chunk
                .par_iter()
                .map(|subset| materializer.materialize(subset, &request.aggregation))
                .collect()
        } else {
            chunk
                .iter()
                .map(|subset| materializer.materialize(subset, &request.aggregation))
                .collect()
        };

        done += chunk.len();
        combinations.extend(
            materialized
                .into_iter()
                .filter(|c| request.include_empty || !c.is_empty()),
        );
        on_progress(done, total);
    }

    if done == 0 {
        on_progress(0, total);
    }

    finish(&mut combinations, request);
    Ok(combinations)
}

/// Degree visiting order that lets enumeration stop early, if the primary key allows it
fn degree_short_circuit(request: &CombinationRequest) -> Option<DegreeOrder> {
    let primary = request.order.first()?;
    if primary.by != SortBy::Degree {
        return None;
    }
    Some(match primary.direction {
        SortDirection::Ascending => DegreeOrder::Ascending,
        SortDirection::Descending => DegreeOrder::Descending,
    })
}

/// Enumerate in primary-key order and stop once the first `limit` results are final
///
/// With the degree as the only key, ties keep enumeration order and the cut can
/// happen right at `limit`; with further keys the degree reached by the
/// `limit`-th result still has to be completed.
fn generate_until_limit<F>(
    sets: &SetList,
    request: &CombinationRequest,
    materializer: &Materializer<'_>,
    options: PowerSetOptions,
    limit: usize,
    total: usize,
    on_progress: &mut F,
) -> Vec<Combination>
where
    F: FnMut(usize, usize),
{
    let complete_level = request.order.len() > 1;
    let mut combinations: Vec<Combination> = Vec::new();
    let mut cut_degree: Option<usize> = None;
    let mut done = 0;

    for subset in power_set(sets.as_slice(), options).indices() {
        if let Some(degree) = cut_degree
            && (!complete_level || subset.len() != degree)
        {
            break;
        }

        let combination = materializer.materialize(&subset, &request.aggregation);
        done += 1;
        if done % PROGRESS_INTERVAL == 0 {
            on_progress(done, total);
        }

        if request.include_empty || !combination.is_empty() {
            combinations.push(combination);
            if cut_degree.is_none() && combinations.len() >= limit {
                cut_degree = Some(subset.len());
            }
        }
    }
    on_progress(done, total);

    finish(&mut combinations, request);
    combinations
}

/// Stable sort by the request keys, then apply the limit
fn finish(combinations: &mut Vec<Combination>, request: &CombinationRequest) {
    combinations.sort_by(|a, b| compare_by_keys(a, b, &request.order));
    if let Some(limit) = request.limit {
        combinations.truncate(limit);
    }
}
