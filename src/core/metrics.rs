//! Pure derived statistics over catalog entities.

use crate::domain::model::{score, NameEntity, RankSet, Series, Sex, YearlyCount};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Orders counts and scores numerically. Equal values, including `0.0` and
/// `-0.0`, compare equal so stable sorts keep their input order.
pub fn compare_values(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Computes all three rank dimensions together. The result lines up with
/// `entities`. Each dimension is a stable descending sort, so ties keep the
/// input order.
pub fn rank(entities: &[NameEntity]) -> Vec<RankSet> {
    let overall = dense_ranks(entities, NameEntity::total_count);
    let boys = dense_ranks(entities, |e| e.total(Sex::Boys));
    let girls = dense_ranks(entities, |e| e.total(Sex::Girls));

    overall
        .into_iter()
        .zip(boys)
        .zip(girls)
        .map(|((overall, boys), girls)| RankSet {
            overall,
            boys,
            girls,
        })
        .collect()
}

fn dense_ranks<F>(entities: &[NameEntity], key: F) -> Vec<usize>
where
    F: Fn(&NameEntity) -> f64,
{
    let mut order: Vec<usize> = (0..entities.len()).collect();
    order.sort_by(|&a, &b| compare_values(key(&entities[b]), key(&entities[a])));

    let mut ranks = vec![0; entities.len()];
    for (position, index) in order.into_iter().enumerate() {
        ranks[index] = position + 1;
    }
    ranks
}

fn by_year(series: &[YearlyCount]) -> BTreeMap<i32, f64> {
    series.iter().map(|yc| (yc.year, yc.count)).collect()
}

/// Year-ascending `(year, count)` pairs. An absent series comes back empty.
pub fn time_series(entity: &NameEntity, which: Series) -> Vec<(i32, f64)> {
    if !entity.has_yearly_data() {
        return Vec::new();
    }

    match which {
        Series::Boys | Series::Girls => {
            let sex = if which == Series::Boys {
                Sex::Boys
            } else {
                Sex::Girls
            };
            entity
                .yearly(sex)
                .unwrap_or_default()
                .iter()
                .map(|yc| (yc.year, yc.count))
                .collect()
        }
        Series::Combined => {
            let mut combined = by_year(entity.yearly(Sex::Boys).unwrap_or_default());
            for yc in entity.yearly(Sex::Girls).unwrap_or_default() {
                *combined.entry(yc.year).or_insert(0.0) += yc.count;
            }
            combined.into_iter().collect()
        }
    }
}

/// Per-year gender score. Needs both series loaded; years with no
/// registrations at all are left out rather than scored 0.
pub fn yearly_gender_score(entity: &NameEntity) -> Vec<(i32, f64)> {
    let (Some(boys), Some(girls)) = (entity.yearly(Sex::Boys), entity.yearly(Sex::Girls)) else {
        return Vec::new();
    };

    let boys = by_year(boys);
    let girls = by_year(girls);

    let mut years: Vec<i32> = boys.keys().chain(girls.keys()).copied().collect();
    years.sort_unstable();
    years.dedup();

    years
        .into_iter()
        .filter_map(|year| {
            let b = boys.get(&year).copied().unwrap_or(0.0);
            let g = girls.get(&year).copied().unwrap_or(0.0);
            (b + g > 0.0).then(|| (year, score(b, g)))
        })
        .collect()
}

/// The `n` entities whose score is closest to `target`. Equal distances keep
/// their input order.
pub fn nearest_to_score<'a>(entities: &[&'a NameEntity], target: f64, n: usize) -> Vec<&'a NameEntity> {
    let mut scored: Vec<(&'a NameEntity, f64)> = entities
        .iter()
        .map(|e| (*e, (e.gender_score() - target).abs()))
        .collect();
    scored.sort_by(|a, b| compare_values(a.1, b.1));
    scored.into_iter().take(n).map(|(e, _)| e).collect()
}

/// Inclusive score-range filter followed by an order-preserving cut.
pub fn filter_by_score_range<'a>(
    entities: &[&'a NameEntity],
    score_range: Option<(f64, f64)>,
    top_n: Option<usize>,
) -> Vec<&'a NameEntity> {
    let mut result: Vec<&'a NameEntity> = match score_range {
        Some((min, max)) => entities
            .iter()
            .copied()
            .filter(|e| (min..=max).contains(&e.gender_score()))
            .collect(),
        None => entities.to_vec(),
    };

    if let Some(n) = top_n.filter(|n| *n > 0) {
        result.truncate(n);
    }
    result
}

pub type Ranked<'a> = (&'a NameEntity, RankSet);

fn take_sorted_by<'a, F>(entries: &[Ranked<'a>], n: usize, key: F) -> Vec<Ranked<'a>>
where
    F: Fn(&NameEntity) -> f64,
{
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| compare_values(key(a.0), key(b.0)));
    sorted.truncate(n);
    sorted
}

/// Most negative scores first.
pub fn most_masculine<'a>(entries: &[Ranked<'a>], n: usize) -> Vec<Ranked<'a>> {
    take_sorted_by(entries, n, NameEntity::gender_score)
}

pub fn most_feminine<'a>(entries: &[Ranked<'a>], n: usize) -> Vec<Ranked<'a>> {
    take_sorted_by(entries, n, |e| -e.gender_score())
}

pub fn most_neutral<'a>(entries: &[Ranked<'a>], n: usize) -> Vec<Ranked<'a>> {
    take_sorted_by(entries, n, |e| e.gender_score().abs())
}

/// Highest totals for one sex first.
pub fn top_by_sex<'a>(entries: &[Ranked<'a>], sex: Sex, n: usize) -> Vec<Ranked<'a>> {
    take_sorted_by(entries, n, |e| -e.total(sex))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_series(boys: Option<Vec<(i32, f64)>>, girls: Option<Vec<(i32, f64)>>) -> NameEntity {
        let to_series = |pairs: Vec<(i32, f64)>| -> Vec<YearlyCount> {
            pairs.into_iter().map(|(y, c)| YearlyCount::new(y, c)).collect()
        };
        let mut entity = NameEntity::new("Test", 0.0, 0.0);
        entity.boys_total = boys.iter().flatten().map(|(_, c)| c).sum();
        entity.girls_total = girls.iter().flatten().map(|(_, c)| c).sum();
        entity.boys_yearly = boys.map(to_series);
        entity.girls_yearly = girls.map(to_series);
        entity
    }

    fn scored(scores: &[f64]) -> Vec<NameEntity> {
        scores
            .iter()
            .enumerate()
            .map(|(i, s)| {
                // girls - boys = s * 100 with total 100
                let girls = (1.0 + s) * 50.0;
                NameEntity::new(format!("N{}", i), 100.0 - girls, girls)
            })
            .collect()
    }

    #[test]
    fn test_rank_dimensions_are_dense_permutations() {
        let entities = vec![
            NameEntity::new("A", 5.0, 0.0),
            NameEntity::new("B", 1.0, 9.0),
            NameEntity::new("C", 3.0, 3.0),
            NameEntity::new("D", 0.0, 0.0),
        ];
        let ranks = rank(&entities);

        let dims: [fn(&RankSet) -> usize; 3] = [|r| r.overall, |r| r.boys, |r| r.girls];
        for dim in dims {
            let mut values: Vec<usize> = ranks.iter().map(dim).collect();
            values.sort_unstable();
            assert_eq!(values, vec![1, 2, 3, 4]);
        }

        assert_eq!(ranks[1], RankSet { overall: 1, boys: 3, girls: 1 });
        assert_eq!(ranks[0].boys, 1);
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let entities = vec![
            NameEntity::new("A", 2.0, 0.0),
            NameEntity::new("B", 2.0, 0.0),
        ];
        let ranks = rank(&entities);
        assert_eq!(ranks[0].overall, 1);
        assert_eq!(ranks[1].overall, 2);
        assert_eq!(ranks[0].girls, 1);
        assert_eq!(ranks[1].girls, 2);
    }

    #[test]
    fn test_signed_zero_counts_tie() {
        let entities = vec![
            NameEntity::new("A", -0.0, 1.0),
            NameEntity::new("B", 0.0, 1.0),
        ];
        let ranks = rank(&entities);
        assert_eq!(ranks[0].boys, 1);
        assert_eq!(ranks[1].boys, 2);
        assert_eq!(compare_values(-0.0, 0.0), Ordering::Equal);
    }

    #[test]
    fn test_nearest_to_zero() {
        let entities = scored(&[-0.9, -0.1, 0.05, 0.2, 0.95]);
        let refs: Vec<&NameEntity> = entities.iter().collect();

        let nearest: Vec<&str> = nearest_to_score(&refs, 0.0, 3)
            .into_iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(nearest, vec!["N2", "N1", "N3"]);
    }

    #[test]
    fn test_nearest_ties_keep_input_order() {
        let entities = vec![
            NameEntity::new("First", 1.0, 0.0),
            NameEntity::new("Second", 0.0, 1.0),
        ];
        let refs: Vec<&NameEntity> = entities.iter().collect();
        let nearest = nearest_to_score(&refs, 0.0, 2);
        assert_eq!(nearest[0].name, "First");
        assert_eq!(nearest[1].name, "Second");
    }

    #[test]
    fn test_combined_series_is_union_of_years() {
        let entity = with_series(
            Some(vec![(2000, 5.0), (2001, 7.0)]),
            Some(vec![(2001, 3.0), (2002, 4.0)]),
        );

        assert_eq!(
            time_series(&entity, Series::Combined),
            vec![(2000, 5.0), (2001, 10.0), (2002, 4.0)]
        );
        assert_eq!(time_series(&entity, Series::Girls), vec![(2001, 3.0), (2002, 4.0)]);
    }

    #[test]
    fn test_time_series_without_yearly_data_is_empty() {
        let entity = NameEntity::new("Unloaded", 3.0, 4.0);
        assert!(time_series(&entity, Series::Combined).is_empty());

        let only_girls = with_series(None, Some(vec![(2000, 2.0)]));
        assert!(time_series(&only_girls, Series::Boys).is_empty());
        assert_eq!(time_series(&only_girls, Series::Combined), vec![(2000, 2.0)]);
    }

    #[test]
    fn test_yearly_gender_score_omits_zero_years() {
        let entity = with_series(
            Some(vec![(2000, 0.0), (2001, 1.0), (2002, 3.0)]),
            Some(vec![(2000, 0.0), (2001, 3.0)]),
        );

        assert_eq!(
            yearly_gender_score(&entity),
            vec![(2001, 0.5), (2002, -1.0)]
        );
    }

    #[test]
    fn test_yearly_gender_score_needs_both_series() {
        let entity = with_series(Some(vec![(2000, 4.0)]), None);
        assert!(yearly_gender_score(&entity).is_empty());
    }

    #[test]
    fn test_filter_by_score_range_is_inclusive_and_order_preserving() {
        let entities = scored(&[0.5, -0.5, 1.0, 0.0]);
        let refs: Vec<&NameEntity> = entities.iter().collect();

        let filtered = filter_by_score_range(&refs, Some((0.0, 1.0)), None);
        let names: Vec<&str> = filtered.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["N0", "N2", "N3"]);

        let cut = filter_by_score_range(&refs, Some((0.0, 1.0)), Some(2));
        assert_eq!(cut.len(), 2);
        assert_eq!(filter_by_score_range(&refs, None, Some(0)).len(), 4);
    }

    #[test]
    fn test_score_lists() {
        let entities = scored(&[0.5, -1.0, 0.1, 1.0]);
        let ranks = rank(&entities);
        let entries: Vec<Ranked> = entities.iter().zip(ranks).collect();

        assert_eq!(most_masculine(&entries, 1)[0].0.name, "N1");
        assert_eq!(most_feminine(&entries, 1)[0].0.name, "N3");
        assert_eq!(most_neutral(&entries, 1)[0].0.name, "N2");

        let boys = top_by_sex(&entries, Sex::Boys, 2);
        assert_eq!(boys[0].0.name, "N1");
        assert_eq!(boys.len(), 2);
    }
}
