use crate::core::aggregate::{self, NameTotal};
use crate::core::metrics;
use crate::core::parser::SourceTable;
use crate::domain::model::{normalize_name, NameEntity, RankSet, Sex, YearlyCount};
use crate::utils::error::{NamesError, Result};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Load progress. Transitions only move forward and repeating one is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogState {
    Uninitialized,
    TotalsLoaded,
    TotalsAndYearlyLoaded,
}

impl CatalogState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogState::Uninitialized => "uninitialized",
            CatalogState::TotalsLoaded => "totals loaded",
            CatalogState::TotalsAndYearlyLoaded => "totals and yearly loaded",
        }
    }
}

#[derive(Debug)]
struct RankCache {
    version: u64,
    ranks: Vec<RankSet>,
}

/// Every name from the boys and girls tables, keyed case-insensitively.
///
/// Entities keep the sorted-name order they were built in, which is also the
/// tie-break order for ranks and nearest-score searches.
#[derive(Debug)]
pub struct Catalog {
    state: CatalogState,
    entities: Vec<NameEntity>,
    index: HashMap<String, usize>,
    version: u64,
    rank_cache: RefCell<Option<RankCache>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            state: CatalogState::Uninitialized,
            entities: Vec::new(),
            index: HashMap::new(),
            version: 0,
            rank_cache: RefCell::new(None),
        }
    }

    pub fn load(boys: &SourceTable, girls: &SourceTable) -> Self {
        let mut catalog = Self::new();
        catalog.load_totals(boys, girls);
        catalog
    }

    /// Builds one entity per distinct name from the per-sex totals. A name
    /// missing from one table gets 0 for that sex.
    pub fn load_totals(&mut self, boys: &SourceTable, girls: &SourceTable) {
        if self.state != CatalogState::Uninitialized {
            tracing::debug!("Totals already loaded, skipping");
            return;
        }

        let boys_totals = aggregate::totals(boys);
        let girls_totals = aggregate::totals(girls);

        // display name -> key; the first casing seen for a key wins
        let mut seen: HashSet<&str> = HashSet::new();
        let mut union: BTreeMap<&str, &str> = BTreeMap::new();
        for total in boys_totals.iter().chain(girls_totals.iter()) {
            if seen.insert(total.key.as_str()) {
                union.insert(&total.name, &total.key);
            }
        }

        let lookup = |totals: &[NameTotal]| -> HashMap<String, f64> {
            totals.iter().map(|t| (t.key.clone(), t.total)).collect()
        };
        let boys_by_key = lookup(&boys_totals);
        let girls_by_key = lookup(&girls_totals);

        let mut entities = Vec::with_capacity(union.len());
        let mut index = HashMap::with_capacity(union.len());
        for (name, key) in union {
            let entity = NameEntity::new(
                name,
                boys_by_key.get(key).copied().unwrap_or(0.0),
                girls_by_key.get(key).copied().unwrap_or(0.0),
            );
            index.insert(key.to_string(), entities.len());
            entities.push(entity);
        }

        tracing::info!(
            "Loaded {} names ({} from '{}', {} from '{}')",
            entities.len(),
            boys_totals.len(),
            boys.label(),
            girls_totals.len(),
            girls.label()
        );

        self.entities = entities;
        self.index = index;
        self.version += 1;
        self.state = CatalogState::TotalsLoaded;
    }

    /// Attaches per-year series to existing entities. Only names already in
    /// the catalog receive data; yearly rows for unknown names are dropped.
    pub fn load_yearly_data(&mut self, boys: &SourceTable, girls: &SourceTable) -> Result<()> {
        match self.state {
            CatalogState::Uninitialized => {
                return Err(NamesError::CatalogStateError {
                    state: self.state.as_str(),
                    operation: "loading yearly data",
                })
            }
            CatalogState::TotalsAndYearlyLoaded => {
                tracing::debug!("Yearly data already loaded, skipping");
                return Ok(());
            }
            CatalogState::TotalsLoaded => {}
        }

        let mut boys_yearly = aggregate::group_yearly(&aggregate::long_form(boys));
        let mut girls_yearly = aggregate::group_yearly(&aggregate::long_form(girls));

        let mut attached = 0usize;
        for entity in &mut self.entities {
            if let Some(series) = boys_yearly.remove(entity.key()) {
                entity.boys_yearly = Some(series);
            }
            if let Some(series) = girls_yearly.remove(entity.key()) {
                entity.girls_yearly = Some(series);
            }
            if entity.has_yearly_data() {
                attached += 1;
            }
        }

        let dropped = boys_yearly.len() + girls_yearly.len();
        if dropped > 0 {
            tracing::debug!("Dropped yearly series for {} names missing from totals", dropped);
        }
        tracing::info!("Loaded yearly data for {} names", attached);

        self.state = CatalogState::TotalsAndYearlyLoaded;

        let mismatched = self.check_consistency();
        if !mismatched.is_empty() {
            tracing::warn!(
                "{} names have totals that disagree with their yearly series",
                mismatched.len()
            );
        }

        Ok(())
    }

    pub fn state(&self) -> CatalogState {
        self.state
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Case-insensitive exact lookup.
    pub fn get_by_name(&self, name: &str) -> Option<&NameEntity> {
        self.index
            .get(&normalize_name(name))
            .map(|&i| &self.entities[i])
    }

    pub fn get_all(&self) -> Vec<&NameEntity> {
        self.entities.iter().collect()
    }

    /// Names by total count, highest first, each with its ranks. `top_n` of 0
    /// means no limit.
    pub fn get_ranked(&self, top_n: usize) -> Vec<(&NameEntity, RankSet)> {
        self.ensure_ranks();
        let cache = self.rank_cache.borrow();
        let ranks = cache.as_ref().map(|c| c.ranks.as_slice()).unwrap_or_default();

        let mut ranked: Vec<(&NameEntity, RankSet)> =
            self.entities.iter().zip(ranks.iter().copied()).collect();
        ranked.sort_by(|a, b| metrics::compare_values(b.0.total_count(), a.0.total_count()));

        if top_n > 0 {
            ranked.truncate(top_n);
        }
        ranked
    }

    pub fn ranks_for(&self, name: &str) -> Option<RankSet> {
        let index = *self.index.get(&normalize_name(name))?;
        self.ensure_ranks();
        self.rank_cache
            .borrow()
            .as_ref()
            .and_then(|c| c.ranks.get(index).copied())
    }

    fn ensure_ranks(&self) {
        let mut cache = self.rank_cache.borrow_mut();
        if cache.as_ref().is_some_and(|c| c.version == self.version) {
            return;
        }

        tracing::debug!("Computing ranks for {} names", self.entities.len());
        *cache = Some(RankCache {
            version: self.version,
            ranks: metrics::rank(&self.entities),
        });
    }

    /// Names whose loaded yearly series do not add up to their totals. A sex
    /// with no series attached is not checked.
    pub fn check_consistency(&self) -> Vec<&str> {
        if self.state != CatalogState::TotalsAndYearlyLoaded {
            return Vec::new();
        }

        let disagrees = |e: &NameEntity, sex: Sex| -> bool {
            let Some(series) = e.yearly(sex) else {
                return false;
            };
            let expected = e.total(sex);
            let sum: f64 = series.iter().map(|yc: &YearlyCount| yc.count).sum();
            (sum - expected).abs() > 1e-6 * expected.max(1.0)
        };

        self.entities
            .iter()
            .filter(|e| disagrees(*e, Sex::Boys) || disagrees(*e, Sex::Girls))
            .map(|e| e.name.as_str())
            .collect()
    }
}
