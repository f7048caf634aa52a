use crate::core::catalog::{Catalog, CatalogState};
use crate::core::metrics::{self, Ranked};
use crate::core::parser::SourceTable;
use crate::core::{ConfigProvider, NameEntity, RankSet, Series, Sex, Storage};
use crate::utils::error::Result;
use crate::utils::validation::validate_target_score;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct ScoreReport<'a> {
    pub masculine: Vec<Ranked<'a>>,
    pub feminine: Vec<Ranked<'a>>,
    pub neutral: Vec<Ranked<'a>>,
}

#[derive(Debug, Clone)]
pub struct PopularReport<'a> {
    pub boys: Vec<Ranked<'a>>,
    pub girls: Vec<Ranked<'a>>,
}

/// Everything the lookup command shows for one name.
#[derive(Debug, Clone, Serialize)]
pub struct NameReport<'a> {
    /// Serialized as totals only; the series are the fields below.
    #[serde(serialize_with = "serialize_totals")]
    pub entity: &'a NameEntity,
    pub ranks: RankSet,
    pub combined: Vec<(i32, f64)>,
    pub boys: Vec<(i32, f64)>,
    pub girls: Vec<(i32, f64)>,
    pub yearly_scores: Vec<(i32, f64)>,
    /// Set when the historical tables could not be read; the totals are
    /// still valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_error: Option<String>,
}

fn serialize_totals<S>(entity: &&NameEntity, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeStruct;

    let mut state = serializer.serialize_struct("NameTotals", 4)?;
    state.serialize_field("name", &entity.name)?;
    state.serialize_field("boys_total", &entity.boys_total)?;
    state.serialize_field("girls_total", &entity.girls_total)?;
    state.serialize_field("gender_score", &entity.gender_score())?;
    state.end()
}

/// Owns the catalog and answers the query commands. Totals load on
/// construction; yearly history loads the first time a lookup needs it.
pub struct NamesService<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    catalog: Catalog,
}

impl<S: Storage, C: ConfigProvider> NamesService<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let mut service = Self {
            storage,
            config,
            catalog: Catalog::new(),
        };
        let (boys, girls) = service.read_tables()?;
        service.catalog.load_totals(&boys, &girls);
        Ok(service)
    }

    fn read_table(&self, path: &str) -> Result<SourceTable> {
        let bytes = self.storage.read_file(path)?;
        SourceTable::from_reader(path, bytes.as_slice(), self.config.skip_rows())
    }

    fn read_tables(&self) -> Result<(SourceTable, SourceTable)> {
        tracing::debug!(
            "Reading source tables: boys='{}', girls='{}'",
            self.config.boys_file(),
            self.config.girls_file()
        );
        let boys = self.read_table(self.config.boys_file())?;
        let girls = self.read_table(self.config.girls_file())?;
        Ok((boys, girls))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// Loads per-year history once; later calls return immediately.
    pub fn ensure_yearly_loaded(&mut self) -> Result<()> {
        if self.catalog.state() == CatalogState::TotalsAndYearlyLoaded {
            return Ok(());
        }
        let (boys, girls) = self.read_tables()?;
        self.catalog.load_yearly_data(&boys, &girls)
    }

    /// Extremes of the score scale among the `top` most popular names
    /// (0 for all names).
    pub fn score_report(&self, top: usize) -> ScoreReport<'_> {
        let ranked = self.catalog.get_ranked(top);
        let n = self.config.list_size();
        ScoreReport {
            masculine: metrics::most_masculine(&ranked, n),
            feminine: metrics::most_feminine(&ranked, n),
            neutral: metrics::most_neutral(&ranked, n),
        }
    }

    pub fn popular_report(&self, n: usize) -> PopularReport<'_> {
        let ranked = self.catalog.get_ranked(0);
        PopularReport {
            boys: metrics::top_by_sex(&ranked, Sex::Boys, n),
            girls: metrics::top_by_sex(&ranked, Sex::Girls, n),
        }
    }

    /// The `n` names closest to `target` among the `top` most popular.
    /// Targets outside [-1.0, 1.0] are rejected before anything is computed.
    pub fn nearest(&self, target: f64, n: usize, top: usize) -> Result<Vec<Ranked<'_>>> {
        validate_target_score(target)?;

        let ranked = self.catalog.get_ranked(top);
        let candidates: Vec<&NameEntity> = ranked.iter().map(|(e, _)| *e).collect();
        let closest = metrics::nearest_to_score(&candidates, target, n);

        Ok(closest
            .into_iter()
            .filter_map(|e| ranked.iter().find(|(r, _)| std::ptr::eq(*r, e)).copied())
            .collect())
    }

    /// `None` when the name is not in the catalog.
    pub fn lookup(&mut self, name: &str) -> Option<NameReport<'_>> {
        self.catalog.get_by_name(name)?;

        let history_error = match self.ensure_yearly_loaded() {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!("Could not load historical data: {}", e);
                Some(e.to_string())
            }
        };

        let entity = self.catalog.get_by_name(name)?;
        let ranks = self.catalog.ranks_for(name)?;

        Some(NameReport {
            entity,
            ranks,
            combined: metrics::time_series(entity, Series::Combined),
            boys: metrics::time_series(entity, Series::Boys),
            girls: metrics::time_series(entity, Series::Girls),
            yearly_scores: metrics::yearly_gender_score(entity),
            history_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::NamesError;
    use std::cell::Cell;
    use std::collections::HashMap;

    struct MockStorage {
        files: HashMap<String, Vec<u8>>,
        reads: Cell<usize>,
    }

    impl MockStorage {
        fn new(boys: &str, girls: &str) -> Self {
            let mut files = HashMap::new();
            files.insert("boys.csv".to_string(), boys.as_bytes().to_vec());
            files.insert("girls.csv".to_string(), girls.as_bytes().to_vec());
            Self {
                files,
                reads: Cell::new(0),
            }
        }
    }

    impl Storage for MockStorage {
        fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.reads.set(self.reads.get() + 1);
            self.files.get(path).cloned().ok_or_else(|| {
                NamesError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }
    }

    struct TestConfig;

    impl ConfigProvider for TestConfig {
        fn boys_file(&self) -> &str {
            "boys.csv"
        }
        fn girls_file(&self) -> &str {
            "girls.csv"
        }
        fn skip_rows(&self) -> usize {
            1
        }
        fn list_size(&self) -> usize {
            2
        }
    }

    const BOYS: &str = "\
metadata
Name,2023 Count,2024 Count
Jack,50,60
Alex,20,20
Robin,5,5
";

    const GIRLS: &str = "\
metadata
Name,2023 Count,2024 Count
Ava,70,80
Alex,10,[x]
Robin,5,5
";

    fn service() -> NamesService<MockStorage, TestConfig> {
        NamesService::new(MockStorage::new(BOYS, GIRLS), TestConfig).unwrap()
    }

    #[test]
    fn test_new_loads_totals_only() {
        let service = service();
        assert_eq!(service.catalog().state(), CatalogState::TotalsLoaded);
        assert_eq!(service.catalog().len(), 4);
        assert_eq!(service.storage.reads.get(), 2);
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let mut storage = MockStorage::new(BOYS, GIRLS);
        storage.files.remove("girls.csv");
        assert!(NamesService::new(storage, TestConfig).is_err());
    }

    #[test]
    fn test_score_report_lists() {
        let service = service();
        let report = service.score_report(0);

        assert_eq!(report.masculine.len(), 2);
        assert_eq!(report.masculine[0].0.name, "Jack");
        assert_eq!(report.feminine[0].0.name, "Ava");
        assert_eq!(report.neutral[0].0.name, "Robin");
    }

    #[test]
    fn test_popular_report() {
        let service = service();
        let report = service.popular_report(1);
        assert_eq!(report.boys[0].0.name, "Jack");
        assert_eq!(report.girls[0].0.name, "Ava");
    }

    #[test]
    fn test_nearest_validates_target() {
        let service = service();
        assert!(matches!(
            service.nearest(1.5, 3, 0),
            Err(NamesError::InvalidTargetScore { .. })
        ));

        let nearest = service.nearest(0.0, 2, 0).unwrap();
        assert_eq!(nearest[0].0.name, "Robin");
        assert_eq!(nearest[1].0.name, "Alex");
        assert_eq!(nearest[0].1, service.catalog().ranks_for("robin").unwrap());
    }

    #[test]
    fn test_lookup_loads_history_once() {
        let mut service = service();
        assert!(service.lookup("nobody").is_none());
        assert_eq!(service.storage.reads.get(), 2);

        let report = service.lookup("ALEX").unwrap();
        assert_eq!(report.entity.name, "Alex");
        assert_eq!(report.combined, vec![(2023, 30.0), (2024, 20.0)]);
        assert_eq!(report.yearly_scores.len(), 2);
        assert!(report.history_error.is_none());

        service.lookup("jack").unwrap();
        assert_eq!(service.storage.reads.get(), 4);
        assert_eq!(
            service.catalog().state(),
            CatalogState::TotalsAndYearlyLoaded
        );
    }

    #[test]
    fn test_lookup_json_carries_each_series_once() {
        let mut service = service();
        let report = service.lookup("alex").unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["entity"]["name"], "Alex");
        assert_eq!(json["entity"]["boys_total"], 40.0);
        assert!(json["entity"].get("boys_yearly").is_none());
        assert!(json["entity"].get("girls_yearly").is_none());
        assert_eq!(json["boys"], serde_json::json!([[2023, 20.0], [2024, 20.0]]));
        assert_eq!(json["girls"], serde_json::json!([[2023, 10.0]]));
    }

    #[test]
    fn test_lookup_survives_history_failure() {
        let mut service = service();
        service.storage.files.clear();

        let report = service.lookup("ava").unwrap();
        assert!(report.history_error.is_some());
        assert!(report.combined.is_empty());
        assert_eq!(report.entity.girls_total, 150.0);
    }
}
