use serde::Serialize;

/// One year's registrations for a name and sex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearlyCount {
    pub year: i32,
    pub count: f64,
}

impl YearlyCount {
    pub fn new(year: i32, count: f64) -> Self {
        Self { year, count }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Boys,
    Girls,
}

/// Which time series to pull out of a [`NameEntity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Series {
    Boys,
    Girls,
    Combined,
}

/// All data for a single name, boys and girls combined.
///
/// `key` is the lower-cased lookup form; `name` keeps the casing of the first
/// occurrence for display. Yearly series stay `None` until historical data is
/// loaded, which is different from a loaded-but-empty series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameEntity {
    #[serde(skip)]
    key: String,
    pub name: String,
    pub boys_total: f64,
    pub girls_total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boys_yearly: Option<Vec<YearlyCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub girls_yearly: Option<Vec<YearlyCount>>,
}

impl NameEntity {
    pub fn new(name: impl Into<String>, boys_total: f64, girls_total: f64) -> Self {
        let name = name.into();
        Self {
            key: normalize_name(&name),
            name,
            boys_total,
            girls_total,
            boys_yearly: None,
            girls_yearly: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn total(&self, sex: Sex) -> f64 {
        match sex {
            Sex::Boys => self.boys_total,
            Sex::Girls => self.girls_total,
        }
    }

    pub fn yearly(&self, sex: Sex) -> Option<&[YearlyCount]> {
        match sex {
            Sex::Boys => self.boys_yearly.as_deref(),
            Sex::Girls => self.girls_yearly.as_deref(),
        }
    }

    pub fn total_count(&self) -> f64 {
        self.boys_total + self.girls_total
    }

    /// -1.0 is fully masculine, +1.0 fully feminine, 0.0 balanced or no data.
    pub fn gender_score(&self) -> f64 {
        score(self.boys_total, self.girls_total)
    }

    pub fn has_yearly_data(&self) -> bool {
        self.boys_yearly.is_some() || self.girls_yearly.is_some()
    }
}

/// `(girls - boys) / (girls + boys)`, or 0.0 when there are no registrations.
pub fn score(boys: f64, girls: f64) -> f64 {
    let total = boys + girls;
    if total > 0.0 {
        (girls - boys) / total
    } else {
        0.0
    }
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Popularity ranks for one name; 1 is the most registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankSet {
    pub overall: usize,
    pub boys: usize,
    pub girls: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_score_bounds() {
        assert_eq!(NameEntity::new("Oliver", 100.0, 0.0).gender_score(), -1.0);
        assert_eq!(NameEntity::new("Olivia", 0.0, 100.0).gender_score(), 1.0);
        assert_eq!(NameEntity::new("Alex", 50.0, 50.0).gender_score(), 0.0);
        assert_eq!(NameEntity::new("Zyx", 0.0, 0.0).gender_score(), 0.0);
    }

    #[test]
    fn test_key_is_separate_from_display_name() {
        let entity = NameEntity::new("McKenzie", 3.0, 9.0);
        assert_eq!(entity.key(), "mckenzie");
        assert_eq!(entity.name, "McKenzie");
        assert_eq!(entity.total_count(), 12.0);
        assert!(!entity.has_yearly_data());
    }

    #[test]
    fn test_serialized_entity_omits_unloaded_series() {
        let entity = NameEntity::new("Sam", 10.0, 30.0);
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["name"], "Sam");
        assert!(json.get("boys_yearly").is_none());
        assert!(json.get("key").is_none());
    }

    #[test]
    fn test_sex_and_series_serialize_lowercase() {
        assert_eq!(serde_json::to_value(Sex::Girls).unwrap(), "girls");
        assert_eq!(serde_json::to_value(Series::Combined).unwrap(), "combined");
    }
}
