//! # Criteria
//!
//! What the user is looking for: keywords (primary in priority order, plus a
//! lower-weight secondary set), acceptable locations, target companies,
//! industries of interest, and the seniority vocabulary used to drop roles
//! that are out of reach.
//!
//! - Loads from TOML (`[criteria]` table or top-level keys) or JSON.
//! - A missing file falls back to [`Criteria::default_seed`].
//! - Lists are trimmed and de-duplicated case-insensitively, keeping the
//!   first spelling so primary keyword priority survives.
//!
//! Read once at start; never mutated during a run.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

fn default_min_salary() -> u64 {
    400_000 // 4 LPA
}

fn default_senior_years_threshold() -> u32 {
    2
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Criteria {
    /// Primary keywords, highest priority first.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Lower-weight keywords; only count together with a primary hit.
    #[serde(default)]
    pub secondary_keywords: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    /// Informational; mentioned in accept reasons when present in the text.
    #[serde(default)]
    pub industries: Vec<String>,
    /// Postings from these companies are accepted outright.
    #[serde(default)]
    pub target_companies: Vec<String>,
    /// Annual salary floor in rupees.
    #[serde(default = "default_min_salary")]
    pub min_salary: u64,
    /// Reject postings whose parsed salary is below `min_salary`. Off by default;
    /// salary text is too unreliable to drop postings on.
    #[serde(default)]
    pub enforce_min_salary: bool,
    /// Seniority terms ("senior", "lead", "manager", ...).
    #[serde(default)]
    pub experience_exclusions: Vec<String>,
    /// Terms that mark a role as open to freshers; they override seniority hits.
    #[serde(default)]
    pub entry_level_terms: Vec<String>,
    /// Minimum stated years of experience that counts as senior.
    #[serde(default = "default_senior_years_threshold")]
    pub senior_years_threshold: u32,
}

impl Criteria {
    /// Load from `path`; TOML or JSON chosen by extension, then by content.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no criteria file, using built-in criteria");
            return Ok(Self::default_seed());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading criteria from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self::parse(&content, &ext).with_context(|| format!("parsing criteria in {}", path.display()))
    }

    pub fn parse(s: &str, hint_ext: &str) -> Result<Self> {
        let parsed = if hint_ext == "json" || s.trim_start().starts_with('{') {
            serde_json::from_str::<Criteria>(s).map_err(anyhow::Error::from)
        } else {
            parse_toml(s)
        };
        let mut c = parsed?;
        c.clean();
        if c.keywords.is_empty() && c.target_companies.is_empty() {
            return Err(anyhow!("criteria need at least one keyword or target company"));
        }
        Ok(c)
    }

    fn clean(&mut self) {
        for list in [
            &mut self.keywords,
            &mut self.secondary_keywords,
            &mut self.locations,
            &mut self.industries,
            &mut self.target_companies,
            &mut self.experience_exclusions,
            &mut self.entry_level_terms,
        ] {
            *list = clean_list(std::mem::take(list));
        }
    }

    /// Built-in profile: fresher data-analyst roles in Indian metros.
    pub fn default_seed() -> Self {
        fn owned(v: &[&str]) -> Vec<String> {
            v.iter().map(|s| s.to_string()).collect()
        }
        Self {
            keywords: owned(&[
                "Data Analyst",
                "Python",
                "SQL",
                "Pandas",
                "NumPy",
                "Power BI",
                "Excel",
                "Data Visualization",
                "EDA",
                "Data Cleaning",
                "Dashboard",
                "Reporting",
                "Business Intelligence",
                "KPI",
                "Statistics",
                "Analytics Intern",
                "Junior Data Analyst",
            ]),
            secondary_keywords: owned(&[
                "MySQL",
                "Jupyter",
                "ETL",
                "Exploratory Data Analysis",
                "Analytics",
                "Machine Learning",
                "Matplotlib",
                "Seaborn",
                "DAX",
                "Data Warehousing",
                "MIS",
                "Business Analyst",
                "Data Engineer",
            ]),
            locations: owned(&[
                "Bangalore",
                "Bengaluru",
                "Chennai",
                "Hyderabad",
                "Pune",
                "Mumbai",
                "Remote",
                "India",
            ]),
            industries: owned(&[
                "Internet",
                "Ecommerce",
                "IT-Software",
                "Software Services",
                "KPO",
                "Research",
                "Analytics",
            ]),
            target_companies: owned(&[
                "Amazon",
                "Microsoft",
                "Google",
                "Accenture",
                "TCS",
                "Infosys",
                "Wipro",
                "Cognizant",
                "Capgemini",
                "Deloitte",
                "EY",
                "KPMG",
                "PwC",
            ]),
            min_salary: default_min_salary(),
            enforce_min_salary: false,
            experience_exclusions: owned(&[
                "senior", "sr", "lead", "manager", "principal", "head", "architect", "director",
            ]),
            entry_level_terms: owned(&[
                "fresher",
                "freshers",
                "entry level",
                "entry-level",
                "junior",
                "intern",
                "internship",
                "trainee",
                "graduate",
                "0 years",
            ]),
            senior_years_threshold: default_senior_years_threshold(),
        }
    }
}

fn parse_toml(s: &str) -> Result<Criteria> {
    let mut table: toml::Table = toml::from_str(s)?;
    let value = match table.remove("criteria") {
        Some(inner) => inner,
        None => toml::Value::Table(table),
    };
    Ok(value.try_into()?)
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .map(|it| it.trim().to_string())
        .filter(|it| !it.is_empty() && seen.insert(it.to_lowercase()))
        .collect()
}
