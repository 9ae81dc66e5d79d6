//! # Candidate Filter
//! Pure, deterministic accept/reject policy for one posting against the
//! criteria. No I/O. Rules are applied in order and the first one that fires
//! decides:
//!
//! 1. target company → accept
//! 2. location not in the wanted list → reject
//! 3. (opt-in) parsed salary below the floor → reject
//! 4. senior wording or years ≥ threshold, with no entry-level wording → reject
//! 5. keyword score: ≥2 primary, or ≥1 primary and ≥2 secondary → accept
//!
//! This is a heuristic. It will misjudge some postings; it must never judge
//! the same posting differently twice.

use regex::Regex;
use serde::Serialize;

use crate::config::Criteria;
use crate::extract::{parse_experience_years, parse_salary};
use crate::ingest::types::Posting;

pub const REASON_TARGET_COMPANY: &str = "target company";
pub const REASON_LOCATION_MISMATCH: &str = "location mismatch";
pub const REASON_SALARY_BELOW_MIN: &str = "salary below minimum";
pub const REASON_SENIOR_ROLE: &str = "senior role";
pub const REASON_CURATED: &str = "curated portal";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub accepted: bool,
    pub reason: String,
}

impl Verdict {
    fn accept(reason: impl Into<String>) -> Self {
        Self {
            accepted: true,
            reason: reason.into(),
        }
    }

    fn reject(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            reason: reason.into(),
        }
    }
}

/// Whole-word, case-insensitive matcher over a list of terms.
/// Boundaries are "not a letter/digit/underscore" so terms like `c++` work.
#[derive(Debug, Clone)]
struct TermSet {
    terms: Vec<String>,
    re: Option<Regex>,
}

impl TermSet {
    fn new(terms: &[String]) -> Self {
        let alts: Vec<String> = terms
            .iter()
            .filter(|t| !t.trim().is_empty())
            .map(|t| regex::escape(t.trim()))
            .collect();
        let re = if alts.is_empty() {
            None
        } else {
            let pattern = format!(
                r"(?i)(?:^|[^\p{{L}}\p{{N}}_])(?:{})(?:$|[^\p{{L}}\p{{N}}_])",
                alts.join("|")
            );
            Regex::new(&pattern).ok()
        };
        Self {
            terms: terms.to_vec(),
            re,
        }
    }

    fn is_match(&self, text: &str) -> bool {
        self.re.as_ref().is_some_and(|re| re.is_match(text))
    }

    /// First term (in list order) that matches on its own.
    fn first_match(&self, text: &str) -> Option<&str> {
        if !self.is_match(text) {
            return None;
        }
        self.terms
            .iter()
            .find(|t| TermSet::new(std::slice::from_ref(*t)).is_match(text))
            .map(String::as_str)
    }
}

/// Criteria compiled once per run.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    criteria: Criteria,
    target_companies: TermSet,
    senior_terms: TermSet,
    entry_terms: TermSet,
    primary_lc: Vec<String>,
    secondary_lc: Vec<String>,
}

impl CandidateFilter {
    pub fn new(criteria: Criteria) -> Self {
        let lower = |v: &[String]| v.iter().map(|k| k.to_lowercase()).collect::<Vec<_>>();
        Self {
            target_companies: TermSet::new(&criteria.target_companies),
            senior_terms: TermSet::new(&criteria.experience_exclusions),
            entry_terms: TermSet::new(&criteria.entry_level_terms),
            primary_lc: lower(&criteria.keywords),
            secondary_lc: lower(&criteria.secondary_keywords),
            criteria,
        }
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn matches(&self, posting: &Posting) -> Verdict {
        let c = &self.criteria;

        // 1) Target company wins over everything else.
        if let Some(company) = self.target_companies.first_match(&posting.company) {
            return Verdict::accept(format!("{REASON_TARGET_COMPANY} ({company})"));
        }

        // 2) Location. An empty list means "anywhere".
        let location_lc = posting.location.to_lowercase();
        if !c.locations.is_empty()
            && !c
                .locations
                .iter()
                .any(|l| location_lc.contains(&l.to_lowercase()))
        {
            return Verdict::reject(REASON_LOCATION_MISMATCH);
        }

        // 3) Salary floor, only when asked for and only when a number was found.
        if c.enforce_min_salary {
            if let Some(salary) = posting.salary.as_deref().and_then(parse_salary) {
                if salary < c.min_salary {
                    return Verdict::reject(REASON_SALARY_BELOW_MIN);
                }
            }
        }

        // 4) Seniority.
        let seniority_text = format!(
            "{} {} {}",
            posting.title,
            posting.experience.as_deref().unwrap_or_default(),
            posting.description
        );
        let years = posting
            .experience
            .as_deref()
            .and_then(parse_experience_years)
            .or_else(|| parse_experience_years(&seniority_text));
        let senior = self.senior_terms.is_match(&seniority_text)
            || years.is_some_and(|y| y >= c.senior_years_threshold);
        if senior && !self.entry_terms.is_match(&seniority_text) {
            return Verdict::reject(REASON_SENIOR_ROLE);
        }

        // 5) Keyword score.
        let text_lc = format!("{} {}", posting.title, posting.description).to_lowercase();
        let primary: Vec<&str> = self
            .primary_lc
            .iter()
            .zip(&c.keywords)
            .filter(|(lc, _)| text_lc.contains(lc.as_str()))
            .map(|(_, original)| original.as_str())
            .collect();
        let secondary = self
            .secondary_lc
            .iter()
            .filter(|lc| text_lc.contains(lc.as_str()))
            .count();

        let p = primary.len();
        if p >= 2 || (p >= 1 && secondary >= 2) {
            let mut reason = format!(
                "{p} primary keyword{} ({})",
                if p == 1 { "" } else { "s" },
                primary.iter().take(3).copied().collect::<Vec<_>>().join(", ")
            );
            if secondary > 0 {
                reason.push_str(&format!(" + {secondary} secondary"));
            }
            if let Some(industry) = c
                .industries
                .iter()
                .find(|i| text_lc.contains(&i.to_lowercase()))
            {
                reason.push_str(&format!("; industry: {industry}"));
            }
            return Verdict::accept(reason);
        }

        Verdict::reject(format!(
            "weak keyword match (primary {p}, secondary {secondary})"
        ))
    }
}

/// One-off convenience over [`CandidateFilter`]; compile once when filtering many.
pub fn matches(posting: &Posting, criteria: &Criteria) -> Verdict {
    CandidateFilter::new(criteria.clone()).matches(posting)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria() -> Criteria {
        let mut c = Criteria::default_seed();
        c.locations = vec!["Bangalore".into(), "Chennai".into()];
        c
    }

    fn posting(title: &str, company: &str, location: &str, description: &str) -> Posting {
        Posting {
            title: title.into(),
            company: company.into(),
            location: location.into(),
            description: description.into(),
            source: "test".into(),
            ..Default::default()
        }
    }

    #[test]
    fn short_target_names_need_whole_words() {
        let f = CandidateFilter::new(criteria());
        // "EY" must not fire inside "Honeywell"
        let v = f.matches(&posting("Data Analyst", "Honeywell", "Pune", ""));
        assert_eq!(v.reason, REASON_LOCATION_MISMATCH);
        let v = f.matches(&posting("Analyst", "EY GDS", "Kolkata", ""));
        assert!(v.accepted);
        assert!(v.reason.starts_with(REASON_TARGET_COMPANY));
    }

    #[test]
    fn senior_wording_is_overridden_by_entry_level_wording() {
        let f = CandidateFilter::new(criteria());
        let lead = posting("Lead Data Analyst", "Acme", "Chennai", "Python SQL");
        assert_eq!(f.matches(&lead).reason, REASON_SENIOR_ROLE);

        let mixed = posting(
            "Data Analyst",
            "Acme",
            "Chennai",
            "Work with senior analysts. Freshers welcome. Python, SQL.",
        );
        assert!(f.matches(&mixed).accepted);
    }

    #[test]
    fn years_threshold_counts_as_senior() {
        let f = CandidateFilter::new(criteria());
        let mut p = posting("Data Analyst", "Acme", "Bangalore", "Python SQL");
        p.experience = Some("3-5 Yrs".into());
        assert_eq!(f.matches(&p).reason, REASON_SENIOR_ROLE);

        p.experience = Some("0-2 Yrs".into());
        assert!(f.matches(&p).accepted);
    }

    #[test]
    fn word_boundaries_for_seniority_terms() {
        let f = CandidateFilter::new(criteria());
        // "leading" and "international" contain "lead" / "intern" as substrings only
        let p = posting(
            "Data Analyst",
            "Acme",
            "Bangalore",
            "Join a leading international team. Python and SQL daily.",
        );
        assert!(f.matches(&p).accepted);
    }

    #[test]
    fn one_primary_needs_two_secondary() {
        let f = CandidateFilter::new(criteria());
        let weak = posting("Reporting Associate", "Acme", "Bangalore", "Jupyter");
        let v = f.matches(&weak);
        assert!(!v.accepted);
        assert_eq!(v.reason, "weak keyword match (primary 1, secondary 1)");

        let ok = posting("Reporting Associate", "Acme", "Bangalore", "Jupyter and ETL");
        let v = f.matches(&ok);
        assert!(v.accepted, "{v:?}");
        assert!(v.reason.contains("1 primary keyword (Reporting)"));
        assert!(v.reason.contains("2 secondary"));
    }

    #[test]
    fn salary_floor_is_opt_in() {
        let mut c = criteria();
        let mut p = posting("Data Analyst", "Acme", "Bangalore", "Python SQL");
        p.salary = Some("2-3 LPA".into());
        assert!(CandidateFilter::new(c.clone()).matches(&p).accepted);

        c.enforce_min_salary = true;
        assert_eq!(
            CandidateFilter::new(c.clone()).matches(&p).reason,
            REASON_SALARY_BELOW_MIN
        );

        p.salary = Some("Not disclosed".into());
        assert!(CandidateFilter::new(c).matches(&p).accepted);
    }

    #[test]
    fn empty_location_list_means_anywhere() {
        let mut c = criteria();
        c.locations.clear();
        let p = posting("Data Analyst", "Acme", "Gurgaon", "Python SQL");
        assert!(CandidateFilter::new(c).matches(&p).accepted);
    }
}
