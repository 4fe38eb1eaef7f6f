//! In-memory filtering, sorting and pagination of certificate lists.
//!
//! The backend returns the full certificate list in one response; narrowing
//! it down for display happens entirely on the client. All matching is
//! case-insensitive substring matching, and date filtering compares calendar
//! days, not instants.

use crate::types::Certificate;
use chrono::NaiveDate;

/// Sort direction for the certificate list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// A to Z by trainee name
    #[default]
    Ascending,
    /// Z to A by trainee name
    Descending,
}

/// Narrowing criteria for a certificate list
///
/// All set criteria must match (conjunction). Unset criteria are ignored.
#[derive(Clone, Debug, Default)]
pub struct ListQuery {
    /// Substring of the trainee's full name
    pub name: Option<String>,
    /// Substring of the reference number
    pub reference: Option<String>,
    /// Substring of the group code
    pub group_code: Option<String>,
    /// Calendar day the course started
    pub course_start_date: Option<NaiveDate>,
    /// Sort direction applied after filtering
    pub sort: SortOrder,
}

impl ListQuery {
    /// Filter and sort a certificate list
    ///
    /// Returns references into the input, filtered by every set criterion and
    /// sorted by trainee name. Records without a name always sort last, in
    /// both directions.
    pub fn apply<'a>(&self, certificates: &'a [Certificate]) -> Vec<&'a Certificate> {
        let mut matches: Vec<&Certificate> = certificates
            .iter()
            .filter(|cert| self.matches(cert))
            .collect();

        matches.sort_by(|a, b| self.compare_names(a, b));
        matches
    }

    fn matches(&self, cert: &Certificate) -> bool {
        if let Some(name) = &self.name
            && !contains_ignore_case(&cert.full_name, name)
        {
            return false;
        }

        if let Some(reference) = &self.reference {
            let hit = cert
                .reference_number
                .as_deref()
                .is_some_and(|r| contains_ignore_case(r, reference));
            if !hit {
                return false;
            }
        }

        if let Some(group) = &self.group_code {
            let hit = cert
                .group_code
                .as_deref()
                .is_some_and(|g| contains_ignore_case(g, group));
            if !hit {
                return false;
            }
        }

        if let Some(day) = &self.course_start_date {
            let hit = cert
                .course_start_date
                .is_some_and(|d| d.date_naive() == *day);
            if !hit {
                return false;
            }
        }

        true
    }

    fn compare_names(&self, a: &Certificate, b: &Certificate) -> std::cmp::Ordering {
        use std::cmp::Ordering;

        // Nameless records sort last regardless of direction
        match (a.full_name.is_empty(), b.full_name.is_empty()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }

        let cmp = a
            .full_name
            .to_lowercase()
            .cmp(&b.full_name.to_lowercase());
        match self.sort {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    }
}

/// One page of an already filtered list
///
/// Pages are 0-based; a page past the end yields an empty slice rather than
/// panicking.
pub fn page_slice<T>(items: &[T], page: usize, rows_per_page: usize) -> &[T] {
    let start = page.saturating_mul(rows_per_page);
    if start >= items.len() || rows_per_page == 0 {
        return &[];
    }
    let end = (start + rows_per_page).min(items.len());
    &items[start..end]
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
