//! Shared listing models: pagination envelope and minimum-amount buckets.

use serde::{Deserialize, Serialize};

use crate::error::FieldErrors;

pub const DEFAULT_PER_PAGE: u64 = 12;
pub const MAX_PER_PAGE: u64 = 100;

/// Paginated response envelope used by every listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total rows matching the filters (all pages)
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page,
            per_page: pagination.per_page,
            total_pages: total.div_ceil(pagination.per_page),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Pagination {
    /// 1-based
    pub page: u64,
    pub per_page: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    pub fn from_query(
        page: Option<u64>,
        per_page: Option<u64>,
        errors: &mut FieldErrors,
    ) -> Self {
        let page = match page {
            Some(0) => {
                errors.add("page", "page must be at least 1");
                1
            }
            Some(p) => p,
            None => 1,
        };
        let per_page = match per_page {
            Some(n) if n < 1 => {
                errors.add("per_page", "per_page must be at least 1");
                DEFAULT_PER_PAGE
            }
            Some(n) if n > MAX_PER_PAGE => {
                errors.add("per_page", "per_page cannot exceed 100");
                DEFAULT_PER_PAGE
            }
            Some(n) => n,
            None => DEFAULT_PER_PAGE,
        };
        Self { page, per_page }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.per_page
    }
}

/// Split a comma-separated multi-select parameter into a sorted, de-duplicated list.
pub fn split_multi(raw: Option<&str>) -> Vec<String> {
    let mut values: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    values.sort();
    values.dedup();
    values
}

/// Trim an optional text parameter, treating blank as absent.
pub fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Minimum investment buckets for advisors and investment firms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetBucket {
    #[serde(rename = "no_minimum")]
    NoMinimum,
    #[serde(rename = "under_100k")]
    Under100k,
    #[serde(rename = "100k_500k")]
    From100kTo500k,
    #[serde(rename = "500k_1m")]
    From500kTo1m,
    #[serde(rename = "1m_plus")]
    Over1m,
}

impl AssetBucket {
    pub const ALL: [AssetBucket; 5] = [
        AssetBucket::NoMinimum,
        AssetBucket::Under100k,
        AssetBucket::From100kTo500k,
        AssetBucket::From500kTo1m,
        AssetBucket::Over1m,
    ];

    pub fn for_amount(amount: Option<i64>) -> Self {
        match amount {
            None => AssetBucket::NoMinimum,
            Some(a) if a <= 0 => AssetBucket::NoMinimum,
            Some(a) if a < 100_000 => AssetBucket::Under100k,
            Some(a) if a < 500_000 => AssetBucket::From100kTo500k,
            Some(a) if a < 1_000_000 => AssetBucket::From500kTo1m,
            Some(_) => AssetBucket::Over1m,
        }
    }

    /// Amount range `[lower, upper)` for a non-empty minimum; `None` for the no-minimum bucket.
    pub fn range(self) -> Option<(i64, Option<i64>)> {
        match self {
            AssetBucket::NoMinimum => None,
            AssetBucket::Under100k => Some((1, Some(100_000))),
            AssetBucket::From100kTo500k => Some((100_000, Some(500_000))),
            AssetBucket::From500kTo1m => Some((500_000, Some(1_000_000))),
            AssetBucket::Over1m => Some((1_000_000, None)),
        }
    }

    pub fn value(self) -> &'static str {
        match self {
            AssetBucket::NoMinimum => "no_minimum",
            AssetBucket::Under100k => "under_100k",
            AssetBucket::From100kTo500k => "100k_500k",
            AssetBucket::From500kTo1m => "500k_1m",
            AssetBucket::Over1m => "1m_plus",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AssetBucket::NoMinimum => "No minimum",
            AssetBucket::Under100k => "Under $100k",
            AssetBucket::From100kTo500k => "$100k - $500k",
            AssetBucket::From500kTo1m => "$500k - $1M",
            AssetBucket::Over1m => "$1M+",
        }
    }
}

/// Minimum monthly fee buckets for accounting firms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeeBucket {
    #[serde(rename = "no_minimum")]
    NoMinimum,
    #[serde(rename = "under_250")]
    Under250,
    #[serde(rename = "250_plus")]
    From250,
}

impl FeeBucket {
    pub const ALL: [FeeBucket; 3] = [FeeBucket::NoMinimum, FeeBucket::Under250, FeeBucket::From250];

    pub fn for_amount(amount: Option<i64>) -> Self {
        match amount {
            None => FeeBucket::NoMinimum,
            Some(a) if a <= 0 => FeeBucket::NoMinimum,
            Some(a) if a < 250 => FeeBucket::Under250,
            Some(_) => FeeBucket::From250,
        }
    }

    pub fn range(self) -> Option<(i64, Option<i64>)> {
        match self {
            FeeBucket::NoMinimum => None,
            FeeBucket::Under250 => Some((1, Some(250))),
            FeeBucket::From250 => Some((250, None)),
        }
    }

    pub fn value(self) -> &'static str {
        match self {
            FeeBucket::NoMinimum => "no_minimum",
            FeeBucket::Under250 => "under_250",
            FeeBucket::From250 => "250_plus",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FeeBucket::NoMinimum => "No minimum",
            FeeBucket::Under250 => "Under $250/mo",
            FeeBucket::From250 => "$250/mo+",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults_to_first_page() {
        let mut errors = FieldErrors::new();
        let pagination = Pagination::from_query(None, None, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(pagination, Pagination::default());
        assert_eq!(pagination.offset(), 0);
    }

    #[test]
    fn test_pagination_bounds() {
        let mut errors = FieldErrors::new();
        Pagination::from_query(Some(0), Some(500), &mut errors);
        assert!(errors.contains("page"));
        assert!(errors.contains("per_page"));

        let mut errors = FieldErrors::new();
        let p = Pagination::from_query(Some(3), Some(10), &mut errors);
        assert!(errors.is_empty());
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page: Page<u8> = Page::new(vec![], 25, Pagination { page: 1, per_page: 12 });
        assert_eq!(page.total_pages, 3);
        let empty: Page<u8> = Page::new(vec![], 0, Pagination::default());
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_split_multi() {
        assert_eq!(
            split_multi(Some("Tax Planning, Retirement Planning,,Tax Planning")),
            vec!["Retirement Planning", "Tax Planning"]
        );
        assert!(split_multi(None).is_empty());
    }

    #[test]
    fn test_fee_bucket_boundary() {
        assert_eq!(FeeBucket::for_amount(Some(100)), FeeBucket::Under250);
        assert_eq!(FeeBucket::for_amount(Some(249)), FeeBucket::Under250);
        assert_eq!(FeeBucket::for_amount(Some(250)), FeeBucket::From250);
        assert_eq!(FeeBucket::for_amount(Some(300)), FeeBucket::From250);
        assert_eq!(FeeBucket::for_amount(None), FeeBucket::NoMinimum);
        assert_eq!(FeeBucket::for_amount(Some(0)), FeeBucket::NoMinimum);
    }

    #[test]
    fn test_asset_bucket_ranges_agree_with_for_amount() {
        for amount in [1, 99_999, 100_000, 499_999, 500_000, 999_999, 1_000_000, 25_000_000] {
            let bucket = AssetBucket::for_amount(Some(amount));
            let (lower, upper) = bucket.range().unwrap();
            assert!(amount >= lower);
            assert!(upper.map_or(true, |u| amount < u));
        }
        assert_eq!(AssetBucket::for_amount(None).range(), None);
    }

    #[test]
    fn test_bucket_query_values() {
        let bucket: AssetBucket = serde_json::from_str("\"100k_500k\"").unwrap();
        assert_eq!(bucket, AssetBucket::From100kTo500k);
        let bucket: FeeBucket = serde_json::from_str("\"250_plus\"").unwrap();
        assert_eq!(bucket.label(), "$250/mo+");
    }
}
