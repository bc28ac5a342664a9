//! Listing helpers shared by the advisor, firm and blog directories
//!
//! Filters are pushed into SQL: minimum amounts are parsed once at write time
//! into integer columns, multi-selects use JSONB containment and search is a
//! lower-cased LIKE. Result pages are memoized in a short-lived moka cache
//! keyed by the normalized filter set.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use lazy_static::lazy_static;
use moka::future::Cache;
use regex::Regex;
use sea_orm::{
    sea_query::{extension::postgres::PgBinOper, Expr, Func, LikeExpr},
    ColumnTrait, Condition,
};
use serde::Serialize;
use tracing::debug;

use crate::error::ServiceError;
use crate::models::advisor::AdvisorSummary;
use crate::models::blog::PostSummary;
use crate::models::firm::{AccountingFirmSummary, InvestmentFirmSummary};
use crate::models::listing::Page;

pub const LISTING_TTL: Duration = Duration::from_secs(60);
const LISTING_CAPACITY: u64 = 1_000;

lazy_static! {
    static ref AMOUNT_REGEX: Regex =
        Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?)(?:\s*(mm|million|thousand|billion|bn|k|m|b)\b)?")
            .unwrap();
}

/// Parse the first amount in free text such as "$250k", "$1.5M" or "$100/mo".
///
/// Returns `None` when there is no number or the amount is zero; both land
/// in the "No minimum" bucket.
pub fn parse_amount(text: &str) -> Option<i64> {
    let caps = AMOUNT_REGEX.captures(text)?;
    let number: f64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
    let scale = match caps.get(2).map(|m| m.as_str().to_lowercase()) {
        Some(suffix) => match suffix.as_str() {
            "k" | "thousand" => 1_000.0,
            "m" | "mm" | "million" => 1_000_000.0,
            "b" | "bn" | "billion" => 1_000_000_000.0,
            _ => 1.0,
        },
        None => 1.0,
    };
    let amount = (number * scale).round() as i64;
    (amount > 0).then_some(amount)
}

/// Range condition for a bucket over a parsed amount column.
///
/// `None` selects rows without a minimum (NULL or non-positive).
pub fn amount_condition<C: ColumnTrait>(column: C, range: Option<(i64, Option<i64>)>) -> Condition {
    match range {
        None => Condition::any().add(column.is_null()).add(column.lte(0)),
        Some((lower, upper)) => {
            let mut condition = Condition::all().add(column.gte(lower));
            if let Some(upper) = upper {
                condition = condition.add(column.lt(upper));
            }
            condition
        }
    }
}

/// JSONB array column must contain every value.
pub fn contains_all<C: ColumnTrait>(column: C, values: &[String]) -> Condition {
    let mut condition = Condition::all();
    if !values.is_empty() {
        condition = condition.add(
            Expr::col(column).binary(PgBinOper::Contains, Expr::val(serde_json::json!(values))),
        );
    }
    condition
}

/// `%text%` with LIKE wildcards in `text` escaped by a backslash.
pub fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Case-insensitive substring match over any of the columns.
pub fn search_condition<C: ColumnTrait>(columns: &[C], search: &str) -> Condition {
    let pattern = like_pattern(&search.to_lowercase());
    columns.iter().fold(Condition::any(), |condition, column| {
        condition.add(
            Expr::expr(Func::lower(Expr::col(*column)))
                .like(LikeExpr::new(pattern.clone()).escape('\\')),
        )
    })
}

/// Memoized listing pages; concurrent loads for the same key share one query.
#[derive(Clone)]
pub struct ListingCache<T: Clone + Send + Sync + 'static> {
    name: &'static str,
    cache: Cache<String, Arc<T>>,
}

impl<T: Clone + Send + Sync + 'static> ListingCache<T> {
    pub fn new(name: &'static str) -> Self {
        Self::with_ttl(name, LISTING_TTL)
    }

    pub fn with_ttl(name: &'static str, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(LISTING_CAPACITY)
            .time_to_live(ttl)
            .build();
        Self { name, cache }
    }

    pub async fn get_or_load<K, F, Fut>(&self, key: &K, load: F) -> Result<Arc<T>, ServiceError>
    where
        K: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let key = serde_json::to_string(key).map_err(|e| ServiceError::Internal(e.to_string()))?;

        if let Some(hit) = self.cache.get(&key).await {
            debug!(cache = self.name, key = %key, "Listing cache hit");
            return Ok(hit);
        }

        self.cache
            .try_get_with(key, async move { load().await.map(Arc::new) })
            .await
            .map_err(ServiceError::from_shared)
    }

    /// Drop every cached page after a write to the underlying table.
    pub fn invalidate(&self) {
        debug!(cache = self.name, "Listing cache invalidated");
        self.cache.invalidate_all();
    }
}

/// One cache per public directory
#[derive(Clone)]
pub struct ListingCaches {
    pub advisors: ListingCache<Page<AdvisorSummary>>,
    pub investment_firms: ListingCache<Page<InvestmentFirmSummary>>,
    pub accounting_firms: ListingCache<Page<AccountingFirmSummary>>,
    pub blog_posts: ListingCache<Page<PostSummary>>,
}

impl ListingCaches {
    pub fn new() -> Self {
        Self {
            advisors: ListingCache::new("advisors"),
            investment_firms: ListingCache::new("investment_firms"),
            accounting_firms: ListingCache::new("accounting_firms"),
            blog_posts: ListingCache::new("blog_posts"),
        }
    }
}

impl Default for ListingCaches {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::models::listing::{AssetBucket, FeeBucket};

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$250k"), Some(250_000));
        assert_eq!(parse_amount("$1.5M"), Some(1_500_000));
        assert_eq!(parse_amount("$100/mo"), Some(100));
        assert_eq!(parse_amount("$1,000,000"), Some(1_000_000));
        assert_eq!(parse_amount("2 million"), Some(2_000_000));
        assert_eq!(parse_amount("$5MM"), Some(5_000_000));
        assert_eq!(parse_amount("No minimum"), None);
        assert_eq!(parse_amount("$0"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("austin"), "%austin%");
        assert_eq!(like_pattern("50%_"), r"%50\%\_%");
        assert_eq!(like_pattern(r"a\b"), r"%a\\b%");
    }

    #[test]
    fn test_search_condition_declares_escape() {
        use crate::entities::advisors;
        use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

        let stmt = advisors::Entity::find()
            .filter(search_condition(&[advisors::Column::Name], "50%_"))
            .build(DbBackend::Postgres);
        assert!(stmt.sql.contains("LIKE $1 ESCAPE"));
        let values = stmt.values.expect("bound values");
        assert_eq!(values.0[0], sea_orm::Value::from(r"%50\%\_%".to_string()));
    }

    #[test]
    fn test_fee_text_buckets() {
        let bucket = |text: &str| FeeBucket::for_amount(parse_amount(text));
        assert_eq!(bucket("$100/mo"), FeeBucket::Under250);
        assert_eq!(bucket("$300/mo"), FeeBucket::From250);
        assert_eq!(bucket("$250/mo"), FeeBucket::From250);
        assert_eq!(bucket("call for pricing"), FeeBucket::NoMinimum);
    }

    #[test]
    fn test_asset_text_buckets() {
        let bucket = |text: &str| AssetBucket::for_amount(parse_amount(text));
        assert_eq!(bucket("$250k"), AssetBucket::From100kTo500k);
        assert_eq!(bucket("$1.5M"), AssetBucket::Over1m);
        assert_eq!(bucket("$50,000"), AssetBucket::Under100k);
        assert_eq!(bucket("none"), AssetBucket::NoMinimum);
    }

    #[tokio::test]
    async fn test_cache_loads_once_per_key() {
        let cache: ListingCache<Vec<u32>> = ListingCache::new("test");
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let page = cache
                .get_or_load(&("Texas", 1), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2, 3])
                })
                .await
                .unwrap();
            assert_eq!(page.len(), 3);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.invalidate();
        cache
            .get_or_load(&("Texas", 1), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![])
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cache_does_not_keep_errors() {
        let cache: ListingCache<u32> = ListingCache::new("test");
        let err = cache
            .get_or_load(&"key", || async { Err(ServiceError::NotFound("Page".into())) })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let value = cache.get_or_load(&"key", || async { Ok(7) }).await.unwrap();
        assert_eq!(*value, 7);
    }
}
