//! Closed enumerations for categorical fields.
//!
//! Every categorical value written to the database must appear in one of
//! these lists; the same lists are served at `GET /api/catalog`.

use serde::Serialize;

use crate::error::FieldErrors;
use crate::models::listing::{AssetBucket, FeeBucket};

pub const SERVICES: &[&str] = &[
    "Financial Planning",
    "Retirement Planning",
    "Investment Management",
    "Tax Planning",
    "Estate Planning",
    "Insurance Planning",
    "Education Planning",
    "Wealth Management",
    "Portfolio Management",
    "Business Planning",
    "Divorce Planning",
    "Charitable Giving",
    "Debt Management",
    "Socially Responsible Investing",
];

pub const DESIGNATIONS: &[&str] = &[
    "CFP",
    "CFA",
    "ChFC",
    "CLU",
    "CPA",
    "CPA/PFS",
    "CIMA",
    "CPWA",
    "AIF",
    "RICP",
    "EA",
];

pub const LICENSES: &[&str] = &[
    "Series 6",
    "Series 7",
    "Series 24",
    "Series 63",
    "Series 65",
    "Series 66",
    "Life & Health Insurance",
    "Property & Casualty Insurance",
];

pub const COMPENSATION_TYPES: &[&str] = &[
    "Fee-Only",
    "Fee-Based",
    "Commission",
    "Hourly",
    "Flat Fee",
    "Percentage of AUM",
    "Retainer",
];

pub const CLIENT_TYPES: &[&str] = &[
    "Individuals",
    "High Net Worth Individuals",
    "Families",
    "Retirees",
    "Small Businesses",
    "Corporations",
    "Non-Profits",
    "Physicians",
    "Young Professionals",
    "Trusts & Estates",
];

pub const US_STATES: &[&str] = &[
    "Alabama",
    "Alaska",
    "Arizona",
    "Arkansas",
    "California",
    "Colorado",
    "Connecticut",
    "Delaware",
    "District of Columbia",
    "Florida",
    "Georgia",
    "Hawaii",
    "Idaho",
    "Illinois",
    "Indiana",
    "Iowa",
    "Kansas",
    "Kentucky",
    "Louisiana",
    "Maine",
    "Maryland",
    "Massachusetts",
    "Michigan",
    "Minnesota",
    "Mississippi",
    "Missouri",
    "Montana",
    "Nebraska",
    "Nevada",
    "New Hampshire",
    "New Jersey",
    "New Mexico",
    "New York",
    "North Carolina",
    "North Dakota",
    "Ohio",
    "Oklahoma",
    "Oregon",
    "Pennsylvania",
    "Rhode Island",
    "South Carolina",
    "South Dakota",
    "Tennessee",
    "Texas",
    "Utah",
    "Vermont",
    "Virginia",
    "Washington",
    "West Virginia",
    "Wisconsin",
    "Wyoming",
];

pub const ASSET_CLASSES: &[&str] = &[
    "Equities",
    "Fixed Income",
    "Real Estate",
    "Private Equity",
    "Hedge Funds",
    "Commodities",
    "Cash & Equivalents",
    "Alternatives",
    "Municipal Bonds",
    "ESG",
];

pub const ACCOUNTING_SERVICES: &[&str] = &[
    "Tax Preparation",
    "Bookkeeping",
    "Payroll",
    "Audit & Assurance",
    "Business Advisory",
    "Tax Planning",
    "Estate & Trust Tax",
    "Forensic Accounting",
    "CFO Services",
    "IRS Representation",
];

pub const MEETING_TOPICS: &[&str] = &[
    "Retirement Planning",
    "Investment Strategy",
    "Tax Planning",
    "Estate Planning",
    "Insurance",
    "College Savings",
    "Debt Management",
    "Business Planning",
    "Other",
];

pub const PROFESSIONAL_TYPES: &[&str] = &["advisor", "investor", "accountant", "other"];

pub fn is_member(list: &[&str], value: &str) -> bool {
    list.iter().any(|item| *item == value)
}

/// Record a field error for every value missing from `list`.
pub fn check_members(errors: &mut FieldErrors, field: &str, list: &[&str], values: &[String]) {
    if let Some(bad) = values.iter().find(|v| !is_member(list, v)) {
        errors.add(field, format!("Unknown value: {}", bad));
    }
}

pub fn check_state(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    if let Some(state) = value {
        if !is_member(US_STATES, state) {
            errors.add(field, format!("Unknown state: {}", state));
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BucketOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Response for GET /api/catalog
#[derive(Debug, Clone, Serialize)]
pub struct CatalogResponse {
    pub services: &'static [&'static str],
    pub designations: &'static [&'static str],
    pub licenses: &'static [&'static str],
    pub compensation_types: &'static [&'static str],
    pub client_types: &'static [&'static str],
    pub states: &'static [&'static str],
    pub asset_classes: &'static [&'static str],
    pub accounting_services: &'static [&'static str],
    pub meeting_topics: &'static [&'static str],
    pub professional_types: &'static [&'static str],
    pub asset_buckets: Vec<BucketOption>,
    pub fee_buckets: Vec<BucketOption>,
}

impl CatalogResponse {
    pub fn build() -> Self {
        Self {
            services: SERVICES,
            designations: DESIGNATIONS,
            licenses: LICENSES,
            compensation_types: COMPENSATION_TYPES,
            client_types: CLIENT_TYPES,
            states: US_STATES,
            asset_classes: ASSET_CLASSES,
            accounting_services: ACCOUNTING_SERVICES,
            meeting_topics: MEETING_TOPICS,
            professional_types: PROFESSIONAL_TYPES,
            asset_buckets: AssetBucket::ALL
                .iter()
                .map(|b| BucketOption {
                    value: b.value(),
                    label: b.label(),
                })
                .collect(),
            fee_buckets: FeeBucket::ALL
                .iter()
                .map(|b| BucketOption {
                    value: b.value(),
                    label: b.label(),
                })
                .collect(),
        }
    }
}
