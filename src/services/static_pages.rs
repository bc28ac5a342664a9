//! Pre-rendered HTML shells for crawlers and link previews
//!
//! Each page carries its SEO metadata inline and a `<noscript>` placeholder;
//! the client application replaces the body once loaded.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::json;

#[derive(Debug, Clone)]
pub struct StaticPage {
    /// Route path starting with `/`
    pub path: String,
    pub title: String,
    pub description: String,
    pub og_type: &'static str,
    pub schema_type: &'static str,
}

impl StaticPage {
    fn new(path: &str, title: &str, description: &str, og_type: &'static str, schema_type: &'static str) -> Self {
        Self {
            path: path.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            og_type,
            schema_type,
        }
    }
}

const SITE_NAME: &str = "Advisor Directory";

const EXAMPLE_ADVISORS: [(&str, &str); 3] = [
    ("jane-doe", "Jane Doe, CFP"),
    ("michael-chen", "Michael Chen, CFA"),
    ("sarah-johnson", "Sarah Johnson, ChFC"),
];

const EXAMPLE_INVESTMENT_FIRMS: [(&str, &str); 3] = [
    ("summit-capital-partners", "Summit Capital Partners"),
    ("horizon-wealth-group", "Horizon Wealth Group"),
    ("evergreen-asset-management", "Evergreen Asset Management"),
];

const EXAMPLE_ACCOUNTING_FIRMS: [(&str, &str); 3] = [
    ("ledger-co-cpas", "Ledger & Co CPAs"),
    ("bright-path-accounting", "Bright Path Accounting"),
    ("keystone-tax-advisors", "Keystone Tax Advisors"),
];

const EXAMPLE_POSTS: [(&str, &str); 3] = [
    ("five-retirement-planning-mistakes", "Five Retirement Planning Mistakes to Avoid"),
    ("choosing-a-fee-only-advisor", "Choosing a Fee-Only Advisor"),
    ("tax-planning-for-small-businesses", "Tax Planning for Small Businesses"),
];

/// Routes rendered at build time
pub fn fixed_pages() -> Vec<StaticPage> {
    let mut pages = vec![
        StaticPage::new(
            "/",
            "Find a Trusted Financial Advisor",
            "Search verified financial advisors, investment firms and accounting firms near you.",
            "website",
            "WebSite",
        ),
        StaticPage::new(
            "/advisors",
            "Financial Advisor Directory",
            "Browse financial advisors by state, specialty, client type and minimum investment.",
            "website",
            "CollectionPage",
        ),
        StaticPage::new(
            "/investment-firms",
            "Investment Firm Directory",
            "Compare investment firms by asset class, minimum investment and rating.",
            "website",
            "CollectionPage",
        ),
        StaticPage::new(
            "/accounting-firms",
            "Accounting Firm Directory",
            "Compare accounting firms by service and minimum monthly fee.",
            "website",
            "CollectionPage",
        ),
        StaticPage::new(
            "/blog",
            "Financial Planning Blog",
            "Guides on retirement, investing, taxes and choosing the right advisor.",
            "website",
            "Blog",
        ),
        StaticPage::new(
            "/advisors/register",
            "List Your Advisory Practice",
            "Create a free advisor profile and reach clients looking for your expertise.",
            "website",
            "WebPage",
        ),
    ];

    for (slug, name) in EXAMPLE_ADVISORS {
        pages.push(StaticPage::new(
            &format!("/advisors/{}", slug),
            name,
            &format!("{} - financial advisor profile, services and credentials.", name),
            "profile",
            "FinancialService",
        ));
    }
    for (slug, name) in EXAMPLE_INVESTMENT_FIRMS {
        pages.push(StaticPage::new(
            &format!("/investment-firms/{}", slug),
            name,
            &format!("{} - investment firm profile, leadership and registrations.", name),
            "website",
            "FinancialService",
        ));
    }
    for (slug, name) in EXAMPLE_ACCOUNTING_FIRMS {
        pages.push(StaticPage::new(
            &format!("/accounting-firms/{}", slug),
            name,
            &format!("{} - accounting firm profile, services and fees.", name),
            "website",
            "AccountingService",
        ));
    }
    for (slug, title) in EXAMPLE_POSTS {
        pages.push(StaticPage::new(
            &format!("/blog/{}", slug),
            title,
            &format!("{} | {} blog", title, SITE_NAME),
            "article",
            "BlogPosting",
        ));
    }
    pages
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_shell(page: &StaticPage, site_url: &str) -> String {
    let canonical = format!("{}{}", site_url.trim_end_matches('/'), page.path);
    let full_title = format!("{} | {}", page.title, SITE_NAME);

    let json_ld = json!({
        "@context": "https://schema.org",
        "@type": page.schema_type,
        "name": page.title,
        "description": page.description,
        "url": canonical,
    })
    .to_string()
    .replace("</", "<\\/");

    let title = escape_html(&full_title);
    let description = escape_html(&page.description);
    let canonical = escape_html(&canonical);
    let heading = escape_html(&page.title);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<meta name="description" content="{description}">
<link rel="canonical" href="{canonical}">
<meta property="og:title" content="{title}">
<meta property="og:description" content="{description}">
<meta property="og:url" content="{canonical}">
<meta property="og:type" content="{og_type}">
<meta property="og:site_name" content="{site_name}">
<meta name="twitter:card" content="summary">
<script type="application/ld+json">{json_ld}</script>
</head>
<body>
<div id="root"></div>
<noscript>
<h1>{heading}</h1>
<p>{description}</p>
</noscript>
</body>
</html>
"#,
        og_type = page.og_type,
        site_name = SITE_NAME,
    )
}

/// `/` maps to `index.html`; every other route to `<route>/index.html`.
pub fn output_path(out_dir: &Path, route: &str) -> PathBuf {
    let trimmed = route.trim_matches('/');
    if trimmed.is_empty() {
        out_dir.join("index.html")
    } else {
        out_dir.join(trimmed).join("index.html")
    }
}

/// Write every fixed page under `out_dir`, returning the files written.
pub fn generate(out_dir: &Path, site_url: &str) -> io::Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for page in fixed_pages() {
        let path = output_path(out_dir, &page.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, render_shell(&page, site_url))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"Ledger & Co <"CPAs">"#),
            "Ledger &amp; Co &lt;&quot;CPAs&quot;&gt;"
        );
    }

    #[test]
    fn test_shell_contains_metadata() {
        let page = StaticPage::new("/accounting-firms/ledger-co-cpas", "Ledger & Co", "Fees & services", "website", "AccountingService");
        let html = render_shell(&page, "https://directory.example/");

        assert!(html.contains("<title>Ledger &amp; Co | Advisor Directory</title>"));
        assert!(html.contains(r#"<link rel="canonical" href="https://directory.example/accounting-firms/ledger-co-cpas">"#));
        assert!(html.contains(r#"<meta property="og:type" content="website">"#));
        assert!(html.contains(r#""@type":"AccountingService""#));
        assert!(html.contains("<noscript>"));
    }

    #[test]
    fn test_json_ld_cannot_close_script() {
        let page = StaticPage::new("/", "</script><b>", "x", "website", "WebSite");
        let html = render_shell(&page, "https://directory.example");
        assert_eq!(html.matches("</script>").count(), 1);
    }

    #[test]
    fn test_fixed_pages_cover_examples() {
        let pages = fixed_pages();
        let paths: Vec<&str> = pages.iter().map(|p| p.path.as_str()).collect();
        assert!(paths.contains(&"/"));
        assert!(paths.contains(&"/advisors/jane-doe"));
        assert!(paths.contains(&"/blog/choosing-a-fee-only-advisor"));
        assert_eq!(paths.iter().filter(|p| p.starts_with("/advisors/")).count(), 4);
    }

    #[test]
    fn test_generate_writes_index_files() {
        let dir = std::env::temp_dir().join(format!("static-pages-{}", uuid::Uuid::new_v4()));
        let written = generate(&dir, "https://directory.example").unwrap();

        assert_eq!(written.len(), fixed_pages().len());
        assert!(dir.join("index.html").exists());
        assert!(dir.join("investment-firms/horizon-wealth-group/index.html").exists());
        fs::remove_dir_all(dir).ok();
    }
}
