pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_profiles;
mod m20260301_000002_create_firms;
mod m20260301_000003_create_advisors;
mod m20260301_000004_create_blog;
mod m20260301_000005_create_meeting_requests;
mod m20260301_000006_create_newsletter_signups;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_profiles::Migration),
            Box::new(m20260301_000002_create_firms::Migration),
            Box::new(m20260301_000003_create_advisors::Migration),
            Box::new(m20260301_000004_create_blog::Migration),
            Box::new(m20260301_000005_create_meeting_requests::Migration),
            Box::new(m20260301_000006_create_newsletter_signups::Migration),
        ]
    }
}
