//! `SeaORM` Entity prelude

pub use super::accounting_firms::Entity as AccountingFirms;
pub use super::advisors::Entity as Advisors;
pub use super::blog_categories::Entity as BlogCategories;
pub use super::blog_post_categories::Entity as BlogPostCategories;
pub use super::blog_posts::Entity as BlogPosts;
pub use super::firm_features::Entity as FirmFeatures;
pub use super::firm_leaders::Entity as FirmLeaders;
pub use super::firm_registrations::Entity as FirmRegistrations;
pub use super::investment_firms::Entity as InvestmentFirms;
pub use super::meeting_requests::Entity as MeetingRequests;
pub use super::newsletter_signups::Entity as NewsletterSignups;
pub use super::password_resets::Entity as PasswordResets;
pub use super::profiles::Entity as Profiles;
pub use super::sessions::Entity as Sessions;
pub use super::similar_firms::Entity as SimilarFirms;
