use std::env;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, Database, EntityTrait, IntoActiveModel, QueryFilter, Set};

use advisor_directory::config::Config;
use advisor_directory::entities::{prelude::*, profiles};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <email>", args[0]);
        std::process::exit(1);
    }
    let email = args[1].trim().to_lowercase();

    let config = Config::from_env()?;
    let db = Database::connect(&config.database_url).await?;

    let profile = Profiles::find()
        .filter(profiles::Column::Email.eq(email.as_str()))
        .one(&db)
        .await?
        .ok_or_else(|| format!("No account registered for {}", email))?;

    if profile.is_admin {
        println!("{} is already an admin", email);
        return Ok(());
    }

    let mut active = profile.into_active_model();
    active.is_admin = Set(true);
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(&db).await?;

    println!("Granted admin to {}", email);
    Ok(())
}
