use std::env;
use std::path::PathBuf;

use advisor_directory::services::static_pages;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <out_dir>", args[0]);
        eprintln!("Example: {} dist", args[0]);
        std::process::exit(1);
    }

    dotenvy::dotenv().ok();
    let site_url = env::var("SITE_URL")
        .or_else(|_| env::var("PUBLIC_BASE_URL"))
        .unwrap_or_else(|_| "http://localhost:3000".to_string());

    let out_dir = PathBuf::from(&args[1]);
    let written = static_pages::generate(&out_dir, &site_url)?;

    for path in &written {
        println!("  wrote {}", path.display());
    }
    println!("Generated {} pages under {} for {}", written.len(), out_dir.display(), site_url);
    Ok(())
}
