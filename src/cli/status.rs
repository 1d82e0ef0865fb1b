//! `tally status`: health of every collaborator

use crate::app;

pub async fn run() -> anyhow::Result<()> {
    println!("🩺 Tally Status\n");

    let config = app::load_config()?;
    let app = app::build(&config).await?;

    let cache = app.cache.status().await;
    match &cache.primary {
        Some(name) if cache.fallback_engaged => {
            println!("⚠️  Session cache: {} unreachable, using in-process fallback", name)
        }
        Some(name) => println!("✅ Session cache: {}", name),
        None => println!("ℹ️  Session cache: in-process only (set TALLY_CACHE__REDIS_URL to share sessions)"),
    }
    println!("   Fallback entries: {}", cache.fallback_entries);

    match &app.sqlite {
        Some(store) => match store.health_check().await {
            Ok(()) => println!("✅ Records: SQLite"),
            Err(e) => println!("❌ Records: {}", e),
        },
        None => println!("⚠️  Records: in-memory (lost on exit)"),
    }

    println!("ℹ️  Text generation: {}", app.generator_name);
    Ok(())
}
