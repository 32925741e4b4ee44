use manga_sources::{sources, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let name = std::env::args().nth(1).unwrap_or_else(|| "manganelo".to_string());
    let source = sources::by_name(&name).ok_or_else(|| format!("unknown source: {}", name))?;
    let client = Config::load().client_for(source.as_ref())?;

    println!("=== Browsing {} ===\n", source.name());

    let popular = source.fetch_popular_manga(&client, 1).await?;
    println!("✓ Popular: {} manga (next page: {})\n", popular.mangas.len(), popular.has_next_page);

    let Some(first) = popular.mangas.first() else {
        return Ok(());
    };

    let details = source.fetch_manga_details(&client, first).await?;
    println!("{}\n", serde_json::to_string_pretty(&details)?);

    match source.fetch_chapter_list(&client, &details).await {
        Ok(chapters) => {
            println!("  ✓ Chapters: {}", chapters.len());
            if let Some(latest) = chapters.first() {
                println!("    Latest: {} ({})", latest.name, latest.url);
                let pages = source.fetch_page_list(&client, latest).await?;
                println!("    Pages: {}", pages.len());
            }
        }
        Err(e) => println!("  ✗ Error: {}", e),
    }

    Ok(())
}
