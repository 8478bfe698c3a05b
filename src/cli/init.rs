use std::path::Path;

use colored::Colorize;
use tracing::info;

use crate::catalog::DEFAULT_CATEGORIES;
use crate::categorizer::DEFAULT_RULES;
use crate::cli::Context;
use crate::cursor::CursorStore;
use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{save_settings, settings_path};

pub fn run(ctx: &Context, data_dir_flag: bool) -> Result<()> {
    let root = ctx.paths.root();
    std::fs::create_dir_all(root)?;

    // Remember an explicit directory so later commands find it without the flag.
    if data_dir_flag || !settings_path().exists() {
        let mut settings = ctx.settings.clone();
        settings.data_dir = root.to_string_lossy().to_string();
        save_settings(&settings)?;
    }

    let conn = get_connection(&ctx.paths.database())?;
    init_db(&conn)?;
    CursorStore::new(ctx.paths.cursors()).init()?;

    let categories = serde_json::to_string_pretty(DEFAULT_CATEGORIES)?;
    write_if_missing(&ctx.paths.categories(), &format!("{categories}\n"))?;
    write_if_missing(&ctx.paths.rules(), DEFAULT_RULES)?;

    info!(path = %root.display(), "data directory ready");
    println!("{}", format!("Initialized tally at {}", root.display()).green());
    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        info!(path = %path.display(), "keeping existing file");
        return Ok(());
    }
    std::fs::write(path, content)?;
    Ok(())
}
