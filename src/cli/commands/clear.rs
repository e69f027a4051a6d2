//! Clear command - remove all cached fragments

use crate::cache::CacheStore;
use crate::cli::args::ClearArgs;
use crate::config::Config;
use crate::error::CovcacheResult;
use crate::ui::{self, UiContext};

/// Execute the clear command
pub async fn execute(args: ClearArgs, config: &Config) -> CovcacheResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let store = CacheStore::new(&config.cache.dir);

    let prompt = format!("Remove all fragments in {}?", store.dir().display());
    if !ui::confirm(&ctx, &prompt, false).await? {
        ui::step_info(&ctx, "Nothing removed (use --yes to skip the prompt)");
        return Ok(());
    }

    let removed = store.clear().await?;
    ui::step_ok(&ctx, &format!("Removed {} fragment(s)", removed));
    Ok(())
}
