//! Checksum command - print a directory's fingerprint

use crate::cache::checksum_dir;
use crate::cli::args::ChecksumArgs;
use crate::error::{CovcacheError, CovcacheResult};

/// Execute the checksum command
pub async fn execute(args: ChecksumArgs) -> CovcacheResult<()> {
    let dir = args.dir;
    let checksum = tokio::task::spawn_blocking(move || checksum_dir(&dir))
        .await
        .map_err(|e| CovcacheError::Internal(format!("checksum task failed: {e}")))??;

    println!("{}", checksum);
    Ok(())
}
