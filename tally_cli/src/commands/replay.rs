use crate::ui;
use anyhow::Result;
use std::path::PathBuf;
use tally_scopes::{parse_scope_from_file, ScopeRunner};

pub async fn execute(scope_file: PathBuf, observations: PathBuf) -> Result<()> {
    ui::section("Replay Observations");

    let scope = parse_scope_from_file(&scope_file).await?;
    ui::field("Scope", &scope.app_name);
    ui::field("Publisher", scope.publisher.kind());
    ui::field("Observations", observations.display());

    let runner = ScopeRunner::from_config(scope)?;
    let (recorded, published) = runner.replay_file(&observations).await?;

    println!();
    ui::outcome(
        true,
        &format!(
            "Recorded {} observations, published {} metrics",
            recorded, published
        ),
    );

    Ok(())
}
