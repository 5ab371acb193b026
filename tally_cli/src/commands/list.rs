use crate::ui;
use anyhow::Result;
use tally_scopes::PublisherConfig;

pub async fn execute() -> Result<()> {
    ui::section("Available Publishers");
    println!();

    for (kind, description) in PublisherConfig::KINDS {
        ui::publisher_kind(kind, description);
    }

    println!();
    ui::hint("Select one with `publisher.type` in a scope file");

    Ok(())
}
