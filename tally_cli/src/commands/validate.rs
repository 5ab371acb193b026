use crate::ui;
use anyhow::Result;
use std::path::PathBuf;
use tally_scopes::parse_scope_from_file;

pub async fn execute(scope_file: PathBuf) -> Result<()> {
    ui::section("Validating Scope");
    ui::field("File", scope_file.display());
    println!();

    match parse_scope_from_file(&scope_file).await {
        Ok(scope) => {
            ui::outcome(true, "Scope is valid!");
            println!();
            ui::scope_details(&scope);

            Ok(())
        }
        Err(e) => {
            ui::outcome(false, "Scope is invalid!");
            ui::field("Error", &e);
            Err(e)
        }
    }
}
