//! Templates command - List templates in a template directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use doctk_render::{DirectoryTemplates, TemplateSource};

#[derive(Args)]
pub struct TemplatesArgs {
    /// Template directory
    #[arg(short, long, env = "DOCTK_TEMPLATES")]
    pub templates: PathBuf,
}

pub fn execute(args: TemplatesArgs) -> Result<()> {
    info!("Listing templates in {:?}", args.templates);

    if !args.templates.is_dir() {
        anyhow::bail!(
            "Invalid argument --templates: directory not found: {:?}",
            args.templates
        );
    }

    let names = DirectoryTemplates::new(args.templates.clone())
        .list()
        .context("Failed to list templates")?;

    if names.is_empty() {
        println!("⚠️  No templates found in {}", args.templates.display());
        return Ok(());
    }

    println!("📄 {} template(s):", names.len());
    for name in &names {
        println!("   {}", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_directory_is_an_argument_error() {
        let err = execute(TemplatesArgs {
            templates: PathBuf::from("/nonexistent/doctk/templates"),
        })
        .unwrap_err();
        assert!(err.to_string().contains("Invalid argument"));
    }

    #[test]
    fn test_lists_existing_directory() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("Page.Template.htm"), "page").unwrap();
        assert!(execute(TemplatesArgs {
            templates: temp.path().to_path_buf(),
        })
        .is_ok());
    }
}
