//! Hover command - print the documentation of the property under the cursor

use super::{Sources, read};
use anyhow::{Context, Result};
use bootprops_editor::YamlEditor;
use std::path::Path;

pub fn execute(sources: &Sources, input: &Path, offset: usize, links: bool) -> Result<()> {
    let loaded = sources.load()?;
    let text = read(input)?;
    let editor =
        YamlEditor::new(&loaded.index, &loaded.types).with_settings(&loaded.settings);

    let info = editor
        .hover(&text, offset)
        .with_context(|| format!("Cannot hover {} at {offset}", input.display()))?;
    let Some(info) = info else {
        tracing::info!(offset, "no property at offset");
        return Ok(());
    };

    println!("{}", info.path);
    println!("{}", info.html);
    if links {
        for target in editor.link_targets(&text, offset)? {
            println!("-> {target}");
        }
    }
    Ok(())
}
