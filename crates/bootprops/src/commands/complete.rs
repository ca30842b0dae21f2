//! Complete command - list the proposals offered at a cursor offset

use super::{Sources, read};
use anyhow::{Context, Result};
use bootprops_editor::{CompletionProposal, YamlEditor};
use std::io::Write;
use std::path::Path;

pub fn execute(sources: &Sources, input: &Path, offset: usize, json: bool) -> Result<()> {
    let loaded = sources.load()?;
    let text = read(input)?;
    let editor =
        YamlEditor::new(&loaded.index, &loaded.types).with_settings(&loaded.settings);

    let proposals = editor
        .complete(&text, offset)
        .with_context(|| format!("Cannot complete {} at {offset}", input.display()))?;
    tracing::debug!(count = proposals.len(), offset, "computed completions");

    let mut stdout = std::io::stdout().lock();
    for proposal in &proposals {
        if json {
            writeln!(stdout, "{}", serde_json::to_string(proposal)?)?;
        } else {
            writeln!(stdout, "{}", summary(proposal))?;
        }
    }
    Ok(())
}

/// `label  type  replacement` with the replacement's newlines escaped.
fn summary(proposal: &CompletionProposal) -> String {
    format!(
        "{:<40} {:<30} {:?}",
        proposal.label,
        proposal.type_name.as_deref().unwrap_or("-"),
        proposal.replacement()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootprops_metadata::{EmptyCatalog, MetadataIndex, PropertyMetadata};

    #[test]
    fn test_summary() {
        let index = MetadataIndex::new().with(PropertyMetadata::new(
            "server.port",
            "java.lang.Integer",
            "Server HTTP port.",
        ));
        let proposals = bootprops_editor::complete("port", 4, &index, &EmptyCatalog).unwrap();
        let line = summary(&proposals[0]);
        assert!(line.starts_with("server.port "));
        assert!(line.contains("java.lang.Integer"));
        assert!(line.ends_with("\"server:\\n  port: \""));
    }
}
