//! Agent profile scanners: `*.md` files directly inside `agents/`.

use std::path::Path;

use claude_locate::{ClaudeLayout, Scope};

use super::{Origin, file_stem, list_dir, read_logged};
use crate::component::parse_agent_descriptor;
use crate::resolve::ResolvedInstall;
use crate::types::AgentProfile;

fn is_markdown(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "md")
}

#[must_use]
pub fn scan_agents_dir(dir: &Path, origin: Origin<'_>) -> Vec<AgentProfile> {
    list_dir(dir, is_markdown)
        .into_iter()
        .filter_map(|file| {
            let content = read_logged(&file)?;
            let leaf = file_stem(&file);
            let descriptor = parse_agent_descriptor(&content, &leaf);
            Some(AgentProfile {
                id: origin.record_id(&leaf),
                name: descriptor.name,
                description: descriptor.description,
                source: origin.source(),
                is_enabled: origin.is_enabled(),
                provenance: origin.provenance(),
                path: file,
                tools: descriptor.tools,
                model: descriptor.model,
                color: descriptor.color,
            })
        })
        .collect()
}

#[must_use]
pub fn scan_global_agents(layout: &ClaudeLayout) -> Vec<AgentProfile> {
    scan_agents_dir(&layout.agents_dir(&Scope::Global), Origin::Global)
}

#[must_use]
pub fn scan_project_agents(layout: &ClaudeLayout, root: &Path) -> Vec<AgentProfile> {
    let dir = layout.agents_dir(&Scope::Project(root.to_path_buf()));
    scan_agents_dir(&dir, Origin::Project(root))
}

#[must_use]
pub fn scan_plugin_agents(installs: &[ResolvedInstall]) -> Vec<AgentProfile> {
    installs
        .iter()
        .flat_map(|install| scan_agents_dir(&install.install_path.join("agents"), Origin::Plugin(install)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn scans_markdown_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("reviewer.md"),
            "---\nname: code-reviewer\ntools: Read, Grep\n---\nReviews.\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("sub.md")).unwrap();

        let agents = scan_agents_dir(dir.path(), Origin::Global);
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].name, "code-reviewer");
        assert_eq!(agents[0].description, "Reviews.");
        assert_eq!(agents[0].tools, vec!["Read", "Grep"]);
        assert_eq!(agents[0].id.as_str(), "global:reviewer");
    }

    #[test]
    fn unreadable_agent_does_not_hide_siblings() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.md"), [0xff, 0xfe, 0x00]).unwrap();
        fs::write(dir.path().join("fine.md"), "---\nname: fine\n---\nOk.\n").unwrap();

        let agents = scan_agents_dir(dir.path(), Origin::Global);
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].name, "fine");
    }

    #[test]
    fn file_stem_is_fallback_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("helper.md"), "Helps.\n").unwrap();
        let agents = scan_agents_dir(dir.path(), Origin::Global);
        assert_eq!(agents[0].name, "helper");
    }
}
