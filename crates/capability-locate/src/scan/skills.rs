//! Skill scanners: child directories of `skills/` holding a `SKILL.md`.

use std::path::Path;

use claude_locate::{ClaudeLayout, Scope};

use super::{Origin, file_name, list_dir, read_logged};
use crate::component::parse_skill_descriptor;
use crate::resolve::ResolvedInstall;
use crate::types::Skill;

pub const SKILL_FILE: &str = "SKILL.md";

/// Scans one `skills/` directory.
#[must_use]
pub fn scan_skills_dir(dir: &Path, origin: Origin<'_>) -> Vec<Skill> {
    list_dir(dir, |path| path.join(SKILL_FILE).is_file())
        .into_iter()
        .filter_map(|skill_dir| {
            let content = read_logged(&skill_dir.join(SKILL_FILE))?;
            let leaf = file_name(&skill_dir);
            let descriptor = parse_skill_descriptor(&content, &leaf);
            Some(Skill {
                id: origin.record_id(&leaf),
                name: descriptor.name,
                description: descriptor.description,
                source: origin.source(),
                is_enabled: origin.is_enabled(),
                provenance: origin.provenance(),
                path: skill_dir,
                metadata: descriptor.metadata,
            })
        })
        .collect()
}

/// `<config>/skills/`
#[must_use]
pub fn scan_global_skills(layout: &ClaudeLayout) -> Vec<Skill> {
    scan_skills_dir(&layout.skills_dir(&Scope::Global), Origin::Global)
}

/// `<project>/.claude/skills/`
#[must_use]
pub fn scan_project_skills(layout: &ClaudeLayout, root: &Path) -> Vec<Skill> {
    let dir = layout.skills_dir(&Scope::Project(root.to_path_buf()));
    scan_skills_dir(&dir, Origin::Project(root))
}

/// `<installPath>/skills/` for every resolved install.
#[must_use]
pub fn scan_plugin_skills(installs: &[ResolvedInstall]) -> Vec<Skill> {
    installs
        .iter()
        .flat_map(|install| scan_skills_dir(&install.install_path.join("skills"), Origin::Plugin(install)))
        .collect()
}
