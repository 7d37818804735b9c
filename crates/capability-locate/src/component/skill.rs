//! `SKILL.md` descriptors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::frontmatter;

/// Optional frontmatter fields of a skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument_hint: Option<String>,
    /// Whether users may invoke the skill directly; defaults to `true`.
    pub user_invocable: bool,
    /// Hides the skill from automatic model invocation; defaults to `false`.
    pub disable_model_invocation: bool,
    /// Children of the nested `metadata:` object.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_metadata: BTreeMap<String, String>,
}

impl Default for SkillMetadata {
    fn default() -> Self {
        Self {
            license: None,
            allowed_tools: Vec::new(),
            version: None,
            author: None,
            model: None,
            argument_hint: None,
            user_invocable: true,
            disable_model_invocation: false,
            custom_metadata: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SkillDescriptor {
    pub name: String,
    pub description: String,
    pub metadata: SkillMetadata,
}

/// Parses `SKILL.md` content. `fallback_name` is usually the directory name.
#[must_use]
pub fn parse_skill_descriptor(content: &str, fallback_name: &str) -> SkillDescriptor {
    let doc = frontmatter::parse(content, fallback_name);
    let fm = &doc.frontmatter;
    let text = |key: &str| fm.get(key).map(str::to_string);

    let metadata = SkillMetadata {
        license: text("license"),
        allowed_tools: fm.list("allowed-tools"),
        version: text("version"),
        author: text("author"),
        model: text("model"),
        argument_hint: text("argument-hint"),
        user_invocable: fm.bool("user-invocable").unwrap_or(true),
        disable_model_invocation: fm.bool("disable-model-invocation").unwrap_or(false),
        custom_metadata: fm.object("metadata").cloned().unwrap_or_default(),
    };

    SkillDescriptor {
        name: doc.name,
        description: doc.description,
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_skill() {
        let content = "---\nname: test-skill\ndescription: A test skill\n---\n\n# Body\n";
        let skill = parse_skill_descriptor(content, "dir-name");
        assert_eq!(skill.name, "test-skill");
        assert_eq!(skill.description, "A test skill");
        assert_eq!(skill.metadata, SkillMetadata::default());
    }

    #[test]
    fn name_falls_back_to_directory() {
        let skill = parse_skill_descriptor("Just some instructions.\n", "my-skill");
        assert_eq!(skill.name, "my-skill");
        assert_eq!(skill.description, "Just some instructions.");
    }

    #[test]
    fn nested_metadata_becomes_custom_metadata() {
        let content = "---\nname: s\nmetadata:\n  author: X\n  version: \"1.0\"\n---\n";
        let skill = parse_skill_descriptor(content, "s");
        let expected = BTreeMap::from([
            ("author".to_string(), "X".to_string()),
            ("version".to_string(), "1.0".to_string()),
        ]);
        assert_eq!(skill.metadata.custom_metadata, expected);
        assert_eq!(skill.metadata.author, None);
    }

    #[test]
    fn optional_fields() {
        let content = "---
name: deploy
description: Ship it
license: MIT
allowed-tools: [Bash, Read]
argument-hint: <env>
user-invocable: no
disable-model-invocation: yes
model: opus
---
";
        let meta = parse_skill_descriptor(content, "deploy").metadata;
        assert_eq!(meta.license.as_deref(), Some("MIT"));
        assert_eq!(meta.allowed_tools, vec!["Bash", "Read"]);
        assert_eq!(meta.argument_hint.as_deref(), Some("<env>"));
        assert!(!meta.user_invocable);
        assert!(meta.disable_model_invocation);
        assert_eq!(meta.model.as_deref(), Some("opus"));
    }

    #[test]
    fn allowed_tools_block_sequence() {
        let content = "---\nname: s\nallowed-tools:\n  - Read\n  - Grep\n---\n";
        let meta = parse_skill_descriptor(content, "s").metadata;
        assert_eq!(meta.allowed_tools, vec!["Read", "Grep"]);
    }

    #[test]
    fn unrecognised_bool_uses_default() {
        let content = "---\nuser-invocable: maybe\n---\n";
        assert!(parse_skill_descriptor(content, "s").metadata.user_invocable);
    }
}
