//! Agent profile descriptors (`agents/*.md`).

use crate::frontmatter;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct AgentDescriptor {
    pub name: String,
    pub description: String,
    /// `tools`, as an inline list, comma-separated string or block sequence.
    pub tools: Vec<String>,
    pub model: Option<String>,
    pub color: Option<String>,
}

/// Parses an agent markdown file. `fallback_name` is usually the file stem.
#[must_use]
pub fn parse_agent_descriptor(content: &str, fallback_name: &str) -> AgentDescriptor {
    let doc = frontmatter::parse(content, fallback_name);
    let fm = &doc.frontmatter;
    AgentDescriptor {
        tools: fm.list("tools"),
        model: fm.get("model").map(str::to_string),
        color: fm.get("color").map(str::to_string),
        name: doc.name,
        description: doc.description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_agent_with_tools() {
        let content = "---
name: code-reviewer
description: Reviews diffs for bugs
tools: Read, Grep, Glob
model: sonnet
color: \"blue\"
---

You review code.
";
        let agent = parse_agent_descriptor(content, "reviewer");
        assert_eq!(agent.name, "code-reviewer");
        assert_eq!(agent.description, "Reviews diffs for bugs");
        assert_eq!(agent.tools, vec!["Read", "Grep", "Glob"]);
        assert_eq!(agent.model.as_deref(), Some("sonnet"));
        assert_eq!(agent.color.as_deref(), Some("blue"));
    }

    #[test]
    fn agent_without_frontmatter() {
        let agent = parse_agent_descriptor("# Helper\n\nHelps with things.\n", "helper");
        assert_eq!(agent.name, "helper");
        assert_eq!(agent.description, "Helps with things.");
        assert!(agent.tools.is_empty());
        assert!(agent.model.is_none());
    }

    #[test]
    fn folded_description() {
        let content = "---\nname: a\ndescription: >\n  Line one\n  line two\n---\n";
        let agent = parse_agent_descriptor(content, "a");
        assert_eq!(agent.description, "Line one line two");
    }
}
