//! Prompt Builder System
//!
//! Standardized prompt construction for every content request.
//!
//! ## Design Principles
//!
//! 1. **Role Definition**: Who is writing and for which brand
//! 2. **Structured Objectives**: Numbered goals
//! 3. **Context Sections**: Market signals and topic, in insertion order
//! 4. **Brand Rules**: Voice and banned phrases
//! 5. **Output Format**: Exact JSON or markdown shape

mod templates;

pub use templates::PromptTemplates;

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    Role { expertise: String, task: String },
    Objectives(Vec<String>),
    /// Ordered key-value pairs
    Context(Vec<(String, String)>),
    Text {
        header: Option<String>,
        content: String,
    },
    /// Rules the output must obey
    Rules(Vec<String>),
    /// Required output shape
    Output { format: String, example: String },
}

#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    pub fn objectives<S: AsRef<str>>(mut self, objectives: &[S]) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.iter().map(|o| o.as_ref().to_string()).collect(),
        ));
        self
    }

    /// Add a context item, merging into the existing context section
    pub fn context_item(mut self, key: &str, value: &str) -> Self {
        let item = (key.to_string(), value.to_string());
        match self
            .sections
            .iter_mut()
            .find_map(|s| match s {
                PromptSection::Context(items) => Some(items),
                _ => None,
            }) {
            Some(items) => items.push(item),
            None => self.sections.push(PromptSection::Context(vec![item])),
        }
        self
    }

    /// Add text section with header; empty content is skipped
    pub fn section(mut self, header: &str, content: &str) -> Self {
        if !content.trim().is_empty() {
            self.sections.push(PromptSection::Text {
                header: Some(header.to_string()),
                content: content.trim_end().to_string(),
            });
        }
        self
    }

    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    pub fn rules<S: AsRef<str>>(mut self, rules: &[S]) -> Self {
        self.sections.push(PromptSection::Rules(
            rules.iter().map(|r| r.as_ref().to_string()).collect(),
        ));
        self
    }

    pub fn output(mut self, format: &str, example: &str) -> Self {
        self.sections.push(PromptSection::Output {
            format: format.to_string(),
            example: example.to_string(),
        });
        self
    }

    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str("<ROLE>\n");
                    prompt.push_str(&format!(
                        "You are an expert {} working on {}.\n",
                        expertise, task
                    ));
                    prompt.push_str("</ROLE>\n\n");
                }
                PromptSection::Objectives(objectives) => {
                    prompt.push_str("<OBJECTIVES>\n");
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push_str("</OBJECTIVES>\n\n");
                }
                PromptSection::Context(items) => {
                    prompt.push_str("# Context\n\n");
                    for (key, value) in items {
                        prompt.push_str(&format!("**{}**: {}\n", key, value));
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("# {}\n\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Rules(rules) => {
                    prompt.push_str("<RULES>\n");
                    for rule in rules {
                        prompt.push_str(&format!("- {}\n", rule));
                    }
                    prompt.push_str("</RULES>\n\n");
                }
                PromptSection::Output { format, example } => {
                    prompt.push_str(&format!("# Output\n\nRespond ONLY with {}.\n", format));
                    if !example.is_empty() {
                        prompt.push_str("Example:\n");
                        prompt.push_str(&example);
                        prompt.push('\n');
                    }
                    prompt.push('\n');
                }
            }
        }

        prompt.trim_end().to_string()
    }
}
