//! Slot-based LaTeX template.
//!
//! A template is plain LaTeX with two additions:
//!
//! - `<<slot>>` placeholders, replaced by the slot's rendered fragment;
//! - `%% begin:slot` / `%% end:slot` marker lines around an anchor block
//!   (section heading plus list wrapper). The block is emitted only when its
//!   slot has content, and the marker lines never reach the output.
//!
//! Templates are parsed once, so a typo in a slot name or an unbalanced block
//! surfaces at startup instead of as a dangling placeholder in a PDF.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Named regions of the résumé template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Name,
    Contact,
    Summary,
    Skills,
    Experience,
    Education,
    Awards,
    Certifications,
    Publications,
}

impl Slot {
    pub const ALL: [Slot; 9] = [
        Slot::Name,
        Slot::Contact,
        Slot::Summary,
        Slot::Skills,
        Slot::Experience,
        Slot::Education,
        Slot::Awards,
        Slot::Certifications,
        Slot::Publications,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Name => "name",
            Slot::Contact => "contact",
            Slot::Summary => "summary",
            Slot::Skills => "skills",
            Slot::Experience => "experience",
            Slot::Education => "education",
            Slot::Awards => "awards",
            Slot::Certifications => "certifications",
            Slot::Publications => "publications",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.as_str() == name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("line {line}: unknown slot '{name}'")]
    UnknownSlot { line: usize, name: String },

    #[error("line {line}: end of block '{found}' while block '{open}' is open")]
    MismatchedEnd {
        line: usize,
        open: String,
        found: String,
    },

    #[error("line {line}: end of block '{name}' without a matching begin")]
    UnexpectedEnd { line: usize, name: String },

    #[error("block '{name}' opened on line {line} is never closed")]
    Unclosed { line: usize, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Placeholder(Slot),
    Block { slot: Slot, body: Vec<Node> },
}

enum Marker<'a> {
    Begin(&'a str),
    End(&'a str),
}

/// Rendered fragments keyed by slot. Blank fragments count as absent.
#[derive(Debug, Default, Clone)]
pub struct SlotValues(HashMap<Slot, String>);

impl SlotValues {
    pub fn set(&mut self, slot: Slot, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            self.0.remove(&slot);
        } else {
            self.0.insert(slot, value);
        }
    }

    pub fn get(&self, slot: Slot) -> Option<&str> {
        self.0.get(&slot).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A parsed résumé template.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    nodes: Vec<Node>,
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<<([a-z_]+)>>").expect("valid placeholder regex"))
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        // Stack of open blocks: (slot, opening line, collected body).
        let mut stack: Vec<(Slot, usize, Vec<Node>)> = Vec::new();
        let mut root: Vec<Node> = Vec::new();

        for (idx, line) in source.split_inclusive('\n').enumerate() {
            let line_no = idx + 1;

            match parse_marker(line) {
                Some(Marker::Begin(name)) => {
                    let slot = lookup(name, line_no)?;
                    stack.push((slot, line_no, Vec::new()));
                }
                Some(Marker::End(name)) => {
                    let slot = lookup(name, line_no)?;
                    let (open, _, body) = stack.pop().ok_or_else(|| TemplateError::UnexpectedEnd {
                        line: line_no,
                        name: name.to_string(),
                    })?;
                    if open != slot {
                        return Err(TemplateError::MismatchedEnd {
                            line: line_no,
                            open: open.as_str().to_string(),
                            found: name.to_string(),
                        });
                    }
                    let target = stack.last_mut().map(|(_, _, b)| b).unwrap_or(&mut root);
                    target.push(Node::Block { slot, body });
                }
                None => {
                    let target = stack.last_mut().map(|(_, _, b)| b).unwrap_or(&mut root);
                    push_line(target, line, line_no)?;
                }
            }
        }

        if let Some((slot, line, _)) = stack.pop() {
            return Err(TemplateError::Unclosed {
                line,
                name: slot.as_str().to_string(),
            });
        }

        Ok(Self {
            source: source.to_string(),
            nodes: root,
        })
    }

    /// The raw template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitutes every placeholder and drops blocks whose slot is absent.
    pub fn fill(&self, values: &SlotValues) -> String {
        let mut out = String::with_capacity(self.source.len() * 2);
        fill_nodes(&self.nodes, values, &mut out);
        out
    }
}

fn parse_marker(line: &str) -> Option<Marker<'_>> {
    let rest = line.trim().strip_prefix("%%")?.trim_start();
    if let Some(name) = rest.strip_prefix("begin:") {
        Some(Marker::Begin(name.trim()))
    } else {
        rest.strip_prefix("end:").map(|name| Marker::End(name.trim()))
    }
}

fn lookup(name: &str, line: usize) -> Result<Slot, TemplateError> {
    Slot::from_name(name).ok_or_else(|| TemplateError::UnknownSlot {
        line,
        name: name.to_string(),
    })
}

fn push_line(target: &mut Vec<Node>, line: &str, line_no: usize) -> Result<(), TemplateError> {
    let mut last = 0;
    for caps in placeholder_re().captures_iter(line) {
        let whole = caps.get(0).expect("capture 0 always present");
        let slot = lookup(&caps[1], line_no)?;
        push_text(target, &line[last..whole.start()]);
        target.push(Node::Placeholder(slot));
        last = whole.end();
    }
    push_text(target, &line[last..]);
    Ok(())
}

fn push_text(target: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text(prev)) = target.last_mut() {
        prev.push_str(text);
    } else {
        target.push(Node::Text(text.to_string()));
    }
}

fn fill_nodes(nodes: &[Node], values: &SlotValues, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Placeholder(slot) => out.push_str(values.get(*slot).unwrap_or_default()),
            Node::Block { slot, body } => {
                if values.get(*slot).is_some() {
                    fill_nodes(body, values, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "\\begin{document}\n\
%% begin:summary\n\
\\section{Summary}\n\
<<summary>>\n\
%% end:summary\n\
%% begin:skills\n\
\\section{Skills}\n\
\\begin{itemize}\n\
<<skills>>\\end{itemize}\n\
%% end:skills\n\
\\end{document}\n";

    #[test]
    fn test_fill_present_and_absent_blocks() {
        let template = Template::parse(SMALL).unwrap();
        let mut values = SlotValues::default();
        values.set(Slot::Summary, "Builds things.");
        let out = template.fill(&values);
        assert_eq!(
            out,
            "\\begin{document}\n\\section{Summary}\nBuilds things.\n\\end{document}\n"
        );
    }

    #[test]
    fn test_blank_value_counts_as_absent() {
        let template = Template::parse(SMALL).unwrap();
        let mut values = SlotValues::default();
        values.set(Slot::Summary, "   \n");
        assert!(values.is_empty());
        assert_eq!(template.fill(&values), "\\begin{document}\n\\end{document}\n");
    }

    #[test]
    fn test_no_markers_or_placeholders_leak() {
        let template = Template::parse(SMALL).unwrap();
        let mut values = SlotValues::default();
        values.set(Slot::Summary, "S");
        values.set(Slot::Skills, "  \\item Rust\n");
        let out = template.fill(&values);
        assert!(!out.contains("<<"));
        assert!(!out.contains("%% begin"));
        assert!(!out.contains("%% end"));
        assert!(out.contains("\\item Rust"));
    }

    #[test]
    fn test_unknown_slot_rejected() {
        let err = Template::parse("hello <<nickname>>\n").unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnknownSlot {
                line: 1,
                name: "nickname".to_string()
            }
        );
    }

    #[test]
    fn test_unbalanced_blocks_rejected() {
        assert!(matches!(
            Template::parse("%% begin:skills\nx\n").unwrap_err(),
            TemplateError::Unclosed { line: 1, .. }
        ));
        assert!(matches!(
            Template::parse("x\n%% end:skills\n").unwrap_err(),
            TemplateError::UnexpectedEnd { line: 2, .. }
        ));
        assert!(matches!(
            Template::parse("%% begin:skills\n%% end:awards\n").unwrap_err(),
            TemplateError::MismatchedEnd { line: 2, .. }
        ));
    }

    #[test]
    fn test_ordinary_latex_comments_are_text() {
        let template = Template::parse("% Experience\n%% note to self\n").unwrap();
        assert_eq!(
            template.fill(&SlotValues::default()),
            "% Experience\n%% note to self\n"
        );
    }

    #[test]
    fn test_nested_blocks() {
        let src = "%% begin:contact\nA\n%% begin:name\n<<name>>\n%% end:name\n%% end:contact\n";
        let template = Template::parse(src).unwrap();
        let mut values = SlotValues::default();
        values.set(Slot::Contact, "c");
        assert_eq!(template.fill(&values), "A\n");
        values.set(Slot::Name, "N");
        assert_eq!(template.fill(&values), "A\nN\n");
    }

    #[test]
    fn test_slot_names_round_trip() {
        for slot in Slot::ALL {
            assert_eq!(Slot::from_name(slot.as_str()), Some(slot));
        }
    }
}
