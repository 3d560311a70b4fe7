//! Modeling lints.
//!
//! The [`Linter`] walks every slice of a parsed [`Document`] and reports
//! advisory [`Issue`]s about step sequences that are valid but probably not
//! what the author meant. Lints never fail parsing.

use std::{collections::HashSet, fmt};

use log::debug;

use emlang_core::{Document, Element, ElementType, Slice};
use emlang_parser::error::Severity;

/// A lint rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// A command not followed by an event or exception before the next
    /// command.
    CommandWithoutEvent,
    /// An exception with no command before it in the slice.
    OrphanException,
    /// A slice with steps but no event.
    SliceMissingEvent,
}

impl Rule {
    /// All rules, in reporting order.
    pub const ALL: [Rule; 3] = [
        Rule::CommandWithoutEvent,
        Rule::OrphanException,
        Rule::SliceMissingEvent,
    ];

    /// The rule name used in output and in ignore lists.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::CommandWithoutEvent => "command-without-event",
            Rule::OrphanException => "orphan-exception",
            Rule::SliceMissingEvent => "slice-missing-event",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single lint finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    rule: Rule,
    message: String,
    line: usize,
    column: usize,
    severity: Severity,
}

impl Issue {
    fn warning(rule: Rule, message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            rule,
            message: message.into(),
            line,
            column,
            severity: Severity::Warning,
        }
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// 1-based line, or 0 for slice-level issues.
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column, or 0 for slice-level issues.
    pub fn column(&self) -> usize {
        self.column
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {} ({})",
            self.line, self.column, self.severity, self.message, self.rule
        )
    }
}

/// Runs the lint rules over a document.
#[derive(Debug, Clone, Default)]
pub struct Linter {
    ignored: HashSet<String>,
}

impl Linter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress every issue of the named rule.
    ///
    /// Names that match no rule are accepted and have no effect.
    pub fn ignore(mut self, rule: impl Into<String>) -> Self {
        self.ignored.insert(rule.into());
        self
    }

    /// Returns `true` if the rule is suppressed.
    pub fn is_ignored(&self, rule: Rule) -> bool {
        self.ignored.contains(rule.as_str())
    }

    /// Lint every slice of every sub-document, in source order.
    pub fn lint(&self, document: &Document) -> Vec<Issue> {
        let issues: Vec<Issue> = document
            .sub_docs()
            .iter()
            .flat_map(|sub_doc| sub_doc.slices())
            .flat_map(lint_slice)
            .filter(|issue| !self.is_ignored(issue.rule))
            .collect();

        debug!(issues = issues.len(); "Lint completed");
        issues
    }
}

fn lint_slice(slice: &Slice) -> Vec<Issue> {
    let elements = slice.elements();
    let mut issues = Vec::new();
    if elements.is_empty() {
        return issues;
    }

    let mut seen_command = false;
    for (index, element) in elements.iter().enumerate() {
        match element.element_type() {
            ElementType::Command => {
                seen_command = true;
                if !followed_by_outcome(&elements[index + 1..]) {
                    issues.push(Issue::warning(
                        Rule::CommandWithoutEvent,
                        "command should be followed by an event or exception",
                        element.line(),
                        element.column(),
                    ));
                }
            }
            ElementType::Exception if !seen_command => {
                issues.push(Issue::warning(
                    Rule::OrphanException,
                    "exception without preceding command",
                    element.line(),
                    element.column(),
                ));
            }
            _ => {}
        }
    }

    let has_event = elements
        .iter()
        .any(|element| element.element_type() == ElementType::Event);
    if !has_event {
        issues.push(Issue::warning(
            Rule::SliceMissingEvent,
            format!("slice \"{}\" has no events", slice.name()),
            0,
            0,
        ));
    }
    issues
}

/// Whether an event or exception comes before the next command.
fn followed_by_outcome(rest: &[Element]) -> bool {
    rest.iter()
        .map(Element::element_type)
        .find(|element_type| {
            matches!(
                element_type,
                ElementType::Event | ElementType::Exception | ElementType::Command
            )
        })
        .is_some_and(|element_type| element_type != ElementType::Command)
}
