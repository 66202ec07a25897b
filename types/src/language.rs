//! Static editing rules a host applies to a language.
//!
//! Patterns are regular expressions in the `regex` crate dialect (no
//! look-around), so a host can compile them directly.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageConfiguration {
    pub indentation_rules: IndentationRules,
    pub word_pattern: &'static str,
    pub on_enter_rules: Vec<OnEnterRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndentationRules {
    /// A line matching this pattern dedents itself.
    pub decrease_indent_pattern: &'static str,
    /// The line after one matching this pattern is indented.
    pub increase_indent_pattern: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnEnterRule {
    pub before_text: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_text: Option<&'static str>,
    pub action: EnterAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterAction {
    pub indent_action: IndentAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append_text: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_text: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IndentAction {
    /// Keep the current indentation.
    None,
    /// Indent the new line relative to the previous one.
    Indent,
    /// Insert two lines: the first indented, the second at the original level.
    IndentOutdent,
    /// Outdent the new line.
    Outdent,
}

impl EnterAction {
    #[must_use]
    pub const fn append(indent_action: IndentAction, text: &'static str) -> Self {
        Self {
            indent_action,
            append_text: Some(text),
            remove_text: None,
        }
    }

    #[must_use]
    pub const fn remove(indent_action: IndentAction, count: u32) -> Self {
        Self {
            indent_action,
            append_text: None,
            remove_text: Some(count),
        }
    }
}
