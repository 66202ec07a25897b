//! Editing rules for Kotlin sources: brace indentation, identifier words and
//! KDoc comment continuation.

use kide_types::{
    EnterAction, Host, IndentAction, IndentationRules, KOTLIN_LANGUAGE_ID, LanguageConfiguration,
    OnEnterRule,
};

const DECREASE_INDENT: &str = r"^(.*\*/)?\s*\}.*$";
const INCREASE_INDENT: &str = r#"^.*\{[^}"']*$"#;
const WORD: &str = r#"(-?\d*\.\d\w*)|([^`~!@#%^&*()\-=+\[{\]}\\|;:'",.<>/?\s]+)"#;

const KDOC_OPEN: &str = r"^\s*/\*\*([^*/]([^*]|\*[^/])*)?$";
const KDOC_CLOSE_AFTER: &str = r"^\s*\*/$";
const KDOC_LINE: &str = r"^(\t|  )* \*( ([^*]|\*[^/])*)?$";
const KDOC_END: &str = r"^(\t|  )* \*/\s*$";
const KDOC_END_AFTER_TEXT: &str = r"^(\t|  )* \*[^/]*\*/\s*$";

#[must_use]
pub fn kotlin_language_configuration() -> LanguageConfiguration {
    LanguageConfiguration {
        indentation_rules: IndentationRules {
            decrease_indent_pattern: DECREASE_INDENT,
            increase_indent_pattern: INCREASE_INDENT,
        },
        word_pattern: WORD,
        on_enter_rules: vec![
            // `/** | */`
            OnEnterRule {
                before_text: KDOC_OPEN,
                after_text: Some(KDOC_CLOSE_AFTER),
                action: EnterAction::append(IndentAction::IndentOutdent, " * "),
            },
            // `/** |`
            OnEnterRule {
                before_text: KDOC_OPEN,
                after_text: None,
                action: EnterAction::append(IndentAction::None, " * "),
            },
            // ` * |`
            OnEnterRule {
                before_text: KDOC_LINE,
                after_text: None,
                action: EnterAction::append(IndentAction::None, "* "),
            },
            // ` */|`
            OnEnterRule {
                before_text: KDOC_END,
                after_text: None,
                action: EnterAction::remove(IndentAction::None, 1),
            },
            // ` * text */|`
            OnEnterRule {
                before_text: KDOC_END_AFTER_TEXT,
                after_text: None,
                action: EnterAction::remove(IndentAction::None, 1),
            },
        ],
    }
}

/// Register the Kotlin editing rules with the host.
pub fn configure_language(host: &dyn Host) {
    host.set_language_configuration(KOTLIN_LANGUAGE_ID, kotlin_language_configuration());
}
