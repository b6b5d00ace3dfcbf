use crate::generator::{FormFields, NEGATIVE_PROMPT_FIELD, PROMPT_FIELD};

const NEGATIVE_PROMPT_SEPARATOR: char = '|';

/// The `/img` argument text viewed as the two-field prompt form.
///
/// `sunset | blurry` fills both fields; without a `|` the negative prompt is
/// the empty string. Only one space on each side of the `|` belongs to the
/// separator, so `cat |   ` still carries a whitespace negative prompt. Both
/// fields always exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandForm {
    prompt: String,
    negative_prompt: String,
}

impl CommandForm {
    pub fn parse(text: &str) -> Self {
        let (prompt, negative_prompt) = match text.split_once(NEGATIVE_PROMPT_SEPARATOR) {
            Some((prompt, negative_prompt)) => (
                prompt.strip_suffix(' ').unwrap_or(prompt),
                negative_prompt
                    .strip_prefix(' ')
                    .unwrap_or(negative_prompt),
            ),
            None => (text, ""),
        };
        CommandForm {
            prompt: prompt.trim().to_string(),
            negative_prompt: negative_prompt.to_string(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn negative_prompt(&self) -> &str {
        &self.negative_prompt
    }
}

impl FormFields for CommandForm {
    fn field_value(&self, name: &str) -> Option<String> {
        match name {
            PROMPT_FIELD => Some(self.prompt.clone()),
            NEGATIVE_PROMPT_FIELD => Some(self.negative_prompt.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_only_leaves_negative_prompt_empty() {
        let form = CommandForm::parse("  a red fox ");
        assert_eq!(form.prompt(), "a red fox");
        assert_eq!(form.field_value(NEGATIVE_PROMPT_FIELD).as_deref(), Some(""));
    }

    #[test]
    fn splits_on_first_separator() {
        let form = CommandForm::parse("sunset | blurry | dark");
        assert_eq!(form.prompt(), "sunset");
        assert_eq!(form.negative_prompt(), "blurry | dark");
    }

    #[test]
    fn keeps_whitespace_negative_prompt_after_separator() {
        let form = CommandForm::parse("cat |   ");
        assert_eq!(form.prompt(), "cat");
        assert_eq!(form.negative_prompt(), "  ");
        assert_eq!(form.field_value(NEGATIVE_PROMPT_FIELD).as_deref(), Some("  "));
    }

    #[test]
    fn bare_separator_gives_empty_negative_prompt() {
        assert_eq!(CommandForm::parse("cat |").negative_prompt(), "");
        assert_eq!(CommandForm::parse("cat|blurry").negative_prompt(), "blurry");
    }

    #[test]
    fn empty_text_yields_empty_fields() {
        let form = CommandForm::parse("");
        assert_eq!(form, CommandForm::default());
        assert_eq!(form.field_value(PROMPT_FIELD).as_deref(), Some(""));
    }

    #[test]
    fn unknown_field_is_missing() {
        assert_eq!(CommandForm::parse("cat").field_value("seed"), None);
    }
}
