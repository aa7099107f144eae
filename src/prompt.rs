use crate::styles::StyleTemplate;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PromptError {
    #[error("Please provide a prompt for the 'Open' style.")]
    EmptyPrompt,
}

/// Merges the selected style with the user's text into the single
/// instruction sent to the generation service. Pure: identical inputs
/// always compose to the identical string.
pub fn compose_prompt(
    style: &StyleTemplate,
    freeform_text: &str,
    extra_instructions: &str,
) -> Result<String, PromptError> {
    if style.is_open() {
        let freeform = freeform_text.trim();
        if freeform.is_empty() {
            return Err(PromptError::EmptyPrompt);
        }
        return Ok(freeform.to_string());
    }

    let mut instruction = style.instruction.to_string();
    let extra = extra_instructions.trim();
    if !extra.is_empty() {
        instruction.push_str(". ");
        instruction.push_str(extra);
    }
    Ok(instruction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styles;

    fn open_style() -> &'static StyleTemplate {
        styles::find(styles::OPEN_STYLE_ID).unwrap()
    }

    fn linkedin_style() -> &'static StyleTemplate {
        styles::find("linkedin").unwrap()
    }

    #[test]
    fn template_alone_composes_to_its_instruction() {
        let style = linkedin_style();
        let prompt = compose_prompt(style, "", "").unwrap();
        assert_eq!(prompt, style.instruction);
    }

    #[test]
    fn extra_instructions_append_as_a_second_sentence() {
        let style = linkedin_style();
        let prompt = compose_prompt(style, "", "wearing glasses").unwrap();
        assert_eq!(prompt, format!("{}. wearing glasses", style.instruction));
    }

    #[test]
    fn blank_extra_instructions_are_ignored() {
        let style = linkedin_style();
        assert_eq!(
            compose_prompt(style, "", "   ").unwrap(),
            style.instruction
        );
    }

    #[test]
    fn open_style_uses_the_freeform_text_verbatim() {
        let prompt = compose_prompt(open_style(), "a renaissance oil painting", "").unwrap();
        assert_eq!(prompt, "a renaissance oil painting");
    }

    #[test]
    fn open_style_with_empty_text_is_rejected() {
        assert_eq!(
            compose_prompt(open_style(), "  ", "ignored"),
            Err(PromptError::EmptyPrompt)
        );
    }

    #[test]
    fn composition_is_deterministic() {
        let style = linkedin_style();
        let first = compose_prompt(style, "", "smiling more").unwrap();
        let second = compose_prompt(style, "", "smiling more").unwrap();
        assert_eq!(first, second);
    }
}
