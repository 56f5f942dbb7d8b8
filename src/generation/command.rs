//! Command line for the external page generator.

use crate::models::ARTIFACT_FILE;

/// Instruction block handed to the generator. `{prompt}` is replaced with the
/// escaped user request. Section breaks are literal `\n` sequences so the
/// whole block stays one shell argument.
const INSTRUCTION_TEMPLATE: &str = concat!(
    "/ui-ux-pro-max ",
    "[ROLE] You are a professional front-end developer who turns requirements into polished web page prototypes\\n",
    "[TASK] Produce a complete single-file HTML page for the request. If the project already contains a single-file HTML page, ",
    "first decide whether the request asks to modify it; unless the user explicitly asks to regenerate from scratch, ",
    "keep the existing style and modify the existing page\\n",
    "[REQUIREMENTS]\\n",
    "1. Output complete HTML5 code including CSS and JavaScript\\n",
    "2. Save the code as {artifact} (overwrite it)\\n",
    "3. Whatever language the request is written in, the page content must use Chinese as its primary language\\n",
    "4. Generate front-end code only, no back-end logic\\n",
    "5. Pick a UI style that suits the request; it must be clean, attractive and modern\\n",
    "6. Make sure the HTML structure is complete and opens directly in a browser\\n",
    "[INPUT] User request: {prompt}",
);

/// Builds the generator invocation for a user prompt.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    program: String,
}

impl CommandBuilder {
    /// `program` is the generator executable, either a resolved path or a
    /// bare name left to `PATH` lookup.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Assemble `<program> run "<instructions + prompt>"`.
    ///
    /// Only double quotes in `prompt` are escaped. Everything else, including
    /// shell metacharacters, is passed through verbatim.
    pub fn build(&self, prompt: &str) -> String {
        let escaped = prompt.replace('"', "\\\"");
        let instructions = INSTRUCTION_TEMPLATE
            .replace("{artifact}", ARTIFACT_FILE)
            .replace("{prompt}", &escaped);
        format!("{} run \"{}\"", self.program, instructions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_program_and_run_subcommand() {
        let command = CommandBuilder::new("opencode").build("a landing page");
        assert!(command.starts_with("opencode run \"/ui-ux-pro-max [ROLE]"));
        assert!(command.ends_with("[INPUT] User request: a landing page\""));
    }

    #[test]
    fn names_the_artifact_file() {
        let command = CommandBuilder::new("opencode").build("x");
        assert!(command.contains("Save the code as index.html"));
        assert!(!command.contains("{artifact}"));
    }

    #[test]
    fn escapes_double_quotes_in_prompt() {
        let command = CommandBuilder::new("opencode").build(r#"title "Hello""#);
        assert!(command.ends_with(r#"User request: title \"Hello\"""#));
    }

    #[test]
    fn template_has_no_bare_double_quotes() {
        let command = CommandBuilder::new("opencode").build("plain");
        let inner = &command["opencode run \"".len()..command.len() - 1];
        assert!(!inner.contains('"'));
    }

    #[test]
    fn passes_other_characters_through() {
        let command = CommandBuilder::new("/usr/bin/opencode").build("use $HOME & 'quotes'");
        assert!(command.starts_with("/usr/bin/opencode run "));
        assert!(command.contains("use $HOME & 'quotes'"));
    }

    #[test]
    fn prompt_placeholder_text_is_not_reexpanded() {
        let command = CommandBuilder::new("opencode").build("{artifact}");
        assert!(command.ends_with("User request: {artifact}\""));
    }
}
