use codetender_core::{CodetenderError, TokenDef, TokenResolver};
use inquire::Text;
use tracing::debug;

/// Asks on the terminal for whatever the configuration left open.
pub struct InteractiveResolver;

impl TokenResolver for InteractiveResolver {
    fn resolve(&self, tokens: &mut Vec<TokenDef>) -> codetender_core::Result<()> {
        if tokens.is_empty() {
            debug!("Reading tokens from command line...");
            read_new_tokens(tokens)
        } else if tokens.iter().any(|t| t.replacement.is_none()) {
            debug!("Reading token values from command line...");
            read_missing_values(tokens)
        } else {
            debug!("All token replacements already provided.");
            Ok(())
        }
    }
}

fn ask(question: &str) -> codetender_core::Result<String> {
    Text::new(question)
        .prompt()
        .map_err(|e| CodetenderError::Configuration(format!("prompt failed: {}", e)))
}

fn read_new_tokens(tokens: &mut Vec<TokenDef>) -> codetender_core::Result<()> {
    loop {
        let pattern = ask("Token to replace [done]:")?;
        if pattern.is_empty() {
            break;
        }
        let replacement = ask("Replace with [abort]:")?;
        if replacement.is_empty() {
            return Err(CodetenderError::Configuration(format!(
                "no replacement given for '{}'",
                pattern
            )));
        }
        tokens.push(TokenDef::new(pattern, replacement));
    }

    if tokens.is_empty() {
        return Err(CodetenderError::Configuration("No tokens specified.".to_string()));
    }
    Ok(())
}

fn read_missing_values(tokens: &mut [TokenDef]) -> codetender_core::Result<()> {
    println!("Enter a blank value at any time to abort.");
    for token in tokens.iter_mut().filter(|t| t.replacement.is_none()) {
        let response = ask(&token.prompt_text())?;
        if response.is_empty() {
            return Err(CodetenderError::Configuration(format!(
                "no replacement given for '{}'",
                token.pattern
            )));
        }
        token.replacement = Some(response);
    }
    Ok(())
}
