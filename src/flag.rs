//! Flag-spec tokens: the short/long switch pair plus an optional argument
//! placeholder.
//!
//! Accepted token shapes:
//!
//! | Token | Meaning |
//! |---|---|
//! | `-t` / `--tries` | switch without argument |
//! | `-t NUMBER`, `-tNUMBER` | short switch with a required argument |
//! | `--tries NUMBER`, `--tries=NUMBER` | long switch with a required argument |
//! | `-t[N]`, `--level[=N]`, `--level [N]` | optional argument |
//!
//! Several tokens combine into one [`FlagSpec`]; the first one is the primary
//! flag used in "not given" messages.

use crate::error::OptError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    pub short: Option<char>,
    pub long: Option<String>,
    /// Argument placeholder (`NUMBER` in `--tries NUMBER`).
    pub placeholder: Option<String>,
    /// Whether the argument may be omitted (`--level[=N]`).
    pub optional_arg: bool,
    /// First flag as written, without its placeholder.
    pub primary: String,
}

impl FlagSpec {
    pub fn takes_argument(&self) -> bool {
        self.placeholder.is_some()
    }

    /// The long switch when declared, else the short one. Used to tag
    /// command-line values in error messages.
    pub fn display_flag(&self) -> String {
        match (&self.long, self.short) {
            (Some(long), _) => format!("--{long}"),
            (None, Some(short)) => format!("-{short}"),
            (None, None) => self.primary.clone(),
        }
    }

    /// Parse the flag tokens declared for `option`.
    pub fn parse<S: AsRef<str>>(option: &str, tokens: &[S]) -> Result<Self, OptError> {
        let invalid = |token: &str, reason: &str| OptError::InvalidFlagSpec {
            option: option.to_string(),
            token: token.to_string(),
            reason: reason.to_string(),
        };

        let mut spec = FlagSpec {
            short: None,
            long: None,
            placeholder: None,
            optional_arg: false,
            primary: String::new(),
        };

        for token in tokens {
            let token = token.as_ref().trim();
            let (flag, argument) = if let Some(rest) = token.strip_prefix("--") {
                let end = rest.find([' ', '=', '[']).unwrap_or(rest.len());
                let (name, tail) = rest.split_at(end);
                if name.is_empty() || !name.chars().all(is_name_char) {
                    return Err(invalid(token, "long flag name must be alphanumeric"));
                }
                if spec.long.replace(name.to_string()).is_some() {
                    return Err(invalid(token, "more than one long flag"));
                }
                (format!("--{name}"), tail)
            } else if let Some(rest) = token.strip_prefix('-') {
                let mut chars = rest.chars();
                let short = chars
                    .next()
                    .filter(char::is_ascii_alphanumeric)
                    .ok_or_else(|| {
                        invalid(token, "short flag must be one alphanumeric character")
                    })?;
                if spec.short.replace(short).is_some() {
                    return Err(invalid(token, "more than one short flag"));
                }
                (format!("-{short}"), chars.as_str())
            } else {
                return Err(invalid(token, "flags start with '-' or '--'"));
            };

            if let Some((placeholder, optional)) =
                parse_argument(argument).map_err(|reason| invalid(token, reason))?
            {
                spec.placeholder = Some(placeholder);
                spec.optional_arg |= optional;
            }
            if spec.primary.is_empty() {
                spec.primary = flag;
            }
        }

        if spec.primary.is_empty() {
            return Err(invalid("", "at least one flag token is required"));
        }
        Ok(spec)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Parse the part after the switch name: `""`, `" ARG"`, `"=ARG"`, `"ARG"`,
/// `"[ARG]"`, `"[=ARG]"`, `" [ARG]"`.
fn parse_argument(rest: &str) -> Result<Option<(String, bool)>, &'static str> {
    let trimmed = rest.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let (inner, optional) = match trimmed.strip_prefix('[') {
        Some(bracketed) => {
            let inner = bracketed.strip_suffix(']').ok_or("unterminated '['")?;
            (inner.strip_prefix('=').unwrap_or(inner).trim(), true)
        }
        None => (trimmed.strip_prefix('=').unwrap_or(trimmed).trim(), false),
    };

    if inner.is_empty() || inner.contains(char::is_whitespace) {
        return Err("argument placeholder must be a single word");
    }
    Ok(Some((inner.to_string(), optional)))
}
