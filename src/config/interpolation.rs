//! `${variable}` interpolation for command templates.
//!
//! # Syntax
//!
//! - `${name}` - replaced with the variable's value
//! - `$${name}` - produces a literal `${name}`
//!
//! Every substituted value is quoted as one shell word, so command
//! templates leave their variables unquoted (`--setalias ${alias}`).
//!
//! # Example
//!
//! ```
//! use orgbuilder::config::{render_command, TemplateVars};
//!
//! let mut vars = TemplateVars::new();
//! vars.set("alias", "scratch1");
//! vars.set("site", "My Site");
//! let line = render_command("sfdx force:org:open -u ${alias} -p ${site}", &vars).unwrap();
//! assert_eq!(line, "sfdx force:org:open -u scratch1 -p 'My Site'");
//! ```

use std::collections::{BTreeSet, HashMap};

use crate::error::{BuilderError, Result};

/// A piece of a parsed template.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Variable(String),
}

/// Split a template into literal text and variable references.
pub fn parse_template(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            literal.push(c);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                if chars.peek() == Some(&'{') {
                    // $${...} stays literal up to the closing brace.
                    literal.push('$');
                    for c in chars.by_ref() {
                        literal.push(c);
                        if c == '}' {
                            break;
                        }
                    }
                } else {
                    literal.push('$');
                }
            }
            Some('{') => {
                chars.next();
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                let name: String = chars.by_ref().take_while(|&c| c != '}').collect();
                segments.push(Segment::Variable(name.trim().to_string()));
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

/// Names referenced by a template.
pub fn template_variables(input: &str) -> BTreeSet<String> {
    parse_template(input)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Variable(name) => Some(name),
            Segment::Literal(_) => None,
        })
        .collect()
}

/// Variables available to a template.
///
/// Lookups go through the layers from the most specific (pushed last) to
/// the least specific.
#[derive(Debug, Clone, Default)]
pub struct TemplateVars {
    layers: Vec<HashMap<String, String>>,
}

impl TemplateVars {
    /// Empty variable set with a single layer.
    pub fn new() -> Self {
        Self {
            layers: vec![HashMap::new()],
        }
    }

    /// Set a variable in the most specific layer.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        if self.layers.is_empty() {
            self.layers.push(HashMap::new());
        }
        if let Some(top) = self.layers.last_mut() {
            top.insert(name.into(), value.into());
        }
    }

    /// A copy with one more layer on top.
    pub fn layered<I, K, V>(&self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut next = self.clone();
        next.layers
            .push(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        next
    }

    /// Look a variable up.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.get(name))
            .map(String::as_str)
    }
}

/// Render a command line template, failing on the first unknown variable.
///
/// Each value becomes exactly one word when the line is split again,
/// whatever spaces or quotes it contains.
pub fn render_command(template: &str, vars: &TemplateVars) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    for segment in parse_template(template) {
        match segment {
            Segment::Literal(text) => out.push_str(&text),
            Segment::Variable(name) => match vars.get(&name) {
                Some(value) => out.push_str(&shell_words::quote(value)),
                None => {
                    return Err(BuilderError::UnknownVariable {
                        name,
                        template: template.to_string(),
                    })
                }
            },
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_only() {
        assert_eq!(
            parse_template("npm run test:unit:CICD"),
            vec![Segment::Literal("npm run test:unit:CICD".to_string())]
        );
    }

    #[test]
    fn variable_with_surrounding_text() {
        assert_eq!(
            parse_template("--alias \"${alias}\" -d 7"),
            vec![
                Segment::Literal("--alias \"".to_string()),
                Segment::Variable("alias".to_string()),
                Segment::Literal("\" -d 7".to_string()),
            ]
        );
    }

    #[test]
    fn adjacent_variables() {
        assert_eq!(
            parse_template("${a}${b}"),
            vec![
                Segment::Variable("a".to_string()),
                Segment::Variable("b".to_string()),
            ]
        );
    }

    #[test]
    fn escaped_reference_stays_literal() {
        assert_eq!(
            parse_template("echo '$${HOME}' ${x}"),
            vec![
                Segment::Literal("echo '${HOME}' ".to_string()),
                Segment::Variable("x".to_string()),
            ]
        );
    }

    #[test]
    fn dollar_without_brace_is_literal() {
        assert_eq!(
            parse_template("cost $5"),
            vec![Segment::Literal("cost $5".to_string())]
        );
    }

    #[test]
    fn collects_unique_variable_names() {
        let names = template_variables("${item} ${alias} ${item}");
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["alias", "item"]);
    }

    #[test]
    fn upper_layer_shadows_lower() {
        let mut vars = TemplateVars::new();
        vars.set("alias", "base");
        let vars = vars.layered([("alias", "override")]);
        assert_eq!(render_command("${alias}", &vars).unwrap(), "override");
    }

    #[test]
    fn lower_layer_still_visible() {
        let mut vars = TemplateVars::new();
        vars.set("days", "7");
        let vars = vars.layered([("item", "pkg1")]);
        assert_eq!(render_command("${item}:${days}", &vars).unwrap(), "pkg1:7");
    }

    #[test]
    fn unknown_variable_is_an_error() {
        let err = render_command("open ${nowhere}", &TemplateVars::new()).unwrap_err();
        assert!(matches!(err, BuilderError::UnknownVariable { ref name, .. } if name == "nowhere"));
    }

    #[test]
    fn command_values_stay_single_words() {
        let mut vars = TemplateVars::new();
        vars.set("cli", "sfdx");
        vars.set("name", "Partners \"EU\"");
        vars.set("path", "lightning/setup/Site Settings");
        vars.set("owner", "O'Brien");
        let line = render_command(
            "${cli} publish --name ${name} --path=${path} --owner ${owner}",
            &vars,
        )
        .unwrap();
        assert_eq!(
            shell_words::split(&line).unwrap(),
            [
                "sfdx",
                "publish",
                "--name",
                "Partners \"EU\"",
                "--path=lightning/setup/Site Settings",
                "--owner",
                "O'Brien"
            ]
        );
    }

    #[test]
    fn plain_command_values_are_not_quoted() {
        let mut vars = TemplateVars::new();
        vars.set("alias", "scratch");
        assert_eq!(
            render_command("--setalias ${alias}", &vars).unwrap(),
            "--setalias scratch"
        );
    }

    #[test]
    fn escaped_reference_renders_without_lookup() {
        assert_eq!(
            render_command("$${NOT_RESOLVED}", &TemplateVars::new()).unwrap(),
            "${NOT_RESOLVED}"
        );
    }
}
