//! # Prompt Templates
//!
//! The fixed texts sent to the AI providers. The task prompts in [`tasks`] are
//! the defaults; the server lets `config.yml` or `prompt.yml` override the
//! system prompts per task.

pub mod tasks;

/// Substitutes `{key}` placeholders in `template` in a single pass, so
/// substituted values are never scanned for further placeholders.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let value = after.find('}').and_then(|end| {
            let key = &after[..end];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, end))
        });
        match value {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_replaces_every_occurrence() {
        let out = render("{a} and {a}, {b}", &[("a", "x"), ("b", "y")]);
        assert_eq!(out, "x and x, y");
    }

    #[test]
    fn unknown_placeholders_are_left_alone() {
        assert_eq!(render("{missing}", &[("a", "x")]), "{missing}");
        assert_eq!(render("{ {a}", &[("a", "x")]), "{ x");
    }

    #[test]
    fn substituted_values_are_not_rendered_again() {
        let out = render("{a}|{b}", &[("a", "{b}"), ("b", "{a}")]);
        assert_eq!(out, "{b}|{a}");
    }
}
