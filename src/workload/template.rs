use super::types::User;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Tokens that always resolve to the user name.
const USER_NAME_TOKENS: [&str; 4] = ["encoded_user_name", "username", "UserName", "user_name"];
/// Tokens that always resolve to the password.
const PASSWORD_TOKENS: [&str; 2] = ["password", "Password"];

/// Substitutes `{{token}}` placeholders in `template` with values from `user`.
///
/// Recognized tokens are the user-name and password aliases plus one token per
/// entry of `user.properties`. The template is trimmed first. Substituted text
/// is never re-scanned, and unknown tokens are left as they are. A missing
/// template yields an empty string.
#[must_use]
pub fn merge_placeholders(template: Option<&str>, user: &User) -> String {
    let Some(template) = template else {
        return String::new();
    };
    let mut rest = template.trim();
    let mut output = String::with_capacity(rest.len());

    while let Some(start) = rest.find(OPEN) {
        let (before, from_open) = rest.split_at(start);
        output.push_str(before);
        let after_open = from_open.get(OPEN.len()..).unwrap_or_default();
        let resolved = after_open.find(CLOSE).and_then(|end| {
            let key = after_open.get(..end)?;
            let value = lookup(user, key)?;
            let remaining = after_open
                .get(end.saturating_add(CLOSE.len())..)
                .unwrap_or_default();
            Some((value, remaining))
        });
        match resolved {
            Some((value, remaining)) => {
                output.push_str(value);
                rest = remaining;
            }
            None => {
                // Only the first brace is consumed so "{{{{key}}}}" still resolves the inner token.
                output.push('{');
                rest = from_open.get(1..).unwrap_or_default();
            }
        }
    }
    output.push_str(rest);
    output
}

fn lookup<'user>(user: &'user User, key: &str) -> Option<&'user str> {
    if USER_NAME_TOKENS.contains(&key) {
        return Some(user.user_name.as_str());
    }
    if PASSWORD_TOKENS.contains(&key) {
        return Some(user.password.as_str());
    }
    user.properties.get(key).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User::new("alice", "secret").with_property("id", "42")
    }

    #[test]
    fn merges_user_name_password_and_properties() -> Result<(), String> {
        let merged = merge_placeholders(
            Some("/users/{{UserName}}/items/{{id}}?pw={{password}}"),
            &alice(),
        );
        if merged != "/users/alice/items/42?pw=secret" {
            return Err(format!("Unexpected merge result: {}", merged));
        }
        Ok(())
    }

    #[test]
    fn missing_template_yields_empty_string() -> Result<(), String> {
        if !merge_placeholders(None, &alice()).is_empty() {
            return Err("Expected empty output for missing template".to_owned());
        }
        if !merge_placeholders(Some("   "), &alice()).is_empty() {
            return Err("Expected empty output for blank template".to_owned());
        }
        Ok(())
    }

    #[test]
    fn user_name_aliases_resolve() -> Result<(), String> {
        let merged = merge_placeholders(
            Some("{{encoded_user_name}}|{{username}}|{{user_name}}|{{Password}}"),
            &alice(),
        );
        if merged != "alice|alice|alice|secret" {
            return Err(format!("Unexpected alias merge: {}", merged));
        }
        Ok(())
    }

    #[test]
    fn unknown_tokens_are_left_verbatim() -> Result<(), String> {
        let merged = merge_placeholders(Some("/a/{{missing}}/{{ id }}/{{id}}"), &alice());
        if merged != "/a/{{missing}}/{{ id }}/42" {
            return Err(format!("Unexpected merge result: {}", merged));
        }
        Ok(())
    }

    #[test]
    fn substituted_values_are_not_rescanned() -> Result<(), String> {
        let user = User::new("{{password}}", "secret").with_property("next", "{{id}}");
        let merged = merge_placeholders(Some("{{UserName}}-{{next}}"), &user);
        if merged != "{{password}}-{{id}}" {
            return Err(format!("Substituted value was rescanned: {}", merged));
        }
        Ok(())
    }

    #[test]
    fn fixed_aliases_win_over_properties() -> Result<(), String> {
        let user = User::new("alice", "secret").with_property("username", "bob");
        let merged = merge_placeholders(Some("{{username}}"), &user);
        if merged != "alice" {
            return Err(format!("Expected alias to win, got {}", merged));
        }
        Ok(())
    }

    #[test]
    fn template_is_trimmed_and_nested_braces_resolve_inner_token() -> Result<(), String> {
        let merged = merge_placeholders(Some("  {{{{id}}}} \n"), &alice());
        if merged != "{{42}}" {
            return Err(format!("Unexpected merge result: {:?}", merged));
        }
        let unterminated = merge_placeholders(Some("/x/{{id"), &alice());
        if unterminated != "/x/{{id" {
            return Err(format!("Unexpected merge result: {:?}", unterminated));
        }
        Ok(())
    }
}
