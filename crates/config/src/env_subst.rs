/// Replace `${VAR}` and `${VAR:-default}` placeholders in raw config text.
///
/// Unresolvable variables without a default are left as-is.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// Same as [`substitute_env`] with a custom lookup, so tests don't touch the
/// process environment.
pub fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find('}') else {
            // Unterminated: emit the remainder literally.
            result.push_str(&rest[start..]);
            return result;
        };

        let body = &after[..end];
        let (name, default) = match body.split_once(":-") {
            Some((name, default)) => (name, Some(default)),
            None => (body, None),
        };

        // An empty value counts as unset, as in shells.
        match lookup(name).filter(|v| !v.is_empty()) {
            Some(value) if !name.is_empty() => result.push_str(&value),
            _ => match default {
                Some(default) if !name.is_empty() => result.push_str(default),
                _ => {
                    result.push_str("${");
                    result.push_str(body);
                    result.push('}');
                },
            },
        }

        rest = &after[end + 1..];
    }

    result.push_str(rest);
    result
}
