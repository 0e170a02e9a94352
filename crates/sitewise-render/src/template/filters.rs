//! MiniJinja filter registration.

use minijinja::{Environment, Value};

/// Registers the built-in filters on a minijinja environment.
///
/// - `nl`: appends a newline (`{{ "" | nl }}` is a blank line)
/// - `ucfirst`: capitalizes the first character, the same rule used for view names
pub fn register_filters(env: &mut Environment<'static>) {
    env.add_filter("nl", |value: Value| -> String { format!("{}\n", value) });

    env.add_filter("ucfirst", |value: String| -> String { ucfirst(&value) });
}

/// Uppercases the first character of `s`, leaving the rest unchanged.
pub fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ucfirst() {
        assert_eq!(ucfirst("about"), "About");
        assert_eq!(ucfirst("About"), "About");
        assert_eq!(ucfirst("aboutUs"), "AboutUs");
        assert_eq!(ucfirst(""), "");
        assert_eq!(ucfirst("élan"), "Élan");
    }

    #[test]
    fn test_filters_in_template() {
        let mut env = Environment::new();
        register_filters(&mut env);
        env.add_template("t", "{{ name | ucfirst }}{{ '' | nl }}")
            .unwrap();

        let out = env
            .get_template("t")
            .unwrap()
            .render(minijinja::context! { name => "contact" })
            .unwrap();
        assert_eq!(out, "Contact\n");
    }
}
