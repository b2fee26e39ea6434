use std::sync::LazyLock;

use regex::Regex;

static HOOK_NAME: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^use[A-Z][A-Za-z0-9_$]*$").ok());
static EVENT_HANDLER_NAME: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^on[A-Z][A-Za-z0-9_$]*$").ok());
static SETTER_NAME: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^set[A-Z][A-Za-z0-9_$]*$").ok());
static PROPS_TYPE_NAME: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_$]*Props$").ok());

fn matches(re: &LazyLock<Option<Regex>>, name: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(name))
}

/// `useFoo` but not `user` or `use`.
pub fn is_hook_name(name: &str) -> bool {
    matches(&HOOK_NAME, name)
}

/// `onClick`, `onMouseEnter`; not `one` or `on`.
pub fn is_event_handler_name(name: &str) -> bool {
    matches(&EVENT_HANDLER_NAME, name)
}

/// `setCount`; not `settle`.
pub fn is_setter_name(name: &str) -> bool {
    matches(&SETTER_NAME, name)
}

/// `Props`, `CardProps`, `CardComponentProps`.
pub fn is_props_type_name(name: &str) -> bool {
    matches(&PROPS_TYPE_NAME, name)
}

pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `count` -> `setCount`.
pub fn setter_name(variable: &str) -> String {
    format!("set{}", capitalize(variable))
}

/// `onMouseEnter` -> `mouseEnter`.
pub fn event_type(attr: &str) -> String {
    let rest = attr.strip_prefix("on").unwrap_or(attr);
    let mut chars = rest.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `UserCard` -> `user_card`, `Menu.Item` -> `menu_item`.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c == '.' || c == '-' || c == ' ' {
            if !out.ends_with('_') && !out.is_empty() {
                out.push('_');
            }
            prev_lower = false;
        } else if c.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_and_handler_names() {
        assert!(is_hook_name("useState"));
        assert!(is_hook_name("useFetchUser"));
        assert!(!is_hook_name("use"));
        assert!(!is_hook_name("user"));
        assert!(!is_hook_name("useless"));
        assert!(is_event_handler_name("onClick"));
        assert!(!is_event_handler_name("one"));
        assert!(!is_event_handler_name("on"));
    }

    #[test]
    fn props_type_names() {
        assert!(is_props_type_name("Props"));
        assert!(is_props_type_name("CardComponentProps"));
        assert!(!is_props_type_name("PropsBag"));
    }

    #[test]
    fn setter_and_case_helpers() {
        assert_eq!(setter_name("x"), "setX");
        assert_eq!(setter_name("isOpen"), "setIsOpen");
        assert_eq!(event_type("onMouseEnter"), "mouseEnter");
        assert_eq!(snake_case("UserCard"), "user_card");
        assert_eq!(snake_case("Menu.Item"), "menu_item");
        assert_eq!(snake_case("HTTPStatus2"), "httpstatus2");
    }
}
