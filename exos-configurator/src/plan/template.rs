//! Named-placeholder command templates.
//!
//! Templates are plain command lines with `{name}` placeholders:
//!
//! ```text
//! configure vlan NetMgmt ipaddress {switch_ip} 255.255.255.0
//! ```
//!
//! Rendering substitutes every placeholder from a [`Vars`] set and fails on
//! the first placeholder without a value, so a typo in a template surfaces
//! as an error instead of a half-formatted command sent to the switch.

use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};

use crate::error::TemplateError;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_][a-z0-9_]*)\}").unwrap());

/// Values available to templates, keyed by placeholder name.
///
/// Values registered with [`Vars::set_secret`] are masked by [`Vars::masked`].
#[derive(Clone, Default)]
pub struct Vars {
    values: IndexMap<&'static str, (String, bool)>,
}

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one.
    pub fn set(&mut self, name: &'static str, value: impl Into<String>) -> &mut Self {
        self.values.insert(name, (value.into(), false));
        self
    }

    /// Set a value that must not appear in logs.
    pub fn set_secret(&mut self, name: &'static str, value: impl Into<String>) -> &mut Self {
        self.values.insert(name, (value.into(), true));
        self
    }

    /// Builder form of [`Vars::set`].
    pub fn with(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|(value, _)| value.as_str())
    }

    pub fn is_secret(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(|(_, secret)| *secret)
    }

    /// Copy with every secret replaced by [`MASK`](super::MASK).
    pub fn masked(&self) -> Self {
        let values = self
            .values
            .iter()
            .map(|(name, (value, secret))| {
                let shown = if *secret { super::MASK.to_string() } else { value.clone() };
                (*name, (shown, *secret))
            })
            .collect();
        Self { values }
    }
}

impl fmt::Debug for Vars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.masked().values.iter().map(|(k, (v, _))| (*k, v.clone())))
            .finish()
    }
}

/// Render one template.
pub fn render(template: &str, vars: &Vars) -> Result<String, TemplateError> {
    let mut missing = None;
    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        let name = &caps[1];
        match vars.get(name) {
            Some(value) => value.to_string(),
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(TemplateError::MissingVariable {
            name,
            template: template.to_string(),
        }),
        None => Ok(rendered.into_owned()),
    }
}

/// Placeholder names referenced by a template, in order of appearance.
pub fn placeholders(template: &str) -> impl Iterator<Item = &str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_all() {
        let vars = Vars::new()
            .with("switch_ip", "10.20.30.40")
            .with("gateway_ip", "10.20.30.254");
        assert_eq!(
            render("configure iproute add default {gateway_ip}", &vars).unwrap(),
            "configure iproute add default 10.20.30.254"
        );
        assert_eq!(
            render("radius server {switch_ip} client-ip {switch_ip}", &vars).unwrap(),
            "radius server 10.20.30.40 client-ip 10.20.30.40"
        );
    }

    #[test]
    fn test_render_without_placeholders() {
        assert_eq!(render("enable ssh2", &Vars::new()).unwrap(), "enable ssh2");
    }

    #[test]
    fn test_missing_variable_is_reported() {
        let vars = Vars::new().with("ports", "1-24");
        let err = render("enable mac-locking ports {ports} {uplink}", &vars).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingVariable {
                name: "uplink".to_string(),
                template: "enable mac-locking ports {ports} {uplink}".to_string(),
            }
        );
    }

    #[test]
    fn test_non_identifier_braces_are_left_alone() {
        let rendered = render(r#"show vlan | include "^{name} ""#, &Vars::new().with("name", "AV"));
        assert_eq!(rendered.unwrap(), r#"show vlan | include "^AV ""#);
        assert_eq!(render("echo {1}", &Vars::new()).unwrap(), "echo {1}");
    }

    #[test]
    fn test_placeholders_listed_in_order() {
        let names: Vec<&str> = placeholders("a {one} b {two} c {one}").collect();
        assert_eq!(names, vec!["one", "two", "one"]);
    }
}
