use regex::Regex;
use std::sync::LazyLock;

const DNS1123_SUBDOMAIN_MAX_LENGTH: usize = 253;

static DNS1123_SUBDOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$").unwrap()
});

/// Check a name against the Kubernetes DNS-1123 subdomain rules.
/// Returns one message per violated rule; empty when the name is valid.
pub fn dns_subdomain_violations(name: &str) -> Vec<String> {
    let mut violations = Vec::new();
    if name.len() > DNS1123_SUBDOMAIN_MAX_LENGTH {
        violations.push(format!(
            "must be no more than {} characters",
            DNS1123_SUBDOMAIN_MAX_LENGTH
        ));
    }
    if !DNS1123_SUBDOMAIN.is_match(name) {
        violations.push(
            "a lowercase RFC 1123 subdomain must consist of lower case alphanumeric characters, \
             '-' or '.', and must start and end with an alphanumeric character"
                .to_string(),
        );
    }
    violations
}
