//! Well-known diagnostic variables that users do not name or control

/// Variables injected by the platform for debugging; never worth flagging
pub const SPECIAL_VARS: &[&str] = &["DeployPrintVariables", "DeployPrintEvaluatedVariables"];

/// Whether a variable name should be ignored by variable checks
pub fn ignore_variable(name: &str) -> bool {
    if SPECIAL_VARS.contains(&name) {
        return true;
    }

    // Substitution-syntax names, e.g. "Config:Database:Password"
    if name.contains(':') {
        return true;
    }

    // Indexed group names, e.g. "Hosts[web].Port"
    if name.contains('[') {
        return true;
    }

    false
}
