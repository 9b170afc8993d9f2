/// Decides whether recognized text belongs to the script being translated.
pub trait ScriptPredicate: Send + Sync {
    /// Short identifier used in logs and config ("ja", "any", ...)
    fn name(&self) -> &str;

    fn matches(&self, text: &str) -> bool;
}

/// Accepts any text.
pub struct AnyScript;

impl ScriptPredicate for AnyScript {
    fn name(&self) -> &str {
        "any"
    }

    fn matches(&self, _text: &str) -> bool {
        true
    }
}
