//! Model alias resolution (spec §4.7): a single-level lookup from a
//! caller-facing alias to the model name actually sent upstream. Config
//! validation (see `config::validation`) already rejects aliases that
//! resolve to another alias key, so resolution here never has to chase a
//! chain.

use std::collections::HashMap;

pub fn resolve(aliases: &HashMap<String, String>, model: &str) -> String {
    aliases.get(model).cloned().unwrap_or_else(|| model.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unaliased_model_passes_through() {
        let aliases = HashMap::new();
        assert_eq!(resolve(&aliases, "gpt-4"), "gpt-4");
    }

    #[test]
    fn aliased_model_resolves_once() {
        let mut aliases = HashMap::new();
        aliases.insert("fast".to_string(), "gpt-4o-mini".to_string());
        assert_eq!(resolve(&aliases, "fast"), "gpt-4o-mini");
    }
}
