//! Language lookup and file-type detection.

use std::collections::HashMap;
use std::sync::Arc;

use super::lang::{Lang, SupportLevel};

/// All languages known to the editor, looked up by code or by support-level
/// detection against a file's contents and path.
#[derive(Default)]
pub struct LangRegistry {
    langs: Vec<Arc<dyn Lang>>,
    by_code: HashMap<&'static str, usize>,
}

impl LangRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a language. A language registered later under an existing
    /// code replaces the earlier one for lookups.
    pub fn add(&mut self, lang: Arc<dyn Lang>) {
        let code = lang.code();

        self.by_code.insert(code, self.langs.len());
        self.langs.push(lang);
    }

    pub fn get(&self, code: &str) -> Option<Arc<dyn Lang>> {
        self.by_code.get(code).map(|&i| Arc::clone(&self.langs[i]))
    }

    pub fn codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_code.keys().copied()
    }

    /// Pick the best language for a file by support level. `Specific` beats
    /// `General` beats `Alternate`; ties go to the earlier registration.
    pub fn detect(&self, code: &str, path: Option<&str>) -> Option<Arc<dyn Lang>> {
        let mut best: Option<(SupportLevel, &Arc<dyn Lang>)> = None;

        for lang in &self.langs {
            let Some(level) = lang.get_support_level(code, path) else {
                continue;
            };

            if best.map_or(true, |(best_level, _)| level > best_level) {
                best = Some((level, lang));
            }
        }

        best.map(|(_, lang)| Arc::clone(lang))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::syntax::tree::Tree;
    use crate::text::Selection;

    struct FakeLang {
        code: &'static str,
        level: Option<SupportLevel>,
    }

    impl Lang for FakeLang {
        fn code(&self) -> &'static str {
            self.code
        }

        fn name(&self) -> &'static str {
            self.code
        }

        fn parse(&self, _code: &str, range: &Selection) -> Result<Tree, ParseError> {
            Ok(Tree::new("root", *range))
        }

        fn get_support_level(&self, _code: &str, _path: Option<&str>) -> Option<SupportLevel> {
            self.level
        }
    }

    #[test]
    fn test_lookup_by_code() {
        let mut registry = LangRegistry::new();

        registry.add(Arc::new(FakeLang {
            code: "plain",
            level: None,
        }));

        assert!(registry.get("plain").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_detect_prefers_specific_support() {
        let mut registry = LangRegistry::new();

        registry.add(Arc::new(FakeLang {
            code: "general",
            level: Some(SupportLevel::General),
        }));

        registry.add(Arc::new(FakeLang {
            code: "specific",
            level: Some(SupportLevel::Specific),
        }));

        let lang = registry.detect("", None);

        assert_eq!(lang.map(|lang| lang.code()), Some("specific"));
    }
}
