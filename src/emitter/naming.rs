//! Target and repository names.
//!
//! Every record gets a versioned *primary* name, used for its `http_file`
//! repository and its private rules, and a version-independent *alias*, the
//! public handle other build files depend on.
//!
//! | Coordinate | Primary | Alias (`GroupIdAndArtifactId`) | Alias (`ArtifactId`) |
//! |---|---|---|---|
//! | `com.example:my-app:1.0` | `com_example__my_app__1_0` | `com_example__my_app` | `my_app` |

use crate::config::{AliasStrategy, ApplicationConfig, Nature};
use crate::model::Coordinate;

/// Lowercase `text` and replace everything but ASCII letters and digits with `_`.
#[must_use]
pub fn fold(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// Names derived for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetNames {
    /// Versioned name, also the `http_file` repository name
    pub primary: String,
    /// Version-independent public name
    pub alias: String,
    natures: Vec<Nature>,
}

impl TargetNames {
    /// Names for `coordinate` under the prefix and strategy configured for it.
    #[must_use]
    pub fn new(coordinate: &Coordinate, config: &ApplicationConfig) -> Self {
        let key = coordinate.key();
        let prefix = &config.options.name_prefix;
        let group = fold(&coordinate.group_id);
        let artifact = fold(&coordinate.artifact_id);
        let alias = match config.alias_strategy(&key) {
            AliasStrategy::GroupIdAndArtifactId => format!("{prefix}{group}__{artifact}"),
            AliasStrategy::ArtifactId => format!("{prefix}{artifact}"),
        };
        Self {
            primary: format!("{prefix}{group}__{artifact}__{}", fold(&coordinate.version)),
            alias,
            natures: config.natures(&key),
        }
    }

    /// Natures the record is emitted with, in declaration order.
    #[must_use]
    pub fn natures(&self) -> &[Nature] {
        &self.natures
    }

    #[must_use]
    pub fn has_nature(&self, nature: Nature) -> bool {
        self.natures.contains(&nature)
    }

    /// Suffix distinguishing the rules of `nature`.
    ///
    /// Empty when `nature` is the only one and needs no disambiguation; J2cl
    /// rules are always suffixed.
    #[must_use]
    pub fn suffix(&self, nature: Nature) -> String {
        if self.natures.len() == 1 && nature != Nature::J2cl {
            String::new()
        } else {
            format!("-{}", nature.suffix())
        }
    }

    /// Primary target of `nature`.
    #[must_use]
    pub fn target(&self, nature: Nature) -> String {
        format!("{}{}", self.primary, self.suffix(nature))
    }

    /// Alias target of `nature`.
    #[must_use]
    pub fn alias(&self, nature: Nature) -> String {
        format!("{}{}", self.alias, self.suffix(nature))
    }

    /// `http_file` repository of the sources jar.
    #[must_use]
    pub fn sources_repository(&self) -> String {
        format!("{}__sources", self.primary)
    }

    /// Import wrapped by the plugin rules.
    #[must_use]
    pub fn plugin_library(&self) -> String {
        format!("{}__plugin_library", self.primary)
    }

    /// Plugin rule for `processor`, or the processor-less plugin.
    #[must_use]
    pub fn plugin(&self, processor: Option<&str>) -> String {
        match processor {
            Some(processor) => format!("{}__{}", self.primary, fold(processor)),
            None => format!("{}__plugin", self.primary),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yaml: &str) -> ApplicationConfig {
        let mut config = ApplicationConfig::from_yaml(yaml).unwrap();
        config.validate().unwrap();
        config
    }

    #[test]
    fn test_fold() {
        assert_eq!(fold("com.example"), "com_example");
        assert_eq!(fold("My-App"), "my_app");
        assert_eq!(fold("1.0-SNAPSHOT"), "1_0_snapshot");
    }

    #[test]
    fn test_primary_and_alias() {
        let coordinate = Coordinate::new("com.example", "my-app", "1.0");
        let names = TargetNames::new(&coordinate, &config(""));
        assert_eq!(names.primary, "com_example__my_app__1_0");
        assert_eq!(names.alias, "com_example__my_app");
        assert_eq!(names.target(Nature::Java), "com_example__my_app__1_0");
        assert_eq!(names.sources_repository(), "com_example__my_app__1_0__sources");

        let names = TargetNames::new(
            &coordinate,
            &config("options:\n  namePrefix: ext_\n  aliasStrategy: ArtifactId\n"),
        );
        assert_eq!(names.primary, "ext_com_example__my_app__1_0");
        assert_eq!(names.alias, "ext_my_app");
    }

    #[test]
    fn test_per_artifact_alias_strategy() {
        let config = config("artifacts:\n  - coord: com.example:my-app\n    aliasStrategy: ArtifactId\n");
        let names = TargetNames::new(&Coordinate::new("com.example", "my-app", "1.0"), &config);
        assert_eq!(names.alias, "my_app");
        let other = TargetNames::new(&Coordinate::new("com.example", "other", "1.0"), &config);
        assert_eq!(other.alias, "com_example__other");
    }

    #[test]
    fn test_nature_suffixes() {
        let single = config("artifacts:\n  - coord: g:a\n    natures: [Plugin]\n");
        let names = TargetNames::new(&Coordinate::new("g", "a", "1"), &single);
        assert_eq!(names.suffix(Nature::Plugin), "");

        let j2cl = config("artifacts:\n  - coord: g:a\n    natures: [J2cl]\n");
        let names = TargetNames::new(&Coordinate::new("g", "a", "1"), &j2cl);
        assert_eq!(names.alias(Nature::J2cl), "g__a-j2cl");

        let both = config("artifacts:\n  - coord: g:a\n    natures: [Java, Plugin]\n");
        let names = TargetNames::new(&Coordinate::new("g", "a", "1"), &both);
        assert_eq!(names.target(Nature::Java), "g__a__1-java");
        assert_eq!(names.alias(Nature::Plugin), "g__a-plugin");
        assert_eq!(names.plugin(Some("dagger.internal.Processor")), "g__a__1__dagger_internal_processor");
        assert_eq!(names.plugin(None), "g__a__1__plugin");
    }
}
