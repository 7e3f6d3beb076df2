#[cfg(test)]
pub mod test {
    use confique::Config;
    use serde::{Deserialize, Serialize};

    use crate::registry::ScopeRegistry;
    use crate::scope::{ConfigurationObject, ScopeKey};

    #[derive(Config, Serialize, Deserialize, Debug, PartialEq)]
    pub struct PublishConfig {
        /// Track to publish to.
        #[config(default = "internal")]
        pub track: String,

        /// Release status of the uploaded artifacts.
        pub release_status: Option<String>,

        /// Fraction of users receiving a staged rollout.
        pub user_fraction: Option<f64>,

        /// In-app update priority.
        #[config(default = 0)]
        pub update_priority: u32,

        /// Publish app bundles instead of APKs.
        #[config(default = false)]
        pub default_to_app_bundles: bool,

        /// Promotion settings.
        #[config(nested)]
        pub promote: PromoteConfig,
    }

    #[derive(Config, Serialize, Deserialize, Debug, PartialEq)]
    pub struct PromoteConfig {
        /// Track to promote from.
        pub from_track: Option<String>,

        /// Commit the edit after promoting.
        #[config(default = true)]
        pub commit: bool,
    }

    /// Schema with a required field and no default, for load failures.
    #[derive(Config, Serialize, Deserialize, Debug, PartialEq)]
    pub struct RequiredConfig {
        pub service_account: String,
    }

    pub fn object(name: &str, toml_str: &str) -> ConfigurationObject {
        ConfigurationObject::from_toml_str(name, toml_str).unwrap()
    }

    /// A registry with one object per scope kind.
    ///
    /// Flavor `free` lives in dimension `tier`; build type `release`.
    pub fn full_registry() -> ScopeRegistry<PublishConfig> {
        let mut registry = ScopeRegistry::new();
        registry
            .register(ScopeKey::Base, object("base", "track = \"internal\"\nupdate_priority = 1\nuser_fraction = 0.1\n[promote]\ncommit = false\n"))
            .unwrap();
        registry
            .register(
                ScopeKey::BuildType("release".into()),
                object("release", "track = \"production\"\nrelease_status = \"completed\"\n"),
            )
            .unwrap();
        registry
            .register(
                ScopeKey::Dimension("tier".into()),
                object("tier", "update_priority = 2\n"),
            )
            .unwrap();
        registry
            .register(
                ScopeKey::Flavor("free".into()),
                object("free", "track = \"beta\"\n"),
            )
            .unwrap();
        registry
            .register(
                ScopeKey::Variant("freeRelease".into()),
                object("freeRelease", "release_status = \"draft\"\n"),
            )
            .unwrap();
        registry
    }

    #[test]
    fn publish_config_loads_defaults() {
        let config = PublishConfig::builder().load().unwrap();
        assert_eq!(config.track, "internal");
        assert_eq!(config.release_status, None);
        assert_eq!(config.update_priority, 0);
        assert!(!config.default_to_app_bundles);
        assert_eq!(config.promote.from_track, None);
        assert!(config.promote.commit);
    }
}
