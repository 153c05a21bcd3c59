//! Product configuration trait for CLI binaries
//!
//! The binary implements this trait to give the library its identity, the
//! registry it resolves versions from, and the environment variables that
//! override those defaults.

/// Configuration trait for a scaffolding CLI product
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, env vars)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// URL for product documentation
    fn docs_url(&self) -> &'static str;

    /// Base URL of the package registry used for latest-version lookups
    fn default_registry_url(&self) -> &'static str {
        "https://registry.npmjs.org"
    }

    /// Environment variable name for overriding the registry URL
    fn registry_url_env(&self) -> &'static str;

    /// Environment variable name for overriding the version cache directory
    fn cache_dir_env(&self) -> &'static str;

    /// Environment variable that, when set, disables live registry lookups
    fn offline_env(&self) -> &'static str;

    /// Directory namespace for the persistent version cache
    fn cache_namespace(&self) -> &'static str {
        self.name()
    }

    /// Message of the first commit in a freshly created repository
    fn initial_commit_message(&self) -> String {
        format!("Initial commit from {}", self.display_name())
    }

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::ProductConfig;

    /// Product config used across unit tests
    #[derive(Clone)]
    pub struct TestProduct;

    impl ProductConfig for TestProduct {
        fn name(&self) -> &'static str {
            "stackforge-test"
        }

        fn display_name(&self) -> &'static str {
            "Stackforge Test"
        }

        fn cli_description(&self) -> &'static str {
            "test product"
        }

        fn docs_url(&self) -> &'static str {
            "https://example.invalid/docs"
        }

        fn registry_url_env(&self) -> &'static str {
            "STACKFORGE_TEST_REGISTRY_URL"
        }

        fn cache_dir_env(&self) -> &'static str {
            "STACKFORGE_TEST_CACHE_DIR"
        }

        fn offline_env(&self) -> &'static str {
            "STACKFORGE_TEST_OFFLINE"
        }
    }

    #[test]
    fn test_default_commit_message() {
        assert_eq!(
            TestProduct.initial_commit_message(),
            "Initial commit from Stackforge Test"
        );
        assert_eq!(TestProduct.cache_namespace(), "stackforge-test");
    }
}
