use crate::args::Args;
use crate::chain::Chain;
use crate::env::Env;
use crate::error::LookfigError;
use crate::file::{self, JsonFile, TomlFile};
use crate::source::{Defaults, Source};
use crate::types::SearchPath;

impl Chain {
    pub fn builder() -> ChainBuilder {
        ChainBuilder::new()
    }
}

enum Layer {
    Ready(Box<dyn Source>),
    Env,
    JsonIn(SearchPath, String),
    TomlIn(SearchPath, String),
}

/// Builder for a [`Chain`] of sources.
///
/// Layers are listed in **priority-descending** order: the first one added
/// wins. A typical setup reads arguments first, then the environment, then a
/// config file, then compiled defaults:
///
/// ```ignore
/// let chain = Chain::builder()
///     .app_name("myapp")
///     .args("--")
///     .env()
///     .json_file_in(SearchPath::Platform, "config.json")
///     .defaults(Defaults::from([("PORT", "8080")]))
///     .build()?;
/// ```
pub struct ChainBuilder {
    app_name: Option<String>,
    env_prefix: Option<String>,
    layers: Vec<Layer>,
}

impl ChainBuilder {
    fn new() -> Self {
        Self {
            app_name: None,
            env_prefix: None,
            layers: Vec::new(),
        }
    }

    /// Set the application name. It names the [`SearchPath::Platform`]
    /// directory and derives the env prefix (`"{APP_NAME}_"`, uppercased,
    /// dashes as underscores).
    pub fn app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    /// Override the environment variable prefix. `""` reads bare keys.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Add any source.
    pub fn source(mut self, source: impl Source + 'static) -> Self {
        self.layers.push(Layer::Ready(Box::new(source)));
        self
    }

    /// Add the process arguments of the form `<prefix><KEY>=<value>`.
    pub fn args(self, prefix: &str) -> Self {
        self.source(Args::from_env(prefix))
    }

    /// Add the process environment, keys prefixed per
    /// [`env_prefix`](Self::env_prefix).
    pub fn env(mut self) -> Self {
        self.layers.push(Layer::Env);
        self
    }

    /// Add a JSON file that must exist.
    pub fn json_file(self, path: impl Into<std::path::PathBuf>) -> Self {
        self.source(JsonFile::new(path))
    }

    /// Add `file_name` inside a search location. A missing file, or a
    /// location that cannot be resolved on this system, is skipped.
    pub fn json_file_in(mut self, location: SearchPath, file_name: &str) -> Self {
        self.layers
            .push(Layer::JsonIn(location, file_name.to_string()));
        self
    }

    /// Add a TOML file that must exist.
    pub fn toml_file(self, path: impl Into<std::path::PathBuf>) -> Self {
        self.source(TomlFile::new(path))
    }

    /// TOML counterpart of [`json_file_in`](Self::json_file_in).
    pub fn toml_file_in(mut self, location: SearchPath, file_name: &str) -> Self {
        self.layers
            .push(Layer::TomlIn(location, file_name.to_string()));
        self
    }

    /// Add compiled-in defaults. Usually the last layer.
    pub fn defaults(self, defaults: Defaults) -> Self {
        self.source(defaults)
    }

    /// Resolve the effective env prefix.
    fn effective_env_prefix(&self) -> String {
        if let Some(prefix) = &self.env_prefix {
            return prefix.clone();
        }
        match &self.app_name {
            Some(app) => format!("{}_", app.to_uppercase().replace('-', "_")),
            None => String::new(),
        }
    }

    /// Resolve a search location, or `Ok(None)` if this system has no such
    /// directory.
    fn locate(
        &self,
        location: &SearchPath,
        file_name: &str,
    ) -> Result<Option<std::path::PathBuf>, LookfigError> {
        let app_name = match (location, self.app_name.as_deref()) {
            (SearchPath::Platform, None) => {
                return Err(LookfigError::AppNameRequired {
                    location: location.clone(),
                });
            }
            (_, name) => name.unwrap_or_default(),
        };
        match file::resolve_search_path(location, app_name) {
            Some(dir) => Ok(Some(dir.join(file_name))),
            None => {
                tracing::debug!(?location, "search location unavailable, skipping");
                Ok(None)
            }
        }
    }

    /// Assemble the chain. No file is read until the first lookup.
    pub fn build(mut self) -> Result<Chain, LookfigError> {
        let env_prefix = self.effective_env_prefix();
        let layers = std::mem::take(&mut self.layers);
        let mut sources: Vec<Box<dyn Source>> = Vec::with_capacity(layers.len());
        for layer in layers {
            match layer {
                Layer::Ready(source) => sources.push(source),
                Layer::Env => sources.push(Box::new(Env::process().with_prefix(&env_prefix))),
                Layer::JsonIn(location, name) => {
                    if let Some(path) = self.locate(&location, &name)? {
                        sources.push(Box::new(JsonFile::new(path).allow_missing()));
                    }
                }
                Layer::TomlIn(location, name) => {
                    if let Some(path) = self.locate(&location, &name)? {
                        sources.push(Box::new(TomlFile::new(path).allow_missing()));
                    }
                }
            }
        }
        tracing::debug!(sources = sources.len(), "built source chain");
        Ok(Chain::new(sources))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn first_layer_wins() {
        let chain = Chain::builder()
            .defaults(Defaults::from([("A", "first")]))
            .defaults(Defaults::from([("A", "second"), ("B", "second")]))
            .build()
            .unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.lookup_key("A").unwrap().as_deref(), Some("first"));
        assert_eq!(chain.lookup_key("B").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn app_name_derives_env_prefix() {
        let builder = Chain::builder().app_name("my-app");
        assert_eq!(builder.effective_env_prefix(), "MY_APP_");
    }

    #[test]
    fn explicit_env_prefix_wins() {
        let builder = Chain::builder().app_name("myapp").env_prefix("");
        assert_eq!(builder.effective_env_prefix(), "");
    }

    #[test]
    fn no_app_name_means_bare_env_keys() {
        assert_eq!(Chain::builder().effective_env_prefix(), "");
    }

    #[test]
    fn platform_location_needs_app_name() {
        let result = Chain::builder()
            .json_file_in(SearchPath::Platform, "config.json")
            .build();
        assert!(matches!(
            result,
            Err(LookfigError::AppNameRequired {
                location: SearchPath::Platform
            })
        ));
    }

    #[test]
    fn json_file_in_explicit_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.json"), r#"{"PORT": 3000}"#).unwrap();

        let chain = Chain::builder()
            .json_file_in(SearchPath::Path(dir.path().to_path_buf()), "app.json")
            .defaults(Defaults::from([("PORT", "80"), ("HOST", "localhost")]))
            .build()
            .unwrap();
        assert_eq!(chain.lookup_key("PORT").unwrap().as_deref(), Some("3000"));
        assert_eq!(chain.lookup_key("HOST").unwrap().as_deref(), Some("localhost"));
    }

    #[test]
    fn missing_file_in_location_is_skipped() {
        let dir = TempDir::new().unwrap();
        let chain = Chain::builder()
            .toml_file_in(SearchPath::Path(dir.path().to_path_buf()), "absent.toml")
            .defaults(Defaults::from([("PORT", "80")]))
            .build()
            .unwrap();
        assert_eq!(chain.lookup_key("PORT").unwrap().as_deref(), Some("80"));
    }

    #[test]
    fn explicit_missing_file_fails_on_lookup() {
        let dir = TempDir::new().unwrap();
        let chain = Chain::builder()
            .toml_file(dir.path().join("absent.toml"))
            .build()
            .unwrap();
        assert!(chain.lookup_key("PORT").is_err());
    }

    #[test]
    fn toml_file_in_reads_nested_tables() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.toml"), "[server]\nport = 9000\n").unwrap();

        let chain = Chain::builder()
            .app_name("myapp")
            .toml_file_in(SearchPath::Path(dir.path().to_path_buf()), "app.toml")
            .build()
            .unwrap();
        assert_eq!(chain.lookup_key("server.port").unwrap().as_deref(), Some("9000"));
    }

    #[test]
    fn env_layer_uses_process_environment() {
        let chain = Chain::builder().env_prefix("").env().build().unwrap();
        assert_eq!(
            chain.lookup_key("PATH").unwrap(),
            std::env::var("PATH").ok()
        );
    }
}
