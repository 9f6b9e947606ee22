//! INI configuration files
//!
//! ```ini
//! # prepended to every command line
//! defaults = --threads 4 --stats
//!
//! [aliases]
//! acme = --seller-id 11.222.333/0001-81
//! acme-future = -a acme --values future
//!
//! [columns]
//! document_number = 17
//! ```

use anyhow::{anyhow, Context, Result};
use std::collections::{HashMap, HashSet};
use std::env;
use std::path::{Path, PathBuf};

use crate::config::ColumnLayout;

const PROJECT_FILE_NAME: &str = ".docsumrc";
const MAX_ALIAS_DEPTH: usize = 10;

/// Configuration file handler for docsum
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigFile {
    pub defaults: Option<String>,
    pub aliases: HashMap<String, String>,
    /// Column index overrides in file order
    pub columns: Vec<(String, String)>,
}

impl ConfigFile {
    /// Find project-level .docsumrc by walking up from the working directory
    pub fn find_project_config() -> Option<PathBuf> {
        let current = env::current_dir().ok()?;
        Self::find_project_config_from(&current)
    }

    pub fn find_project_config_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(PROJECT_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// User config file locations in order of preference
    pub fn get_user_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if cfg!(windows) {
            if let Ok(appdata) = env::var("APPDATA") {
                paths.push(PathBuf::from(appdata).join("docsum").join("config.ini"));
            }
            if let Ok(userprofile) = env::var("USERPROFILE") {
                paths.push(PathBuf::from(userprofile).join(PROJECT_FILE_NAME));
            }
        } else {
            let xdg_config = env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    env::var("HOME")
                        .map(|h| PathBuf::from(h).join(".config"))
                        .unwrap_or_else(|_| PathBuf::from(".config"))
                });
            paths.push(xdg_config.join("docsum").join("config.ini"));

            if let Ok(home) = env::var("HOME") {
                paths.push(PathBuf::from(home).join(PROJECT_FILE_NAME));
            }
        }

        paths
    }

    /// Load configuration with precedence project > user > defaults
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Only the first existing user file counts
        if let Some(path) = Self::get_user_config_paths().into_iter().find(|p| p.is_file()) {
            config = config.merge(Self::load_from_path(&path)?);
        }

        if let Some(project_path) = Self::find_project_config() {
            config = config.merge(Self::load_from_path(&project_path)?);
        }

        Ok(config)
    }

    /// `--config-file` replaces discovery entirely
    pub fn load_with_custom_path(custom_path: Option<&str>) -> Result<Self> {
        match custom_path {
            Some(path) => Self::load_from_path(Path::new(path)),
            None => Self::load(),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse_ini_content(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    fn parse_ini_content(content: &str) -> Result<Self> {
        let mut config = Self::default();
        let mut current_section = String::new();

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current_section = section.trim().to_string();
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(anyhow!("line {}: expected 'key = value'", number + 1));
            };
            let (key, value) = (key.trim(), value.trim());

            match current_section.as_str() {
                "" if key == "defaults" => config.defaults = Some(value.to_string()),
                "aliases" => {
                    config.aliases.insert(key.to_string(), value.to_string());
                }
                "columns" => config.columns.push((key.to_string(), value.to_string())),
                // Unknown keys and sections are ignored
                _ => {}
            }
        }

        Ok(config)
    }

    /// Merge with `overlay` taking precedence
    fn merge(self, overlay: Self) -> Self {
        let mut aliases = self.aliases;
        aliases.extend(overlay.aliases);
        let mut columns = self.columns;
        columns.extend(overlay.columns);

        Self {
            defaults: overlay.defaults.or(self.defaults),
            aliases,
            columns,
        }
    }

    /// Apply the `[columns]` section to a layout. Later entries win.
    pub fn apply_columns(&self, layout: &mut ColumnLayout) -> Result<(), String> {
        for (name, index) in &self.columns {
            layout
                .apply(name, index)
                .map_err(|e| format!("config [columns]: {}", e))?;
        }
        Ok(())
    }

    /// Resolve a single alias, expanding nested `-a NAME` references
    pub fn resolve_alias(&self, name: &str, seen: &mut HashSet<String>, depth: usize) -> Result<Vec<String>> {
        if depth > MAX_ALIAS_DEPTH {
            return Err(anyhow!("Alias chain too deep: {} levels", depth));
        }
        if !seen.insert(name.to_string()) {
            return Err(anyhow!("Circular dependency detected in alias: {}", name));
        }

        let alias_value = self
            .aliases
            .get(name)
            .ok_or_else(|| anyhow!("Unknown alias: {}", name))?;
        let args = shell_words::split(alias_value)
            .with_context(|| format!("Invalid alias '{}': failed to parse arguments", name))?;

        let resolved = self.expand_aliases(args, seen, depth + 1)?;
        seen.remove(name);
        Ok(resolved)
    }

    fn expand_aliases(&self, args: Vec<String>, seen: &mut HashSet<String>, depth: usize) -> Result<Vec<String>> {
        let mut result = Vec::with_capacity(args.len());
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            if arg == "-a" || arg == "--alias" {
                match args.next() {
                    Some(name) => result.extend(self.resolve_alias(&name, seen, depth)?),
                    None => result.push(arg),
                }
            } else {
                result.push(arg);
            }
        }

        Ok(result)
    }

    /// Prepend `defaults` (after the program name) and expand aliases
    pub fn process_args(&self, args: Vec<String>) -> Result<Vec<String>> {
        let mut combined = Vec::with_capacity(args.len());
        let mut args = args.into_iter();
        combined.extend(args.next());

        if let Some(defaults) = &self.defaults {
            let default_args = shell_words::split(defaults)
                .context("Invalid defaults: failed to parse arguments")?;
            combined.extend(default_args);
        }
        combined.extend(args);

        self.expand_aliases(combined, &mut HashSet::new(), 0)
    }

    /// Print where configuration is searched and what is active.
    /// `custom_path` is the `--config-file` value, which replaces discovery.
    pub fn show_config(custom_path: Option<&str>) {
        println!("Configuration precedence: CLI > project .docsumrc > user config > defaults\n");

        match Self::load_with_custom_path(custom_path) {
            Ok(config) => {
                match &config.defaults {
                    Some(defaults) => println!("defaults = {}", defaults),
                    None => println!("No defaults configured."),
                }

                if !config.aliases.is_empty() {
                    println!("\n[aliases]");
                    let mut sorted: Vec<_> = config.aliases.iter().collect();
                    sorted.sort_by_key(|(k, _)| k.as_str());
                    for (key, value) in sorted {
                        println!("{} = {}", key, value);
                    }
                }

                if !config.columns.is_empty() {
                    println!("\n[columns]");
                    for (key, value) in &config.columns {
                        println!("{} = {}", key, value);
                    }
                }
            }
            Err(e) => eprintln!("Error loading configuration: {:#}", e),
        }

        if let Some(path) = custom_path {
            println!("\nConfiguration file: {} (--config-file, discovery skipped)", path);
            return;
        }

        println!("\nConfiguration search locations (in precedence order):");
        match &Self::find_project_config() {
            Some(path) => println!("  1. Project: {} (found)", path.display()),
            None => println!("  1. Project: {} (searched up directory tree, not found)", PROJECT_FILE_NAME),
        }
        for (i, path) in Self::get_user_config_paths().iter().enumerate() {
            let status = if path.is_file() { "(found)" } else { "(not found)" };
            println!("  {}. User: {} {}", i + 2, path.display(), status);
        }
    }
}
