//! Command handlers for the eternal-memory CLI.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::process::ExitCode;

use eternal_memory::config::{Config, ConfigStore, Workspace};
use eternal_memory::errors::Error;
use eternal_memory::memory::MemoryStore;
use eternal_memory::sqlite::{COLLECTION_NAME, VectorStore};
use eternal_memory::{OnnxEmbedder, SOURCE_MANUAL};

use crate::output::*;

/// Commands supported by the eternal-memory CLI.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Initialize the workspace: directories, collection and configuration
    Setup {
        /// Skip the interactive cloud storage prompt
        #[arg(long)]
        no_prompt: bool,
    },
    /// Configure or disable cloud storage credentials
    #[command(group(
        clap::ArgGroup::new("action")
            .required(true)
            .args(["url", "disable"])
    ))]
    Cloud {
        /// Cloud project URL
        #[arg(long, requires = "api_key")]
        url: Option<String>,

        /// Cloud API key
        #[arg(long, requires = "url")]
        api_key: Option<String>,

        /// Turn cloud storage off
        #[arg(long, conflicts_with_all = ["url", "api_key"])]
        disable: bool,
    },
    /// Store a memory
    Store {
        /// Memory text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Source recorded in the memory's metadata
        #[arg(long, default_value = SOURCE_MANUAL)]
        source: String,

        /// Extra metadata as key=value (repeatable)
        #[arg(short = 'm', long = "meta", value_parser = parse_meta)]
        meta: Vec<(String, String)>,
    },
    /// Search memories by semantic similarity
    Search {
        /// Search query text
        query: String,

        /// Maximum number of results
        #[arg(default_value_t = 5)]
        n_results: usize,
    },
    /// Show workspace, store and configuration summary
    Status,
}

/// Parse a `key=value` metadata argument.
pub fn parse_meta(arg: &str) -> Result<(String, String), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{arg}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty metadata key in '{arg}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Execute a CLI command.
pub fn execute(command: &Commands, workspace: &Workspace, json: bool) -> Result<ExitCode, Error> {
    match command {
        Commands::Setup { no_prompt } => handle_setup(workspace, *no_prompt, json),
        Commands::Cloud {
            url,
            api_key,
            disable,
        } => handle_cloud(workspace, url.as_deref(), api_key.as_deref(), *disable, json),
        Commands::Store { text, source, meta } => {
            let extra: BTreeMap<String, String> = meta.iter().cloned().collect();
            handle_store(workspace, &text.join(" "), source, &extra, json)
        }
        Commands::Search { query, n_results } => handle_search(workspace, query, *n_results, json),
        Commands::Status => handle_status(workspace, json),
    }
}

/// Outcome of the interactive cloud storage prompt.
#[derive(Debug, PartialEq)]
pub enum CloudPrompt {
    Configured,
    MissingCredentials,
    Declined,
}

fn read_answer<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> Result<String, Error> {
    write!(output, "{prompt}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Ask whether to configure cloud storage and, on `y`, read the credentials
/// into `config`. The caller persists the config.
pub fn prompt_cloud_setup<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    config: &mut Config,
) -> Result<CloudPrompt, Error> {
    writeln!(output, "\n{}", "=".repeat(60))?;
    writeln!(output, "CLOUD STORAGE (OPTIONAL)")?;
    writeln!(output, "{}", "=".repeat(60))?;
    writeln!(output, "Cloud backup keeps memories reachable from other machines.")?;
    writeln!(output, "You'll need a {} project URL and API key.", config.storage.cloud.provider)?;

    let answer = read_answer(input, output, "\nSet up cloud storage now? (y/n): ")?;
    if !answer.eq_ignore_ascii_case("y") {
        return Ok(CloudPrompt::Declined);
    }

    let url = read_answer(input, output, "Project URL: ")?;
    let api_key = read_answer(input, output, "API key: ")?;
    if url.is_empty() || api_key.is_empty() {
        return Ok(CloudPrompt::MissingCredentials);
    }

    config.enable_cloud(&url, &api_key)?;
    Ok(CloudPrompt::Configured)
}

/// Configuration `setup` writes: an existing readable config is kept as is,
/// otherwise the defaults.
fn setup_config(workspace: &Workspace, config_store: &ConfigStore) -> Config {
    match config_store.load() {
        Ok(existing) => existing,
        Err(Error::NotInitialized(_)) => Config::default_for(workspace),
        Err(e) => {
            tracing::warn!(error = %e, "Replacing unreadable configuration with defaults");
            Config::default_for(workspace)
        }
    }
}

fn handle_setup(workspace: &Workspace, no_prompt: bool, json: bool) -> Result<ExitCode, Error> {
    let config_store = ConfigStore::for_workspace(workspace);
    let mut config = setup_config(workspace, &config_store);

    if !json {
        println!("{}", "=".repeat(60));
        println!("ETERNAL MEMORY SETUP");
        println!("{}", "=".repeat(60));
        println!("Workspace: {}\n", workspace.root().display());
    }

    let store_path = config.store_path(workspace);
    let log_dir = workspace.daily_log_dir();
    std::fs::create_dir_all(&store_path)?;
    std::fs::create_dir_all(&log_dir)?;
    VectorStore::open(&store_path, &config.embeddings.model)?.close()?;
    config_store.save(&config)?;

    if !json {
        println!("Local storage initialized at {}", store_path.display());
        println!("Daily logs directory: {}", log_dir.display());
        println!("Configuration saved to {}", config_store.path().display());
    }

    // the prompt would interleave with JSON on stdout
    if !no_prompt && !json {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        match prompt_cloud_setup(&mut stdin.lock(), &mut stdout, &mut config)? {
            CloudPrompt::Configured => {
                config_store.save(&config)?;
                println!("Cloud storage configured.");
            }
            CloudPrompt::MissingCredentials => {
                println!("Skipping cloud setup (missing credentials)");
            }
            CloudPrompt::Declined => {
                println!("Cloud storage skipped. Configure it later with 'eternal-memory cloud'.");
            }
        }
    }

    if json {
        print_json(&SetupResponse {
            status: "initialized".to_string(),
            workspace: workspace.root().to_path_buf(),
            config_path: config_store.path().to_path_buf(),
            store_path,
            daily_log_dir: log_dir,
            cloud_enabled: config.storage.cloud.enabled,
        });
    } else {
        println!("\n{}", "=".repeat(60));
        println!("SETUP COMPLETE");
        println!("{}", "=".repeat(60));
        println!("\nNext steps:");
        println!("1. Store your first memory:");
        println!("   eternal-memory store 'Your memory here'");
        println!("\n2. Search memories:");
        println!("   eternal-memory search 'query'");
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_cloud(
    workspace: &Workspace,
    url: Option<&str>,
    api_key: Option<&str>,
    disable: bool,
    json: bool,
) -> Result<ExitCode, Error> {
    // raw load: the model env override must not end up in the saved file
    let config_store = ConfigStore::for_workspace(workspace);
    let mut config = config_store.load()?;

    if disable {
        config.disable_cloud();
    } else {
        let (url, api_key) = url.zip(api_key).ok_or_else(|| {
            Error::InvalidInput("--url and --api-key must be given together".to_string())
        })?;
        config.enable_cloud(url, api_key)?;
    }
    config_store.save(&config)?;

    let cloud = &config.storage.cloud;
    if json {
        print_json(&CloudResponse {
            status: if cloud.enabled { "enabled" } else { "disabled" }.to_string(),
            cloud_enabled: cloud.enabled,
            url: cloud.url.clone(),
        });
    } else if cloud.enabled {
        println!("Cloud storage enabled ({}: {})", cloud.provider, cloud.url);
    } else {
        println!("Cloud storage disabled");
    }
    Ok(ExitCode::SUCCESS)
}

fn open_memory_store(workspace: &Workspace) -> Result<MemoryStore, Error> {
    let config = Config::load(workspace)?;
    let embedder = OnnxEmbedder::new(&config.embeddings.model, config.embeddings.cache_dir.clone());
    MemoryStore::open(&config, workspace, embedder)
}

fn handle_store(
    workspace: &Workspace,
    text: &str,
    source: &str,
    extra: &BTreeMap<String, String>,
    json: bool,
) -> Result<ExitCode, Error> {
    MemoryStore::<OnnxEmbedder>::validate_input_length(text)?;

    let mut store = open_memory_store(workspace)?;
    if !json {
        println!("Generating embedding...");
    }
    store.embedder_mut().ensure_loaded()?;

    let outcome = store.store(text, source, extra)?;
    if json {
        print_json(&StoreResponse {
            status: "stored".to_string(),
            id: outcome.id,
            total: outcome.total,
            log_path: outcome.log_path,
        });
    } else {
        println!("Memory stored! (ID: {})", outcome.id);
        println!("   Total memories: {}", outcome.total);
        if let Some(path) = outcome.log_path {
            println!("   Also logged to: {}", path.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_search(
    workspace: &Workspace,
    query: &str,
    n_results: usize,
    json: bool,
) -> Result<ExitCode, Error> {
    let mut store = open_memory_store(workspace)?;

    if store.count()? == 0 {
        if json {
            print_json(&SearchResponse { results: Vec::new() });
        } else {
            println!("No memories stored yet!");
        }
        return Ok(ExitCode::SUCCESS);
    }

    store.embedder_mut().ensure_loaded()?;
    if !json {
        println!("Searching for: '{query}'...\n");
    }
    let hits = store.search(query, n_results)?;

    if json {
        let results = hits.into_iter().map(SearchResultItem::from).collect();
        print_json(&SearchResponse { results });
    } else {
        print_hits(&hits);
    }
    Ok(ExitCode::SUCCESS)
}

/// Collect `status` without creating the store or rebinding its model.
fn status_report(workspace: &Workspace) -> Result<StatusResponse, Error> {
    let config = Config::load(workspace)?;
    let store_path = config.store_path(workspace);

    let (count, stored_model) = match VectorStore::open_existing(&store_path)? {
        Some(vectors) => {
            let count = vectors.count()?;
            let stored_model = vectors.model_id()?;
            vectors.close()?;
            (count, stored_model)
        }
        None => (0, None),
    };
    let model_mismatch = stored_model
        .as_deref()
        .is_some_and(|stored| count > 0 && stored != config.embeddings.model);

    Ok(StatusResponse {
        workspace: workspace.root().to_path_buf(),
        config_path: workspace.config_path(),
        model: config.embeddings.model.clone(),
        stored_model,
        model_mismatch,
        store_path,
        collection: COLLECTION_NAME.to_string(),
        count,
        daily_logs: config.auto_capture.daily_logs,
        cloud_enabled: config.storage.cloud.enabled,
    })
}

fn handle_status(workspace: &Workspace, json: bool) -> Result<ExitCode, Error> {
    let status = status_report(workspace)?;
    if json {
        print_json(&status);
    } else {
        print_status(&status);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_status(status: &StatusResponse) {
    let on_off = |flag: bool| if flag { "enabled" } else { "disabled" };
    println!("Workspace:   {}", status.workspace.display());
    println!("Config:      {}", status.config_path.display());
    println!("Model:       {}", status.model);
    if let Some(stored) = &status.stored_model {
        if status.model_mismatch {
            println!("Stored with: {stored} (differs from configured model)");
        } else if stored != &status.model {
            println!("Stored with: {stored}");
        }
    }
    println!("Store:       {}", status.store_path.display());
    println!("Collection:  {} ({} memories)", status.collection, status.count);
    println!("Daily logs:  {}", on_off(status.daily_logs));
    println!("Cloud:       {}", on_off(status.cloud_enabled));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn default_config(dir: &TempDir) -> Config {
        Config::default_for(&Workspace::new(dir.path()))
    }

    #[test]
    fn test_parse_meta() {
        assert_eq!(
            parse_meta("topic=ui").unwrap(),
            ("topic".to_string(), "ui".to_string())
        );
        assert_eq!(
            parse_meta("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_meta("novalue").is_err());
        assert!(parse_meta("=value").is_err());
    }

    #[test]
    fn test_prompt_declined() {
        let dir = TempDir::new().unwrap();
        let mut config = default_config(&dir);
        let mut input = Cursor::new("n\n");
        let mut output = Vec::new();

        let outcome = prompt_cloud_setup(&mut input, &mut output, &mut config).unwrap();
        assert_eq!(outcome, CloudPrompt::Declined);
        assert!(!config.storage.cloud.enabled);

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Set up cloud storage now? (y/n)"));
    }

    #[test]
    fn test_prompt_configures_cloud() {
        let dir = TempDir::new().unwrap();
        let mut config = default_config(&dir);
        let mut input = Cursor::new("Y\nhttps://example.supabase.co\nsecret-key\n");
        let mut output = Vec::new();

        let outcome = prompt_cloud_setup(&mut input, &mut output, &mut config).unwrap();
        assert_eq!(outcome, CloudPrompt::Configured);
        assert!(config.storage.cloud.enabled);
        assert_eq!(config.storage.cloud.url, "https://example.supabase.co");
        assert_eq!(config.storage.cloud.api_key, "secret-key");
    }

    #[test]
    fn test_prompt_missing_credentials() {
        let dir = TempDir::new().unwrap();
        let mut config = default_config(&dir);
        let mut input = Cursor::new("y\nhttps://example.supabase.co\n\n");
        let mut output = Vec::new();

        let outcome = prompt_cloud_setup(&mut input, &mut output, &mut config).unwrap();
        assert_eq!(outcome, CloudPrompt::MissingCredentials);
        assert!(!config.storage.cloud.enabled);
    }

    #[test]
    fn test_prompt_eof_declines() {
        let dir = TempDir::new().unwrap();
        let mut config = default_config(&dir);
        let mut input = Cursor::new("");
        let mut output = Vec::new();

        let outcome = prompt_cloud_setup(&mut input, &mut output, &mut config).unwrap();
        assert_eq!(outcome, CloudPrompt::Declined);
    }

    #[test]
    fn test_setup_is_idempotent_and_keeps_cloud() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path());

        handle_setup(&workspace, true, true).unwrap();
        handle_cloud(&workspace, Some("https://x.example"), Some("key"), false, true).unwrap();
        handle_setup(&workspace, true, true).unwrap();

        let config = ConfigStore::for_workspace(&workspace).load().unwrap();
        assert!(config.storage.cloud.enabled);
        assert_eq!(config.storage.cloud.url, "https://x.example");
        assert!(workspace.default_store_path().join("memories.db").exists());
        assert!(workspace.daily_log_dir().is_dir());
    }

    #[test]
    fn test_cloud_disable() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path());
        handle_setup(&workspace, true, true).unwrap();
        handle_cloud(&workspace, Some("https://x.example"), Some("key"), false, true).unwrap();

        handle_cloud(&workspace, None, None, true, true).unwrap();
        let config = ConfigStore::for_workspace(&workspace).load().unwrap();
        assert!(!config.storage.cloud.enabled);
    }

    #[test]
    fn test_cloud_before_setup_not_initialized() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path());

        let result = handle_cloud(&workspace, None, None, true, true);
        assert!(matches!(result, Err(Error::NotInitialized(_))));
    }

    #[test]
    fn test_status_after_setup() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path());
        handle_setup(&workspace, true, true).unwrap();

        assert!(handle_status(&workspace, true).is_ok());
    }

    #[test]
    fn test_setup_keeps_custom_store_path_and_flags() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path());
        handle_setup(&workspace, true, true).unwrap();

        let config_store = ConfigStore::for_workspace(&workspace);
        let custom = dir.path().join("custom-store");
        let mut config = config_store.load().unwrap();
        config.storage.local.path = custom.clone();
        config.auto_capture.daily_logs = false;
        config_store.save(&config).unwrap();

        handle_setup(&workspace, true, true).unwrap();

        let config = config_store.load().unwrap();
        assert_eq!(config.storage.local.path, custom);
        assert!(!config.auto_capture.daily_logs);
        assert!(custom.join("memories.db").exists());
    }

    #[test]
    fn test_status_does_not_create_store() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path());
        let config = default_config(&dir);
        ConfigStore::for_workspace(&workspace).save(&config).unwrap();
        let store_path = config.store_path(&workspace);

        let status = status_report(&workspace).unwrap();
        assert_eq!(status.count, 0);
        assert_eq!(status.stored_model, None);
        assert!(!status.model_mismatch);
        assert!(!store_path.exists());
    }

    #[test]
    fn test_status_reports_model_mismatch() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path());
        handle_setup(&workspace, true, true).unwrap();

        let config_store = ConfigStore::for_workspace(&workspace);
        let mut config = config_store.load().unwrap();
        let store_path = config.store_path(&workspace);
        let vectors = VectorStore::open(&store_path, "old/model").unwrap();
        let metadata = eternal_memory::memory_types::Metadata::now(SOURCE_MANUAL);
        vectors.add("mem_1", &[1.0, 0.0], "kept", &metadata).unwrap();
        vectors.close().unwrap();

        config.embeddings.model = "new/model".to_string();
        config_store.save(&config).unwrap();

        let status = status_report(&workspace).unwrap();
        assert_eq!(status.count, 1);
        assert_eq!(status.stored_model.as_deref(), Some("old/model"));
        assert!(status.model_mismatch);

        let vectors = VectorStore::open_existing(&store_path).unwrap().unwrap();
        assert_eq!(vectors.model_id().unwrap().as_deref(), Some("old/model"));
    }

    #[test]
    fn test_store_rejects_blank_text_before_loading_model() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path());
        handle_setup(&workspace, true, true).unwrap();

        let result = handle_store(&workspace, "   ", SOURCE_MANUAL, &BTreeMap::new(), true);
        assert!(matches!(result, Err(Error::EmptyInput)));
    }

    #[test]
    fn test_search_empty_store_does_not_load_model() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path());
        handle_setup(&workspace, true, true).unwrap();

        assert!(handle_search(&workspace, "anything", 5, true).is_ok());
    }
}
