use catalog_core::catalog::CatalogService;
use catalog_core::config::{AppConfig, LoadOptions, StorageBackend};
use catalog_db::{open_store, seed_if_empty, SeedResult};

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    // A memory catalog would vanish as soon as this process exits.
    if config.storage.backend == StorageBackend::Memory {
        return CommandResult::failure(
            "seed",
            "unsupported_backend",
            "seed requires a persistent backend; storage.backend is `memory`",
            2,
        );
    }

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let store = open_store(&config.storage)
            .await
            .map_err(|error| ("store_open", error.to_string(), 4u8))?;
        seed_if_empty(&CatalogService::new(store))
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))
    });

    match result {
        Ok(seeded) => CommandResult::success("seed", describe(&seeded, &config)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn describe(seeded: &SeedResult, config: &AppConfig) -> String {
    let path = config.storage.path.display();
    if seeded.inserted.is_empty() {
        return format!(
            "catalog at `{path}` already holds {} products; demo data not loaded",
            seeded.skipped_existing
        );
    }

    let ids = seeded.inserted.iter().map(|id| id.as_str()).collect::<Vec<_>>();
    format!("loaded {} demo products into `{path}`: {}", ids.len(), ids.join(", "))
}
