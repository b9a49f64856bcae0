use std::path::Path;

use rally_core::config::ConfigFile;
use rally_core::util::normalize_text_option;

use crate::commands::common::load_config_file;
use crate::error::CliError;

pub fn run_init(
    path: &Path,
    backend_url: Option<String>,
    api_key: Option<String>,
    access_token: Option<String>,
    player_id: Option<String>,
) -> Result<(), CliError> {
    let mut file = if path.exists() {
        ConfigFile::read(path)?
    } else {
        ConfigFile::default()
    };

    for (incoming, slot) in [
        (backend_url, &mut file.backend_url),
        (api_key, &mut file.api_key),
        (access_token, &mut file.access_token),
        (player_id, &mut file.player_id),
    ] {
        if let Some(value) = normalize_text_option(incoming) {
            *slot = Some(value);
        }
    }

    // Validate eagerly so a broken value never lands on disk.
    file.clone().into_client_config()?;
    file.write(path)?;

    println!("Wrote {}", path.display());
    Ok(())
}

pub fn run_show(path: &Path) -> Result<(), CliError> {
    let config = load_config_file(path)?.into_client_config()?;
    // Debug output redacts the api key and access token.
    println!("{config:#?}");
    Ok(())
}
