// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tubecast serve` command implementation.
//!
//! Builds every adapter once, hands them to a single [`Coordinator`], and
//! runs the dispatch loop until SIGINT/SIGTERM. Requests already running at
//! shutdown are awaited before the store is checkpointed.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tubecast_cache::{ContentCache, HttpLoader};
use tubecast_config::model::TubecastConfig;
use tubecast_coordinator::{
    install_signal_handler, Collaborators, Coordinator, CoordinatorSettings, DispatchLoop,
};
use tubecast_core::{AudioStore, PluginAdapter, TubecastError, UpdateSource};
use tubecast_ffmpeg::{locate_ffmpeg, ConversionProfile, FfmpegEngine};
use tubecast_storage::SqliteStore;
use tubecast_telegram::TelegramGateway;
use tubecast_youtube::{YoutubeClient, YtDlp};

/// Output encoding taken from the `[conversion]` section.
pub fn conversion_profile(config: &TubecastConfig) -> ConversionProfile {
    ConversionProfile {
        codec: config.conversion.codec.clone(),
        bitrate: config.conversion.bitrate.clone(),
        container: config.conversion.container.clone(),
    }
}

/// Runs the `tubecast serve` command.
pub async fn run_serve(config: TubecastConfig) -> Result<(), TubecastError> {
    info!("starting tubecast serve");

    let store = {
        let store = SqliteStore::new(config.storage.clone());
        store.initialize().await?;
        Arc::new(store)
    };

    let cache = Arc::new(ContentCache::open(&config.cache.root)?);
    let timeout = Duration::from_secs(config.network.timeout_secs);
    let loader = Arc::new(HttpLoader::new(
        cache.clone(),
        config.network.max_redirects,
        timeout,
    )?);

    let ffmpeg = locate_ffmpeg(config.conversion.ffmpeg_binary.as_deref()).await?;
    let transcoder = Arc::new(FfmpegEngine::new(
        ffmpeg,
        conversion_profile(&config),
        config.conversion.max_parallel,
        cache.clone(),
    ));
    info!(
        binary = %transcoder.binary().display(),
        max_parallel = transcoder.capacity(),
        "conversion engine ready"
    );

    let api_key = config
        .youtube
        .api_key
        .clone()
        .ok_or_else(|| TubecastError::Config("youtube.api_key is required".into()))?;
    let metadata = Arc::new(YoutubeClient::new(
        &config.youtube.api_base_url,
        api_key,
        YtDlp::new(&config.youtube.ytdlp_binary, &config.youtube.audio_format),
        timeout,
    )?);

    let gateway = {
        let mut gateway = TelegramGateway::new(&config.telegram)?;
        gateway.connect().await?;
        Arc::new(gateway)
    };

    let coordinator = Arc::new(Coordinator::new(
        Collaborators {
            gateway: gateway.clone(),
            metadata: metadata.clone(),
            loader: loader.clone(),
            transcoder,
            store: store.clone(),
        },
        cache,
        CoordinatorSettings::from_config(&config),
    ));

    let cancel = install_signal_handler();
    let dispatch = DispatchLoop::new(
        gateway.clone(),
        coordinator,
        config.telegram.allowed_chats.clone(),
    );
    dispatch.run(cancel).await?;

    let adapters: [&dyn PluginAdapter; 3] = [gateway.as_ref(), metadata.as_ref(), loader.as_ref()];
    for adapter in adapters {
        if let Err(e) = adapter.shutdown().await {
            warn!(adapter = adapter.name(), error = %e, "adapter shutdown failed");
        }
    }
    store.close().await?;

    info!("tubecast serve shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_follows_conversion_section() {
        let mut config = TubecastConfig::default();
        config.conversion.codec = "libopus".into();
        config.conversion.bitrate = "96k".into();
        config.conversion.container = "ogg".into();

        let profile = conversion_profile(&config);
        assert_eq!(profile.codec, "libopus");
        assert_eq!(profile.bitrate, "96k");
        assert_eq!(profile.container, "ogg");
    }

    #[test]
    fn default_profile_matches_engine_default() {
        assert_eq!(
            conversion_profile(&TubecastConfig::default()),
            ConversionProfile::default()
        );
    }
}
