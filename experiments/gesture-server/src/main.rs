use {
    base::log,
    candle_core::Device,
    gesture::TrainingService,
    gesture_server::{LOG_DIR_VAR, listen_addr, router, settings_from_env},
    std::{env, sync::Arc},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match env::var(LOG_DIR_VAR) {
        Ok(dir) => base::init_file_logger(dir)?,
        Err(_) => base::init_stdout_logger(),
    }

    let settings = settings_from_env()?;
    let device = Device::cuda_if_available(0)?;
    log::info!(
        "Gesture training server: data in {}, models under {}, {} epochs",
        settings.data_dir.display(),
        settings.models_dir().display(),
        settings.epoch_count
    );

    let service = Arc::new(TrainingService::new(settings.clone(), device));
    let app = router(service.clone(), settings.static_root.clone());

    let addr = listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
            log::info!("Shutting down");
            service.cancel();
        })
        .await?;
    Ok(())
}
