use std::path::Path;

#[cfg(unix)]
use std::fs;

use actix_web::{middleware::Logger, web, App, HttpServer};

use primeadview_domain::auth::AuthVerifier;
use primeadview_domain::config::{ApiConfig, ConfigError};
use primeadview_domain::services::telemetry::{init_telemetry, TelemetryConfig, TelemetryError};
use primeadview_storage::SeaOrmStorage;
use thiserror::Error;

use crate::{
    handlers::{
        activate_package_handler, claim_reward_handler, create_ad_handler,
        create_package_handler, deactivate_account_handler, deposit_handler,
        earnings_today_handler, list_ads_handler, list_packages_handler, metrics_handler,
        profile_handler, provision_profile_handler, request_withdrawal_handler,
        transactions_handler,
    },
    state::AppState,
};

// 应用程序启动入口函数。
pub async fn run() -> Result<(), BootstrapError> {
    // 1. 加载配置
    let config = ApiConfig::load_from_env()?;

    // 2. 初始化遥测（日志 + 指标），环境变量前缀为 "API"。
    let telemetry_config = TelemetryConfig::from_env("API");
    let telemetry = init_telemetry(&telemetry_config)?;

    // 3. 连接数据库并确保表结构存在。
    let storage = SeaOrmStorage::connect(config.database_url()).await?;

    // 4. 构建凭证校验器。令牌由托管认证服务签发，这里只做验证。
    let verifier = AuthVerifier::new(config.auth_jwt_secret());

    // 5. 组合应用共享状态。
    let state = AppState::new(storage, verifier, telemetry.clone());

    // 如果配置了内部监听器，指标端点只在内部接口暴露。
    let include_metrics_on_public = !config.has_internal_listener();

    let public_state = state.clone();

    // 6. 配置公共 HTTP 服务器。
    let mut public_server = HttpServer::new(move || {
        let mut app = App::new()
            .app_data(web::Data::new(public_state.clone()))
            .wrap(Logger::default())
            .route("/api/v1/deposit", web::post().to(deposit_handler))
            .route(
                "/api/v1/withdrawals",
                web::post().to(request_withdrawal_handler),
            )
            .route(
                "/api/v1/earnings/claim",
                web::post().to(claim_reward_handler),
            )
            .route(
                "/api/v1/earnings/today",
                web::get().to(earnings_today_handler),
            )
            .route("/api/v1/ads", web::get().to(list_ads_handler))
            .route("/api/v1/packages", web::get().to(list_packages_handler))
            .route(
                "/api/v1/packages/activate",
                web::post().to(activate_package_handler),
            )
            .route("/api/v1/profile", web::get().to(profile_handler))
            .route(
                "/api/v1/transactions",
                web::get().to(transactions_handler),
            )
            .route(
                "/api/v1/account/deactivate",
                web::post().to(deactivate_account_handler),
            );

        if include_metrics_on_public {
            app = app.route("/metrics", web::get().to(metrics_handler));
        }

        app
    });

    // 绑定公共服务器地址；Unix 系统支持 Unix Domain Socket。
    #[cfg(unix)]
    {
        if let Some(socket) = config.api_unix_socket() {
            cleanup_socket(socket)?;
            public_server = public_server.bind_uds(socket)?;
        } else {
            public_server = public_server.bind(config.api_bind_address())?;
        }
    }

    #[cfg(not(unix))]
    {
        if let Some(socket) = config.api_unix_socket() {
            return Err(BootstrapError::Io(std::io::Error::other(format!(
                "unix socket '{socket}' requested but this platform does not support it"
            ))));
        }
        public_server = public_server.bind(config.api_bind_address())?;
    }

    tracing::info!(address = config.api_bind_address(), "public api listening");
    let public_server = public_server.run();

    // 7. 内部 HTTP 服务器（可选）：用户开通、广告/套餐目录管理和指标，
    //    只绑定在内部地址，绝不对公网暴露。
    let internal_server = if config.has_internal_listener() {
        let internal_state = state.clone();
        let mut internal_server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(internal_state.clone()))
                .wrap(Logger::default())
                .route("/metrics", web::get().to(metrics_handler))
                .route(
                    "/internal/v1/profiles",
                    web::post().to(provision_profile_handler),
                )
                .route("/internal/v1/ads", web::post().to(create_ad_handler))
                .route(
                    "/internal/v1/packages",
                    web::post().to(create_package_handler),
                )
        });

        #[cfg(unix)]
        {
            if let Some(socket) = config.internal_unix_socket() {
                cleanup_socket(socket)?;
                internal_server = internal_server.bind_uds(socket)?;
            } else if let Some(addr) = config.internal_bind_address() {
                internal_server = internal_server.bind(addr)?;
            } else {
                return Err(BootstrapError::Io(std::io::Error::other(
                    "internal listener configured but no bind target provided",
                )));
            }
        }

        #[cfg(not(unix))]
        {
            if let Some(socket) = config.internal_unix_socket() {
                return Err(BootstrapError::Io(std::io::Error::other(format!(
                    "internal unix socket '{socket}' requested but this platform does not support it"
                ))));
            }
            if let Some(addr) = config.internal_bind_address() {
                internal_server = internal_server.bind(addr)?;
            } else {
                return Err(BootstrapError::Io(std::io::Error::other(
                    "internal listener configured but no bind target provided",
                )));
            }
        }

        Some(internal_server.run())
    } else {
        None
    };

    // 8. 并发运行两个服务器；任意一个出错即整体退出。
    if let Some(internal) = internal_server {
        tokio::try_join!(public_server, internal)?;
    } else {
        public_server.await?;
    }

    Ok(())
}

// 启动过程中的错误枚举。
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("storage error: {0}")]
    Storage(#[from] primeadview_domain::storage::StorageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// 清理遗留的 Unix Socket 文件，否则 bind 会失败。
#[cfg(unix)]
fn cleanup_socket(path: &str) -> std::io::Result<()> {
    let socket_path = Path::new(path);
    if socket_path.exists() {
        fs::remove_file(socket_path)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn cleanup_socket(_path: &str) -> std::io::Result<()> {
    Ok(())
}
