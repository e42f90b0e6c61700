use primeadview_domain::auth::AuthVerifier;
use primeadview_domain::services::telemetry::TelemetryGuard;
use primeadview_storage::SeaOrmStorage;

#[derive(Clone)]
pub struct AppState {
    storage: SeaOrmStorage,
    verifier: AuthVerifier,
    telemetry: TelemetryGuard,
}

impl AppState {
    pub fn new(storage: SeaOrmStorage, verifier: AuthVerifier, telemetry: TelemetryGuard) -> Self {
        Self {
            storage,
            verifier,
            telemetry,
        }
    }

    pub fn storage(&self) -> &SeaOrmStorage {
        &self.storage
    }

    pub fn verifier(&self) -> &AuthVerifier {
        &self.verifier
    }

    pub fn telemetry(&self) -> &TelemetryGuard {
        &self.telemetry
    }
}
