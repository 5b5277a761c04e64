//! Application state shared by every RPC handler.

use filestore_core::Config;
use filestore_infra::AdmissionController;
use filestore_services::TransferService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub transfer: TransferService,
    pub admission: AdmissionController,
}

impl AppState {
    pub fn new(config: Config, transfer: TransferService) -> Self {
        let admission = AdmissionController::new(config.limits());
        Self {
            config,
            transfer,
            admission,
        }
    }
}
