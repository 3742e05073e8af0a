use serde::{Deserialize, Serialize};

/// Body of `POST /api/auth/login`.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct LoginResponse {
    pub success: bool,
}

/// Returned by `POST /api/batches/start`; poll `/api/batches/status/{batch_id}`.
#[derive(Serialize, Deserialize, Debug)]
pub struct StartBatchResponse {
    pub batch_id: String,
}
