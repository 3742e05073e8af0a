use crate::error::AppError;
use crate::job_controller::state::BatchesState;
use actix_web::{web, HttpResponse, ResponseError};

pub(crate) async fn process(
    batch_id: web::Path<String>,
    state: web::Data<BatchesState>,
) -> HttpResponse {
    match state.status(&batch_id.into_inner()).await {
        Some(status) => HttpResponse::Ok().json(status),
        None => AppError::BatchNotFound.error_response(),
    }
}
