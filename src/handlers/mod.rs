use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

pub mod admin;
pub mod driver;
pub mod public;

/// `Json` whose rejection renders as the usual failure body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Query` whose rejection renders as the usual failure body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
