//! Request extractors whose rejections are reported as `AppError`

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// `Json` body; malformed or mistyped payloads become `BadRequest`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `Query` string; unparsable parameters become `BadRequest`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// `Path` segments; unparsable IDs become `BadRequest`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);
