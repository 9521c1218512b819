//! Custom Axum extractors
//!
//! Wrappers around the stock extractors whose rejections come back as
//! `ApiError` JSON instead of plain text.

use axum::extract::{FromRequest, FromRequestParts, Path, Query};
use axum::http::request::Parts;
use fleet_core::{Page, PageParams, PlateNumbers};

use super::error::ApiError;

/// JSON request body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Typed path parameters
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Extract and validate plate numbers from path
pub struct ValidPlate(pub PlateNumbers);

impl<S> FromRequestParts<S> for ValidPlate
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(plate): Path<String> = Path::from_request_parts(parts, state).await?;
        Ok(Self(PlateNumbers::new(&plate)?))
    }
}

/// `?pageNumber=&pageSize=`, validated before any query runs
pub struct PageQuery(pub Page);

impl<S> FromRequestParts<S> for PageQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params): Query<PageParams> = Query::from_request_parts(parts, state).await?;
        Ok(Self(Page::try_from(params)?))
    }
}
