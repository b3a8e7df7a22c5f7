//! Owner 侧的链接接口：创建、列表、分析、二维码内容

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::trace;

use crate::api::middleware::AuthenticatedUser;
use crate::errors::SnaplinkError;
use crate::services::{AnalyticsService, CreateLinkRequest, LinkService, ListLinksQuery};

use super::helpers::{api_result, error_response, parse_positive, request_base_url};
use super::types::{
    AnalyticsResponse, CreateLinkBody, CreateLinkResponse, LinkListResponse, LinkResponse,
    ListLinksParams, QrPayloadResponse,
};

// 路由都挂了 BearerAuth，正常情况下一定有值
fn owner_id(user: Option<web::ReqData<AuthenticatedUser>>) -> Result<String, SnaplinkError> {
    user.map(|u| u.into_inner().id)
        .ok_or_else(|| SnaplinkError::unauthorized("No token, authorization denied"))
}

/// POST /links
pub async fn create_link(
    user: Option<web::ReqData<AuthenticatedUser>>,
    body: web::Json<CreateLinkBody>,
    service: web::Data<LinkService>,
) -> HttpResponse {
    let owner_id = match owner_id(user) {
        Ok(id) => id,
        Err(e) => return error_response(&e),
    };
    let body = body.into_inner();

    let result = service
        .create_link(CreateLinkRequest {
            original_url: body.original_url,
            owner_id,
            custom_alias: body.custom_alias,
            expiration_date: body.expiration_date,
        })
        .await
        .map(|link| CreateLinkResponse {
            success: true,
            link: LinkResponse::from(link),
        });

    api_result(StatusCode::CREATED, result)
}

/// GET /links?page&limit&search
pub async fn list_links(
    user: Option<web::ReqData<AuthenticatedUser>>,
    params: web::Query<ListLinksParams>,
    service: web::Data<LinkService>,
) -> HttpResponse {
    let owner_id = match owner_id(user) {
        Ok(id) => id,
        Err(e) => return error_response(&e),
    };
    let params = params.into_inner();
    trace!("Listing links for {}: {:?}", owner_id, params);

    let query = ListLinksQuery {
        page: parse_positive(params.page.as_deref()),
        limit: parse_positive(params.limit.as_deref()),
        search: params.search,
    };

    let result = service
        .list_links(&owner_id, query)
        .await
        .map(LinkListResponse::from);
    api_result(StatusCode::OK, result)
}

/// GET /links/{id}/analytics
pub async fn link_analytics(
    user: Option<web::ReqData<AuthenticatedUser>>,
    path: web::Path<String>,
    service: web::Data<AnalyticsService>,
) -> HttpResponse {
    let owner_id = match owner_id(user) {
        Ok(id) => id,
        Err(e) => return error_response(&e),
    };
    let link_id = path.into_inner();

    let result = service
        .summarize(&link_id, &owner_id)
        .await
        .map(AnalyticsResponse::from);
    api_result(StatusCode::OK, result)
}

/// GET /links/{code}/qr
pub async fn qr_payload(
    req: HttpRequest,
    user: Option<web::ReqData<AuthenticatedUser>>,
    path: web::Path<String>,
    service: web::Data<LinkService>,
) -> HttpResponse {
    if let Err(e) = owner_id(user) {
        return error_response(&e);
    }
    let short_code = path.into_inner();
    let request_base = request_base_url(&req);

    let result = service
        .qr_payload(&short_code, &request_base)
        .await
        .map(|short_url| QrPayloadResponse {
            success: true,
            short_code,
            short_url,
        });
    api_result(StatusCode::OK, result)
}
