//! HTTP handlers for back-office endpoints.
//!
//! Every handler except login takes [`RequireAdmin`]; permissions beyond
//! viewing are checked with `admin.ensure(..)` before any work is done.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::adapters::http::dto::{
    AdminEventResponse, AdminMemberResponse, AdminUserResponse, ContactMessageResponse,
    EventResponse, GalleryImageResponse, PageResponse, PaymentResponse, ReceiptDownload,
    ReferralSourceResponse, RsvpResponse,
};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAdmin;
use crate::adapters::http::state::AppState;
use crate::application::handlers::admin_users::{
    CreateAdminUserCommand, DeleteAdminUserCommand, LogInAdminCommand, UpdateAdminUserCommand,
};
use crate::application::handlers::content::MarkMessageReadCommand;
use crate::application::handlers::events::{
    CheckInCommand, EventInput, SetEventPublishedCommand, UpdateEventCommand,
};
use crate::application::handlers::gallery::{UpdateImageCommand, UploadImageCommand};
use crate::application::handlers::marketing::UpdateReferralSourceCommand;
use crate::application::handlers::members::{
    ListMembersQuery, UpdateMemberNotesCommand, UpdateMemberStatusCommand,
};
use crate::application::handlers::payments::{
    ListPaymentsQuery, ReceiptRequester, RefundPaymentCommand, RenderReceiptQuery,
};
use crate::domain::foundation::{
    AdminUserId, ContactMessageId, EventId, GalleryImageId, MemberId, PaymentId, Permission,
    ReferralSourceId, RsvpId,
};
use crate::domain::marketing::{DateRange, MarketingStats};
use crate::ports::{MemberFilter, PaginationQuery, PaymentFilter};

use super::dto::{
    AdminLogInRequest, AdminSessionResponse, AttendeeResponse, CheckInResponse,
    CreateAdminUserRequest, CreateReferralSourceRequest, MarkReadRequest, MemberDetailResponse,
    MemberListParams, PageParams, PaymentListParams, PublishRequest, RefundRequest,
    RefundResponse, StatsParams, UnreadCountResponse, UpdateAdminUserRequest,
    UpdateImageRequest, UpdateNotesRequest, UpdateReferralSourceRequest, UpdateStatusRequest,
};

// ════════════════════════════════════════════════════════════════════════════════
// Session
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/admin/login
pub async fn log_in(
    State(state): State<AppState>,
    Json(request): Json<AdminLogInRequest>,
) -> Result<Json<AdminSessionResponse>, ApiError> {
    let result = state
        .admin_log_in_handler()
        .handle(LogInAdminCommand {
            email: request.email,
            password: request.password,
        })
        .await?;

    Ok(Json(AdminSessionResponse {
        admin: AdminUserResponse::from(&result.admin),
        token: result.token.into(),
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Members
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/admin/members
pub async fn list_members(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(params): Query<MemberListParams>,
) -> Result<Json<PageResponse<AdminMemberResponse>>, ApiError> {
    let page = PaginationQuery {
        limit: params.limit,
        offset: params.offset,
    }
    .page();
    let members = state
        .list_members_handler()
        .handle(ListMembersQuery {
            filter: MemberFilter {
                search: params.search,
                status: params.status,
            },
            page,
        })
        .await?;
    Ok(Json(PageResponse::map(members, |m| AdminMemberResponse::from(&m))))
}

/// GET /api/admin/members/:id
pub async fn get_member(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(member_id): Path<MemberId>,
) -> Result<Json<MemberDetailResponse>, ApiError> {
    let detail = state.member_detail_handler().handle(member_id).await?;
    Ok(Json(MemberDetailResponse {
        member: AdminMemberResponse::from(&detail.member),
        payments: detail.payments.iter().map(PaymentResponse::from).collect(),
        rsvps: detail.rsvps.iter().map(RsvpResponse::from).collect(),
    }))
}

/// PATCH /api/admin/members/:id/status
pub async fn update_member_status(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(member_id): Path<MemberId>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<AdminMemberResponse>, ApiError> {
    admin.ensure(Permission::ManageMembers)?;
    let member = state
        .member_status_handler()
        .handle(UpdateMemberStatusCommand {
            member_id,
            status: request.status,
            membership_expires_at: request.membership_expires_at,
        })
        .await?;
    Ok(Json(AdminMemberResponse::from(&member)))
}

/// PATCH /api/admin/members/:id/notes
pub async fn update_member_notes(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(member_id): Path<MemberId>,
    Json(request): Json<UpdateNotesRequest>,
) -> Result<Json<AdminMemberResponse>, ApiError> {
    admin.ensure(Permission::ManageMembers)?;
    let member = state
        .member_notes_handler()
        .handle(UpdateMemberNotesCommand {
            member_id,
            notes: request.notes,
        })
        .await?;
    Ok(Json(AdminMemberResponse::from(&member)))
}

/// DELETE /api/admin/members/:id
pub async fn delete_member(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(member_id): Path<MemberId>,
) -> Result<StatusCode, ApiError> {
    admin.ensure(Permission::DeleteMembers)?;
    state.delete_member_handler().handle(member_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ════════════════════════════════════════════════════════════════════════════════
// Admin users
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/admin/admin-users
pub async fn list_admin_users(
    State(state): State<AppState>,
    admin: RequireAdmin,
) -> Result<Json<Vec<AdminUserResponse>>, ApiError> {
    admin.ensure(Permission::ManageAdminUsers)?;
    let admins = state.list_admin_users_handler().handle().await?;
    Ok(Json(admins.iter().map(AdminUserResponse::from).collect()))
}

/// POST /api/admin/admin-users
pub async fn create_admin_user(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(request): Json<CreateAdminUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    admin.ensure(Permission::ManageAdminUsers)?;
    let created = state
        .create_admin_user_handler()
        .handle(CreateAdminUserCommand {
            email: request.email,
            name: request.name,
            password: request.password,
            role: request.role,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(AdminUserResponse::from(&created))))
}

/// PATCH /api/admin/admin-users/:id
pub async fn update_admin_user(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(admin_user_id): Path<AdminUserId>,
    Json(request): Json<UpdateAdminUserRequest>,
) -> Result<Json<AdminUserResponse>, ApiError> {
    admin.ensure(Permission::ManageAdminUsers)?;
    let updated = state
        .update_admin_user_handler()
        .handle(UpdateAdminUserCommand {
            admin_user_id,
            name: request.name,
            role: request.role,
            password: request.password,
        })
        .await?;
    Ok(Json(AdminUserResponse::from(&updated)))
}

/// DELETE /api/admin/admin-users/:id
pub async fn delete_admin_user(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(admin_user_id): Path<AdminUserId>,
) -> Result<StatusCode, ApiError> {
    admin.ensure(Permission::ManageAdminUsers)?;
    state
        .delete_admin_user_handler()
        .handle(DeleteAdminUserCommand {
            admin_user_id,
            requested_by: admin.admin_id,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ════════════════════════════════════════════════════════════════════════════════
// Events
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/admin/events
pub async fn list_events(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(params): Query<PageParams>,
) -> Result<Json<PageResponse<AdminEventResponse>>, ApiError> {
    let events = state
        .list_events_handler()
        .handle(params.pagination().page())
        .await?;
    Ok(Json(PageResponse::map(events, |e| AdminEventResponse::from(&e))))
}

/// GET /api/admin/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(event_id): Path<EventId>,
) -> Result<Json<AdminEventResponse>, ApiError> {
    let event = state.get_event_handler().handle(event_id).await?;
    Ok(Json(AdminEventResponse::from(&event)))
}

/// POST /api/admin/events
pub async fn create_event(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(input): Json<EventInput>,
) -> Result<impl IntoResponse, ApiError> {
    admin.ensure(Permission::ManageContent)?;
    let event = state.create_event_handler().handle(input).await?;
    Ok((StatusCode::CREATED, Json(AdminEventResponse::from(&event))))
}

/// PUT /api/admin/events/:id
pub async fn update_event(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(event_id): Path<EventId>,
    Json(input): Json<EventInput>,
) -> Result<Json<AdminEventResponse>, ApiError> {
    admin.ensure(Permission::ManageContent)?;
    let event = state
        .update_event_handler()
        .handle(UpdateEventCommand { event_id, input })
        .await?;
    Ok(Json(AdminEventResponse::from(&event)))
}

/// POST /api/admin/events/:id/publish
pub async fn set_event_published(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(event_id): Path<EventId>,
    Json(request): Json<PublishRequest>,
) -> Result<Json<AdminEventResponse>, ApiError> {
    admin.ensure(Permission::ManageContent)?;
    let event = state
        .publish_event_handler()
        .handle(SetEventPublishedCommand {
            event_id,
            published: request.published,
        })
        .await?;
    Ok(Json(AdminEventResponse::from(&event)))
}

/// DELETE /api/admin/events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(event_id): Path<EventId>,
) -> Result<StatusCode, ApiError> {
    admin.ensure(Permission::ManageContent)?;
    state.delete_event_handler().handle(event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/events/:id/rsvps
pub async fn list_event_rsvps(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(event_id): Path<EventId>,
) -> Result<Json<Vec<AttendeeResponse>>, ApiError> {
    let attendees = state.event_rsvps_handler().handle(event_id).await?;
    Ok(Json(
        attendees
            .into_iter()
            .map(|a| AttendeeResponse {
                rsvp: RsvpResponse::from(&a.rsvp),
                member_name: a.member_name,
                member_email: a.member_email,
            })
            .collect(),
    ))
}

/// POST /api/admin/events/:id/rsvps/:rsvp_id/check-in
pub async fn check_in(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path((event_id, rsvp_id)): Path<(EventId, RsvpId)>,
) -> Result<Json<CheckInResponse>, ApiError> {
    admin.ensure(Permission::ManageContent)?;
    let result = state
        .check_in_handler()
        .handle(CheckInCommand { event_id, rsvp_id })
        .await?;
    Ok(Json(CheckInResponse {
        rsvp: RsvpResponse::from(&result.rsvp),
        event: EventResponse::from(&result.event),
        checked_in_count: result.event.checked_in_count,
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Gallery
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/admin/gallery
pub async fn list_gallery(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<GalleryImageResponse>>, ApiError> {
    let images = state.list_images_handler().handle().await?;
    Ok(Json(images.iter().map(GalleryImageResponse::from).collect()))
}

/// POST /api/admin/gallery (multipart: `file`, `title`, optional `caption`)
pub async fn upload_image(
    State(state): State<AppState>,
    admin: RequireAdmin,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    admin.ensure(Permission::ManageContent)?;

    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut title = String::new();
    let mut caption = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request("file", e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request("file", e.body_text()))?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            "title" => {
                title = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request("title", e.body_text()))?;
            }
            "caption" => {
                caption = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request("caption", e.body_text()))?,
                );
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    let (file_name, content_type, bytes) =
        file.ok_or_else(|| ApiError::bad_request("file", "An image file is required"))?;

    let image = state
        .upload_image_handler()
        .handle(UploadImageCommand {
            file_name,
            content_type,
            bytes,
            title,
            caption,
            uploaded_by: admin.admin_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(GalleryImageResponse::from(&image))))
}

/// PATCH /api/admin/gallery/:id
pub async fn update_image(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(image_id): Path<GalleryImageId>,
    Json(request): Json<UpdateImageRequest>,
) -> Result<Json<GalleryImageResponse>, ApiError> {
    admin.ensure(Permission::ManageContent)?;
    let image = state
        .update_image_handler()
        .handle(UpdateImageCommand {
            image_id,
            title: request.title,
            caption: request.caption,
            sort_order: request.sort_order,
        })
        .await?;
    Ok(Json(GalleryImageResponse::from(&image)))
}

/// DELETE /api/admin/gallery/:id
pub async fn delete_image(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(image_id): Path<GalleryImageId>,
) -> Result<StatusCode, ApiError> {
    admin.ensure(Permission::ManageContent)?;
    state.delete_image_handler().handle(image_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ════════════════════════════════════════════════════════════════════════════════
// Payments
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/admin/payments
pub async fn list_payments(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(params): Query<PaymentListParams>,
) -> Result<Json<PageResponse<PaymentResponse>>, ApiError> {
    let page = PaginationQuery {
        limit: params.limit,
        offset: params.offset,
    }
    .page();
    let payments = state
        .list_payments_handler()
        .handle(ListPaymentsQuery {
            filter: PaymentFilter {
                status: params.status,
                purpose: params.purpose,
                member_id: params.member_id,
            },
            page,
        })
        .await?;
    Ok(Json(PageResponse::map(payments, |p| PaymentResponse::from(&p))))
}

/// GET /api/admin/payments/:id
pub async fn get_payment(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(payment_id): Path<PaymentId>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let payment = state.get_payment_handler().handle(payment_id).await?;
    Ok(Json(PaymentResponse::from(&payment)))
}

/// POST /api/admin/payments/:id/refund
pub async fn refund_payment(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(payment_id): Path<PaymentId>,
    Json(request): Json<RefundRequest>,
) -> Result<Json<RefundResponse>, ApiError> {
    admin.ensure(Permission::RefundPayments)?;
    let result = state
        .refund_handler()
        .handle(RefundPaymentCommand {
            payment_id,
            amount_cents: request.amount_cents,
            reason: request.reason,
            requested_by: admin.admin_id,
        })
        .await?;
    Ok(Json(RefundResponse {
        payment: PaymentResponse::from(&result.payment),
        refund_id: result.refund_id,
        refunded_now_cents: result.refunded_now_cents,
        fully_refunded: result.fully_refunded,
    }))
}

/// GET /api/admin/payments/:id/receipt
pub async fn download_receipt(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(payment_id): Path<PaymentId>,
) -> Result<ReceiptDownload, ApiError> {
    let receipt = state
        .receipt_handler()
        .handle(RenderReceiptQuery {
            payment_id,
            requester: ReceiptRequester::BackOffice,
        })
        .await?;
    Ok(ReceiptDownload(receipt))
}

// ════════════════════════════════════════════════════════════════════════════════
// Marketing
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/admin/stats?from=..&to=..
pub async fn get_stats(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(params): Query<StatsParams>,
) -> Result<Json<MarketingStats>, ApiError> {
    let range = DateRange::new(params.from, params.to)?;
    let stats = state.stats_handler().handle(range).await?;
    Ok(Json(stats))
}

/// GET /api/admin/referral-sources
pub async fn list_referral_sources(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<ReferralSourceResponse>>, ApiError> {
    let sources = state.list_referral_sources_handler().handle(false).await?;
    Ok(Json(sources.iter().map(ReferralSourceResponse::from).collect()))
}

/// POST /api/admin/referral-sources
pub async fn create_referral_source(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(request): Json<CreateReferralSourceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    admin.ensure(Permission::ManageContent)?;
    let source = state
        .create_referral_source_handler()
        .handle(&request.name)
        .await?;
    Ok((StatusCode::CREATED, Json(ReferralSourceResponse::from(&source))))
}

/// PATCH /api/admin/referral-sources/:id
pub async fn update_referral_source(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(referral_source_id): Path<ReferralSourceId>,
    Json(request): Json<UpdateReferralSourceRequest>,
) -> Result<Json<ReferralSourceResponse>, ApiError> {
    admin.ensure(Permission::ManageContent)?;
    let source = state
        .update_referral_source_handler()
        .handle(UpdateReferralSourceCommand {
            referral_source_id,
            name: request.name,
            active: request.active,
        })
        .await?;
    Ok(Json(ReferralSourceResponse::from(&source)))
}

/// DELETE /api/admin/referral-sources/:id
pub async fn delete_referral_source(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(referral_source_id): Path<ReferralSourceId>,
) -> Result<StatusCode, ApiError> {
    admin.ensure(Permission::ManageContent)?;
    state
        .delete_referral_source_handler()
        .handle(referral_source_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ════════════════════════════════════════════════════════════════════════════════
// Contact messages
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/admin/messages
pub async fn list_messages(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Query(params): Query<PageParams>,
) -> Result<Json<PageResponse<ContactMessageResponse>>, ApiError> {
    admin.ensure(Permission::ManageContent)?;
    let messages = state
        .list_messages_handler()
        .handle(params.pagination().page())
        .await?;
    Ok(Json(PageResponse::map(messages, |m| ContactMessageResponse::from(&m))))
}

/// GET /api/admin/messages/unread-count
pub async fn count_unread_messages(
    State(state): State<AppState>,
    admin: RequireAdmin,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    admin.ensure(Permission::ManageContent)?;
    let unread = state.unread_messages_handler().handle().await?;
    Ok(Json(UnreadCountResponse { unread }))
}

/// PATCH /api/admin/messages/:id
pub async fn mark_message_read(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(message_id): Path<ContactMessageId>,
    Json(request): Json<MarkReadRequest>,
) -> Result<Json<ContactMessageResponse>, ApiError> {
    admin.ensure(Permission::ManageContent)?;
    let message = state
        .mark_message_read_handler()
        .handle(MarkMessageReadCommand {
            message_id,
            read: request.read,
        })
        .await?;
    Ok(Json(ContactMessageResponse::from(&message)))
}

/// DELETE /api/admin/messages/:id
pub async fn delete_message(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(message_id): Path<ContactMessageId>,
) -> Result<StatusCode, ApiError> {
    admin.ensure(Permission::ManageContent)?;
    state.delete_message_handler().handle(message_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
