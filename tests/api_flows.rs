//! End-to-end HTTP flows against the in-memory backend.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;

use common::{TestApp, CONTACT_LIMIT, MEMBER_PASSWORD};

fn event_body(title: &str, capacity: u32, member_price_cents: i64) -> serde_json::Value {
    let starts_at = Utc::now() + Duration::days(7);
    json!({
        "title": title,
        "description": "Bring snacks.",
        "location": "Main hall",
        "starts_at": starts_at.to_rfc3339(),
        "ends_at": (starts_at + Duration::hours(3)).to_rfc3339(),
        "member_price_cents": member_price_cents,
        "guest_price_cents": 0,
        "capacity": capacity,
    })
}

// =============================================================================
// Public surface
// =============================================================================

#[tokio::test]
async fn health_and_site_content_are_public() {
    let app = TestApp::spawn().await;

    let health = app.get("/health", None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.json()["status"], "ok");

    let site = app.get("/api/site", None).await;
    assert_eq!(site.status, StatusCode::OK);
    assert_eq!(site.json()["club_name"], "Test Club");
    assert_eq!(site.json()["home"]["headline"], "Welcome");
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = TestApp::spawn().await;
    let response = app.get("/health", None).await;
    assert!(response.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn contact_form_is_rate_limited_and_lands_in_inbox() {
    let app = TestApp::spawn().await;
    let message = json!({
        "name": "Grace",
        "email": "grace@example.org",
        "subject": "Hello",
        "message": "Do you run beginner sessions?",
    });

    for _ in 0..CONTACT_LIMIT {
        let response = app.post("/api/contact", None, message.clone()).await;
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.json()["received"], true);
    }

    let limited = app.post("/api/contact", None, message).await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.headers.contains_key(header::RETRY_AFTER));
    assert_eq!(limited.json()["code"], "RATE_LIMITED");

    let admin = app.admin_token().await;
    let unread = app.get("/api/admin/messages/unread-count", Some(&admin)).await;
    assert_eq!(unread.status, StatusCode::OK);
    assert_eq!(unread.json()["unread"], CONTACT_LIMIT);

    let inbox = app.get("/api/admin/messages", Some(&admin)).await;
    assert_eq!(inbox.json()["total"], CONTACT_LIMIT);
}

#[tokio::test]
async fn contact_form_rejects_invalid_email() {
    let app = TestApp::spawn().await;
    let response = app
        .post(
            "/api/contact",
            None,
            json!({ "name": "Grace", "email": "not-an-email", "message": "Hi" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["code"], "VALIDATION_FAILED");
}

// =============================================================================
// Member accounts
// =============================================================================

#[tokio::test]
async fn signup_starts_membership_checkout() {
    let app = TestApp::spawn().await;
    let response = app
        .post(
            "/api/members/signup",
            None,
            json!({
                "email": "ada@example.org",
                "password": MEMBER_PASSWORD,
                "first_name": "Ada",
                "last_name": "Lovelace",
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let body = response.json();
    assert_eq!(body["member"]["status"], "pending");
    assert_eq!(body["member"]["has_access"], false);
    assert!(body["checkout"]["checkout_url"]
        .as_str()
        .unwrap()
        .starts_with("https://club.example.org"));
    assert!(app.payments.was_called("create_checkout_session"));
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let app = TestApp::spawn().await;
    app.sign_up("ada@example.org").await;

    let again = app
        .post(
            "/api/members/signup",
            None,
            json!({
                "email": "ADA@example.org",
                "password": MEMBER_PASSWORD,
                "first_name": "Ada",
                "last_name": "Again",
            }),
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.json()["code"], "MEMBER_EXISTS");
}

#[tokio::test]
async fn login_and_profile_require_valid_credentials() {
    let app = TestApp::spawn().await;
    app.sign_up("ada@example.org").await;

    let wrong = app
        .post(
            "/api/members/login",
            None,
            json!({ "email": "ada@example.org", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let login = app
        .post(
            "/api/members/login",
            None,
            json!({ "email": "ada@example.org", "password": MEMBER_PASSWORD }),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    let token = login.json()["token"]["token"].as_str().unwrap().to_string();

    let anonymous = app.get("/api/members/me", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let me = app.get("/api/members/me", Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.json()["email"], "ada@example.org");

    let updated = app
        .request(
            Method::PATCH,
            "/api/members/me",
            Some(&token),
            Some(json!({ "first_name": "Augusta" })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["first_name"], "Augusta");
    assert_eq!(updated.json()["last_name"], "Lovelace");
}

#[tokio::test]
async fn garbage_bearer_token_is_rejected() {
    let app = TestApp::spawn().await;
    let response = app.get("/api/events", Some("not-a-jwt")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Payments
// =============================================================================

#[tokio::test]
async fn webhook_activates_membership_once() {
    let app = TestApp::spawn().await;
    let (_, token, payment_id) = app.sign_up("ada@example.org").await;

    let first = app.complete_checkout(&payment_id).await;
    assert_eq!(first.status, StatusCode::OK, "{:?}", first.json());
    assert_eq!(first.json()["outcome"], "membership_activated");

    let replay = app.complete_checkout(&payment_id).await;
    assert_eq!(replay.status, StatusCode::OK);
    assert_eq!(replay.json()["outcome"], "acknowledged");

    let me = app.get("/api/members/me", Some(&token)).await;
    assert_eq!(me.json()["status"], "active");
    assert_eq!(me.json()["has_access"], true);

    let payments = app.get("/api/members/me/payments", Some(&token)).await;
    assert_eq!(payments.status, StatusCode::OK);
    assert_eq!(payments.json()["items"][0]["status"], "succeeded");
    assert_eq!(payments.json()["items"][0]["has_receipt"], true);
}

#[tokio::test]
async fn webhook_with_bad_signature_is_rejected() {
    let app = TestApp::spawn().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/webhooks/stripe")
        .header("stripe-signature", "t=1,v1=deadbeef")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let unsigned = Request::builder()
        .method(Method::POST)
        .uri("/api/webhooks/stripe")
        .body(Body::from("{}"))
        .unwrap();
    assert_eq!(app.send(unsigned).await.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn receipt_downloads_as_pdf_after_payment() {
    let app = TestApp::spawn().await;
    let (_, token, payment_id) = app.sign_up("ada@example.org").await;

    let early = app
        .get(&format!("/api/members/me/payments/{}/receipt", payment_id), Some(&token))
        .await;
    assert_eq!(early.status, StatusCode::CONFLICT);

    app.complete_checkout(&payment_id).await;
    let receipt = app
        .get(&format!("/api/members/me/payments/{}/receipt", payment_id), Some(&token))
        .await;
    assert_eq!(receipt.status, StatusCode::OK);
    assert_eq!(receipt.headers[header::CONTENT_TYPE], "application/pdf");
    assert!(receipt.bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn admin_refund_marks_payment_refunded() {
    let app = TestApp::spawn().await;
    let (_, _, payment_id) = app.sign_up("ada@example.org").await;
    app.complete_checkout(&payment_id).await;
    let admin = app.admin_token().await;

    let refund = app
        .post(
            &format!("/api/admin/payments/{}/refund", payment_id),
            Some(&admin),
            json!({ "reason": "requested_by_customer" }),
        )
        .await;
    assert_eq!(refund.status, StatusCode::OK, "{:?}", refund.json());
    assert_eq!(refund.json()["fully_refunded"], true);
    assert_eq!(refund.json()["payment"]["status"], "refunded");
    assert_eq!(app.payments.refund_requests().len(), 1);

    let again = app
        .post(
            &format!("/api/admin/payments/{}/refund", payment_id),
            Some(&admin),
            json!({}),
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
}

// =============================================================================
// Events
// =============================================================================

#[tokio::test]
async fn rsvp_respects_publication_and_capacity() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let created = app
        .post("/api/admin/events", Some(&admin), event_body("Board games", 2, 0))
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.json());
    let event_id = created.json()["id"].as_str().unwrap().to_string();

    let hidden = app.get(&format!("/api/events/{}", event_id), None).await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);

    let published = app
        .post(
            &format!("/api/admin/events/{}/publish", event_id),
            Some(&admin),
            json!({ "published": true }),
        )
        .await;
    assert_eq!(published.status, StatusCode::OK);
    assert_eq!(published.json()["published"], true);

    let (_, ada, _) = app.sign_up("ada@example.org").await;
    let (_, bob, _) = app.sign_up("bob@example.org").await;
    let rsvp_uri = format!("/api/members/me/events/{}/rsvp", event_id);

    let reserved = app.post(&rsvp_uri, Some(&ada), json!({ "guests": 1 })).await;
    assert_eq!(reserved.status, StatusCode::CREATED, "{:?}", reserved.json());
    assert_eq!(reserved.json()["event"]["seats_available"], 0);

    let full = app.post(&rsvp_uri, Some(&bob), json!({ "guests": 0 })).await;
    assert_eq!(full.status, StatusCode::CONFLICT);
    assert_eq!(full.json()["code"], "EVENT_FULL");

    let cancelled = app.request(Method::DELETE, &rsvp_uri, Some(&ada), None).await;
    assert_eq!(cancelled.status, StatusCode::OK);
    assert_eq!(cancelled.json()["seats_available"], 2);

    let retry = app.post(&rsvp_uri, Some(&bob), json!({})).await;
    assert_eq!(retry.status, StatusCode::CREATED);
    let rsvp_id = retry.json()["rsvp"]["id"].as_str().unwrap().to_string();

    let attendees = app
        .get(&format!("/api/admin/events/{}/rsvps", event_id), Some(&admin))
        .await;
    assert_eq!(attendees.status, StatusCode::OK);
    assert_eq!(attendees.json().as_array().unwrap().len(), 1);

    let checked_in = app
        .post(
            &format!("/api/admin/events/{}/rsvps/{}/check-in", event_id, rsvp_id),
            Some(&admin),
            json!({}),
        )
        .await;
    assert_eq!(checked_in.status, StatusCode::OK, "{:?}", checked_in.json());
    assert_eq!(checked_in.json()["checked_in_count"], 1);
}

#[tokio::test]
async fn paid_event_requires_checkout() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let created = app
        .post("/api/admin/events", Some(&admin), event_body("Dinner", 10, 2_500))
        .await;
    let event_id = created.json()["id"].as_str().unwrap().to_string();
    app.post(
        &format!("/api/admin/events/{}/publish", event_id),
        Some(&admin),
        json!({ "published": true }),
    )
    .await;

    let (_, ada, _) = app.sign_up("ada@example.org").await;
    let free_rsvp = app
        .post(&format!("/api/members/me/events/{}/rsvp", event_id), Some(&ada), json!({}))
        .await;
    assert_eq!(free_rsvp.status, StatusCode::BAD_REQUEST);

    let checkout = app
        .post(
            &format!("/api/members/me/events/{}/checkout", event_id),
            Some(&ada),
            json!({ "guests": 0 }),
        )
        .await;
    assert_eq!(checkout.status, StatusCode::OK, "{:?}", checkout.json());
    assert!(checkout.json()["checkout_url"].is_string());
}

// =============================================================================
// Back office
// =============================================================================

#[tokio::test]
async fn member_token_cannot_reach_back_office() {
    let app = TestApp::spawn().await;
    let (_, token, _) = app.sign_up("ada@example.org").await;

    let response = app.get("/api/admin/members", Some(&token)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let anonymous = app.get("/api/admin/members", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn viewer_can_read_but_not_write() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let created = app
        .post(
            "/api/admin/admin-users",
            Some(&admin),
            json!({
                "email": "viewer@club.example.org",
                "name": "Read Only",
                "password": "viewer-password-1",
                "role": "viewer",
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.json());

    let viewer = app
        .log_in_admin("viewer@club.example.org", "viewer-password-1")
        .await;

    let members = app.get("/api/admin/members", Some(&viewer)).await;
    assert_eq!(members.status, StatusCode::OK);

    let write = app
        .post("/api/admin/events", Some(&viewer), event_body("Nope", 5, 0))
        .await;
    assert_eq!(write.status, StatusCode::FORBIDDEN);

    let staff = app.get("/api/admin/admin-users", Some(&viewer)).await;
    assert_eq!(staff.status, StatusCode::FORBIDDEN);
}

/// Creates a back-office account with `role` and returns `(id, token)`.
async fn staff_account(app: &TestApp, admin: &str, email: &str, role: &str) -> (String, String) {
    let created = app
        .post(
            "/api/admin/admin-users",
            Some(admin),
            json!({
                "email": email,
                "name": "Staff",
                "password": "staff-password-1",
                "role": role,
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.json());
    let id = created.json()["id"].as_str().unwrap().to_string();
    let token = app.log_in_admin(email, "staff-password-1").await;
    (id, token)
}

#[tokio::test]
async fn deleted_admin_token_stops_working() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (ed_id, ed) = staff_account(&app, &admin, "ed@club.example.org", "administrator").await;

    let deleted = app
        .request(Method::DELETE, &format!("/api/admin/admin-users/{}", ed_id), Some(&admin), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let list = app.get("/api/admin/admin-users", Some(&ed)).await;
    assert_eq!(list.status, StatusCode::UNAUTHORIZED);

    let create = app
        .post(
            "/api/admin/admin-users",
            Some(&ed),
            json!({
                "email": "sneaky@club.example.org",
                "name": "Sneaky",
                "password": "sneaky-password-1",
                "role": "administrator",
            }),
        )
        .await;
    assert_eq!(create.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn demotion_applies_to_existing_tokens() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (ed_id, ed) = staff_account(&app, &admin, "ed@club.example.org", "administrator").await;
    assert_eq!(app.get("/api/admin/admin-users", Some(&ed)).await.status, StatusCode::OK);

    let demoted = app
        .request(
            Method::PATCH,
            &format!("/api/admin/admin-users/{}", ed_id),
            Some(&admin),
            Some(json!({ "role": "viewer" })),
        )
        .await;
    assert_eq!(demoted.status, StatusCode::OK, "{:?}", demoted.json());

    assert_eq!(app.get("/api/admin/admin-users", Some(&ed)).await.status, StatusCode::FORBIDDEN);
    assert_eq!(app.get("/api/admin/members", Some(&ed)).await.status, StatusCode::OK);
}

#[tokio::test]
async fn admin_searches_and_annotates_members() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    app.sign_up("ada@example.org").await;
    let (member_id, _, _) = app.sign_up("bob@example.org").await;

    let search = app.get("/api/admin/members?search=bob", Some(&admin)).await;
    assert_eq!(search.status, StatusCode::OK);
    assert_eq!(search.json()["total"], 1);
    assert_eq!(search.json()["items"][0]["id"], member_id.as_str());

    let notes = app
        .request(
            Method::PATCH,
            &format!("/api/admin/members/{}/notes", member_id),
            Some(&admin),
            Some(json!({ "notes": "Met at the spring fair" })),
        )
        .await;
    assert_eq!(notes.status, StatusCode::OK, "{:?}", notes.json());

    let detail = app
        .get(&format!("/api/admin/members/{}", member_id), Some(&admin))
        .await;
    assert_eq!(detail.status, StatusCode::OK);
}

#[tokio::test]
async fn stats_are_available_to_staff() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    app.sign_up("ada@example.org").await;

    let stats = app.get("/api/admin/stats", Some(&admin)).await;
    assert_eq!(stats.status, StatusCode::OK, "{:?}", stats.json());
}

#[tokio::test]
async fn gallery_upload_is_listed_publicly() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let boundary = "clubhouse-boundary";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"title\"\r\n\r\n\
         Summer party\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"party.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         not-really-a-png\r\n\
         --{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/admin/gallery")
        .header(header::AUTHORIZATION, format!("Bearer {}", admin))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();
    let uploaded = app.send(request).await;
    assert_eq!(uploaded.status, StatusCode::CREATED, "{:?}", uploaded.json());
    assert_eq!(uploaded.json()["title"], "Summer party");

    let gallery = app.get("/api/gallery", None).await;
    assert_eq!(gallery.status, StatusCode::OK);
    assert_eq!(gallery.json().as_array().unwrap().len(), 1);
}
